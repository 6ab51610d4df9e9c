//! Device session: lifecycle and operations of one transceiver module
//!
//! ```text
//! Closed -> Opening -> VersionConfirmed -> ModeConfigured -> Ready
//!              \______________\__________________\___________\--> Faulted
//! ```
//!
//! `start()` walks the chain, confirming each AT command with the
//! [`ResponseMatcher`]. Any unanswered command or link error lands in
//! `Faulted`; `stop()` releases the link from any state and returns to
//! `Closed`.

use crate::config::protocol::MAX_VERSION_LEN;
use crate::config::{timing, uart};
use crate::radio::checksum;
use crate::radio::dialect::{find_token_end, CommandSet, Rak811P2p, LINE_TERMINATOR};
use crate::radio::error::{FramingError, Result, SessionError};
use crate::radio::matcher::{PollOutcome, ResponseMatcher};
use crate::radio::message::{Message, MessageFramer, WireLine};
use crate::radio::settings::{ConfigurationValidator, RadioConfig, RawRadioConfig};
use crate::serial::reader::LineReader;
use crate::serial::traits::{SerialConnector, SerialError, SerialLink};
use embedded_hal_async::delay::DelayNs;
use heapless::String;

/// Firmware version string reported by the module
pub type ModuleVersion = String<MAX_VERSION_LEN>;

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No link open
    Closed,
    /// Link opened, version not yet confirmed
    Opening,
    /// Module answered the version query
    VersionConfirmed,
    /// Module switched to P2P mode
    ModeConfigured,
    /// Radio configured; send and receive are available
    Ready,
    /// A command went unanswered or the link failed; only `stop()` leaves this state
    Faulted,
}

/// Attempts allowed per command kind while waiting for its success token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptBudgets {
    pub version: u16,
    pub mode_switch: u16,
    pub config: u16,
    pub status: u16,
    pub send_ack: u16,
}

impl Default for AttemptBudgets {
    fn default() -> Self {
        Self {
            version: timing::VERSION_ATTEMPTS,
            mode_switch: timing::MODE_SWITCH_ATTEMPTS,
            config: timing::CONFIG_ATTEMPTS,
            status: timing::STATUS_ATTEMPTS,
            send_ack: timing::SEND_ACK_ATTEMPTS,
        }
    }
}

/// Link and polling options of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Serial port identifier handed to the connector
    pub port: u8,
    pub baud_rate: u32,
    /// Trace every command written and every response line read
    pub debug: bool,
    /// Delay before each response read
    pub poll_interval_ms: u32,
    pub budgets: AttemptBudgets,
}

impl SessionOptions {
    /// Options for `port` at `baud_rate`, everything else default
    pub fn new(port: u8, baud_rate: u32) -> Self {
        Self {
            port,
            baud_rate,
            ..Self::default()
        }
    }

    /// Enable or disable line tracing
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            port: uart::PORT,
            baud_rate: uart::BAUD_RATE,
            debug: false,
            poll_interval_ms: timing::POLL_INTERVAL_MS,
            budgets: AttemptBudgets::default(),
        }
    }
}

/// One transceiver module behind one serial link
///
/// The session owns the link exclusively from `start()` until `stop()`.
/// Dropping an open session drops the link with it, so the handle is
/// released on every exit path.
pub struct DeviceSession<C: SerialConnector, D: DelayNs, S: CommandSet = Rak811P2p> {
    connector: C,
    delay: D,
    options: SessionOptions,
    config: RadioConfig,
    state: SessionState,
    link: Option<C::Link>,
    reader: LineReader,
    matcher: ResponseMatcher,
    framer: MessageFramer<S>,
    version: ModuleVersion,
}

impl<C, D, S> DeviceSession<C, D, S>
where
    C: SerialConnector,
    D: DelayNs,
    S: CommandSet,
{
    /// Create a closed session; `radio` is validated against the RAK811 domains
    pub fn new(connector: C, delay: D, options: SessionOptions, radio: &RawRadioConfig) -> Self {
        Self::with_validator(connector, delay, options, radio, &ConfigurationValidator::rak811())
    }

    /// Create a closed session validating `radio` with `validator`
    pub fn with_validator(
        connector: C,
        delay: D,
        options: SessionOptions,
        radio: &RawRadioConfig,
        validator: &ConfigurationValidator<'_>,
    ) -> Self {
        let config = validator.validate(radio);
        if config.to_raw() != *radio {
            log::warn!("radio parameters adjusted to device domains: {:?}", config);
        }

        Self {
            connector,
            delay,
            options,
            config,
            state: SessionState::Closed,
            link: None,
            reader: LineReader::new(),
            matcher: ResponseMatcher::new(options.poll_interval_ms).with_line_trace(options.debug),
            framer: MessageFramer::new(),
            version: ModuleVersion::new(),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Validated radio configuration pushed on `start()`
    pub fn config(&self) -> &RadioConfig {
        &self.config
    }

    /// Firmware version reported by the module, empty until started
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Whether the session currently holds the link
    pub fn is_open(&self) -> bool {
        self.link.is_some()
    }

    /// Open the link and bring the module up to `Ready`
    pub async fn start(&mut self) -> Result<()> {
        if self.state != SessionState::Closed {
            return Err(SessionError::AlreadyStarted);
        }

        self.set_state(SessionState::Opening);
        match self
            .connector
            .open(self.options.port, self.options.baud_rate)
            .await
        {
            Ok(link) => self.link = Some(link),
            Err(e) => {
                log::warn!("opening port {} failed: {}", self.options.port, e);
                self.set_state(SessionState::Faulted);
                return Err(e.into());
            }
        }
        self.reader.reset();

        match self.bring_up().await {
            Ok(()) => {
                self.set_state(SessionState::Ready);
                Ok(())
            }
            Err(e) => {
                log::warn!("start failed: {}", e);
                self.set_state(SessionState::Faulted);
                Err(e)
            }
        }
    }

    async fn bring_up(&mut self) -> Result<()> {
        let budgets = self.options.budgets;

        match self
            .exchange(S::VERSION_QUERY, budgets.version, S::ACK_TOKEN)
            .await?
        {
            PollOutcome::Success(line) => self.record_version(&line),
            PollOutcome::Timeout => return Err(SessionError::LinkUnresponsive),
        }
        self.set_state(SessionState::VersionConfirmed);

        if let PollOutcome::Timeout = self
            .exchange(S::MODE_SWITCH, budgets.mode_switch, S::ACK_TOKEN)
            .await?
        {
            return Err(SessionError::ModeSwitchFailed);
        }
        self.set_state(SessionState::ModeConfigured);

        let mut command = WireLine::new();
        command
            .push_str(S::CONFIG_PREFIX)
            .and_then(|_| command.push_str(&self.config.fragment()))
            .map_err(|_| SessionError::Framing(FramingError::PayloadTooLarge))?;
        if let PollOutcome::Timeout = self
            .exchange(&command, budgets.config, S::ACK_TOKEN)
            .await?
        {
            return Err(SessionError::ConfigRejected);
        }

        Ok(())
    }

    /// Send `text` `repeat_count` times, `interval_ms` apart
    ///
    /// Fails fast: the first repeat whose acknowledgement times out ends the
    /// operation with [`SessionError::SendFailed`], and no further repeats go
    /// out. Earlier repeats may already have reached the receiver.
    pub async fn send(
        &mut self,
        text: &str,
        use_checksum: bool,
        repeat_count: u8,
        interval_ms: u32,
    ) -> Result<()> {
        self.require_ready()?;

        let checksum = use_checksum.then(|| checksum::compute(text.as_bytes()));
        let line = self
            .framer
            .encode_outgoing(text, checksum)
            .map_err(SessionError::Framing)?;

        for iteration in 1..=repeat_count {
            if self.options.debug {
                log::debug!("> {}", line.trim_end());
            }
            let outcome = self
                .write_and_poll(line.as_bytes(), self.options.budgets.send_ack, S::ACK_TOKEN)
                .await;
            match self.check_link(outcome)? {
                PollOutcome::Success(_) => {}
                PollOutcome::Timeout => {
                    log::warn!("send repeat {}/{} not acknowledged", iteration, repeat_count);
                    return Err(SessionError::SendFailed { iteration });
                }
            }

            if iteration < repeat_count {
                self.delay.delay_ms(interval_ms).await;
            }
        }

        Ok(())
    }

    /// Decode the next pending line as a received message
    ///
    /// Returns [`SessionError::NoMessage`] when no complete line is pending;
    /// never waits beyond the link's own read timeout.
    pub async fn receive(&mut self, use_checksum: bool) -> Result<Message> {
        let link = self.link.as_mut().ok_or(SessionError::HandleClosed)?;

        let read = self.reader.try_read_line(link).await;
        let line = match read {
            Ok(Some(line)) => line,
            Ok(None) => return Err(SessionError::NoMessage),
            Err(e) => return Err(self.fault_on_link_error(e.into())),
        };

        let text = core::str::from_utf8(&line)
            .map_err(|_| SessionError::Framing(FramingError::InvalidText))?;
        if self.options.debug {
            log::debug!("< {}", text);
        }

        Ok(self.framer.decode_incoming(text, use_checksum)?)
    }

    /// Query the module status and wait for the end of its listing
    pub async fn get_status(&mut self) -> Result<()> {
        if self.link.is_none() {
            return Err(SessionError::HandleClosed);
        }

        let outcome = self
            .exchange(S::STATUS_QUERY, self.options.budgets.status, S::STATUS_END_TOKEN)
            .await;
        match self.check_link(outcome)? {
            PollOutcome::Success(_) => Ok(()),
            PollOutcome::Timeout => Err(SessionError::LinkUnresponsive),
        }
    }

    /// Release the link and return to `Closed`
    ///
    /// Safe from any state and safe to repeat. A release error is logged and
    /// returned, but the session is `Closed` either way.
    pub async fn stop(&mut self) -> core::result::Result<(), SerialError> {
        let result = match self.link.take() {
            Some(link) => self.connector.release(link).await,
            None => Ok(()),
        };
        if let Err(e) = result {
            log::warn!("releasing port {} failed: {}", self.options.port, e);
        }

        self.reader.reset();
        self.version.clear();
        self.set_state(SessionState::Closed);
        result
    }

    /// Release the link and bring the module up again, from any state
    pub async fn restart(&mut self) -> Result<()> {
        // A release error still leaves the session closed
        let _ = self.stop().await;
        self.start().await
    }

    fn require_ready(&self) -> Result<()> {
        if self.link.is_none() {
            return Err(SessionError::HandleClosed);
        }
        if self.state != SessionState::Ready {
            return Err(SessionError::NotReady(self.state));
        }
        Ok(())
    }

    /// Write `command` plus CR-LF and poll for `token`
    async fn exchange(&mut self, command: &str, attempts: u16, token: &str) -> Result<PollOutcome> {
        if self.options.debug {
            log::debug!("> {}", command);
        }

        let mut line = WireLine::new();
        line.push_str(command)
            .and_then(|_| line.push_str(LINE_TERMINATOR))
            .map_err(|_| SessionError::Framing(FramingError::PayloadTooLarge))?;

        self.write_and_poll(line.as_bytes(), attempts, token).await
    }

    async fn write_and_poll(&mut self, bytes: &[u8], attempts: u16, token: &str) -> Result<PollOutcome> {
        let link = self.link.as_mut().ok_or(SessionError::HandleClosed)?;
        link.write(bytes).await?;
        link.flush().await?;

        let outcome = self
            .matcher
            .poll(&mut self.reader, link, &mut self.delay, attempts, token)
            .await?;
        Ok(outcome)
    }

    /// Move to `Faulted` if `outcome` carries a link error
    fn check_link<T>(&mut self, outcome: Result<T>) -> Result<T> {
        outcome.map_err(|e| self.fault_on_link_error(e))
    }

    fn fault_on_link_error(&mut self, error: SessionError) -> SessionError {
        if let SessionError::Link(e) = error {
            log::warn!("link error: {}", e);
            self.set_state(SessionState::Faulted);
        }
        error
    }

    fn record_version(&mut self, line: &[u8]) {
        self.version.clear();
        let rest = find_token_end(line, S::ACK_TOKEN.as_bytes())
            .map(|end| &line[end..])
            .unwrap_or(line);
        let rest = core::str::from_utf8(rest.trim_ascii()).unwrap_or("");
        for c in rest.chars() {
            if self.version.push(c).is_err() {
                break;
            }
        }
        log::info!("module firmware {}", self.version);
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            log::info!("session {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }
}

impl<C, D, S> Drop for DeviceSession<C, D, S>
where
    C: SerialConnector,
    D: DelayNs,
    S: CommandSet,
{
    fn drop(&mut self) {
        if self.link.take().is_some() {
            log::debug!("session dropped while open, link released");
        }
    }
}
