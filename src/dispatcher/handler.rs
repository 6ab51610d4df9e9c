//! Command dispatcher
//!
//! Executes host commands against the transceiver session and turns the
//! outcome into a response frame.

use crate::commands::types::{Command, Response, ResponseStatus};
use crate::config::protocol;
use crate::radio::dialect::CommandSet;
use crate::radio::error::SessionError;
use crate::radio::session::{DeviceSession, ModuleVersion};
use crate::serial::traits::SerialConnector;
use embedded_hal_async::delay::DelayNs;

/// Command dispatcher
///
/// Receives commands and dispatches them to the session, returning the
/// response to send back to the host.
pub struct CommandDispatcher;

impl CommandDispatcher {
    /// Create a new command dispatcher
    pub fn new() -> Self {
        Self
    }

    /// Dispatch a command and return the response
    pub async fn dispatch<C, D, S>(
        &self,
        session: &mut DeviceSession<C, D, S>,
        command: Command,
    ) -> Response
    where
        C: SerialConnector,
        D: DelayNs,
        S: CommandSet,
    {
        let id = command.id();
        let outcome = match command {
            Command::GetVersion => Ok(self.handle_get_version()),
            Command::GetStatus => session.get_status().await.map(|_| ready(session)),
            Command::Restart => self.handle_restart(session).await,
            Command::GetConfig => Ok(Response::Config(*session.config())),
            Command::Send {
                text,
                checksum,
                repeat,
                interval_ms,
            } => session
                .send(&text, checksum, repeat, interval_ms.into())
                .await
                .map(|_| Response::TxComplete),
        };

        outcome.unwrap_or_else(|e| {
            log::warn!("{:?} failed: {}", id, e);
            Response::error(status_for(&e), id)
        })
    }

    fn handle_get_version(&self) -> Response {
        log::debug!(
            "Version requested. Responding {}.{}.{}",
            protocol::VERSION_MAJOR,
            protocol::VERSION_MINOR,
            protocol::VERSION_PATCH
        );
        Response::Version {
            major: protocol::VERSION_MAJOR,
            minor: protocol::VERSION_MINOR,
            patch: protocol::VERSION_PATCH,
        }
    }

    async fn handle_restart<C, D, S>(
        &self,
        session: &mut DeviceSession<C, D, S>,
    ) -> Result<Response, SessionError>
    where
        C: SerialConnector,
        D: DelayNs,
        S: CommandSet,
    {
        session.restart().await?;
        log::info!("transceiver restarted, module firmware {}", session.version());
        Ok(ready(session))
    }
}

impl Default for CommandDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn ready<C, D, S>(session: &DeviceSession<C, D, S>) -> Response
where
    C: SerialConnector,
    D: DelayNs,
    S: CommandSet,
{
    let mut module_version = ModuleVersion::new();
    // Both sides share the same capacity
    let _ = module_version.push_str(session.version());
    Response::Ready { module_version }
}

/// Map a session error onto the status reported to the host
pub fn status_for(error: &SessionError) -> ResponseStatus {
    match error {
        SessionError::LinkUnresponsive => ResponseStatus::Timeout,
        SessionError::SendFailed { .. } => ResponseStatus::SendFailed,
        SessionError::Framing(_) => ResponseStatus::InvalidPayload,
        SessionError::HandleClosed
        | SessionError::NotReady(_)
        | SessionError::AlreadyStarted => ResponseStatus::NotReady,
        SessionError::ModeSwitchFailed
        | SessionError::ConfigRejected
        | SessionError::Integrity(_)
        | SessionError::NoMessage
        | SessionError::Link(_) => ResponseStatus::RadioError,
    }
}
