//! Bounded polling for a success token in the module's response lines

use crate::config::timing::POLL_INTERVAL_MS;
use crate::radio::dialect::contains_token;
use crate::serial::reader::{Line, LineReader};
use crate::serial::traits::{SerialError, SerialLink};
use embedded_hal_async::delay::DelayNs;

/// Result of a poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The token was seen; carries the matching line
    Success(Line),
    /// The attempt budget ran out without a match
    Timeout,
}

/// Polls the link line by line until a token shows up or the budget runs out
///
/// Each attempt sleeps for the poll interval, then reads at most one line.
/// A read that finds no complete line consumes the attempt like a
/// non-matching line does.
#[derive(Debug, Clone, Copy)]
pub struct ResponseMatcher {
    poll_interval_ms: u32,
    trace_lines: bool,
}

impl ResponseMatcher {
    /// Create a matcher sleeping `poll_interval_ms` before every attempt
    pub fn new(poll_interval_ms: u32) -> Self {
        Self {
            poll_interval_ms,
            trace_lines: false,
        }
    }

    /// Log every line seen while polling
    pub fn with_line_trace(mut self, enabled: bool) -> Self {
        self.trace_lines = enabled;
        self
    }

    /// Poll for `token` (case-insensitive substring) over at most `max_attempts` reads
    pub async fn poll<L, D>(
        &self,
        reader: &mut LineReader,
        link: &mut L,
        delay: &mut D,
        max_attempts: u16,
        token: &str,
    ) -> Result<PollOutcome, SerialError>
    where
        L: SerialLink,
        D: DelayNs,
    {
        for attempt in 1..=max_attempts {
            delay.delay_ms(self.poll_interval_ms).await;

            let Some(line) = reader.try_read_line(link).await? else {
                continue;
            };

            if self.trace_lines {
                log::debug!(
                    "poll {}/{}: {}",
                    attempt,
                    max_attempts,
                    core::str::from_utf8(&line).unwrap_or("<non-utf8>")
                );
            }

            if contains_token(&line, token.as_bytes()) {
                return Ok(PollOutcome::Success(line));
            }
        }

        log::debug!("no {:?} within {} attempts", token, max_attempts);
        Ok(PollOutcome::Timeout)
    }
}

impl Default for ResponseMatcher {
    fn default() -> Self {
        Self::new(POLL_INTERVAL_MS)
    }
}
