//! Radio task: owns the transceiver session
//!
//! Brings the session up, retrying with a back-off until the module answers,
//! then alternates between relaying received messages to the host and
//! executing host commands. A session that faults is brought up again.

use embassy_time::{Duration, Timer};
use embedded_hal_async::delay::DelayNs;

use crate::commands::Response;
use crate::config::gateway;
use crate::dispatcher::{CommandDispatcher, CommandReceiver, ResponseSender};
use crate::radio::dialect::CommandSet;
use crate::radio::error::SessionError;
use crate::radio::session::{DeviceSession, SessionState};
use crate::serial::traits::SerialConnector;

/// Run the session forever
pub async fn radio_task<C, D, S>(
    mut session: DeviceSession<C, D, S>,
    command_receiver: CommandReceiver,
    response_sender: ResponseSender,
) where
    C: SerialConnector,
    D: DelayNs,
    S: CommandSet,
{
    let dispatcher = CommandDispatcher::new();

    bring_up(&mut session).await;

    loop {
        if session.state() == SessionState::Faulted {
            log::warn!("transceiver faulted, bringing it up again");
            bring_up(&mut session).await;
        }

        match session.receive(gateway::USE_CHECKSUM).await {
            Ok(message) => {
                log::info!("received {:?}", message.text.as_str());
                response_sender.send(Response::from(message)).await;
            }
            Err(SessionError::NoMessage) => {}
            Err(e) => log::warn!("receive failed: {}", e),
        }

        while let Ok(command) = command_receiver.try_receive() {
            let response = dispatcher.dispatch(&mut session, command).await;
            response_sender.send(response).await;
        }

        Timer::after(Duration::from_millis(gateway::RX_POLL_INTERVAL_MS)).await;
    }
}

/// Restart the session until it comes up, backing off between failed attempts
async fn bring_up<C, D, S>(session: &mut DeviceSession<C, D, S>)
where
    C: SerialConnector,
    D: DelayNs,
    S: CommandSet,
{
    loop {
        match session.restart().await {
            Ok(()) => {
                log::info!("transceiver ready, firmware {}", session.version());
                return;
            }
            Err(e) => {
                log::warn!(
                    "transceiver start failed: {}; retrying in {} ms",
                    e,
                    gateway::START_RETRY_DELAY_MS
                );
                Timer::after(Duration::from_millis(gateway::START_RETRY_DELAY_MS)).await;
            }
        }
    }
}
