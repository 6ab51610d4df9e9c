//! Serial tasks for host command/response handling.
//!
//! Handles reading commands from and writing responses to the host serial
//! interface. These tasks are generic over any type implementing
//! embedded_io_async traits, so they run over USB Serial JTAG or a UART alike.

use embedded_io_async::{Read, Write};

use crate::commands::{CommandParser, ResponseSerialiser};
use crate::config::protocol::READ_CHUNK;
use crate::dispatcher::{CommandSender, ResponseReceiver, ResponseSender};
use crate::protocol::framing::FrameAccumulator;

/// Back-off after a host read error
const READ_ERROR_BACKOFF_MS: u64 = 10;

/// Task that reads commands from the host.
///
/// Parsed commands go to the radio task; frames that decode but do not parse
/// are answered directly with an error response.
pub async fn serial_reader_task<R: Read>(
    mut reader: R,
    command_sender: CommandSender,
    response_sender: ResponseSender,
) {
    let mut accumulator = FrameAccumulator::frames();
    let parser = CommandParser::new();

    loop {
        let mut buf = [0u8; READ_CHUNK];
        match reader.read(&mut buf).await {
            Ok(0) => continue,
            Ok(n) => {
                for &byte in &buf[..n] {
                    let Some(frame) = accumulator.push(byte) else {
                        continue;
                    };

                    match parser.parse_frame(&frame) {
                        Some(Ok(command)) => {
                            log::debug!("host command {:?}", command.id());
                            command_sender.send(command).await;
                        }
                        Some(Err(response)) => {
                            log::debug!("rejected host frame: {:?}", response);
                            response_sender.send(response).await;
                        }
                        None => {}
                    }
                }
            }
            Err(e) => {
                log::debug!("host read failed: {:?}", e);
                embassy_time::Timer::after(embassy_time::Duration::from_millis(
                    READ_ERROR_BACKOFF_MS,
                ))
                .await;
            }
        }
    }
}

/// Task that writes responses to the host.
pub async fn serial_writer_task<W: Write>(mut writer: W, response_receiver: ResponseReceiver) {
    let serialiser = ResponseSerialiser::new();

    loop {
        let response = response_receiver.receive().await;
        let encoded = serialiser.serialise(&response);
        if let Err(e) = writer.write_all(&encoded).await {
            log::debug!("host write failed: {:?}", e);
        }
    }
}
