//! UART link to the transceiver on ESP32-S3
//!
//! The connector owns the UART peripheral while no session holds it and
//! lends it out as a [`UartLink`] for the lifetime of a session.

use crate::config::uart::{PORT, READ_IDLE_TIMEOUT_MS};
use crate::serial::traits::{SerialConnector, SerialError, SerialLink};
use embassy_time::{with_timeout, Duration};
use esp_hal::uart::{Config as UartConfig, Uart};
use esp_hal::Async;

/// Hands out the transceiver UART
pub struct UartConnector {
    uart: Option<Uart<'static, Async>>,
}

impl UartConnector {
    /// Wrap an initialised async UART
    pub fn new(uart: Uart<'static, Async>) -> Self {
        Self { uart: Some(uart) }
    }
}

impl SerialConnector for UartConnector {
    type Link = UartLink;

    async fn open(&mut self, port: u8, baud_rate: u32) -> Result<UartLink, SerialError> {
        if port != PORT {
            log::warn!("no transceiver wired to UART{}", port);
            return Err(SerialError::OpenFailed);
        }

        let Some(mut uart) = self.uart.take() else {
            log::warn!("UART{} already in use", port);
            return Err(SerialError::OpenFailed);
        };

        if let Err(e) = uart.apply_config(&UartConfig::default().with_baudrate(baud_rate)) {
            log::warn!("UART{} rejected {} baud: {:?}", port, baud_rate, e);
            self.uart = Some(uart);
            return Err(SerialError::OpenFailed);
        }

        log::debug!("UART{} open at {} baud", port, baud_rate);
        Ok(UartLink { uart })
    }

    async fn release(&mut self, link: UartLink) -> Result<(), SerialError> {
        self.uart = Some(link.uart);
        Ok(())
    }
}

/// An open UART link
pub struct UartLink {
    uart: Uart<'static, Async>,
}

impl SerialLink for UartLink {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        let idle = Duration::from_millis(READ_IDLE_TIMEOUT_MS);
        match with_timeout(idle, embedded_io_async::Read::read(&mut self.uart, buf)).await {
            Ok(Ok(n)) => Ok(n),
            Ok(Err(e)) => {
                log::debug!("UART read failed: {:?}", e);
                Err(SerialError::ReadError)
            }
            // Nothing arrived within the idle window
            Err(_) => Ok(0),
        }
    }

    async fn write(&mut self, data: &[u8]) -> Result<(), SerialError> {
        embedded_io_async::Write::write_all(&mut self.uart, data)
            .await
            .map_err(|_| SerialError::WriteError)
    }

    async fn flush(&mut self) -> Result<(), SerialError> {
        embedded_io_async::Write::flush(&mut self.uart)
            .await
            .map_err(|_| SerialError::WriteError)
    }
}
