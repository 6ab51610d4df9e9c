#![no_std]
#![no_main]

// Required for ESP-IDF bootloader compatibility
// Use explicit parameters to ensure correct efuse block revision values
esp_bootloader_esp_idf::esp_app_desc!(
    env!("CARGO_PKG_VERSION"),  // version
    env!("CARGO_PKG_NAME"),     // project_name
    "00:00:00",                 // build_time
    "2025-01-01",               // build_date
    "0.0.0",                    // idf_ver (not using IDF)
    0x10000,                    // mmu_page_size (64KB)
    0,                          // min_efuse_blk_rev_full (accept all)
    u16::MAX                    // max_efuse_blk_rev_full (accept all)
);

use embassy_executor::Spawner;
use embassy_time::Delay;
use esp_backtrace as _;
use esp_hal::timer::timg::TimerGroup;
use esp_hal::uart::{Config as UartConfig, Uart};
use esp_hal::usb_serial_jtag::{UsbSerialJtag, UsbSerialJtagRx, UsbSerialJtagTx};
use esp_hal::Async;
use static_cell::StaticCell;

use rak811_p2p_firmware::config::{logging, uart};
use rak811_p2p_firmware::dispatcher::{
    CommandReceiver, CommandSender, ResponseReceiver, ResponseSender, COMMAND_CHANNEL,
    RESPONSE_CHANNEL,
};
use rak811_p2p_firmware::radio::{DeviceSession, RawRadioConfig, SessionOptions};
use rak811_p2p_firmware::serial::uart::UartConnector;
use rak811_p2p_firmware::{logger, tasks};

/// Session type driving the RAK811 on UART1
type Session = DeviceSession<UartConnector, Delay>;

/// Static executor for embassy
static EXECUTOR: StaticCell<esp_rtos::embassy::Executor> = StaticCell::new();

#[esp_hal::main]
fn main() -> ! {
    let peripherals = esp_hal::init(esp_hal::Config::default());
    logger::init(logging::MAX_LEVEL);
    log::info!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    // Initialise the RTOS scheduler with timer - MUST be done before any async operations
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    // Transceiver UART: TX on GPIO17, RX on GPIO18
    let transceiver_uart = Uart::new(
        peripherals.UART1,
        UartConfig::default().with_baudrate(uart::BAUD_RATE),
    )
    .unwrap()
    .with_tx(peripherals.GPIO17)
    .with_rx(peripherals.GPIO18)
    .into_async();
    log::info!(
        "transceiver on UART{} (TX GPIO{}, RX GPIO{})",
        uart::PORT,
        uart::TX_PIN,
        uart::RX_PIN
    );

    let session = DeviceSession::new(
        UartConnector::new(transceiver_uart),
        Delay,
        SessionOptions::default(),
        &RawRadioConfig::default(),
    );

    // Configure USB Serial JTAG for host frames
    let usb_serial = UsbSerialJtag::new(peripherals.USB_DEVICE).into_async();
    let (usb_rx, usb_tx) = usb_serial.split();

    // Create and run the embassy executor
    let executor = EXECUTOR.init(esp_rtos::embassy::Executor::new());
    executor.run(|spawner| {
        spawner.must_spawn(async_main(spawner, usb_rx, usb_tx, session));
    })
}

#[embassy_executor::task]
async fn async_main(
    spawner: Spawner,
    usb_rx: UsbSerialJtagRx<'static, Async>,
    usb_tx: UsbSerialJtagTx<'static, Async>,
    session: Session,
) {
    spawner
        .spawn(serial_reader_task(
            usb_rx,
            COMMAND_CHANNEL.sender(),
            RESPONSE_CHANNEL.sender(),
        ))
        .unwrap();
    spawner
        .spawn(serial_writer_task(usb_tx, RESPONSE_CHANNEL.receiver()))
        .unwrap();
    spawner
        .spawn(radio_task(
            session,
            COMMAND_CHANNEL.receiver(),
            RESPONSE_CHANNEL.sender(),
        ))
        .unwrap();
}

/// Task that reads host commands from USB serial
#[embassy_executor::task]
async fn serial_reader_task(
    usb_rx: UsbSerialJtagRx<'static, Async>,
    command_sender: CommandSender,
    response_sender: ResponseSender,
) {
    tasks::serial_reader_task(usb_rx, command_sender, response_sender).await;
}

/// Task that writes responses to USB serial
#[embassy_executor::task]
async fn serial_writer_task(
    usb_tx: UsbSerialJtagTx<'static, Async>,
    response_receiver: ResponseReceiver,
) {
    tasks::serial_writer_task(usb_tx, response_receiver).await;
}

/// Task that owns the transceiver session
#[embassy_executor::task]
async fn radio_task(
    session: Session,
    command_receiver: CommandReceiver,
    response_sender: ResponseSender,
) {
    tasks::radio_task(session, command_receiver, response_sender).await;
}
