//! EOS Wing - Button Panel Firmware
//!
//! Main firmware binary for an RP2040 board wired to a 3x3 key matrix.
//! Each pressed key sends an OSC address to an ETC Eos console over the
//! serial link; the console session is kept alive with handshake,
//! ping and timeout handling.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{self, BufferedInterruptHandler, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use eoswing_core::config::{LoopConfig, SessionConfig};
use eoswing_core::keymap::CommandTable;
use eoswing_core::matrix::MatrixScanner;
use eoswing_core::runner::Runner;
use eoswing_core::session::Session;
use eoswing_hal::uart::{DataBits, Parity, StopBits};
use eoswing_hal::UartConfig;
use eoswing_hal_rp2040::pins::PinAssignment;
use eoswing_hal_rp2040::{MatrixColumn, MatrixRow, SerialRx, SerialTx};

mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Busy-wait after driving a row, ~1us at 125 MHz
const SETTLE_CYCLES: u32 = 125;

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("EOS Wing firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let assignment = PinAssignment::board_default();
    match assignment.validate() {
        Ok(uart) => info!(
            "Pins: rows={} cols={} console tx={} rx={} on {}",
            assignment.rows,
            assignment.columns,
            assignment.console_tx,
            assignment.console_rx,
            uart
        ),
        Err(e) => error!("Invalid pin assignment: {}", e),
    }

    // Rows idle low; columns read high only through a pressed key
    let rows = [
        MatrixRow::new(Output::new(p.PIN_3, Level::Low)),
        MatrixRow::new(Output::new(p.PIN_4, Level::Low)),
        MatrixRow::new(Output::new(p.PIN_5, Level::Low)),
    ];
    let cols = [
        MatrixColumn::new(Input::new(p.PIN_7, Pull::Down)),
        MatrixColumn::new(Input::new(p.PIN_8, Pull::Down)),
        MatrixColumn::new(Input::new(p.PIN_9, Pull::Down)),
    ];
    let scanner = MatrixScanner::with_settle(rows, cols, settle);
    info!("Key matrix initialized");

    // Setup UART for the console link
    let console_config = UartConfig::default();
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config(&console_config));
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();
    info!("Console UART initialized at {} baud", console_config.baudrate);

    let runner = Runner::new(
        scanner,
        CommandTable::default(),
        Session::new(SessionConfig::default()),
        SerialTx::new(tx),
        SerialRx::new(rx),
    );

    tasks::control_loop::run(runner, LoopConfig::default()).await;
}

/// Row settle delay for the matrix scanner
fn settle() {
    cortex_m::asm::delay(SETTLE_CYCLES);
}

/// Convert the board-agnostic UART settings to embassy-rp's
fn uart_config(config: &UartConfig) -> uart::Config {
    let mut out = uart::Config::default();
    out.baudrate = config.baudrate;
    out.data_bits = match config.data_bits {
        DataBits::Seven => uart::DataBits::DataBits7,
        DataBits::Eight => uart::DataBits::DataBits8,
    };
    out.parity = match config.parity {
        Parity::None => uart::Parity::ParityNone,
        Parity::Even => uart::Parity::ParityEven,
        Parity::Odd => uart::Parity::ParityOdd,
    };
    out.stop_bits = match config.stop_bits {
        StopBits::One => uart::StopBits::STOP1,
        StopBits::Two => uart::StopBits::STOP2,
    };
    out
}
