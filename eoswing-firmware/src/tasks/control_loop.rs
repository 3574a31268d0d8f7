//! Control loop
//!
//! Runs one [`Runner`] cycle, logs what happened, then sleeps for the
//! scan interval. Timestamps come from the embassy time driver.

use defmt::*;
use embassy_rp::gpio::{Input, Output};
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embassy_time::{Duration, Instant, Timer};

use eoswing_core::config::LoopConfig;
use eoswing_core::runner::{CycleReport, Runner};
use eoswing_core::session::{SessionEvent, State};
use eoswing_hal_rp2040::{MatrixColumn, MatrixRow, SerialError, SerialRx, SerialTx};
use eoswing_protocol::tokens;

/// Matrix rows
pub const ROWS: usize = 3;

/// Matrix columns
pub const COLS: usize = 3;

/// The panel's runner over embassy-rp pins and the buffered console UART
pub type PanelRunner = Runner<
    MatrixRow<Output<'static>>,
    MatrixColumn<Input<'static>>,
    SerialTx<BufferedUartTx>,
    SerialRx<BufferedUartRx>,
    ROWS,
    COLS,
>;

/// Run the control loop forever
pub async fn run(mut runner: PanelRunner, config: LoopConfig) {
    info!("Control loop started ({} ms cycle)", config.scan_interval_ms);

    match runner.start() {
        Ok(()) => debug!("Sent OSC: {}", tokens::FILTER_REGISTRATION),
        Err(e) => warn!("Filter registration failed: {}", e),
    }

    let interval = Duration::from_millis(config.scan_interval_ms);
    let mut last_state = State::Disconnected;
    loop {
        let report = runner.run_cycle(Instant::now().as_millis());
        log_report(&report);

        if report.state != last_state {
            let session = runner.session();
            debug!(
                "Session {} -> {} (last liveness {} ms, ping outstanding {})",
                last_state,
                report.state,
                session.last_message_ms(),
                session.ping_outstanding()
            );
            if report.state.is_connected() != last_state.is_connected() {
                if report.state.is_connected() {
                    info!("Console connected");
                } else {
                    info!("Console disconnected");
                }
            }
            last_state = report.state;
        }

        Timer::after(interval).await;
    }
}

fn log_report(report: &CycleReport<SerialError, SerialError>) {
    for (key, address) in &report.commands {
        debug!("Sent OSC: {} (key {},{})", address, key.row, key.col);
    }

    for message in &report.messages {
        trace!("Received: {=[u8]:a} ({})", message.text.as_slice(), message.kind);
    }

    for event in &report.events {
        match event {
            SessionEvent::HandshakeCompleted => {
                info!("Handshake received, sent {}", tokens::HANDSHAKE_REPLY)
            }
            SessionEvent::HandshakeRepeated => {
                debug!("Handshake repeated, sent {}", tokens::HANDSHAKE_REPLY)
            }
            SessionEvent::LivenessReceived => trace!("Ping echo received"),
            SessionEvent::PingDue => debug!("Sent OSC: {}", tokens::PING),
            SessionEvent::TimedOut => warn!("Connection timeout!"),
        }
    }

    if report.dropped_entries > 0 {
        debug!("{} report entries not shown", report.dropped_entries);
    }

    if !report.has_errors() {
        return;
    }
    if let Some(e) = report.send_error {
        warn!("{} send(s) failed, last error: {}", report.send_failures, e);
    }
    if let Some(e) = report.read_error {
        warn!("Console read failed: {}", e);
    }
}
