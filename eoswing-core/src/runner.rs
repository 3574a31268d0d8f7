//! Control-loop cycle
//!
//! One cycle does, in order:
//! 1. Scan the matrix and send the address of every mapped pressed key
//! 2. If inbound data is waiting, read it once and feed each complete
//!    message to the session
//! 3. Run the session's time-driven transitions
//!
//! The caller sleeps between cycles. Nothing in a cycle blocks on input,
//! and no error escapes it: failures are collected in the [`CycleReport`]
//! for the caller to log.

use heapless::Vec;

use eoswing_hal::{InputPin, OutputPin, UartRx, UartTx};
use eoswing_protocol::{encode_address_to_vec, tokens, ConsoleMessage, EncodeError, MessageSplitter};

use crate::keymap::CommandTable;
use crate::matrix::{Coordinate, MatrixScanner};
use crate::session::{Session, SessionEvent, State};

/// Bytes taken from the transport per cycle
pub const READ_CHUNK_SIZE: usize = 64;

/// Sent commands kept in a report
pub const MAX_REPORTED_COMMANDS: usize = 16;

/// Inbound messages and session events kept in a report
pub const MAX_REPORTED_EVENTS: usize = 8;

/// Leading bytes of each received message kept in a report
pub const REPORTED_TEXT_LEN: usize = 32;

/// Failure to send a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendError<E> {
    /// Address could not be encoded
    Encode(EncodeError),
    /// Transport write failed
    Transport(E),
}

/// A message recognised from the inbound data
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Received {
    pub kind: ConsoleMessage,
    /// Trimmed message text, cut to [`REPORTED_TEXT_LEN`] bytes
    pub text: Vec<u8, REPORTED_TEXT_LEN>,
}

impl Received {
    fn new(message: &[u8]) -> Self {
        let len = message.len().min(REPORTED_TEXT_LEN);
        Self {
            kind: ConsoleMessage::classify(message),
            text: Vec::from_slice(&message[..len]).unwrap_or_default(),
        }
    }
}

/// What happened during one cycle
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport<TxE, RxE> {
    /// Keys whose address was sent
    pub commands: Vec<(Coordinate, &'static str), MAX_REPORTED_COMMANDS>,
    /// Messages recognised from the inbound data
    pub messages: Vec<Received, MAX_REPORTED_EVENTS>,
    /// Session events, in the order they occurred
    pub events: Vec<SessionEvent, MAX_REPORTED_EVENTS>,
    /// Entries left out because a list above was full
    pub dropped_entries: u8,
    /// Number of sends that failed
    pub send_failures: u8,
    /// Most recent send failure
    pub send_error: Option<SendError<TxE>>,
    /// Transport read failure, if any
    pub read_error: Option<RxE>,
    /// Session state at the end of the cycle
    pub state: State,
}

impl<TxE, RxE> CycleReport<TxE, RxE> {
    fn new() -> Self {
        Self {
            commands: Vec::new(),
            messages: Vec::new(),
            events: Vec::new(),
            dropped_entries: 0,
            send_failures: 0,
            send_error: None,
            read_error: None,
            state: State::Disconnected,
        }
    }

    fn record_send_error(&mut self, error: SendError<TxE>) {
        self.send_failures = self.send_failures.saturating_add(1);
        self.send_error = Some(error);
    }

    /// Check if any transport operation failed
    pub fn has_errors(&self) -> bool {
        self.send_failures > 0 || self.read_error.is_some()
    }
}

/// Owns the panel's components and runs control-loop cycles
pub struct Runner<R, C, Tx, Rx, const ROWS: usize, const COLS: usize> {
    scanner: MatrixScanner<R, C, ROWS, COLS>,
    commands: CommandTable,
    session: Session,
    tx: Tx,
    rx: Rx,
    splitter: MessageSplitter,
}

impl<R, C, Tx, Rx, const ROWS: usize, const COLS: usize> Runner<R, C, Tx, Rx, ROWS, COLS>
where
    R: OutputPin,
    C: InputPin,
    Tx: UartTx,
    Rx: UartRx,
{
    pub fn new(
        scanner: MatrixScanner<R, C, ROWS, COLS>,
        commands: CommandTable,
        session: Session,
        tx: Tx,
        rx: Rx,
    ) -> Self {
        Self {
            scanner,
            commands,
            session,
            tx,
            rx,
            splitter: MessageSplitter::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Ask the console to forward ping echoes to us
    ///
    /// Call once before the first cycle.
    pub fn start(&mut self) -> Result<(), SendError<Tx::Error>> {
        self.send(tokens::FILTER_REGISTRATION)?;
        self.tx.flush().map_err(SendError::Transport)
    }

    /// Run one cycle at time `now_ms`
    pub fn run_cycle(&mut self, now_ms: u64) -> CycleReport<Tx::Error, Rx::Error> {
        let mut report = CycleReport::new();

        self.dispatch_pressed(&mut report);
        self.process_inbound(now_ms, &mut report);

        if let Some(event) = self.session.poll(now_ms) {
            self.apply(event, &mut report);
        }

        report.state = self.session.state();
        report
    }

    /// Scan and send every mapped pressed key once
    fn dispatch_pressed(&mut self, report: &mut CycleReport<Tx::Error, Rx::Error>) {
        let pressed = self.scanner.scan();

        for coord in pressed.iter() {
            let Some(address) = self.commands.lookup(coord) else {
                continue;
            };
            match self.send(address) {
                Ok(()) => keep(&mut report.commands, (coord, address), &mut report.dropped_entries),
                Err(e) => report.record_send_error(e),
            }
        }
    }

    /// Read what is waiting on the transport and hand messages to the session
    fn process_inbound(&mut self, now_ms: u64, report: &mut CycleReport<Tx::Error, Rx::Error>) {
        match self.rx.poll_ready() {
            Ok(true) => {}
            Ok(false) => return,
            Err(e) => {
                report.read_error = Some(e);
                return;
            }
        }

        let mut buf = [0u8; READ_CHUNK_SIZE];
        let n = match self.rx.read_available(&mut buf) {
            Ok(n) => n,
            Err(e) => {
                report.read_error = Some(e);
                return;
            }
        };

        for &byte in &buf[..n] {
            if let Some(message) = self.splitter.feed(byte) {
                self.handle_message(&message, now_ms, report);
            }
        }

        // A complete token without a trailing delimiter is handled now
        if let Some(message) = self.splitter.take_recognised() {
            self.handle_message(&message, now_ms, report);
        }
    }

    fn handle_message(
        &mut self,
        message: &[u8],
        now_ms: u64,
        report: &mut CycleReport<Tx::Error, Rx::Error>,
    ) {
        let received = Received::new(message);
        let kind = received.kind;
        keep(&mut report.messages, received, &mut report.dropped_entries);
        if let Some(event) = self.session.handle_message(kind, now_ms) {
            self.apply(event, report);
        }
    }

    /// Record a session event and send its reply
    fn apply(&mut self, event: SessionEvent, report: &mut CycleReport<Tx::Error, Rx::Error>) {
        keep(&mut report.events, event, &mut report.dropped_entries);
        if let Some(reply) = event.reply() {
            if let Err(e) = self.send(reply) {
                report.record_send_error(e);
            }
        }
    }

    fn send(&mut self, address: &str) -> Result<(), SendError<Tx::Error>> {
        let message = encode_address_to_vec(address).map_err(SendError::Encode)?;
        self.tx.write_blocking(&message).map_err(SendError::Transport)
    }
}

/// Append to a report list, counting what does not fit
fn keep<T, const N: usize>(list: &mut Vec<T, N>, item: T, dropped: &mut u8) {
    if list.push(item).is_err() {
        *dropped = dropped.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::keymap::DEFAULT_COMMANDS;
    use core::cell::Cell;
    use std::vec::Vec as StdVec;

    /// Keys held on the simulated panel, [row][col]
    struct Panel {
        keys: Cell<[[bool; 3]; 3]>,
        active: Cell<u8>,
    }

    impl Panel {
        fn new() -> Self {
            Self {
                keys: Cell::new([[false; 3]; 3]),
                active: Cell::new(0),
            }
        }

        fn press(&self, row: usize, col: usize) {
            let mut keys = self.keys.get();
            keys[row][col] = true;
            self.keys.set(keys);
        }

        fn release_all(&self) {
            self.keys.set([[false; 3]; 3]);
        }
    }

    struct Row<'a> {
        panel: &'a Panel,
        index: usize,
    }

    impl OutputPin for Row<'_> {
        fn set_high(&mut self) {
            self.panel.active.set(self.panel.active.get() | (1 << self.index));
        }

        fn set_low(&mut self) {
            self.panel.active.set(self.panel.active.get() & !(1 << self.index));
        }

        fn is_set_high(&self) -> bool {
            self.panel.active.get() & (1 << self.index) != 0
        }
    }

    struct Col<'a> {
        panel: &'a Panel,
        index: usize,
    }

    impl InputPin for Col<'_> {
        fn is_high(&mut self) -> bool {
            let active = self.panel.active.get();
            let keys = self.panel.keys.get();
            (0..3).any(|r| active & (1 << r) != 0 && keys[r][self.index])
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct WireError;

    /// Records every outbound message
    #[derive(Default)]
    struct MockTx {
        sent: StdVec<StdVec<u8>>,
        fail: bool,
    }

    impl MockTx {
        fn addresses(&self) -> StdVec<&str> {
            self.sent
                .iter()
                .map(|m| {
                    assert!(m.ends_with(&[0, 0, 0]));
                    core::str::from_utf8(&m[..m.len() - 3]).unwrap()
                })
                .collect()
        }
    }

    impl UartTx for MockTx {
        type Error = WireError;

        fn write_blocking(&mut self, data: &[u8]) -> Result<(), WireError> {
            if self.fail {
                return Err(WireError);
            }
            self.sent.push(data.to_vec());
            Ok(())
        }

        fn flush(&mut self) -> Result<(), WireError> {
            Ok(())
        }
    }

    /// Serves queued input, one chunk per read
    #[derive(Default)]
    struct MockRx {
        pending: StdVec<u8>,
        fail: bool,
        reads: u32,
    }

    impl UartRx for MockRx {
        type Error = WireError;

        fn poll_ready(&mut self) -> Result<bool, WireError> {
            if self.fail {
                return Err(WireError);
            }
            Ok(!self.pending.is_empty())
        }

        fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, WireError> {
            self.reads += 1;
            let n = buf.len().min(self.pending.len());
            buf[..n].copy_from_slice(&self.pending[..n]);
            self.pending.drain(..n);
            Ok(n)
        }
    }

    type TestRunner<'a> = Runner<Row<'a>, Col<'a>, MockTx, MockRx, 3, 3>;

    fn runner(panel: &Panel) -> TestRunner<'_> {
        let scanner = MatrixScanner::new(
            [0, 1, 2].map(|index| Row { panel, index }),
            [0, 1, 2].map(|index| Col { panel, index }),
        );
        Runner::new(
            scanner,
            CommandTable::new(&DEFAULT_COMMANDS),
            Session::new(SessionConfig::default()),
            MockTx::default(),
            MockRx::default(),
        )
    }

    fn console_says(runner: &mut TestRunner<'_>, bytes: &[u8]) {
        runner.rx.pending.extend_from_slice(bytes);
    }

    fn kinds(report: &CycleReport<WireError, WireError>) -> StdVec<ConsoleMessage> {
        report.messages.iter().map(|m| m.kind).collect()
    }

    #[test]
    fn test_start_registers_filter() {
        let panel = Panel::new();
        let mut runner = runner(&panel);

        runner.start().unwrap();
        assert_eq!(runner.tx.addresses(), ["/eos/filter/add /eos/out/ping"]);
    }

    #[test]
    fn test_start_reports_transport_error() {
        let panel = Panel::new();
        let mut runner = runner(&panel);
        runner.tx.fail = true;

        assert_eq!(runner.start(), Err(SendError::Transport(WireError)));
    }

    #[test]
    fn test_pressed_key_sends_once_per_cycle() {
        let panel = Panel::new();
        let mut runner = runner(&panel);
        panel.press(0, 0);

        let report = runner.run_cycle(0);
        assert_eq!(runner.tx.addresses(), ["/eos/key/go"]);
        assert_eq!(report.commands.as_slice(), &[(Coordinate::new(0, 0), "/eos/key/go")]);

        // Held key repeats every cycle
        runner.run_cycle(200);
        assert_eq!(runner.tx.addresses(), ["/eos/key/go", "/eos/key/go"]);

        panel.release_all();
        runner.run_cycle(400);
        assert_eq!(runner.tx.sent.len(), 2);
    }

    #[test]
    fn test_simultaneous_keys_each_sent_once() {
        let panel = Panel::new();
        let mut runner = runner(&panel);
        panel.press(0, 1);
        panel.press(2, 2);

        let report = runner.run_cycle(0);

        let mut sent = runner.tx.addresses();
        sent.sort();
        assert_eq!(sent, ["/eos/key/save", "/eos/key/stop"]);
        assert_eq!(report.commands.len(), 2);
    }

    #[test]
    fn test_unmapped_key_sends_nothing() {
        static BINDINGS: [(Coordinate, &str); 1] = [(Coordinate::new(0, 0), "/eos/key/go")];

        let panel = Panel::new();
        let mut runner = runner(&panel);
        runner.commands = CommandTable::new(&BINDINGS);
        panel.press(1, 1);

        let report = runner.run_cycle(0);
        assert!(runner.tx.sent.is_empty());
        assert!(report.commands.is_empty());
    }

    #[test]
    fn test_handshake_reply() {
        let panel = Panel::new();
        let mut runner = runner(&panel);
        console_says(&mut runner, b"ETCOSC?\n");

        let report = runner.run_cycle(0);

        assert_eq!(kinds(&report), [ConsoleMessage::HandshakeQuery]);
        assert_eq!(report.messages[0].text.as_slice(), b"ETCOSC?");
        assert_eq!(report.events[0], SessionEvent::HandshakeCompleted);
        let sent = runner.tx.addresses();
        assert_eq!(sent.iter().filter(|a| **a == "OK").count(), 1);
        assert_eq!(sent[0], "OK");
    }

    #[test]
    fn test_handshake_without_delimiter() {
        let panel = Panel::new();
        let mut runner = runner(&panel);
        console_says(&mut runner, b"ETCOSC?");

        runner.run_cycle(0);
        assert!(runner.session().state().is_connected());
    }

    #[test]
    fn test_fragmented_token_across_cycles() {
        let panel = Panel::new();
        let mut runner = runner(&panel);

        console_says(&mut runner, b"ETC");
        let report = runner.run_cycle(0);
        assert!(report.messages.is_empty());
        assert_eq!(report.state, State::Disconnected);

        console_says(&mut runner, b"OSC?\n");
        let report = runner.run_cycle(200);
        assert_eq!(kinds(&report), [ConsoleMessage::HandshakeQuery]);
        assert!(runner.session().state().is_connected());
    }

    #[test]
    fn test_ping_follows_handshake() {
        let panel = Panel::new();
        let mut runner = runner(&panel);
        console_says(&mut runner, b"ETCOSC?\n");

        let report = runner.run_cycle(0);

        assert_eq!(
            report.events.as_slice(),
            &[SessionEvent::HandshakeCompleted, SessionEvent::PingDue]
        );
        assert_eq!(runner.tx.addresses(), ["OK", "/eos/ping ElementWing_hello"]);
        assert_eq!(report.state, State::ConnectedPingSent);
    }

    #[test]
    fn test_one_read_per_cycle() {
        let panel = Panel::new();
        let mut runner = runner(&panel);
        console_says(&mut runner, &[b'x'; READ_CHUNK_SIZE * 2]);

        runner.run_cycle(0);
        assert_eq!(runner.rx.reads, 1);
        assert_eq!(runner.rx.pending.len(), READ_CHUNK_SIZE);

        runner.run_cycle(200);
        assert_eq!(runner.rx.reads, 2);

        // Nothing waiting: no read at all
        runner.run_cycle(400);
        assert_eq!(runner.rx.reads, 2);
    }

    #[test]
    fn test_read_error_is_contained() {
        let panel = Panel::new();
        let mut runner = runner(&panel);
        runner.rx.fail = true;
        panel.press(1, 0);

        let report = runner.run_cycle(0);

        assert_eq!(report.read_error, Some(WireError));
        assert!(report.has_errors());
        // Scanning still happened
        assert_eq!(runner.tx.addresses(), ["/eos/key/cue"]);

        runner.rx.fail = false;
        let report = runner.run_cycle(200);
        assert_eq!(report.read_error, None);
    }

    #[test]
    fn test_send_error_is_contained() {
        let panel = Panel::new();
        let mut runner = runner(&panel);
        runner.tx.fail = true;
        panel.press(0, 0);
        panel.press(0, 1);
        console_says(&mut runner, b"ETCOSC?\n");

        let report = runner.run_cycle(0);

        // Two keys, handshake reply, ping
        assert_eq!(report.send_failures, 4);
        assert_eq!(report.send_error, Some(SendError::Transport(WireError)));
        assert!(report.commands.is_empty());
        // The session still advanced
        assert_eq!(report.state, State::ConnectedPingSent);
    }

    #[test]
    fn test_unrecognised_messages_ignored() {
        let panel = Panel::new();
        let mut runner = runner(&panel);
        console_says(&mut runner, b"/eos/out/active/chan\0\0\0\n");

        let report = runner.run_cycle(0);
        assert_eq!(kinds(&report), [ConsoleMessage::Other]);
        assert_eq!(report.messages[0].text.as_slice(), b"/eos/out/active/chan");
        assert!(report.events.is_empty());
        assert!(runner.tx.sent.is_empty());
    }

    #[test]
    fn test_received_text_is_cut_to_report_length() {
        let panel = Panel::new();
        let mut runner = runner(&panel);
        let mut line = [b'a'; REPORTED_TEXT_LEN + 8];
        line[REPORTED_TEXT_LEN + 7] = b'\n';
        console_says(&mut runner, &line);

        let report = runner.run_cycle(0);
        assert_eq!(report.messages[0].text.as_slice(), &[b'a'; REPORTED_TEXT_LEN][..]);
    }

    #[test]
    fn test_report_overflow_is_counted() {
        let panel = Panel::new();
        let mut runner = runner(&panel);
        console_says(&mut runner, &b"OK\n".repeat(MAX_REPORTED_EVENTS + 2));

        let report = runner.run_cycle(0);

        assert_eq!(report.messages.len(), MAX_REPORTED_EVENTS);
        assert_eq!(report.dropped_entries, 2);
        assert!(!report.has_errors());
    }

    #[test]
    fn test_handshake_after_long_line_noise() {
        let panel = Panel::new();
        let mut runner = runner(&panel);
        let mut noise = std::vec![b'x'; 125];
        noise.extend_from_slice(b"ETCOSC?\n");

        // Noise fills more than one read; keep cycling until it is drained
        let mut now = 0;
        console_says(&mut runner, &noise);
        while !runner.rx.pending.is_empty() {
            runner.run_cycle(now);
            now += 200;
        }

        assert!(runner.session().state().is_connected());
        assert_eq!(runner.tx.addresses()[0], "OK");
    }

    #[test]
    fn test_end_to_end_session() {
        let panel = Panel::new();
        let mut runner = runner(&panel);
        let mut now = 0u64;

        // Startup
        runner.start().unwrap();
        assert_eq!(runner.tx.addresses(), ["/eos/filter/add /eos/out/ping"]);

        // Handshake
        console_says(&mut runner, b"ETCOSC?\n");
        let report = runner.run_cycle(now);
        assert_eq!(report.events[0], SessionEvent::HandshakeCompleted);
        assert_eq!(runner.tx.addresses()[1], "OK");
        assert!(runner.session().state().is_connected());

        // Console answers the first ping
        now += 200;
        console_says(&mut runner, b"/eos/out/ping\0\0\0");
        let report = runner.run_cycle(now);
        assert_eq!(report.events.as_slice(), &[SessionEvent::LivenessReceived]);
        assert_eq!(report.state, State::ConnectedIdle);

        // Press "next"
        now += 200;
        panel.press(1, 1);
        let report = runner.run_cycle(now);
        assert_eq!(report.commands.as_slice(), &[(Coordinate::new(1, 1), "/eos/key/next")]);
        panel.release_all();

        // Silence for 6 seconds
        let mut events = StdVec::new();
        let silence_until = now + 6_000;
        while now < silence_until {
            now += 200;
            events.extend(runner.run_cycle(now).events);
        }

        assert_eq!(events, [SessionEvent::PingDue, SessionEvent::TimedOut]);
        assert_eq!(runner.session().state(), State::Disconnected);

        // No pings until a fresh handshake
        let sent_before = runner.tx.sent.len();
        for _ in 0..30 {
            now += 200;
            runner.run_cycle(now);
        }
        assert_eq!(runner.tx.sent.len(), sent_before);
    }
}
