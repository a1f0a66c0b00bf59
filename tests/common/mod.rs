//! Shared test fixtures: an in-memory UART and an output capture.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use serial_shell::{InstanceId, SerialBus, UartHw, UartStatus};

/// No priority set yet.
const NO_IRQ: u32 = u32::MAX;

/// In-memory UART.
///
/// Bytes "on the wire" towards the MCU are queued with [`MockUart::inject`];
/// bytes the transport writes are collected in `sent`. The transmitter is
/// always ready, and TXE is reported only while the TX interrupt source is
/// enabled, which is what the interrupt handler observes.
pub struct MockUart {
    wire: Mutex<VecDeque<u8>>,
    sent: Mutex<Vec<u8>>,
    errors: AtomicU32,
    rx_irq: AtomicBool,
    tx_irq: AtomicBool,
    irq_priority: AtomicU32,
}

impl MockUart {
    pub fn new() -> Self {
        Self {
            wire: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            errors: AtomicU32::new(0),
            rx_irq: AtomicBool::new(false),
            tx_irq: AtomicBool::new(false),
            irq_priority: AtomicU32::new(NO_IRQ),
        }
    }

    pub fn inject(&self, bytes: &[u8]) {
        self.wire.lock().unwrap().extend(bytes.iter().copied());
    }

    pub fn inject_error(&self, bits: u32) {
        self.errors.fetch_or(bits & UartStatus::ERRORS, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<u8> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_str(&self) -> String {
        String::from_utf8_lossy(&self.sent()).into_owned()
    }

    pub fn clear_sent(&self) {
        self.sent.lock().unwrap().clear();
    }

    pub fn rx_irq_enabled(&self) -> bool {
        self.rx_irq.load(Ordering::SeqCst)
    }

    pub fn tx_irq_enabled(&self) -> bool {
        self.tx_irq.load(Ordering::SeqCst)
    }

    pub fn irq_priority(&self) -> Option<u8> {
        match self.irq_priority.load(Ordering::SeqCst) {
            NO_IRQ => None,
            p => Some(p as u8),
        }
    }

    /// True while the UART would hold its interrupt line asserted.
    pub fn irq_pending(&self) -> bool {
        let status = self.status();
        (status.rx_ready() && self.rx_irq_enabled()) || status.tx_ready() || status.has_error()
    }
}

impl UartHw for MockUart {
    fn status(&self) -> UartStatus {
        let mut bits = self.errors.load(Ordering::SeqCst);
        if !self.wire.lock().unwrap().is_empty() {
            bits |= UartStatus::RXNE;
        }
        if self.tx_irq_enabled() {
            bits |= UartStatus::TXE;
        }
        UartStatus::new(bits)
    }

    fn read_data(&self) -> u8 {
        self.errors.store(0, Ordering::SeqCst);
        self.wire.lock().unwrap().pop_front().unwrap_or(0)
    }

    fn write_data(&self, byte: u8) {
        self.sent.lock().unwrap().push(byte);
    }

    fn set_rx_interrupt(&self, enabled: bool) {
        self.rx_irq.store(enabled, Ordering::SeqCst);
    }

    fn set_tx_interrupt(&self, enabled: bool) {
        self.tx_irq.store(enabled, Ordering::SeqCst);
    }

    fn enable_irq(&self, priority: u8) {
        self.irq_priority.store(priority as u32, Ordering::SeqCst);
    }
}

pub fn mock_bus() -> SerialBus<MockUart> {
    SerialBus::new([MockUart::new(), MockUart::new(), MockUart::new()])
}

/// Run the interrupt handler until the UART releases its interrupt line.
///
/// Returns the number of handler invocations.
pub fn service(bus: &SerialBus<MockUart>, id: InstanceId) -> usize {
    let hw = bus.hw(id).expect("valid instance");
    let mut calls = 0;
    while hw.irq_pending() {
        bus.on_interrupt(id);
        calls += 1;
        assert!(calls < 100_000, "interrupt line stuck");
    }
    calls
}

/// Output capture for handlers and the dispatcher.
pub struct TestOutput {
    buf: String,
}

impl TestOutput {
    pub fn new() -> Self {
        Self { buf: String::new() }
    }

    pub fn contains(&self, s: &str) -> bool {
        self.buf.contains(s)
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn lines(&self) -> Vec<&str> {
        self.buf.lines().collect()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

impl fmt::Write for TestOutput {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.buf.push_str(s);
        Ok(())
    }
}
