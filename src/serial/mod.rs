//! Interrupt-driven serial transport.
//!
//! # Architecture
//!
//! ```text
//! UART IRQ ──push──▶ [rx ring] ──get()──▶ console poll
//!                                          │
//! UART IRQ ◀──pop── [tx ring] ◀──put()─────┘
//! ```
//!
//! Each instance owns two SPSC rings. The interrupt handler is the only
//! producer of `rx` and the only consumer of `tx`; the foreground loop is the
//! other side of each. Neither side ever blocks: `put` reports a full ring,
//! `get` reports an empty one, and the caller decides what to do.
//!
//! A receive overrun in interrupt context has nobody to report to, so it is
//! recorded in the bus [`FaultState`] for the run loop to act on.

pub mod hw;
pub mod ring;
pub mod stream;

pub use hw::{UartHw, UartStatus};
pub use ring::RingBuffer;
pub use stream::SerialStream;

use core::sync::atomic::{AtomicBool, Ordering};

use crate::config::{
    SerialConfig, NUM_SERIAL_INSTANCES, SERIAL_IRQ_PRIORITY, SERIAL_RX_BUF_SIZE,
    SERIAL_TX_BUF_SIZE,
};
use crate::error::ShellError;
use crate::fault::{FaultCode, FaultState};

/// Serial instance identifier (index into the bus).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InstanceId(pub u8);

impl InstanceId {
    pub const UART1: InstanceId = InstanceId(0);
    pub const UART5: InstanceId = InstanceId(1);
    pub const UART6: InstanceId = InstanceId(2);

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Board name of the UART behind this instance.
    pub fn name(self) -> &'static str {
        match self.0 {
            0 => "uart1",
            1 => "uart5",
            2 => "uart6",
            _ => "invalid",
        }
    }
}

/// Per-instance transport state.
struct SerialInstance<H> {
    hw: H,
    rx: RingBuffer<u8, SERIAL_RX_BUF_SIZE>,
    tx: RingBuffer<u8, SERIAL_TX_BUF_SIZE>,
    open: AtomicBool,
    create_stream: AtomicBool,
    send_cr_after_nl: AtomicBool,
}

impl<H: UartHw> SerialInstance<H> {
    fn new(hw: H) -> Self {
        Self {
            hw,
            rx: RingBuffer::new(0),
            tx: RingBuffer::new(0),
            open: AtomicBool::new(false),
            create_stream: AtomicBool::new(false),
            send_cr_after_nl: AtomicBool::new(false),
        }
    }
}

/// All serial instances of the board plus their shared fault record.
///
/// Constructed once with the hardware handle of every UART; must outlive the
/// interrupt handlers that call [`SerialBus::on_interrupt`].
pub struct SerialBus<H: UartHw> {
    instances: [SerialInstance<H>; NUM_SERIAL_INSTANCES],
    fault: FaultState,
}

impl<H: UartHw> SerialBus<H> {
    /// Bind each instance to its hardware. Instance `i` gets `hw[i]`.
    pub fn new(hw: [H; NUM_SERIAL_INSTANCES]) -> Self {
        Self {
            instances: hw.map(SerialInstance::new),
            fault: FaultState::new(),
        }
    }

    fn instance(&self, id: InstanceId) -> Result<&SerialInstance<H>, ShellError> {
        self.instances.get(id.index()).ok_or(ShellError::BadInstance)
    }

    /// Reset an instance and enable its interrupts.
    ///
    /// Fails with `BadInstance` for an unknown id and `InvalidArgument` when
    /// no config is given.
    pub fn open(&self, id: InstanceId, config: Option<&SerialConfig>) -> Result<(), ShellError> {
        let inst = self.instance(id)?;
        let config = config.ok_or(ShellError::InvalidArgument)?;

        inst.open.store(false, Ordering::Release);
        inst.hw.set_rx_interrupt(false);
        inst.hw.set_tx_interrupt(false);

        inst.rx.reset();
        inst.tx.reset();
        inst.create_stream.store(config.create_stream, Ordering::Relaxed);
        inst.send_cr_after_nl.store(config.send_cr_after_nl, Ordering::Relaxed);
        inst.open.store(true, Ordering::Release);

        inst.hw.set_rx_interrupt(true);
        inst.hw.set_tx_interrupt(true);
        inst.hw.enable_irq(SERIAL_IRQ_PRIORITY);
        Ok(())
    }

    pub fn is_open(&self, id: InstanceId) -> bool {
        self.instance(id)
            .map(|inst| inst.open.load(Ordering::Acquire))
            .unwrap_or(false)
    }

    /// Queue one byte for transmission. Never blocks.
    ///
    /// Returns `BufferOverrun` if the transmit ring is full; the byte is not
    /// queued and the ring is unchanged.
    pub fn put(&self, id: InstanceId, byte: u8) -> Result<(), ShellError> {
        let inst = self.instance(id)?;

        if !inst.tx.push(byte) {
            return Err(ShellError::BufferOverrun);
        }

        if inst.open.load(Ordering::Acquire) {
            inst.hw.set_tx_interrupt(true);
        }
        Ok(())
    }

    /// Take one received byte, or `None` if nothing is buffered. Never blocks.
    pub fn get(&self, id: InstanceId) -> Result<Option<u8>, ShellError> {
        Ok(self.instance(id)?.rx.pop())
    }

    /// Number of received bytes waiting.
    pub fn rx_pending(&self, id: InstanceId) -> Result<usize, ShellError> {
        Ok(self.instance(id)?.rx.len())
    }

    /// Number of bytes still waiting to be transmitted.
    pub fn tx_pending(&self, id: InstanceId) -> Result<usize, ShellError> {
        Ok(self.instance(id)?.tx.len())
    }

    /// Formatted-output bridge for an open instance.
    ///
    /// `InvalidState` if the instance is not open or was opened without
    /// `create_stream`.
    pub fn stream(&self, id: InstanceId) -> Result<SerialStream<'_, H>, ShellError> {
        let inst = self.instance(id)?;
        if !inst.open.load(Ordering::Acquire) || !inst.create_stream.load(Ordering::Relaxed) {
            return Err(ShellError::InvalidState);
        }
        Ok(SerialStream::new(self, id))
    }

    pub(crate) fn send_cr_after_nl(&self, id: InstanceId) -> bool {
        self.instance(id)
            .map(|inst| inst.send_cr_after_nl.load(Ordering::Relaxed))
            .unwrap_or(false)
    }

    /// Hardware handle of an instance.
    pub fn hw(&self, id: InstanceId) -> Option<&H> {
        self.instances.get(id.index()).map(|inst| &inst.hw)
    }

    /// Fault record written by the interrupt handler.
    pub fn fault(&self) -> &FaultState {
        &self.fault
    }

    /// Interrupt service routine body for one instance.
    ///
    /// Services one condition per call, in priority order: received byte,
    /// transmit register empty, error flags.
    pub fn on_interrupt(&self, id: InstanceId) {
        let Ok(inst) = self.instance(id) else {
            return;
        };

        let status = inst.hw.status();

        if status.rx_ready() {
            let byte = inst.hw.read_data();
            if !inst.rx.push(byte) {
                self.fault.set(FaultCode::RxOverrun, id.0 as u32);
            }
        } else if status.tx_ready() {
            match inst.tx.pop() {
                Some(byte) => inst.hw.write_data(byte),
                None => {
                    inst.hw.set_tx_interrupt(false);
                    // A put() may have landed between the pop and the
                    // disable; re-arm so its byte is not stranded.
                    if !inst.tx.is_empty() {
                        inst.hw.set_tx_interrupt(true);
                    }
                }
            }
        } else if status.has_error() {
            // Reading the data register clears the error flags.
            let _ = inst.hw.read_data();
        }
    }
}
