//! Hardware boundary for one UART.
//!
//! The transport never touches registers directly. A board port implements
//! [`UartHw`] for each physical UART (register block on the MCU, a driver
//! wrapper on ESP-IDF, an in-memory model in tests) and hands the set to
//! [`SerialBus`](super::SerialBus).

/// Snapshot of the UART status register.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct UartStatus {
    pub bits: u32,
}

impl UartStatus {
    /// Receive data register not empty.
    pub const RXNE: u32 = 1 << 0;
    /// Transmit data register empty.
    pub const TXE: u32 = 1 << 1;
    /// Overrun error.
    pub const ORE: u32 = 1 << 2;
    /// Noise error.
    pub const NE: u32 = 1 << 3;
    /// Framing error.
    pub const FE: u32 = 1 << 4;
    /// Parity error.
    pub const PE: u32 = 1 << 5;

    pub const ERRORS: u32 = Self::ORE | Self::NE | Self::FE | Self::PE;

    pub const IDLE: UartStatus = UartStatus { bits: 0 };

    pub const fn new(bits: u32) -> Self {
        Self { bits }
    }

    #[inline]
    pub const fn rx_ready(self) -> bool {
        self.bits & Self::RXNE != 0
    }

    #[inline]
    pub const fn tx_ready(self) -> bool {
        self.bits & Self::TXE != 0
    }

    #[inline]
    pub const fn has_error(self) -> bool {
        self.bits & Self::ERRORS != 0
    }
}

/// Register-level access to one UART.
///
/// All methods take `&self`: they are called from both interrupt and
/// foreground context, the way volatile register accesses are.
pub trait UartHw: Sync {
    /// Read the status flags.
    fn status(&self) -> UartStatus;

    /// Read the receive data register. Also clears pending error flags.
    fn read_data(&self) -> u8;

    /// Write the transmit data register.
    fn write_data(&self, byte: u8);

    /// Enable or disable the receive-ready interrupt source.
    fn set_rx_interrupt(&self, enabled: bool);

    /// Enable or disable the transmit-ready interrupt source.
    fn set_tx_interrupt(&self, enabled: bool);

    /// Set the priority of this UART's interrupt line and enable it.
    fn enable_irq(&self, priority: u8);
}
