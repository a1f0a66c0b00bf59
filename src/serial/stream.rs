//! Byte-stream bridge over one serial instance.
//!
//! Lets `write!`/`writeln!` target a UART and gives the console a plain
//! non-blocking `read`/`write` pair.

use core::fmt;

use super::{InstanceId, SerialBus, UartHw};
use crate::error::ShellError;

/// Stream view of one open serial instance.
pub struct SerialStream<'a, H: UartHw> {
    bus: &'a SerialBus<H>,
    id: InstanceId,
}

impl<'a, H: UartHw> SerialStream<'a, H> {
    pub(crate) fn new(bus: &'a SerialBus<H>, id: InstanceId) -> Self {
        Self { bus, id }
    }

    pub fn instance(&self) -> InstanceId {
        self.id
    }

    /// Queue `bytes` for transmission, adding `\r` after each `\n` when the
    /// instance is configured to.
    ///
    /// Bytes that do not fit in the transmit ring are dropped. Returns how
    /// many input bytes were queued.
    pub fn write(&mut self, bytes: &[u8]) -> usize {
        let cr_after_nl = self.bus.send_cr_after_nl(self.id);
        let mut accepted = 0;

        for &byte in bytes {
            if self.bus.put(self.id, byte).is_err() {
                continue;
            }
            accepted += 1;
            if byte == b'\n' && cr_after_nl {
                let _ = self.bus.put(self.id, b'\r');
            }
        }

        accepted
    }

    /// Drain up to `buf.len()` received bytes.
    ///
    /// Returns `WouldBlock` when nothing is buffered rather than `Ok(0)`.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, ShellError> {
        if self.bus.rx_pending(self.id)? == 0 {
            return Err(ShellError::WouldBlock);
        }

        let mut count = 0;
        while count < buf.len() {
            match self.bus.get(self.id)? {
                Some(byte) => {
                    buf[count] = byte;
                    count += 1;
                }
                None => break,
            }
        }

        Ok(count)
    }
}

impl<H: UartHw> fmt::Write for SerialStream<'_, H> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write(s.as_bytes());
        Ok(())
    }
}
