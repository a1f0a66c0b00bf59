//! Unrecoverable fault record.
//!
//! The serial interrupt handler cannot return an error to anyone. When it
//! hits a condition the shell cannot recover from (the receive ring is full
//! and a byte has to be thrown away), it records the fault here and the run
//! loop decides how to stop the device.

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

/// Reason the device faulted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum FaultCode {
    /// No fault (normal operation).
    None = 0,

    /// Receive ring buffer full in interrupt context. Input was lost.
    /// Data: serial instance index.
    RxOverrun = 1,
}

impl FaultCode {
    /// Convert from raw u8 value.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => FaultCode::RxOverrun,
            _ => FaultCode::None,
        }
    }

    /// Short name for diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            FaultCode::None => "none",
            FaultCode::RxOverrun => "rx overrun",
        }
    }
}

/// Fault state shared between interrupt and foreground context.
///
/// Written from interrupt context, polled by the run loop.
///
/// ```ignore
/// loop {
///     console.poll();
///     if bus.fault().is_active() {
///         let snap = bus.fault().snapshot();
///         halt(snap.code, snap.data);
///     }
/// }
/// ```
pub struct FaultState {
    active: AtomicBool,
    code: AtomicU8,
    data: AtomicU32,
    /// Total fault count since boot (never cleared).
    count: AtomicU32,
}

impl FaultState {
    /// Create new fault state (no fault).
    pub const fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
            code: AtomicU8::new(0),
            data: AtomicU32::new(0),
            count: AtomicU32::new(0),
        }
    }

    /// Record a fault. The active flag is published last.
    #[inline]
    pub fn set(&self, code: FaultCode, data: u32) {
        self.code.store(code as u8, Ordering::Release);
        self.data.store(data, Ordering::Release);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.active.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Fault code (only meaningful if `is_active()` is true).
    #[inline]
    pub fn code(&self) -> FaultCode {
        FaultCode::from_u8(self.code.load(Ordering::Acquire))
    }

    #[inline]
    pub fn data(&self) -> u32 {
        self.data.load(Ordering::Acquire)
    }

    #[inline]
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> FaultSnapshot {
        FaultSnapshot {
            active: self.is_active(),
            code: self.code(),
            data: self.data(),
            count: self.count(),
        }
    }
}

impl Default for FaultState {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of fault state at a point in time.
#[derive(Clone, Copy, Debug)]
pub struct FaultSnapshot {
    pub active: bool,
    pub code: FaultCode,
    pub data: u32,
    pub count: u32,
}
