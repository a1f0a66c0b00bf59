//! Lock-free SPSC ring buffer
//!
//! One producer context, one consumer context, no locks. The producer only
//! ever stores `put_idx` and the consumer only ever stores `get_idx`; each
//! index is published with a single Release store and observed with a single
//! Acquire load, so an interrupt handler and the foreground loop can share a
//! buffer without masking interrupts.
//!
//! One slot is always left empty: `put == get` means empty, and the buffer is
//! full when advancing `put` would land on `get`. Usable capacity is `N - 1`.
//! `N` does not have to be a power of two.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicUsize, Ordering};

/// Fixed-size circular queue shared by exactly one producer and one consumer.
pub struct RingBuffer<T: Copy, const N: usize> {
    slots: UnsafeCell<[T; N]>,
    /// Next slot the producer writes. Stored by the producer only.
    put_idx: AtomicUsize,
    /// Next slot the consumer reads. Stored by the consumer only.
    get_idx: AtomicUsize,
}

// SAFETY: The producer writes only the slot at `put_idx` before publishing
// it, the consumer reads only slots in `get_idx..put_idx`. The two never
// touch the same slot at the same time.
unsafe impl<T: Copy + Send, const N: usize> Sync for RingBuffer<T, N> {}
unsafe impl<T: Copy + Send, const N: usize> Send for RingBuffer<T, N> {}

impl<T: Copy, const N: usize> RingBuffer<T, N> {
    /// Create an empty buffer with every slot set to `init`.
    pub const fn new(init: T) -> Self {
        const { assert!(N >= 2, "Ring buffer needs at least two slots") };

        Self {
            slots: UnsafeCell::new([init; N]),
            put_idx: AtomicUsize::new(0),
            get_idx: AtomicUsize::new(0),
        }
    }

    #[inline]
    const fn advance(idx: usize) -> usize {
        if idx + 1 >= N {
            0
        } else {
            idx + 1
        }
    }

    /// Enqueue one value. Producer side only.
    ///
    /// Returns `false` and leaves the buffer untouched if it is full.
    #[inline]
    pub fn push(&self, value: T) -> bool {
        let put = self.put_idx.load(Ordering::Relaxed);
        let next = Self::advance(put);

        if next == self.get_idx.load(Ordering::Acquire) {
            return false;
        }

        // SAFETY: slot `put` is outside the consumer's readable range until
        // the store below publishes it.
        unsafe {
            self.slots.get().cast::<T>().add(put).write(value);
        }
        self.put_idx.store(next, Ordering::Release);
        true
    }

    /// Dequeue one value. Consumer side only.
    #[inline]
    pub fn pop(&self) -> Option<T> {
        let get = self.get_idx.load(Ordering::Relaxed);

        if get == self.put_idx.load(Ordering::Acquire) {
            return None;
        }

        // SAFETY: slot `get` was published by the producer and is not
        // rewritten until the store below hands it back.
        let value = unsafe { self.slots.get().cast::<T>().add(get).read() };
        self.get_idx.store(Self::advance(get), Ordering::Release);
        Some(value)
    }

    /// Number of values waiting.
    #[inline]
    pub fn len(&self) -> usize {
        let put = self.put_idx.load(Ordering::Acquire);
        let get = self.get_idx.load(Ordering::Acquire);
        (put + N - get) % N
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.put_idx.load(Ordering::Acquire) == self.get_idx.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        let put = self.put_idx.load(Ordering::Acquire);
        Self::advance(put) == self.get_idx.load(Ordering::Acquire)
    }

    /// Usable capacity (`N - 1`).
    #[inline]
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Discard everything.
    ///
    /// Only valid while neither side is running, e.g. before the interrupt
    /// source for this buffer is enabled.
    pub fn reset(&self) {
        self.get_idx.store(0, Ordering::Relaxed);
        self.put_idx.store(0, Ordering::Release);
    }
}
