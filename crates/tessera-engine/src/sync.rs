//! Cross-thread change tracking.
//!
//! The control thread bumps a [`Generation`] whenever it mutates an entity.
//! The render thread keeps the last value it consumed in an [`Observed`] and
//! compares it against the current one once per frame.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Monotonically increasing change counter.
#[derive(Debug, Default)]
pub struct Generation(AtomicU64);

impl Generation {
    #[inline]
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Current value. Pairs with the release in [`bump`](Self::bump).
    #[inline]
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    /// Marks the owner as changed and returns the new value.
    #[inline]
    pub fn bump(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }
}

/// Consumer-side cache of the last generation that was acted upon.
///
/// A fresh `Observed` is always stale so that the first frame builds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Observed {
    seen: Option<u64>,
}

impl Observed {
    #[inline]
    pub const fn new() -> Self {
        Self { seen: None }
    }

    #[inline]
    pub fn is_stale(&self, current: u64) -> bool {
        self.seen != Some(current)
    }

    #[inline]
    pub fn mark(&mut self, current: u64) {
        self.seen = Some(current);
    }

    /// Forgets the consumed value, forcing the next check to report stale.
    #[inline]
    pub fn invalidate(&mut self) {
        self.seen = None;
    }
}

/// One-shot "please redraw" flag raised by the scene and consumed by the view.
#[derive(Debug, Default)]
pub struct UpdateRequest(AtomicBool);

impl UpdateRequest {
    #[inline]
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    #[inline]
    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns whether an update was requested and clears the flag.
    #[inline]
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    #[inline]
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
