//! # Shared Channel State
//!
//! The handoff slot between the receive task (single writer) and any number
//! of polling consumers.
//!
//! This module handles:
//! - Whole-snapshot publication (never observable half-replaced)
//! - Copy-and-clear reads and read-only peeks
//! - Freshness test-and-clear
//! - Link frame counters
//!
//! Ordering guarantee: once a publication has completed, every later read
//! observes that snapshot or a newer one. The snapshot sits behind an
//! `RwLock` and is only ever replaced in full under the write side, so a
//! reader can never see fields from two different frames mixed together.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard};

use crate::ibus::protocol::ChannelSnapshot;

/// Received/rejected frame totals since startup. Diagnostics only; these do
/// not participate in the freshness contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    /// Completed frame reads handed to the decoder
    pub frames_received: u64,

    /// Frames rejected by header or checksum validation
    pub frames_rejected: u64,
}

/// One published snapshot plus its freshness flag, shared via `Arc`.
///
/// The receive task is the only writer; consumers read from any context.
/// No operation here blocks for longer than a struct copy under the lock.
///
/// # Examples
///
/// ```
/// use ibus_bridge::state::SharedChannelState;
///
/// let state = SharedChannelState::new();
///
/// // Before any valid frame: safe defaults, nothing fresh
/// assert!(!state.take_fresh());
/// let snapshot = state.read();
/// assert!(!snapshot.frame_ok);
/// assert_eq!(snapshot.roll, 1500);
/// ```
#[derive(Debug, Default)]
pub struct SharedChannelState {
    snapshot: RwLock<ChannelSnapshot>,
    fresh: AtomicBool,
    frames_received: AtomicU64,
    frames_rejected: AtomicU64,
}

impl SharedChannelState {
    /// Create state holding the default (neutral, not-yet-valid) snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the published snapshot and raise the freshness flag.
    ///
    /// The flag is raised inside the write window, so a read that starts
    /// after publication cannot observe the new snapshot with a stale flag.
    pub(crate) fn publish(&self, next: ChannelSnapshot) {
        let mut guard = self.snapshot.write().unwrap_or_else(|e| e.into_inner());
        *guard = next;
        self.fresh.store(true, Ordering::Release);
    }

    /// Copy-and-clear read: the consumer's primary accessor.
    ///
    /// Returns a fully consistent copy of the published snapshot and clears
    /// the freshness flag before releasing exclusion, so the act of reading
    /// is what resets freshness.
    pub fn read(&self) -> ChannelSnapshot {
        let guard = self.snapshot.read().unwrap_or_else(|e| e.into_inner());
        let copy = *guard;
        self.fresh.store(false, Ordering::Release);
        copy
    }

    /// Read-only view of the live snapshot, without copying.
    ///
    /// Weaker consistency mode for low-overhead callers: freshness is NOT
    /// cleared, and the guard delays the next publication for as long as it
    /// is held. The view itself is never torn: publication replaces the
    /// whole struct under the write lock.
    pub fn peek(&self) -> RwLockReadGuard<'_, ChannelSnapshot> {
        self.snapshot.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Atomically read and clear the freshness flag.
    ///
    /// Returns whether unread valid data had arrived since the last
    /// [`read`](Self::read) or `take_fresh` call. A second immediate call
    /// returns `false`.
    pub fn take_fresh(&self) -> bool {
        self.fresh.swap(false, Ordering::AcqRel)
    }

    /// Count one completed frame read
    pub(crate) fn note_frame(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one rejected frame
    pub(crate) fn note_reject(&self) {
        self.frames_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Current frame counters
    pub fn stats(&self) -> LinkStats {
        LinkStats {
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_rejected: self.frames_rejected.load(Ordering::Relaxed),
        }
    }
}
