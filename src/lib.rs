//! # iBUS Bridge Library
//!
//! Decode FlySky iBUS RC receiver frames from a UART link.
//!
//! This library provides the self-rearming frame receive loop, header and
//! checksum validation, channel extraction with configurable role mapping,
//! and the shared snapshot state that hands consistent channel data from
//! the receive task to polling consumers.

pub mod config;
pub mod error;
pub mod ibus;
pub mod clock;
pub mod serial;
pub mod receiver;
pub mod state;
pub mod recorder;
