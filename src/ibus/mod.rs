//! # iBUS Protocol Module
//!
//! Implementation of the FlySky iBUS servo-channel protocol.
//!
//! This module handles:
//! - Frame validation (header tags, additive 16-bit checksum)
//! - Channel extraction (10 little-endian channels) and role remapping
//! - Frame encoding for test rigs and hardware-in-the-loop setups
//! - Checksum calculation

pub mod protocol;
pub mod encoder;
pub mod decoder;
pub mod checksum;
