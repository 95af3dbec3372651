//! # iBUS Protocol Constants and Types
//!
//! Core protocol definitions for FlySky iBUS servo-channel frames.

use serde::{Deserialize, Serialize};

/// Fixed iBUS frame length in bytes
pub const IBUS_FRAME_LEN: usize = 32;

/// Header length tag (byte 0), equal to the frame length
pub const IBUS_LENGTH_TAG: u8 = 0x20;

/// Command tag (byte 1) identifying a servo-channel frame
pub const IBUS_CMD_CHANNELS: u8 = 0x40;

/// Number of channels extracted from a frame
pub const IBUS_NUM_CHANNELS: usize = 10;

/// Number of 16-bit channel slots carried on the wire
pub const IBUS_WIRE_CHANNELS: usize = 14;

/// Byte offset of the first channel slot
pub const IBUS_CHANNEL_OFFSET: usize = 2;

/// Byte offset of the little-endian checksum trailer
pub const IBUS_CHECKSUM_OFFSET: usize = IBUS_FRAME_LEN - 2;

/// Channel value range (raw protocol units, microsecond-style)
pub const CHANNEL_VALUE_MIN: u16 = 1000;
pub const CHANNEL_VALUE_CENTER: u16 = 1500;
pub const CHANNEL_VALUE_MAX: u16 = 2000;

/// Raw channel values extracted from one frame, in wire order
pub type RawChannels = [u16; IBUS_NUM_CHANNELS];

/// The latest fully-validated decoded channel state.
///
/// Published as one unit: either every field comes from the same frame, or
/// (before the first valid frame) every field is the safe default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChannelSnapshot {
    /// Roll axis, raw protocol units
    pub roll: u16,

    /// Pitch axis, raw protocol units
    pub pitch: u16,

    /// Yaw axis, raw protocol units
    pub yaw: u16,

    /// Throttle, raw protocol units
    pub throttle: u16,

    /// Auxiliary switches, raw protocol units (typically discrete positions)
    pub switch1: u16,
    pub switch2: u16,
    pub switch3: u16,
    pub switch4: u16,
    pub switch5: u16,
    pub switch6: u16,

    /// Monotonic timestamp of the last successfully validated frame
    pub last_update_ms: u64,

    /// True once at least one valid frame has ever been decoded
    pub frame_ok: bool,
}

impl Default for ChannelSnapshot {
    /// Safe neutral values: sticks centered, throttle and switches low.
    fn default() -> Self {
        Self {
            roll: CHANNEL_VALUE_CENTER,
            pitch: CHANNEL_VALUE_CENTER,
            yaw: CHANNEL_VALUE_CENTER,
            throttle: CHANNEL_VALUE_MIN,
            switch1: CHANNEL_VALUE_MIN,
            switch2: CHANNEL_VALUE_MIN,
            switch3: CHANNEL_VALUE_MIN,
            switch4: CHANNEL_VALUE_MIN,
            switch5: CHANNEL_VALUE_MIN,
            switch6: CHANNEL_VALUE_MIN,
            last_update_ms: 0,
            frame_ok: false,
        }
    }
}

/// Role assignment table: which extracted channel feeds which snapshot field.
///
/// This is configuration, not protocol. It is loaded from the `[channels]`
/// config section and handed to the decoder at construction, so role
/// assignment can change without touching extraction.
///
/// Indices must be below [`IBUS_NUM_CHANNELS`]; config loading validates
/// this before a mapping reaches the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChannelMapping {
    pub roll: usize,
    pub pitch: usize,
    pub throttle: usize,
    pub yaw: usize,
    pub switches: [usize; 6],
}

impl Default for ChannelMapping {
    /// CH1..CH10 in wire order: roll, pitch, throttle, yaw, switch1..switch6.
    fn default() -> Self {
        Self {
            roll: 0,
            pitch: 1,
            throttle: 2,
            yaw: 3,
            switches: [4, 5, 6, 7, 8, 9],
        }
    }
}

impl ChannelMapping {
    /// Every role with its assigned channel index, for validation and logging
    pub fn roles(&self) -> [(&'static str, usize); 10] {
        [
            ("roll", self.roll),
            ("pitch", self.pitch),
            ("throttle", self.throttle),
            ("yaw", self.yaw),
            ("switch1", self.switches[0]),
            ("switch2", self.switches[1]),
            ("switch3", self.switches[2]),
            ("switch4", self.switches[3]),
            ("switch5", self.switches[4]),
            ("switch6", self.switches[5]),
        ]
    }

    /// Build a snapshot from extracted channel values, stamping time and
    /// marking the frame valid.
    pub fn apply(&self, channels: &RawChannels, now_ms: u64) -> ChannelSnapshot {
        ChannelSnapshot {
            roll: channels[self.roll],
            pitch: channels[self.pitch],
            yaw: channels[self.yaw],
            throttle: channels[self.throttle],
            switch1: channels[self.switches[0]],
            switch2: channels[self.switches[1]],
            switch3: channels[self.switches[2]],
            switch4: channels[self.switches[3]],
            switch5: channels[self.switches[4]],
            switch6: channels[self.switches[5]],
            last_update_ms: now_ms,
            frame_ok: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_constants() {
        assert_eq!(IBUS_FRAME_LEN, 32);
        assert_eq!(IBUS_LENGTH_TAG, 0x20);
        assert_eq!(IBUS_LENGTH_TAG as usize, IBUS_FRAME_LEN);
        assert_eq!(IBUS_CMD_CHANNELS, 0x40);
        assert_eq!(IBUS_CHECKSUM_OFFSET, 30);
    }

    #[test]
    fn test_channel_slots_fit_the_frame() {
        // 14 wire slots of 2 bytes sit between the header and the checksum
        assert_eq!(
            IBUS_CHANNEL_OFFSET + 2 * IBUS_WIRE_CHANNELS,
            IBUS_CHECKSUM_OFFSET
        );
        assert!(IBUS_NUM_CHANNELS <= IBUS_WIRE_CHANNELS);
    }

    #[test]
    fn test_default_snapshot_is_neutral() {
        let snapshot = ChannelSnapshot::default();

        assert_eq!(snapshot.roll, CHANNEL_VALUE_CENTER);
        assert_eq!(snapshot.pitch, CHANNEL_VALUE_CENTER);
        assert_eq!(snapshot.yaw, CHANNEL_VALUE_CENTER);
        assert_eq!(snapshot.throttle, CHANNEL_VALUE_MIN);
        assert_eq!(snapshot.switch1, CHANNEL_VALUE_MIN);
        assert_eq!(snapshot.switch6, CHANNEL_VALUE_MIN);
        assert_eq!(snapshot.last_update_ms, 0);
        assert!(!snapshot.frame_ok);
    }

    #[test]
    fn test_default_mapping_is_wire_order() {
        let mapping = ChannelMapping::default();

        assert_eq!(mapping.roll, 0);
        assert_eq!(mapping.pitch, 1);
        assert_eq!(mapping.throttle, 2);
        assert_eq!(mapping.yaw, 3);
        assert_eq!(mapping.switches, [4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_apply_uses_the_configured_indices() {
        // Swap roll and yaw relative to the default
        let mapping = ChannelMapping {
            roll: 3,
            yaw: 0,
            ..ChannelMapping::default()
        };
        let channels: RawChannels = [1100, 1200, 1300, 1400, 1500, 1600, 1700, 1800, 1900, 2000];

        let snapshot = mapping.apply(&channels, 77);

        assert_eq!(snapshot.roll, 1400);
        assert_eq!(snapshot.yaw, 1100);
        assert_eq!(snapshot.pitch, 1200);
        assert_eq!(snapshot.throttle, 1300);
        assert_eq!(snapshot.switch1, 1500);
        assert_eq!(snapshot.switch6, 2000);
        assert_eq!(snapshot.last_update_ms, 77);
        assert!(snapshot.frame_ok);
    }

    #[test]
    fn test_roles_lists_every_field_once() {
        let mapping = ChannelMapping::default();
        let roles = mapping.roles();

        assert_eq!(roles.len(), IBUS_NUM_CHANNELS);
        let indices: Vec<usize> = roles.iter().map(|(_, index)| *index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_mapping_deserializes_with_partial_overrides() {
        let mapping: ChannelMapping = toml::from_str("roll = 3\nyaw = 0\n").unwrap();

        assert_eq!(mapping.roll, 3);
        assert_eq!(mapping.yaw, 0);
        // Unspecified roles keep their defaults
        assert_eq!(mapping.pitch, 1);
        assert_eq!(mapping.switches, [4, 5, 6, 7, 8, 9]);
    }
}
