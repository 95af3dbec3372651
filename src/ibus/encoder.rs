//! # iBUS Frame Encoder
//!
//! Builds complete, checksum-correct iBUS frames from channel values.
//!
//! The bridge itself never transmits; this exists for test rigs and
//! hardware-in-the-loop setups that need a byte-exact frame source.

use super::checksum::checksum;
use super::protocol::*;

/// Encode channel slots into a complete 32-byte iBUS frame
///
/// Writes the header tags, all 14 little-endian channel slots, and the
/// checksum trailer.
///
/// # Arguments
///
/// * `channels` - All 14 wire slots (a receiver only decodes the first 10)
///
/// # Examples
///
/// ```
/// use ibus_bridge::ibus::encoder::encode_channel_frame;
/// use ibus_bridge::ibus::protocol::{IBUS_CMD_CHANNELS, IBUS_LENGTH_TAG, IBUS_WIRE_CHANNELS};
///
/// let frame = encode_channel_frame(&[1500u16; IBUS_WIRE_CHANNELS]);
/// assert_eq!(frame[0], IBUS_LENGTH_TAG);
/// assert_eq!(frame[1], IBUS_CMD_CHANNELS);
/// ```
pub fn encode_channel_frame(channels: &[u16; IBUS_WIRE_CHANNELS]) -> [u8; IBUS_FRAME_LEN] {
    let mut frame = [0u8; IBUS_FRAME_LEN];
    frame[0] = IBUS_LENGTH_TAG;
    frame[1] = IBUS_CMD_CHANNELS;

    for (i, &value) in channels.iter().enumerate() {
        let offset = IBUS_CHANNEL_OFFSET + 2 * i;
        frame[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
    }

    let sum = checksum(&frame[..IBUS_CHECKSUM_OFFSET]);
    frame[IBUS_CHECKSUM_OFFSET..].copy_from_slice(&sum.to_le_bytes());

    frame
}

/// Encode a frame from the 10 decoded channels, padding the remaining wire
/// slots with the low channel value
pub fn encode_decoded_channels(channels: &RawChannels) -> [u8; IBUS_FRAME_LEN] {
    let mut slots = [CHANNEL_VALUE_MIN; IBUS_WIRE_CHANNELS];
    slots[..IBUS_NUM_CHANNELS].copy_from_slice(channels);
    encode_channel_frame(&slots)
}
