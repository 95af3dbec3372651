//! # iBUS Frame Decoder
//!
//! Validates raw 32-byte frames and publishes channel snapshots.
//!
//! Validation runs both checks on every frame regardless of prior state:
//! header tags first, then the additive checksum. Only a frame that passes
//! both has its channels extracted; a rejected frame produces no mutation
//! anywhere, so consumers keep seeing the previous valid snapshot.

use std::sync::Arc;

use super::checksum::{checksum, frame_checksum};
use super::protocol::*;
use crate::clock::Clock;
use crate::error::FrameError;
use crate::state::SharedChannelState;

/// Check the two header tags of a raw frame
///
/// # Errors
///
/// Returns [`FrameError::HeaderMismatch`] carrying the offending bytes if
/// byte 0 is not the length tag or byte 1 is not the channel-data command.
pub fn validate_header(frame: &[u8; IBUS_FRAME_LEN]) -> Result<(), FrameError> {
    if frame[0] != IBUS_LENGTH_TAG || frame[1] != IBUS_CMD_CHANNELS {
        return Err(FrameError::HeaderMismatch {
            length: frame[0],
            command: frame[1],
        });
    }

    Ok(())
}

/// Check the checksum trailer of a raw frame
///
/// # Errors
///
/// Returns [`FrameError::ChecksumMismatch`] if the checksum computed over
/// bytes 0..30 differs from the little-endian trailer at bytes 30..31.
pub fn validate_checksum(frame: &[u8; IBUS_FRAME_LEN]) -> Result<(), FrameError> {
    let computed = checksum(&frame[..IBUS_CHECKSUM_OFFSET]);
    let received = frame_checksum(frame);

    if computed != received {
        return Err(FrameError::ChecksumMismatch { computed, received });
    }

    Ok(())
}

/// Extract the first ten channel values from a validated frame
///
/// Channel *i* is the little-endian u16 at byte offset `2 + 2*i`. The wire
/// carries 14 slots; slots beyond index 9 are ignored.
pub fn extract_channels(frame: &[u8; IBUS_FRAME_LEN]) -> RawChannels {
    let mut channels = [0u16; IBUS_NUM_CHANNELS];

    for (i, value) in channels.iter_mut().enumerate() {
        let offset = IBUS_CHANNEL_OFFSET + 2 * i;
        *value = u16::from_le_bytes([frame[offset], frame[offset + 1]]);
    }

    channels
}

/// Validate a raw frame and extract its channel values
///
/// # Examples
///
/// ```
/// use ibus_bridge::ibus::decoder::decode_frame;
/// use ibus_bridge::ibus::encoder::encode_channel_frame;
/// use ibus_bridge::ibus::protocol::IBUS_WIRE_CHANNELS;
///
/// let frame = encode_channel_frame(&[1500u16; IBUS_WIRE_CHANNELS]);
/// let channels = decode_frame(&frame).unwrap();
/// assert_eq!(channels, [1500u16; 10]);
/// ```
///
/// # Errors
///
/// Returns the first failing check, header before checksum.
pub fn decode_frame(frame: &[u8; IBUS_FRAME_LEN]) -> Result<RawChannels, FrameError> {
    validate_header(frame)?;
    validate_checksum(frame)?;
    Ok(extract_channels(frame))
}

/// Validates frames and publishes snapshots to shared state.
///
/// Owns the role mapping and the timestamp source. One decoder instance
/// serves one link; multiple links get their own decoder and state.
#[derive(Clone)]
pub struct FrameDecoder {
    mapping: ChannelMapping,
    clock: Arc<dyn Clock>,
}

impl FrameDecoder {
    /// Create a decoder with a role mapping and a monotonic clock.
    ///
    /// The mapping's indices must already be validated against
    /// [`IBUS_NUM_CHANNELS`] (config loading does this).
    pub fn new(mapping: ChannelMapping, clock: Arc<dyn Clock>) -> Self {
        Self { mapping, clock }
    }

    /// Validate one raw frame and, if valid, publish it.
    ///
    /// On success the complete candidate snapshot (remapped channels, fresh
    /// timestamp, `frame_ok = true`) replaces the published snapshot as one
    /// unit and the freshness flag is raised. On rejection nothing is
    /// mutated; the error is returned so the receive loop can log it.
    ///
    /// # Errors
    ///
    /// Returns the [`FrameError`] for a rejected frame.
    pub fn process(
        &self,
        frame: &[u8; IBUS_FRAME_LEN],
        state: &SharedChannelState,
    ) -> Result<(), FrameError> {
        let channels = decode_frame(frame)?;
        let next = self.mapping.apply(&channels, self.clock.now_ms());
        state.publish(next);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::mocks::FixedClock;
    use crate::ibus::encoder::{encode_channel_frame, encode_decoded_channels};

    fn test_decoder(now_ms: u64) -> FrameDecoder {
        FrameDecoder::new(ChannelMapping::default(), Arc::new(FixedClock::at(now_ms)))
    }

    fn valid_frame() -> [u8; IBUS_FRAME_LEN] {
        let mut channels = [CHANNEL_VALUE_MIN; IBUS_WIRE_CHANNELS];
        channels[0] = 1500;
        channels[1] = 1500;
        channels[2] = 1200;
        channels[3] = 1500;
        encode_channel_frame(&channels)
    }

    #[test]
    fn test_validate_header_accepts_channel_frames() {
        assert!(validate_header(&valid_frame()).is_ok());
    }

    #[test]
    fn test_validate_header_rejects_wrong_length_tag() {
        let mut frame = valid_frame();
        frame[0] = 0x1F;

        assert_eq!(
            validate_header(&frame),
            Err(FrameError::HeaderMismatch {
                length: 0x1F,
                command: IBUS_CMD_CHANNELS,
            })
        );
    }

    #[test]
    fn test_validate_header_rejects_wrong_command_tag() {
        let mut frame = valid_frame();
        frame[1] = 0x41;

        assert_eq!(
            validate_header(&frame),
            Err(FrameError::HeaderMismatch {
                length: IBUS_LENGTH_TAG,
                command: 0x41,
            })
        );
    }

    #[test]
    fn test_validate_checksum_accepts_correct_trailer() {
        assert!(validate_checksum(&valid_frame()).is_ok());
    }

    #[test]
    fn test_validate_checksum_rejects_any_payload_bit_flip() {
        // Flip one bit in each covered byte without updating the trailer
        for byte in 0..IBUS_CHECKSUM_OFFSET {
            for bit in 0..8 {
                let mut frame = valid_frame();
                frame[byte] ^= 1 << bit;

                assert!(
                    validate_checksum(&frame).is_err(),
                    "bit {} of byte {} went undetected",
                    bit,
                    byte
                );
            }
        }
    }

    #[test]
    fn test_decode_frame_extracts_little_endian_pairs() {
        let channels: RawChannels = [1000, 1100, 1200, 1300, 1400, 1500, 1600, 1700, 1800, 1900];
        let frame = encode_decoded_channels(&channels);

        assert_eq!(decode_frame(&frame).unwrap(), channels);
    }

    #[test]
    fn test_decode_frame_ignores_wire_slots_beyond_ten() {
        let mut slots = [CHANNEL_VALUE_MIN; IBUS_WIRE_CHANNELS];
        slots[..IBUS_NUM_CHANNELS].copy_from_slice(&[1500u16; IBUS_NUM_CHANNELS]);
        slots[10] = 1999;
        slots[13] = 1001;
        let frame = encode_channel_frame(&slots);

        assert_eq!(decode_frame(&frame).unwrap(), [1500u16; IBUS_NUM_CHANNELS]);
    }

    #[test]
    fn test_decode_frame_reports_header_before_checksum() {
        let mut frame = valid_frame();
        frame[0] = 0x00; // breaks both header and checksum

        assert!(matches!(
            decode_frame(&frame),
            Err(FrameError::HeaderMismatch { .. })
        ));
    }

    #[test]
    fn test_process_publishes_remapped_snapshot() {
        let state = SharedChannelState::new();
        let decoder = test_decoder(42);

        decoder.process(&valid_frame(), &state).unwrap();

        let snapshot = state.read();
        assert_eq!(snapshot.roll, 1500);
        assert_eq!(snapshot.pitch, 1500);
        assert_eq!(snapshot.throttle, 1200);
        assert_eq!(snapshot.yaw, 1500);
        assert_eq!(snapshot.switch1, CHANNEL_VALUE_MIN);
        assert_eq!(snapshot.last_update_ms, 42);
        assert!(snapshot.frame_ok);
    }

    #[test]
    fn test_process_applies_a_permuted_mapping() {
        let state = SharedChannelState::new();
        let mapping = ChannelMapping {
            roll: 9,
            pitch: 8,
            throttle: 7,
            yaw: 6,
            switches: [5, 4, 3, 2, 1, 0],
        };
        let decoder = FrameDecoder::new(mapping, Arc::new(FixedClock::at(1)));

        let channels: RawChannels = [1000, 1100, 1200, 1300, 1400, 1500, 1600, 1700, 1800, 1900];
        decoder
            .process(&encode_decoded_channels(&channels), &state)
            .unwrap();

        let snapshot = state.read();
        assert_eq!(snapshot.roll, 1900);
        assert_eq!(snapshot.pitch, 1800);
        assert_eq!(snapshot.throttle, 1700);
        assert_eq!(snapshot.yaw, 1600);
        assert_eq!(snapshot.switch1, 1500);
        assert_eq!(snapshot.switch6, 1000);
    }

    #[test]
    fn test_process_leaves_state_untouched_on_header_mismatch() {
        let state = SharedChannelState::new();
        let decoder = test_decoder(10);

        decoder.process(&valid_frame(), &state).unwrap();
        let before = state.read();

        let mut frame = valid_frame();
        frame[1] = 0x00;
        assert!(decoder.process(&frame, &state).is_err());

        assert_eq!(state.read(), before);
        assert!(!state.take_fresh());
    }

    #[test]
    fn test_process_leaves_state_untouched_on_checksum_mismatch() {
        let state = SharedChannelState::new();
        let decoder = test_decoder(10);

        decoder.process(&valid_frame(), &state).unwrap();
        let before = state.read();

        let mut frame = valid_frame();
        frame[IBUS_CHECKSUM_OFFSET] = frame[IBUS_CHECKSUM_OFFSET].wrapping_add(1);
        assert!(decoder.process(&frame, &state).is_err());

        assert_eq!(state.read(), before);
        assert!(!state.take_fresh());
    }

    #[test]
    fn test_rejected_frame_before_any_valid_frame_keeps_defaults() {
        let state = SharedChannelState::new();
        let decoder = test_decoder(10);

        let mut frame = valid_frame();
        frame[5] ^= 0x01;
        assert!(decoder.process(&frame, &state).is_err());

        assert_eq!(state.read(), ChannelSnapshot::default());
        assert!(!state.take_fresh());
    }

    #[test]
    fn test_process_stamps_the_injected_clock() {
        let state = SharedChannelState::new();
        let clock = Arc::new(FixedClock::at(100));
        let decoder = FrameDecoder::new(ChannelMapping::default(), clock.clone());

        decoder.process(&valid_frame(), &state).unwrap();
        assert_eq!(state.read().last_update_ms, 100);

        clock.advance(250);
        decoder.process(&valid_frame(), &state).unwrap();
        assert_eq!(state.read().last_update_ms, 350);
    }

    #[test]
    fn test_documented_example_frame() {
        // [0x20, 0x40, CH1=1500 LE, CH2=1500 LE, ..., CH10=1000 LE, pad, checksum LE]
        let mut channels: RawChannels = [1500; IBUS_NUM_CHANNELS];
        channels[9] = 1000;
        let frame = encode_decoded_channels(&channels);
        assert_eq!(frame[0], 0x20);
        assert_eq!(frame[1], 0x40);

        let state = SharedChannelState::new();
        test_decoder(7).process(&frame, &state).unwrap();

        let snapshot = state.read();
        assert_eq!(snapshot.roll, 1500);
        assert_eq!(snapshot.pitch, 1500);
        assert_eq!(snapshot.switch6, 1000);
        assert!(snapshot.frame_ok);
    }
}
