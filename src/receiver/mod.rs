//! # Frame Receiver
//!
//! The self-rearming receive loop: wait for exactly one frame, hand it to
//! the decoder, immediately arm the next read.
//!
//! The loop never retries a single read and never pauses between a
//! completed frame and the next arm; decode runs synchronously in between,
//! so the buffer is never overwritten while the decoder is reading it.
//! Decode outcome has no effect on re-arming; a continuous stream makes
//! the next frame the retry.

use std::io;
use std::sync::Arc;

use tracing::debug;

use crate::ibus::decoder::FrameDecoder;
use crate::ibus::protocol::IBUS_FRAME_LEN;
use crate::serial::FrameTransport;
use crate::state::SharedChannelState;

/// Owns the raw frame buffer and drives the unbroken receive cycle.
pub struct FrameReceiver<T: FrameTransport> {
    transport: T,
    decoder: FrameDecoder,
    state: Arc<SharedChannelState>,
    buf: [u8; IBUS_FRAME_LEN],
}

impl<T: FrameTransport> FrameReceiver<T> {
    pub fn new(transport: T, decoder: FrameDecoder, state: Arc<SharedChannelState>) -> Self {
        Self {
            transport,
            decoder,
            state,
            buf: [0u8; IBUS_FRAME_LEN],
        }
    }

    /// Run the receive cycle until the transport fails.
    ///
    /// # Errors
    ///
    /// Returns the transport's I/O error. The caller decides whether to
    /// reopen the link; the loop itself never goes silently idle.
    pub async fn run(mut self) -> io::Result<()> {
        loop {
            self.transport.receive_exact(&mut self.buf).await?;
            self.on_frame_complete();
        }
    }

    /// Decode the filled buffer and publish on success.
    ///
    /// Rejections are absorbed here: counted, logged at debug level, and
    /// otherwise invisible to consumers.
    fn on_frame_complete(&mut self) {
        self.state.note_frame();

        if let Err(e) = self.decoder.process(&self.buf, &self.state) {
            self.state.note_reject();
            debug!("Discarding frame: {}", e);
        }
    }
}
