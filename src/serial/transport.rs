//! Trait abstraction for the receive side of the serial link to enable testing

use async_trait::async_trait;
use std::io;

/// Byte source that fills whole buffers, one fixed-length frame per call.
///
/// The receive loop hands this its frame buffer and expects it completely
/// filled before the call returns; partial reads never escape this boundary.
#[async_trait]
pub trait FrameTransport: Send {
    /// Fill `buf` completely with the next received bytes
    async fn receive_exact(&mut self, buf: &mut [u8]) -> io::Result<()>;
}

/// Wrapper around tokio_serial::SerialStream that implements FrameTransport
pub struct TokioSerialPort {
    port: tokio_serial::SerialStream,
}

impl TokioSerialPort {
    pub fn new(port: tokio_serial::SerialStream) -> Self {
        Self { port }
    }
}

#[async_trait]
impl FrameTransport for TokioSerialPort {
    async fn receive_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        use tokio::io::AsyncReadExt;
        self.port.read_exact(buf).await?;
        Ok(())
    }
}
