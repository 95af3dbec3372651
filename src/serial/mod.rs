//! # Serial Communication Module
//!
//! Opens the UART link to the iBUS receiver.
//!
//! This module handles:
//! - Opening the configured serial port with iBUS line settings
//! - The `FrameTransport` abstraction consumed by the receive loop

pub mod transport;

pub use transport::{FrameTransport, TokioSerialPort};

use crate::error::{IbusBridgeError, Result};
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info};

/// iBUS line rate, fixed by the protocol (115,200 baud, 8N1)
pub const IBUS_BAUD_RATE: u32 = 115_200;

/// UART link to an iBUS receiver
///
/// # Examples
///
/// ```no_run
/// use ibus_bridge::serial::IbusSerial;
///
/// fn main() -> anyhow::Result<()> {
///     let serial = IbusSerial::open("/dev/ttyUSB0")?;
///     println!("Connected to: {}", serial.device_path());
///     Ok(())
/// }
/// ```
pub struct IbusSerial {
    port: tokio_serial::SerialStream,
    device_path: String,
}

impl std::fmt::Debug for IbusSerial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IbusSerial")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl IbusSerial {
    /// Open a serial device with iBUS line settings (115,200 baud, 8N1)
    ///
    /// # Arguments
    ///
    /// * `path` - Device path (e.g., "/dev/ttyUSB0")
    ///
    /// # Errors
    ///
    /// Returns [`IbusBridgeError::Serial`] if the device cannot be opened
    pub fn open(path: &str) -> Result<Self> {
        debug!("Trying to open serial port: {}", path);

        let port = tokio_serial::new(path, IBUS_BAUD_RATE)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| IbusBridgeError::Serial(format!("Failed to open {}: {}", path, e)))?;

        info!("Opened iBUS receiver at {}", path);

        Ok(Self {
            port,
            device_path: path.to_string(),
        })
    }

    /// Get the device path of the opened serial port
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Consume the connection into the transport used by the receive loop
    pub fn into_transport(self) -> TokioSerialPort {
        TokioSerialPort::new(self.port)
    }
}
