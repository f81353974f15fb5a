//! Trait abstraction for serial port operations to enable testing

use async_trait::async_trait;
use std::io;
use tokio::io::AsyncRead;
use tokio_serial::SerialPortBuilderExt;

/// Readable half of an opened telemetry connection
pub type TelemetryStream = Box<dyn AsyncRead + Send + Unpin>;

/// Opens the telemetry device on demand (initial start and every reconnect)
#[cfg_attr(test, mockall::automock)]
pub trait SerialConnector: Send {
    fn open(&self, path: &str) -> io::Result<TelemetryStream>;
}

/// Connector backed by a real tty through `tokio-serial` (8N1, no flow control)
#[derive(Debug, Clone, Copy)]
pub struct TokioSerialConnector {
    baud_rate: u32,
}

impl TokioSerialConnector {
    pub fn new(baud_rate: u32) -> Self {
        Self { baud_rate }
    }
}

impl SerialConnector for TokioSerialConnector {
    fn open(&self, path: &str) -> io::Result<TelemetryStream> {
        let port = open_native(path, self.baud_rate)?;
        Ok(Box::new(port))
    }
}

/// Open a tty with the 8N1 settings used by both the sensor and the RF bridge
pub fn open_native(path: &str, baud_rate: u32) -> io::Result<tokio_serial::SerialStream> {
    tokio_serial::new(path, baud_rate)
        .data_bits(tokio_serial::DataBits::Eight)
        .parity(tokio_serial::Parity::None)
        .stop_bits(tokio_serial::StopBits::One)
        .flow_control(tokio_serial::FlowControl::None)
        .open_native_async()
        .map_err(io::Error::from)
}

/// Trait for serial port I/O operations
#[async_trait]
pub trait SerialPortIO: Send {
    /// Write all data to the port
    async fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Flush the output buffer
    async fn flush(&mut self) -> io::Result<()>;
}

/// Wrapper around tokio_serial::SerialStream that implements SerialPortIO
pub struct TokioSerialPort {
    port: tokio_serial::SerialStream,
}

impl TokioSerialPort {
    pub fn new(port: tokio_serial::SerialStream) -> Self {
        Self { port }
    }

    /// # Errors
    ///
    /// Returns the underlying I/O error if the device cannot be opened
    pub fn open(path: &str, baud_rate: u32) -> io::Result<Self> {
        open_native(path, baud_rate).map(Self::new)
    }
}

#[async_trait]
impl SerialPortIO for TokioSerialPort {
    async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        use tokio::io::AsyncWriteExt;
        self.port.write_all(data).await
    }

    async fn flush(&mut self) -> io::Result<()> {
        use tokio::io::AsyncWriteExt;
        self.port.flush().await
    }
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Mock RF bridge port for testing
    #[derive(Clone)]
    pub struct MockSerialPort {
        pub written_data: Arc<Mutex<Vec<Vec<u8>>>>,
        pub write_error: Arc<Mutex<Option<io::ErrorKind>>>,
    }

    impl MockSerialPort {
        pub fn new() -> Self {
            Self {
                written_data: Arc::new(Mutex::new(Vec::new())),
                write_error: Arc::new(Mutex::new(None)),
            }
        }

        pub fn get_written_data(&self) -> Vec<Vec<u8>> {
            self.written_data.lock().unwrap().clone()
        }

        pub fn set_write_error(&self, error: io::ErrorKind) {
            *self.write_error.lock().unwrap() = Some(error);
        }
    }

    #[async_trait]
    impl SerialPortIO for MockSerialPort {
        async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
            if let Some(error) = *self.write_error.lock().unwrap() {
                return Err(io::Error::new(error, "Mock write error"));
            }
            self.written_data.lock().unwrap().push(data.to_vec());
            Ok(())
        }

        async fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Connector handing out scripted streams in order, then failing
    #[derive(Clone)]
    pub struct ScriptedConnector {
        streams: Arc<Mutex<VecDeque<TelemetryStream>>>,
        pub open_attempts: Arc<Mutex<usize>>,
    }

    impl ScriptedConnector {
        pub fn new(streams: Vec<TelemetryStream>) -> Self {
            Self {
                streams: Arc::new(Mutex::new(streams.into())),
                open_attempts: Arc::new(Mutex::new(0)),
            }
        }

        pub fn open_attempts(&self) -> usize {
            *self.open_attempts.lock().unwrap()
        }
    }

    impl SerialConnector for ScriptedConnector {
        fn open(&self, path: &str) -> io::Result<TelemetryStream> {
            *self.open_attempts.lock().unwrap() += 1;
            self.streams.lock().unwrap().pop_front().ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("{} not present", path))
            })
        }
    }
}
