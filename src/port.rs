use std::io::{Read, Write};
use std::time::Duration;

use log::debug;
use serialport::{ClearBuffer, ErrorKind, SerialPort};

use crate::channel::Channel;

/// [`Channel`] backed by the host's serial port driver.
pub struct SerialPortChannel {
    path: String,
    baud: u32,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialPortChannel {
    /// # Arguments
    /// * `path` - Serial port path (e.g., "/dev/ttyUSB0", "COM3")
    /// * `baud` - see [`Sensor::baud`](crate::Sensor::baud)
    pub fn new(path: impl Into<String>, baud: u32) -> Self {
        Self {
            path: path.into(),
            baud,
            port: None,
        }
    }

    fn port(&mut self) -> Result<&mut Box<dyn SerialPort>, serialport::Error> {
        self.port
            .as_mut()
            .ok_or_else(|| serialport::Error::new(ErrorKind::NoDevice, "serial port is not open"))
    }
}

impl Channel for SerialPortChannel {
    type Error = serialport::Error;

    fn open(&mut self) -> Result<(), Self::Error> {
        let port = serialport::new(&self.path, self.baud)
            .timeout(Duration::from_millis(100))
            .open()?;
        debug!("Serial port '{}' opened at {} baud", self.path, self.baud);
        self.port = Some(port);
        Ok(())
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        if self.port.take().is_some() {
            debug!("Serial port '{}' closed", self.path);
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.port()?.write_all(bytes)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.port()?.flush()?;
        Ok(())
    }

    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        Ok(self.port()?.bytes_to_read()? as usize)
    }

    fn read(&mut self, count: usize) -> Result<Vec<u8>, Self::Error> {
        let mut buffer = vec![0; count];
        if count == 0 {
            return Ok(buffer);
        }
        let read = self.port()?.read(&mut buffer)?;
        buffer.truncate(read);
        Ok(buffer)
    }

    fn discard_input(&mut self) -> Result<(), Self::Error> {
        self.port()?.clear(ClearBuffer::Input)
    }
}
