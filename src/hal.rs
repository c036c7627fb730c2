use core::fmt::Debug;

use embedded_hal::serial::{Read, Write};
use nb::block;

use crate::channel::Channel;

#[derive(Debug, PartialEq)]
pub enum HalError<R, W> {
    Read(R),
    Write(W),
    NotOpen,
}

/// [`Channel`] on top of embedded hal serial traits.
///
/// The hal only hands out one byte at a time, so received bytes are drained
/// into a local buffer whenever the session asks how many are waiting.
pub struct HalChannel<Serial>
where
    Serial: Read<u8> + Write<u8>,
{
    serial: Serial,
    pending: Vec<u8>,
    open: bool,
}

impl<Serial> HalChannel<Serial>
where
    Serial: Read<u8> + Write<u8>,
{
    /// Channel over one object doing both directions.
    pub fn new(serial: Serial) -> Self {
        Self {
            serial,
            pending: Vec::new(),
            open: false,
        }
    }

    fn drain(&mut self) -> Result<(), HalErrorOf<Serial>> {
        loop {
            match self.serial.read() {
                Ok(byte) => self.pending.push(byte),
                Err(nb::Error::WouldBlock) => return Ok(()),
                Err(nb::Error::Other(e)) => return Err(HalError::Read(e)),
            }
        }
    }

    fn check_open(&self) -> Result<(), HalErrorOf<Serial>> {
        if self.open {
            Ok(())
        } else {
            Err(HalError::NotOpen)
        }
    }
}

type HalErrorOf<Serial> =
    HalError<<Serial as Read<u8>>::Error, <Serial as Write<u8>>::Error>;

impl<Serial> Channel for HalChannel<Serial>
where
    Serial: Read<u8> + Write<u8>,
    <Serial as Read<u8>>::Error: Debug,
    <Serial as Write<u8>>::Error: Debug,
{
    type Error = HalErrorOf<Serial>;

    fn open(&mut self) -> Result<(), Self::Error> {
        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        self.check_open()?;
        block!(self.serial.flush()).map_err(HalError::Write)?;
        self.pending.clear();
        self.open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.check_open()?;
        for byte in bytes {
            block!(self.serial.write(*byte)).map_err(HalError::Write)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.check_open()?;
        block!(self.serial.flush()).map_err(HalError::Write)
    }

    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        self.check_open()?;
        self.drain()?;
        Ok(self.pending.len())
    }

    fn read(&mut self, count: usize) -> Result<Vec<u8>, Self::Error> {
        self.check_open()?;
        self.drain()?;
        let count = count.min(self.pending.len());
        Ok(self.pending.drain(..count).collect())
    }

    fn discard_input(&mut self) -> Result<(), Self::Error> {
        self.check_open()?;
        self.drain()?;
        self.pending.clear();
        Ok(())
    }
}

impl<TX, RX> HalChannel<Wrapper<TX, RX>>
where
    TX: Write<u8>,
    RX: Read<u8>,
{
    /// Channel over separate transmit and receive halves.
    pub fn new_tx_rx(tx: TX, rx: RX) -> Self {
        Self::new(Wrapper(tx, rx))
    }
}

/// Transmit and receive halves seen as one serial object.
pub struct Wrapper<TX, RX>(TX, RX)
where
    TX: Write<u8>,
    RX: Read<u8>;

impl<TX, RX> Read<u8> for Wrapper<TX, RX>
where
    TX: Write<u8>,
    RX: Read<u8>,
{
    type Error = RX::Error;

    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        self.1.read()
    }
}

impl<TX, RX> Write<u8> for Wrapper<TX, RX>
where
    TX: Write<u8>,
    RX: Read<u8>,
{
    type Error = TX::Error;

    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        self.0.write(word)
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        self.0.flush()
    }
}
