use core::fmt::Debug;
use std::time::Duration;

use chrono::{DateTime, Utc};

/// Byte oriented duplex link to a sensor.
///
/// Every call blocks except [`Channel::bytes_available`], which only reports
/// what already arrived.
pub trait Channel {
    type Error: Debug;

    fn open(&mut self) -> Result<(), Self::Error>;

    fn close(&mut self) -> Result<(), Self::Error>;

    fn is_open(&self) -> bool;

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Number of received bytes waiting to be read.
    fn bytes_available(&mut self) -> Result<usize, Self::Error>;

    /// Reads at most `count` of the bytes already received.
    fn read(&mut self, count: usize) -> Result<Vec<u8>, Self::Error>;

    /// Drops everything received so far.
    fn discard_input(&mut self) -> Result<(), Self::Error>;
}

/// Wall clock used to timestamp observations and to wait between reads.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    fn sleep(&mut self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration)
    }
}
