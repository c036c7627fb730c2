use core::fmt::Debug;

use crate::command::Command;

/// How the read loop reacts to a [`SensorError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Sensor is not ready yet, wait a little and ask again.
    WarmingUp,
    /// Corrupted or misaligned answer, drop buffered input and ask again.
    Recoverable,
    /// Ends the observation stream.
    Fatal,
}

/// Problems found while decoding a sensor answer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SensorError {
    #[error("sensor warming up: {0}")]
    WarmingUp(&'static str),

    #[error("answer header {expected:02x?} not found in {buffer:02x?}")]
    WrongHeader {
        expected: &'static [u8],
        buffer: Vec<u8>,
    },

    #[error("answer too short: expected {expected} bytes, got {got}")]
    WrongLength { expected: usize, got: usize },

    #[error("checksum mismatch: expected {expected:#06x}, calculated {calculated:#06x}")]
    WrongChecksum { expected: u16, calculated: u16 },

    #[error("sensor reported device state {0:#04x}")]
    DeviceState(u8),

    #[error("unknown sensor {0:?}")]
    UnknownSensor(String),
}

impl SensorError {
    pub fn severity(&self) -> Severity {
        match self {
            SensorError::WarmingUp(_) => Severity::WarmingUp,
            SensorError::WrongHeader { .. }
            | SensorError::WrongLength { .. }
            | SensorError::WrongChecksum { .. } => Severity::Recoverable,
            SensorError::DeviceState(_) | SensorError::UnknownSensor(_) => Severity::Fatal,
        }
    }
}

/// Session level error, generic over the channel's own error type.
#[derive(Debug, thiserror::Error)]
pub enum Error<E>
where
    E: Debug,
{
    /// Underlying serial channel failed.
    #[error("serial channel error: {0:?}")]
    Channel(E),

    #[error(transparent)]
    Sensor(#[from] SensorError),

    /// No full answer arrived within the configured reply timeout.
    #[error("no answer to {command:?}: {available} of {expected} bytes arrived")]
    Timeout {
        command: Command,
        expected: usize,
        available: usize,
    },
}

pub type Result<T, E> = core::result::Result<T, Error<E>>;
