//! Read particulate matter sensors over a serial link.
//!
//! A [`Session`] wakes the sensor, puts it in passive mode and guesses which
//! [`Sensor`] is attached from its answer. [`Session::read`] then polls it at
//! a fixed interval:
//!
//! ```no_run
//! use pm_sensors::{Config, HalChannel, Session};
//!
//! let serial = linux_embedded_hal::Serial::open(std::path::Path::new("/dev/ttyUSB0")).unwrap();
//! let session = &mut Session::open(HalChannel::new(serial), Config::default()).unwrap();
//! for obs in session.read(60) {
//!     println!("{}", obs.unwrap());
//! }
//! ```
//!
//! Sessions put the sensor to sleep and close the channel when dropped.

pub mod channel;
pub mod command;
pub mod data;
pub mod error;
pub mod hal;
pub mod message;
#[cfg(feature = "serialport")]
pub mod port;
mod read_fsm;
pub mod sensor;
pub mod session;

pub use channel::{Channel, Clock, SystemClock};
pub use command::{Cmd, Command};
pub use data::{ObsData, Observation};
pub use error::{Error, SensorError, Severity};
pub use hal::{HalChannel, HalError, Wrapper};
#[cfg(feature = "serialport")]
pub use port::SerialPortChannel;
pub use sensor::Sensor;
pub use session::{Config, Reader, Session, State};
