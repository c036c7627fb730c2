use core::fmt;
use core::str::FromStr;

use chrono::Utc;
use log::debug;

use crate::command::{self, Cmd, Command, Commands};
use crate::data::{
    Construct, Hpma115C0Data, Hpma115S0Data, Observation, Pms3003Data, PmsX003Data, Sds01xData,
    Sds198Data, Sps30Data,
};
use crate::error::SensorError;
use crate::message::{self, Decode};

/// Supported PM sensors, one per protocol family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sensor {
    PMSx003,
    PMS3003,
    SDS01x,
    SDS198,
    HPMA115S0,
    HPMA115C0,
    SPS30,
}

/// How to talk to a protocol family.
pub struct Protocol {
    pub message: Decode,
    pub data: Construct,
    pub commands: &'static Commands,
}

static PMSX003: Protocol = Protocol {
    message: message::plantower,
    data: PmsX003Data::from_payload,
    commands: &command::PMSX003,
};
static PMS3003: Protocol = Protocol {
    message: message::plantower,
    data: Pms3003Data::from_payload,
    commands: &command::PMS3003,
};
static SDS01X: Protocol = Protocol {
    message: message::nova,
    data: Sds01xData::from_payload,
    commands: &command::SDS01X,
};
static SDS198: Protocol = Protocol {
    message: message::nova,
    data: Sds198Data::from_payload,
    commands: &command::SDS198,
};
static HPMA115S0: Protocol = Protocol {
    message: message::honeywell,
    data: Hpma115S0Data::from_payload,
    commands: &command::HPMA115S0,
};
static HPMA115C0: Protocol = Protocol {
    message: message::honeywell,
    data: Hpma115C0Data::from_payload,
    commands: &command::HPMA115C0,
};
static SPS30: Protocol = Protocol {
    message: message::sensirion,
    data: Sps30Data::from_payload,
    commands: &command::SPS30,
};

/// Model names and their protocol family.
const ALIASES: &[(&str, Sensor)] = &[
    ("PMSx003", Sensor::PMSx003),
    ("PMS1003", Sensor::PMSx003),
    ("PMS5003", Sensor::PMSx003),
    ("PMS7003", Sensor::PMSx003),
    ("PMSA003", Sensor::PMSx003),
    ("G1", Sensor::PMSx003),
    ("G5", Sensor::PMSx003),
    ("G7", Sensor::PMSx003),
    ("G10", Sensor::PMSx003),
    ("PMS3003", Sensor::PMS3003),
    ("G3", Sensor::PMS3003),
    ("SDS01x", Sensor::SDS01x),
    ("SDS011", Sensor::SDS01x),
    ("SDS018", Sensor::SDS01x),
    ("SDS021", Sensor::SDS01x),
    ("SDS198", Sensor::SDS198),
    ("HPMA115S0", Sensor::HPMA115S0),
    ("HPMA115C0", Sensor::HPMA115C0),
    ("SPS30", Sensor::SPS30),
];

/// Passive mode answer of a PMSx003
const PMSX003_SIGNATURE: &[u8] = b"\x42\x4D\x00\x04\xE1\x00\x01\x74";
/// Start of the passive mode answer of a SDS01x/SDS198
const SDS_SIGNATURE: &[u8] = b"\xAA\xC5\x02\x01\x01\x00";

impl Sensor {
    pub const ALL: [Sensor; 7] = [
        Sensor::PMSx003,
        Sensor::PMS3003,
        Sensor::SDS01x,
        Sensor::SDS198,
        Sensor::HPMA115S0,
        Sensor::HPMA115C0,
        Sensor::SPS30,
    ];

    /// Assumed until the sensor answers.
    pub const DEFAULT: Sensor = Sensor::PMSx003;

    pub fn protocol(self) -> &'static Protocol {
        match self {
            Sensor::PMSx003 => &PMSX003,
            Sensor::PMS3003 => &PMS3003,
            Sensor::SDS01x => &SDS01X,
            Sensor::SDS198 => &SDS198,
            Sensor::HPMA115S0 => &HPMA115S0,
            Sensor::HPMA115C0 => &HPMA115C0,
            Sensor::SPS30 => &SPS30,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Sensor::PMSx003 => "PMSx003",
            Sensor::PMS3003 => "PMS3003",
            Sensor::SDS01x => "SDS01x",
            Sensor::SDS198 => "SDS198",
            Sensor::HPMA115S0 => "HPMA115S0",
            Sensor::HPMA115C0 => "HPMA115C0",
            Sensor::SPS30 => "SPS30",
        }
    }

    pub fn baud(self) -> u32 {
        match self {
            Sensor::SPS30 => 115_200,
            _ => 9_600,
        }
    }

    pub fn command(self, command: Command) -> &'static Cmd {
        self.protocol().commands.get(command)
    }

    /// Bytes to write for `command`, empty when the sensor can't be commanded.
    pub fn command_bytes(self, command: Command) -> &'static [u8] {
        self.command(command).command
    }

    /// Number of bytes to wait for after `command`.
    pub fn answer_length(self, command: Command) -> usize {
        self.command(command).answer_length
    }

    /// Whether `buffer` holds the whole answer to `command`.
    pub fn answer_complete(self, command: Command, buffer: &[u8]) -> bool {
        match self {
            Sensor::SPS30 => message::shdlc_complete(buffer, self.command(command)),
            _ => true,
        }
    }

    /// Guess the sensor from its answer to the wake and passive mode commands.
    pub fn guess(buffer: &[u8]) -> Sensor {
        Sensor::guess_with_hint(buffer, Sensor::DEFAULT)
    }

    /// Like [`Sensor::guess`], trusting `hint` where the answer alone can't tell.
    ///
    /// SDS01x and SDS198 share every command, so their answers look the same.
    /// Sensors without a signature of their own are kept when the buffer holds
    /// their passive mode answer, or when they take no commands and the buffer
    /// is empty.
    pub fn guess_with_hint(buffer: &[u8], hint: Sensor) -> Sensor {
        let sensor = if buffer.ends_with(PMSX003_SIGNATURE) {
            Sensor::PMSx003
        } else if buffer.len() >= 10
            && buffer[buffer.len() - 10..buffer.len() - 4] == *SDS_SIGNATURE
        {
            if hint == Sensor::SDS198 {
                Sensor::SDS198
            } else {
                Sensor::SDS01x
            }
        } else if !buffer.is_empty() && hint != Sensor::DEFAULT && hint.acknowledged(buffer) {
            hint
        } else if !buffer.is_empty() {
            Sensor::PMS3003
        } else if !hint.commandable() {
            debug!("{} takes no commands, nothing to wait for", hint);
            hint
        } else {
            debug!(
                "Sensor returned empty buffer, assume {} on sleep mode",
                Sensor::DEFAULT
            );
            Sensor::DEFAULT
        };
        debug!("Guess {} from buffer contents", sensor);
        sensor
    }

    /// Whether the sensor can be woken and told to stop streaming.
    fn commandable(self) -> bool {
        !self.command_bytes(Command::Wake).is_empty()
            || !self.command_bytes(Command::PassiveMode).is_empty()
    }

    fn acknowledged(self, buffer: &[u8]) -> bool {
        let header = self.command(Command::PassiveMode).answer_header;
        header.is_empty() || buffer.windows(header.len()).any(|w| w == header)
    }

    /// Current time as seconds since epoch
    pub fn now() -> i64 {
        Utc::now().timestamp()
    }

    /// Extract an observation from the answer to a passive read.
    pub fn decode(self, buffer: &[u8], time: i64) -> Result<Observation, SensorError> {
        let protocol = self.protocol();
        let payload = (protocol.message)(buffer, self.command(Command::PassiveRead))?;
        let data = (protocol.data)(&payload)?;
        Ok(Observation { time, data })
    }
}

impl Default for Sensor {
    fn default() -> Self {
        Sensor::DEFAULT
    }
}

impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Sensor {
    type Err = SensorError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        ALIASES
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
            .map(|(_, sensor)| *sensor)
            .ok_or_else(|| SensorError::UnknownSensor(name.to_string()))
    }
}
