//! Serial commands understood by each sensor family and the answers they produce.

/// Command names every sensor family knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Wake,
    Sleep,
    PassiveMode,
    PassiveRead,
    /// Sensor reports continuously. Never issued by a [`Session`](crate::Session).
    ActiveMode,
}

impl Command {
    pub const ALL: [Command; 5] = [
        Command::Wake,
        Command::Sleep,
        Command::PassiveMode,
        Command::PassiveRead,
        Command::ActiveMode,
    ];

    /// Read commands must start from a clean input buffer when there are no
    /// bytes to send.
    pub fn is_read(self) -> bool {
        matches!(self, Command::PassiveRead)
    }
}

/// Bytes to send and the answer to wait for.
///
/// An empty `command` means the sensor can't be told to do this; the session
/// just listens for `answer_length` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cmd {
    pub command: &'static [u8],
    pub answer_header: &'static [u8],
    pub answer_length: usize,
}

impl Cmd {
    const fn new(
        command: &'static [u8],
        answer_header: &'static [u8],
        answer_length: usize,
    ) -> Self {
        Self {
            command,
            answer_header,
            answer_length,
        }
    }
}

/// One [`Cmd`] per [`Command`] for a protocol family.
#[derive(Debug)]
pub struct Commands {
    pub wake: Cmd,
    pub sleep: Cmd,
    pub passive_mode: Cmd,
    pub passive_read: Cmd,
    pub active_mode: Cmd,
}

impl Commands {
    pub fn get(&self, command: Command) -> &Cmd {
        match command {
            Command::Wake => &self.wake,
            Command::Sleep => &self.sleep,
            Command::PassiveMode => &self.passive_mode,
            Command::PassiveRead => &self.passive_read,
            Command::ActiveMode => &self.active_mode,
        }
    }
}

/// Plantower PMS1003, PMS5003, PMS7003 and PMSA003
pub const PMSX003: Commands = Commands {
    wake: Cmd::new(b"\x42\x4D\xE4\x00\x01\x01\x74", b"", 0),
    sleep: Cmd::new(
        b"\x42\x4D\xE4\x00\x00\x01\x73",
        b"\x42\x4D\x00\x04\xE4\x00",
        8,
    ),
    passive_mode: Cmd::new(
        b"\x42\x4D\xE1\x00\x00\x01\x70",
        b"\x42\x4D\x00\x04\xE1\x00",
        8,
    ),
    passive_read: Cmd::new(b"\x42\x4D\xE2\x00\x00\x01\x71", b"\x42\x4D\x00\x1C", 32),
    active_mode: Cmd::new(
        b"\x42\x4D\xE1\x00\x01\x01\x71",
        b"\x42\x4D\x00\x04\xE1\x01",
        8,
    ),
};

/// Plantower PMS3003 streams data and accepts no commands.
pub const PMS3003: Commands = Commands {
    wake: Cmd::new(b"", b"", 0),
    sleep: Cmd::new(b"", b"", 0),
    passive_mode: Cmd::new(b"", b"", 0),
    passive_read: Cmd::new(b"", b"\x42\x4D\x00\x14", 24),
    active_mode: Cmd::new(b"", b"", 0),
};

const SDS_WAKE: Cmd = Cmd::new(
    b"\xAA\xB4\x06\x01\x01\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\xFF\xFF\x06\xAB",
    b"\xAA\xC5\x06\x01\x01",
    10,
);
const SDS_SLEEP: Cmd = Cmd::new(
    b"\xAA\xB4\x06\x01\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\xFF\xFF\x05\xAB",
    b"\xAA\xC5\x06\x01\x00",
    10,
);
const SDS_PASSIVE_MODE: Cmd = Cmd::new(
    b"\xAA\xB4\x02\x01\x01\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\xFF\xFF\x02\xAB",
    b"\xAA\xC5\x02\x01\x01",
    10,
);
const SDS_ACTIVE_MODE: Cmd = Cmd::new(
    b"\xAA\xB4\x02\x01\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\xFF\xFF\x01\xAB",
    b"\xAA\xC5\x02\x01\x00",
    10,
);
const SDS_QUERY: &[u8] =
    b"\xAA\xB4\x04\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\xFF\xFF\x02\xAB";

/// Nova Fitness SDS011, SDS018 and SDS021
pub const SDS01X: Commands = Commands {
    wake: SDS_WAKE,
    sleep: SDS_SLEEP,
    passive_mode: SDS_PASSIVE_MODE,
    passive_read: Cmd::new(SDS_QUERY, b"\xAA\xC0", 10),
    active_mode: SDS_ACTIVE_MODE,
};

/// Nova Fitness SDS198, same commands as SDS01x but a PM100 answer
pub const SDS198: Commands = Commands {
    wake: SDS_WAKE,
    sleep: SDS_SLEEP,
    passive_mode: SDS_PASSIVE_MODE,
    passive_read: Cmd::new(SDS_QUERY, b"\xAA\xCF", 10),
    active_mode: SDS_ACTIVE_MODE,
};

const HPMA_ACK: &[u8] = b"\xA5\xA5";

/// Honeywell HPMA115S0
pub const HPMA115S0: Commands = Commands {
    wake: Cmd::new(b"\x68\x01\x01\x96", HPMA_ACK, 2),
    sleep: Cmd::new(b"\x68\x01\x02\x95", HPMA_ACK, 2),
    passive_mode: Cmd::new(b"\x68\x01\x20\x77", HPMA_ACK, 2),
    passive_read: Cmd::new(b"\x68\x01\x04\x93", b"\x40\x05\x04", 8),
    active_mode: Cmd::new(b"\x68\x01\x40\x57", HPMA_ACK, 2),
};

/// Honeywell HPMA115C0, compact version with PM1 and PM4
pub const HPMA115C0: Commands = Commands {
    passive_read: Cmd::new(b"\x68\x01\x04\x93", b"\x40\x0D\x04", 16),
    ..HPMA115S0
};

/// Sensirion SPS30 over UART (SHDLC framing)
pub const SPS30: Commands = Commands {
    wake: Cmd::new(
        b"\xFF\x7E\x00\x7D\x31\x00\xEE\x7E",
        b"\x7E\x00\x7D\x31\x00",
        8,
    ),
    sleep: Cmd::new(b"\x7E\x00\x01\x00\xFE\x7E", b"\x7E\x00\x01\x00", 7),
    passive_mode: Cmd::new(b"\x7E\x00\x00\x02\x01\x03\xF9\x7E", b"\x7E\x00\x00\x00", 7),
    passive_read: Cmd::new(b"\x7E\x00\x03\x00\xFC\x7E", b"\x7E\x00\x03", 47),
    active_mode: Cmd::new(b"\x7E\x00\x00\x02\x01\x03\xF9\x7E", b"\x7E\x00\x00\x00", 7),
};
