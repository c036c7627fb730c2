//! Message validation for each protocol family.
//!
//! A decoder takes whatever the sensor sent back, finds the answer expected for
//! a [`Cmd`], checks it and hands back the payload: the data bytes between
//! header and checksum.

use std::borrow::Cow;

use scroll::{Pread, BE};

use crate::command::Cmd;
use crate::error::SensorError;
use crate::read_fsm::{find_message, locate};

/// Signature shared by every decoder in this module.
pub type Decode = for<'a> fn(&'a [u8], &Cmd) -> Result<Cow<'a, [u8]>, SensorError>;

fn checksum(expected: u16, calculated: u16) -> Result<(), SensorError> {
    if expected == calculated {
        Ok(())
    } else {
        Err(SensorError::WrongChecksum {
            expected,
            calculated,
        })
    }
}

/// Plantower frames: `42 4D len16 data.. sum16`
pub fn plantower<'a>(buffer: &'a [u8], cmd: &Cmd) -> Result<Cow<'a, [u8]>, SensorError> {
    let message = find_message(buffer, cmd.answer_header, cmd.answer_length)?;
    let end = message.len() - 2;

    let expected = message
        .pread_with::<u16>(end, BE)
        .map_err(|_| SensorError::WrongLength {
            expected: cmd.answer_length,
            got: message.len(),
        })?;
    let calculated = message[..end].iter().map(|b| *b as u16).sum::<u16>();
    checksum(expected, calculated)?;

    Ok(Cow::Borrowed(&message[4..end]))
}

/// Nova Fitness frames: `AA id data[6] sum8 AB`
pub fn nova<'a>(buffer: &'a [u8], cmd: &Cmd) -> Result<Cow<'a, [u8]>, SensorError> {
    let message = find_message(buffer, cmd.answer_header, cmd.answer_length)?;
    let data = &message[2..8];

    let calculated = data.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    checksum(message[8] as u16, calculated as u16)?;

    Ok(Cow::Borrowed(data))
}

/// Honeywell frames: `40 len cmd data.. cs`, where all bytes add up to zero.
pub fn honeywell<'a>(buffer: &'a [u8], cmd: &Cmd) -> Result<Cow<'a, [u8]>, SensorError> {
    let message = find_message(buffer, cmd.answer_header, cmd.answer_length)?;
    let end = message.len() - 1;

    let sum = message[..end]
        .iter()
        .fold(0u8, |acc, b| acc.wrapping_add(*b));
    checksum(message[end] as u16, sum.wrapping_neg() as u16)?;

    Ok(Cow::Borrowed(&message[3..end]))
}

const SHDLC_FRAME: u8 = 0x7E;
const SHDLC_ESCAPE: u8 = 0x7D;

fn unstuff(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut escaped = false;
    for byte in bytes {
        if escaped {
            out.push(byte ^ 0x20);
            escaped = false;
        } else if *byte == SHDLC_ESCAPE {
            escaped = true;
        } else {
            out.push(*byte);
        }
    }
    out
}

/// Whether the closing `7E` of a stuffed answer arrived.
///
/// Stuffing makes a frame longer than `answer_length`. A buffer without the
/// answer header counts as complete, decoding reports it.
pub fn shdlc_complete(buffer: &[u8], cmd: &Cmd) -> bool {
    let header = cmd.answer_header;
    if header.is_empty() {
        return true;
    }
    match buffer.windows(header.len()).position(|w| w == header) {
        Some(start) => buffer[start + 1..].contains(&SHDLC_FRAME),
        None => true,
    }
}

/// Sensirion SHDLC frames: `7E adr cmd state len data.. chk 7E`, byte-stuffed.
///
/// `answer_length` is the frame size before stuffing, so the frame is cut at
/// the closing `7E` and checked against its own length byte.
pub fn sensirion<'a>(buffer: &'a [u8], cmd: &Cmd) -> Result<Cow<'a, [u8]>, SensorError> {
    let start = locate(buffer, cmd.answer_header, cmd.answer_length)?.start;
    let rest = &buffer[start + 1..];

    let close = rest
        .iter()
        .position(|b| *b == SHDLC_FRAME)
        .ok_or(SensorError::WrongLength {
            expected: cmd.answer_length,
            got: rest.len() + 1,
        })?;
    let frame = unstuff(&rest[..close]);

    // adr cmd state len data.. chk
    if frame.len() < 5 || frame.len() != 5 + frame[3] as usize {
        return Err(SensorError::WrongLength {
            expected: 5 + frame.get(3).copied().unwrap_or(0) as usize,
            got: frame.len(),
        });
    }

    let end = frame.len() - 1;
    let sum = frame[..end].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    checksum(frame[end] as u16, !sum as u16)?;

    if frame[2] != 0 {
        return Err(SensorError::DeviceState(frame[2]));
    }

    Ok(Cow::Owned(frame[4..end].to_vec()))
}
