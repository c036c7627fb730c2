use core::ops::Range;

use crate::error::SensorError;

#[derive(PartialEq, Debug)]
enum ReadStatus {
    InProgress,
    Finished,
}

#[derive(PartialEq, Debug)]
enum State {
    WaitingForHeader { matched: usize },
    Reading,
    Finished,
}

/// Walks a buffer byte by byte looking for `header`, then collects bytes
/// until `length` bytes (header included) have been seen.
struct ReadStateMachine<'h> {
    header: &'h [u8],
    length: usize,
    index: usize,
    start: usize,
    state: State,
}

impl<'h> ReadStateMachine<'h> {
    fn new(header: &'h [u8], length: usize) -> Self {
        let mut fsm = Self {
            header,
            length,
            index: 0,
            start: 0,
            state: State::WaitingForHeader { matched: 0 },
        };
        if header.is_empty() {
            fsm.header_read();
        }
        fsm
    }

    fn header_read(&mut self) {
        self.start = self.index - self.header.len();
        self.state = State::Reading;
        self.check_finished();
    }

    fn check_finished(&mut self) {
        if self.index - self.start >= self.length {
            self.state = State::Finished;
        }
    }

    fn update(&mut self, byte: u8) -> ReadStatus {
        self.index += 1;

        match self.state {
            State::WaitingForHeader { matched } => {
                let matched = if byte == self.header[matched] {
                    matched + 1
                } else if byte == self.header[0] {
                    1
                } else {
                    0
                };
                if matched == self.header.len() {
                    self.header_read();
                } else {
                    self.state = State::WaitingForHeader { matched };
                }
            }
            State::Reading => self.check_finished(),
            State::Finished => {}
        };

        match self.state {
            State::Finished => ReadStatus::Finished,
            _ => ReadStatus::InProgress,
        }
    }
}

/// Position of the first `length` byte message starting with `header`.
pub(crate) fn locate(
    buffer: &[u8],
    header: &'static [u8],
    length: usize,
) -> Result<Range<usize>, SensorError> {
    let mut fsm = ReadStateMachine::new(header, length);
    if fsm.state == State::Finished {
        return Ok(0..0);
    }

    for byte in buffer {
        if fsm.update(*byte) == ReadStatus::Finished {
            return Ok(fsm.start..fsm.start + length);
        }
    }

    match fsm.state {
        State::Reading => Err(SensorError::WrongLength {
            expected: length,
            got: buffer.len() - fsm.start,
        }),
        _ => Err(SensorError::WrongHeader {
            expected: header,
            buffer: buffer.to_vec(),
        }),
    }
}

/// Returns the first `length` byte message starting with `header`.
pub(crate) fn find_message<'a>(
    buffer: &'a [u8],
    header: &'static [u8],
    length: usize,
) -> Result<&'a [u8], SensorError> {
    locate(buffer, header, length).map(|range| &buffer[range])
}
