#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use pm_sensors::{Channel, Clock, Command, Config, Sensor, Session};

pub const T0: i64 = 1_600_000_000;

/// What the fake sensor answers and what it was told.
pub struct Bench {
    /// Answers queued per command written
    pub answers: HashMap<Vec<u8>, VecDeque<Vec<u8>>>,
    /// Frames a streaming sensor sends, one after each input discard
    pub stream: VecDeque<Vec<u8>>,
    /// Answer bytes still on the wire
    pub incoming: VecDeque<u8>,
    /// Bytes arriving per poll, once everything before them was read
    pub chunk: usize,
    pub rx: Vec<u8>,
    pub written: Vec<Vec<u8>>,
    pub discards: usize,
    pub open: bool,
    pub closes: usize,
    pub now: DateTime<Utc>,
    /// Clock advance on every channel read
    pub read_cost: chrono::Duration,
    pub sleeps: Vec<Duration>,
    pub fail_writes: bool,
    pub fail_discards: bool,
}

pub type Shared = Rc<RefCell<Bench>>;

pub fn bench() -> Shared {
    Rc::new(RefCell::new(Bench {
        answers: HashMap::new(),
        stream: VecDeque::new(),
        incoming: VecDeque::new(),
        chunk: usize::MAX,
        rx: Vec::new(),
        written: Vec::new(),
        discards: 0,
        open: false,
        closes: 0,
        now: Utc.timestamp_opt(T0, 0).unwrap(),
        read_cost: chrono::Duration::zero(),
        sleeps: Vec::new(),
        fail_writes: false,
        fail_discards: false,
    }))
}

pub fn answer(bench: &Shared, sensor: Sensor, command: Command, answer: &[u8]) {
    bench
        .borrow_mut()
        .answers
        .entry(sensor.command_bytes(command).to_vec())
        .or_default()
        .push_back(answer.to_vec());
}

pub fn written(bench: &Shared) -> Vec<Vec<u8>> {
    bench.borrow().written.clone()
}

pub struct FakeChannel(pub Shared);

impl Channel for FakeChannel {
    type Error = &'static str;

    fn open(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        let mut bench = self.0.borrow_mut();
        bench.open = false;
        bench.closes += 1;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.0.borrow().open
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        let mut bench = self.0.borrow_mut();
        if !bench.open {
            return Err("write on closed channel");
        }
        if bench.fail_writes {
            return Err("line broken");
        }
        bench.written.push(bytes.to_vec());
        let answer = bench
            .answers
            .get_mut(bytes)
            .and_then(|answers| answers.pop_front());
        if let Some(answer) = answer {
            bench.incoming.extend(answer);
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        let mut bench = self.0.borrow_mut();
        if bench.rx.is_empty() {
            let count = bench.chunk.min(bench.incoming.len());
            let arrived: Vec<u8> = bench.incoming.drain(..count).collect();
            bench.rx.extend(arrived);
        }
        Ok(bench.rx.len())
    }

    fn read(&mut self, count: usize) -> Result<Vec<u8>, Self::Error> {
        let mut bench = self.0.borrow_mut();
        let cost = bench.read_cost;
        bench.now = bench.now + cost;
        let count = count.min(bench.rx.len());
        Ok(bench.rx.drain(..count).collect())
    }

    fn discard_input(&mut self) -> Result<(), Self::Error> {
        let mut bench = self.0.borrow_mut();
        if bench.fail_discards {
            return Err("discard failed");
        }
        bench.discards += 1;
        bench.rx.clear();
        bench.incoming.clear();
        let frame = bench.stream.pop_front();
        if let Some(frame) = frame {
            bench.rx.extend(frame);
        }
        Ok(())
    }
}

pub struct FakeClock(pub Shared);

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        self.0.borrow().now
    }

    fn sleep(&mut self, duration: Duration) {
        let mut bench = self.0.borrow_mut();
        let now = chrono::Duration::from_std(duration)
            .ok()
            .and_then(|d| bench.now.checked_add_signed(d));
        bench.now = now.unwrap_or(DateTime::<Utc>::MAX_UTC);
        bench.sleeps.push(duration);
    }
}

pub fn config(sensor: Sensor) -> Config {
    Config {
        sensor,
        reply_timeout: Some(Duration::from_millis(50)),
        ..Config::default()
    }
}

pub fn open(
    bench: &Shared,
    config: Config,
) -> Result<Session<FakeChannel, FakeClock>, pm_sensors::Error<&'static str>> {
    Session::with_clock(FakeChannel(bench.clone()), FakeClock(bench.clone()), config)
}

fn plantower(header: &[u8], words: &[u16]) -> Vec<u8> {
    let mut frame = header.to_vec();
    for word in words {
        frame.extend_from_slice(&word.to_be_bytes());
    }
    let sum: u16 = frame.iter().map(|b| *b as u16).sum();
    frame.extend_from_slice(&sum.to_be_bytes());
    frame
}

/// PMSx003 data frame with the given atmospheric PM values
pub fn pms_frame(pm01: u16, pm25: u16, pm10: u16) -> Vec<u8> {
    plantower(
        b"\x42\x4D\x00\x1C",
        &[pm01, pm25, pm10, pm01, pm25, pm10, 300, 100, 30, 8, 2, 1, 0],
    )
}

pub fn pms3003_frame(pm01: u16, pm25: u16, pm10: u16) -> Vec<u8> {
    plantower(
        b"\x42\x4D\x00\x14",
        &[pm01, pm25, pm10, pm01, pm25, pm10, 0, 0, 0],
    )
}

pub const PMS_PASSIVE: &[u8] = b"\x42\x4D\x00\x04\xE1\x00\x01\x74";
pub const PMS_SLEEP: &[u8] = b"\x42\x4D\x00\x04\xE4\x00\x01\x77";

/// Bench with a PMSx003 that acknowledges passive mode and sleep
pub fn pms_bench() -> Shared {
    let bench = bench();
    answer(&bench, Sensor::PMSx003, Command::PassiveMode, PMS_PASSIVE);
    answer(&bench, Sensor::PMSx003, Command::Sleep, PMS_SLEEP);
    bench
}
