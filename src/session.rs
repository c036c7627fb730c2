//! One open-to-close lifetime of a sensor on a serial channel.
//!
//! Opening wakes the sensor, asks for passive mode and guesses which sensor
//! answered. Reading polls it at a steady pace. Closing, explicit or on drop,
//! puts it back to sleep.

use std::convert::TryFrom;
use std::time::{Duration, Instant};

use chrono::TimeZone;
use chrono::Utc;
use log::{debug, info, warn};

use crate::channel::{Channel, Clock, SystemClock};
use crate::command::Command;
use crate::data::Observation;
use crate::error::{Error, Result, Severity};
use crate::sensor::Sensor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Closed,
    Opening,
    Open,
    Closing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Sensor assumed while waking up. Also picks SDS198 over SDS01x, which
    /// answer alike.
    pub sensor: Sensor,
    /// Wait before asking a warming up sensor again.
    pub warm_up_delay: Duration,
    /// Give up waiting for an answer after this long. `None` waits forever.
    pub reply_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sensor: Sensor::DEFAULT,
            warm_up_delay: Duration::from_secs(1),
            reply_timeout: None,
        }
    }
}

pub struct Session<Ch, C = SystemClock>
where
    Ch: Channel,
    C: Clock,
{
    channel: Ch,
    clock: C,
    config: Config,
    sensor: Sensor,
    state: State,
}

impl<Ch> Session<Ch, SystemClock>
where
    Ch: Channel,
{
    /// Opens the channel and finds out which sensor is attached.
    pub fn open(channel: Ch, config: Config) -> Result<Self, Ch::Error> {
        Self::with_clock(channel, SystemClock, config)
    }
}

impl<Ch, C> Session<Ch, C>
where
    Ch: Channel,
    C: Clock,
{
    pub fn with_clock(channel: Ch, clock: C, config: Config) -> Result<Self, Ch::Error> {
        let sensor = config.sensor;
        let mut session = Self {
            channel,
            clock,
            config,
            sensor,
            state: State::Opening,
        };
        // on failure the session is dropped, which closes the channel again
        session.start()?;
        Ok(session)
    }

    /// The sensor guessed while opening.
    pub fn sensor(&self) -> Sensor {
        self.sensor
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn channel(&self) -> &Ch {
        &self.channel
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn start(&mut self) -> Result<(), Ch::Error> {
        if !self.channel.is_open() {
            self.channel.open().map_err(Error::Channel)?;
        }
        self.channel.discard_input().map_err(Error::Channel)?;

        let mut buffer = self.command(Command::Wake)?;
        buffer.extend(self.command(Command::PassiveMode)?);

        self.sensor = Sensor::guess_with_hint(&buffer, self.config.sensor);
        self.state = State::Open;
        info!("{} sensor ready", self.sensor);
        Ok(())
    }

    /// Puts the sensor to sleep and closes the channel.
    pub fn close(mut self) -> Result<(), Ch::Error> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<(), Ch::Error> {
        if self.state == State::Closed {
            return Ok(());
        }
        self.state = State::Closing;

        let mut result = Ok(());
        if self.channel.is_open() {
            if let Err(e) = self.command(Command::Sleep) {
                warn!("{} did not go to sleep: {}", self.sensor, e);
                result = Err(e);
            }
            if let Err(e) = self.channel.close() {
                result = result.and(Err(Error::Channel(e)));
            }
        }

        self.state = State::Closed;
        info!("{} session closed", self.sensor);
        result
    }

    /// Observations at least `interval` seconds apart, as fast as the sensor
    /// answers when `interval` is 0.
    pub fn read(&mut self, interval: u64) -> Reader<'_, Ch, C> {
        Reader {
            session: self,
            interval,
            last: None,
            done: false,
        }
    }

    /// Write command to sensor and return answer
    fn command(&mut self, command: Command) -> Result<Vec<u8>, Ch::Error> {
        let cmd = self.sensor.command(command);

        if !cmd.command.is_empty() {
            self.channel.write(cmd.command).map_err(Error::Channel)?;
            self.channel.flush().map_err(Error::Channel)?;
        } else if command.is_read() {
            self.channel.discard_input().map_err(Error::Channel)?;
        }

        let started = Instant::now();
        self.wait_for(command, cmd.answer_length, started)?;
        let mut answer = self.read_available()?;

        // stuffed answers run past answer_length
        while !self.sensor.answer_complete(command, &answer) {
            self.wait_for(command, 1, started)?;
            answer.extend(self.read_available()?);
        }
        Ok(answer)
    }

    fn read_available(&mut self) -> Result<Vec<u8>, Ch::Error> {
        let available = self.channel.bytes_available().map_err(Error::Channel)?;
        self.channel.read(available).map_err(Error::Channel)
    }

    /// Busy-polls until `expected` bytes arrived.
    fn wait_for(
        &mut self,
        command: Command,
        expected: usize,
        started: Instant,
    ) -> Result<(), Ch::Error> {
        loop {
            let available = self.channel.bytes_available().map_err(Error::Channel)?;
            if available >= expected {
                return Ok(());
            }
            if let Some(timeout) = self.config.reply_timeout {
                if started.elapsed() >= timeout {
                    return Err(Error::Timeout {
                        command,
                        expected,
                        available,
                    });
                }
            }
        }
    }

    fn read_once(&mut self) -> Result<Observation, Ch::Error> {
        let buffer = self.command(Command::PassiveRead)?;
        let time = self.clock.now().timestamp();
        Ok(self.sensor.decode(&buffer, time)?)
    }

    /// Sleeps so the next read happens `interval` seconds after `time`.
    fn pace(&mut self, time: i64, interval: u64) {
        let taken = match Utc.timestamp_opt(time, 0).single() {
            Some(taken) => taken,
            None => return,
        };
        // intervals beyond what chrono can hold wait for as long as it can
        let interval = i64::try_from(interval)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or_else(chrono::Duration::max_value);
        let delay = interval
            .checked_sub(&(self.clock.now() - taken))
            .unwrap_or_else(chrono::Duration::max_value);
        if let Ok(delay) = delay.to_std() {
            if !delay.is_zero() {
                self.clock.sleep(delay);
            }
        }
    }
}

impl<Ch, C> Drop for Session<Ch, C>
where
    Ch: Channel,
    C: Clock,
{
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!("Failed to close session: {}", e);
        }
    }
}

/// Endless observations from an open [`Session`].
///
/// Warm-up and garbled answers are retried internally. The first other error
/// is yielded and ends the iteration, as does closing the channel.
pub struct Reader<'s, Ch, C>
where
    Ch: Channel,
    C: Clock,
{
    session: &'s mut Session<Ch, C>,
    interval: u64,
    last: Option<i64>,
    done: bool,
}

impl<Ch, C> Reader<'_, Ch, C>
where
    Ch: Channel,
    C: Clock,
{
    fn fail(&mut self, error: Error<Ch::Error>) -> Option<Result<Observation, Ch::Error>> {
        self.done = true;
        Some(Err(error))
    }
}

impl<Ch, C> Iterator for Reader<'_, Ch, C>
where
    Ch: Channel,
    C: Clock,
{
    type Item = Result<Observation, Ch::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Some(time) = self.last.take() {
            self.session.pace(time, self.interval);
        }

        while self.session.channel.is_open() {
            let error = match self.session.read_once() {
                Ok(obs) => {
                    self.last = Some(obs.time);
                    return Some(Ok(obs));
                }
                Err(error) => error,
            };

            let severity = match &error {
                Error::Sensor(e) => e.severity(),
                _ => Severity::Fatal,
            };
            match severity {
                Severity::WarmingUp => {
                    debug!("{}", error);
                    let delay = self.session.config.warm_up_delay;
                    self.session.clock.sleep(delay);
                }
                Severity::Recoverable => {
                    debug!("{}", error);
                    if let Err(e) = self.session.channel.discard_input() {
                        return self.fail(Error::Channel(e));
                    }
                }
                Severity::Fatal => return self.fail(error),
            }
        }

        self.done = true;
        None
    }
}
