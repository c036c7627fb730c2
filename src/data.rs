//! Typed observations built from validated payloads.

use core::fmt;

use scroll::{Endian, Pread, BE, LE};

use crate::error::SensorError;

/// Builds the family specific record from a payload.
pub type Construct = fn(&[u8]) -> Result<ObsData, SensorError>;

/// One successful read: when it was taken and what was measured.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Seconds since the Unix epoch.
    pub time: i64,
    pub data: ObsData,
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.time, self.data)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObsData {
    PMSx003(PmsX003Data),
    PMS3003(Pms3003Data),
    SDS01x(Sds01xData),
    SDS198(Sds198Data),
    HPMA115S0(Hpma115S0Data),
    HPMA115C0(Hpma115C0Data),
    SPS30(Sps30Data),
}

impl fmt::Display for ObsData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObsData::PMSx003(d) => write!(
                f,
                "PM1 {}, PM2.5 {}, PM10 {} ug/m3",
                d.pm01, d.pm25, d.pm10
            ),
            ObsData::PMS3003(d) => write!(
                f,
                "PM1 {}, PM2.5 {}, PM10 {} ug/m3",
                d.pm01, d.pm25, d.pm10
            ),
            ObsData::SDS01x(d) => write!(f, "PM2.5 {:.1}, PM10 {:.1} ug/m3", d.pm25, d.pm10),
            ObsData::SDS198(d) => write!(f, "PM100 {} ug/m3", d.pm100),
            ObsData::HPMA115S0(d) => write!(f, "PM2.5 {}, PM10 {} ug/m3", d.pm25, d.pm10),
            ObsData::HPMA115C0(d) => write!(
                f,
                "PM1 {}, PM2.5 {}, PM4 {}, PM10 {} ug/m3",
                d.pm01, d.pm25, d.pm04, d.pm10
            ),
            ObsData::SPS30(d) => write!(
                f,
                "PM1 {:.1}, PM2.5 {:.1}, PM4 {:.1}, PM10 {:.1} ug/m3",
                d.pm01, d.pm25, d.pm04, d.pm10
            ),
        }
    }
}

/// Reads consecutive fields, reporting a short payload as a length error.
struct Fields<'a> {
    payload: &'a [u8],
    offset: usize,
    endian: Endian,
}

impl<'a> Fields<'a> {
    fn new(payload: &'a [u8], endian: Endian) -> Self {
        Self {
            payload,
            offset: 0,
            endian,
        }
    }

    fn short(&self, size: usize) -> SensorError {
        SensorError::WrongLength {
            expected: self.offset + size,
            got: self.payload.len(),
        }
    }

    fn u16(&mut self) -> Result<u16, SensorError> {
        self.payload
            .gread_with::<u16>(&mut self.offset, self.endian)
            .map_err(|_| self.short(2))
    }

    fn f32(&mut self) -> Result<f32, SensorError> {
        self.payload
            .gread_with::<f32>(&mut self.offset, self.endian)
            .map_err(|_| self.short(4))
    }
}

fn all_zero(payload: &[u8]) -> bool {
    payload.iter().all(|b| *b == 0)
}

/// Plantower PMS1003/5003/7003/A003
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PmsX003Data {
    /// Concentration under standard particle (CF=1), ug/m3
    pub raw01: u16,
    pub raw25: u16,
    pub raw10: u16,
    /// Concentration under atmospheric environment, ug/m3
    pub pm01: u16,
    pub pm25: u16,
    pub pm10: u16,
    /// Particles beyond a diameter in 0.1 l of air
    pub n0_3: u16,
    pub n0_5: u16,
    pub n1_0: u16,
    pub n2_5: u16,
    pub n5_0: u16,
    pub n10_0: u16,
}

impl PmsX003Data {
    pub fn from_payload(payload: &[u8]) -> Result<ObsData, SensorError> {
        if all_zero(payload) {
            return Err(SensorError::WarmingUp("PMSx003 answered an empty frame"));
        }

        let mut fields = Fields::new(payload, BE);
        Ok(ObsData::PMSx003(Self {
            raw01: fields.u16()?,
            raw25: fields.u16()?,
            raw10: fields.u16()?,
            pm01: fields.u16()?,
            pm25: fields.u16()?,
            pm10: fields.u16()?,
            n0_3: fields.u16()?,
            n0_5: fields.u16()?,
            n1_0: fields.u16()?,
            n2_5: fields.u16()?,
            n5_0: fields.u16()?,
            n10_0: fields.u16()?,
        }))
    }
}

/// Plantower PMS3003
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Pms3003Data {
    pub raw01: u16,
    pub raw25: u16,
    pub raw10: u16,
    pub pm01: u16,
    pub pm25: u16,
    pub pm10: u16,
}

impl Pms3003Data {
    pub fn from_payload(payload: &[u8]) -> Result<ObsData, SensorError> {
        if all_zero(payload) {
            return Err(SensorError::WarmingUp("PMS3003 answered an empty frame"));
        }

        let mut fields = Fields::new(payload, BE);
        Ok(ObsData::PMS3003(Self {
            raw01: fields.u16()?,
            raw25: fields.u16()?,
            raw10: fields.u16()?,
            pm01: fields.u16()?,
            pm25: fields.u16()?,
            pm10: fields.u16()?,
        }))
    }
}

/// Nova Fitness SDS011/018/021, reported in 0.1 ug/m3 steps
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Sds01xData {
    pub pm25: f32,
    pub pm10: f32,
}

impl Sds01xData {
    pub fn from_payload(payload: &[u8]) -> Result<ObsData, SensorError> {
        let mut fields = Fields::new(payload, LE);
        Ok(ObsData::SDS01x(Self {
            pm25: fields.u16()? as f32 / 10.0,
            pm10: fields.u16()? as f32 / 10.0,
        }))
    }
}

/// Nova Fitness SDS198
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Sds198Data {
    pub pm100: u16,
}

impl Sds198Data {
    pub fn from_payload(payload: &[u8]) -> Result<ObsData, SensorError> {
        let mut fields = Fields::new(payload, LE);
        fields.offset = 2;
        Ok(ObsData::SDS198(Self {
            pm100: fields.u16()?,
        }))
    }
}

/// Honeywell HPMA115S0
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Hpma115S0Data {
    pub pm25: u16,
    pub pm10: u16,
}

impl Hpma115S0Data {
    pub fn from_payload(payload: &[u8]) -> Result<ObsData, SensorError> {
        let mut fields = Fields::new(payload, BE);
        Ok(ObsData::HPMA115S0(Self {
            pm25: fields.u16()?,
            pm10: fields.u16()?,
        }))
    }
}

/// Honeywell HPMA115C0
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Hpma115C0Data {
    pub pm01: u16,
    pub pm25: u16,
    pub pm04: u16,
    pub pm10: u16,
}

impl Hpma115C0Data {
    pub fn from_payload(payload: &[u8]) -> Result<ObsData, SensorError> {
        let mut fields = Fields::new(payload, BE);
        Ok(ObsData::HPMA115C0(Self {
            pm01: fields.u16()?,
            pm25: fields.u16()?,
            pm04: fields.u16()?,
            pm10: fields.u16()?,
        }))
    }
}

/// Sensirion SPS30
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Sps30Data {
    /// Mass concentration, ug/m3
    pub pm01: f32,
    pub pm25: f32,
    pub pm04: f32,
    pub pm10: f32,
    /// Number concentration, particles/cm3
    pub n0_5: f32,
    pub n1_0: f32,
    pub n2_5: f32,
    pub n4_0: f32,
    pub n10_0: f32,
    /// Typical particle size, um
    pub diam: f32,
}

impl Sps30Data {
    pub fn from_payload(payload: &[u8]) -> Result<ObsData, SensorError> {
        if all_zero(payload) {
            return Err(SensorError::WarmingUp("SPS30 has no measurement yet"));
        }

        let mut fields = Fields::new(payload, BE);
        Ok(ObsData::SPS30(Self {
            pm01: fields.f32()?,
            pm25: fields.f32()?,
            pm04: fields.f32()?,
            pm10: fields.f32()?,
            n0_5: fields.f32()?,
            n1_0: fields.f32()?,
            n2_5: fields.f32()?,
            n4_0: fields.f32()?,
            n10_0: fields.f32()?,
            diam: fields.f32()?,
        }))
    }
}
