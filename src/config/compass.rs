use crate::{algorithm::lpf::DEFAULT_ALPHA, types::sensor::Rotation};

use super::{
    pathset::{Error, Path, PathSet, Value},
    Platform,
};

pub const DEFAULT_SAMPLE_INTERVAL: u32 = 100;
/// Roughly 5 km/h, below that GNSS course is mostly noise
pub const DEFAULT_SPEED_THRESHOLD: f32 = 1.4;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisOffset {
    pub android: Rotation,
    pub ios: Rotation,
}

impl Default for AxisOffset {
    fn default() -> Self {
        Self { android: Rotation::NoRotation, ios: Rotation::Degree90 }
    }
}

impl AxisOffset {
    pub fn of(&self, platform: Platform) -> Rotation {
        match platform {
            Platform::Android => self.android,
            Platform::IOS => self.ios,
        }
    }
}

impl PathSet for AxisOffset {
    fn set(&mut self, mut path: Path, value: Value) -> Result<(), Error> {
        let default = Self::default();
        match path.str()? {
            "android" => self.android = value.parse_or(default.android)?,
            "ios" => self.ios = value.parse_or(default.ios)?,
            _ => return Err(Error::UnknownPath),
        }
        path.end()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Compass {
    pub enabled: bool,
    /// Milliseconds between magnetometer samples
    pub sample_interval: u32,
    pub smoothing: f32,
    /// Meters per second
    pub speed_threshold: f32,
    pub axis_offset: AxisOffset,
}

impl Default for Compass {
    fn default() -> Self {
        Self {
            enabled: true,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            smoothing: DEFAULT_ALPHA,
            speed_threshold: DEFAULT_SPEED_THRESHOLD,
            axis_offset: AxisOffset::default(),
        }
    }
}

fn valid_interval(interval: u32) -> bool {
    interval > 0
}

fn valid_smoothing(alpha: f32) -> bool {
    (0.0..=1.0).contains(&alpha)
}

fn valid_speed_threshold(speed: f32) -> bool {
    speed >= 0.0
}

impl Compass {
    /// Checks values that bypassed `PathSet`, e.g. deserialized from a file
    pub fn validate(&self) -> Result<(), Error> {
        let valid = valid_interval(self.sample_interval)
            && valid_smoothing(self.smoothing)
            && valid_speed_threshold(self.speed_threshold);
        if valid {
            Ok(())
        } else {
            Err(Error::InvalidValue)
        }
    }
}

impl PathSet for Compass {
    fn set(&mut self, mut path: Path, value: Value) -> Result<(), Error> {
        match path.str()? {
            "enabled" => self.enabled = value.parse_or(true)?,
            "sample-interval" => match value.parse_or(DEFAULT_SAMPLE_INTERVAL)? {
                interval if valid_interval(interval) => self.sample_interval = interval,
                _ => return Err(Error::InvalidValue),
            },
            "smoothing" => match value.parse_or(DEFAULT_ALPHA)? {
                alpha if valid_smoothing(alpha) => self.smoothing = alpha,
                _ => return Err(Error::InvalidValue),
            },
            "speed-threshold" => match value.parse_or(DEFAULT_SPEED_THRESHOLD)? {
                speed if valid_speed_threshold(speed) => self.speed_threshold = speed,
                _ => return Err(Error::InvalidValue),
            },
            "axis-offset" => return self.axis_offset.set(path, value),
            _ => return Err(Error::UnknownPath),
        }
        path.end()
    }
}
