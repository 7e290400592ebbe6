pub mod compass;
pub mod pathset;

use core::str::FromStr;

pub use compass::{AxisOffset, Compass};
use pathset::{Error, Path, PathSet, Value};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    Android,
    #[serde(rename = "ios")]
    IOS,
}

impl Default for Platform {
    fn default() -> Self {
        Self::Android
    }
}

impl FromStr for Platform {
    type Err = ();

    fn from_str(string: &str) -> Result<Self, ()> {
        match string {
            "android" => Ok(Self::Android),
            "ios" => Ok(Self::IOS),
            _ => Err(()),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub platform: Platform,
    pub compass: Compass,
}

impl PathSet for Config {
    fn set(&mut self, mut path: Path, value: Value) -> Result<(), Error> {
        match path.str()? {
            "platform" => {
                self.platform = value.parse_or(Platform::default())?;
                path.end()
            }
            "compass" => self.compass.set(path, value),
            _ => Err(Error::UnknownPath),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), Error> {
        self.compass.validate()
    }

    /// Applies a single `path=value` or `path=` line
    pub fn apply(&mut self, line: &str) -> Result<(), Error> {
        let mut splitted = line.splitn(2, '=');
        let path = splitted.next().map(str::trim).ok_or(Error::UnknownPath)?;
        let value = match splitted.next().map(str::trim) {
            Some("") => Value(None),
            Some(value) => Value::of(value),
            None => return Err(Error::ExpectValue),
        };
        self.set(Path::new(path), value)
    }
}

mod test {
    #[test]
    fn test_deserialize_config() {
        use super::{Config, Platform};
        use crate::types::sensor::Rotation;

        let json = r#"{
            "platform": "ios",
            "compass": {
                "enabled": false,
                "sample-interval": 50,
                "speed-threshold": 2.0,
                "axis-offset": {"ios": 270}
            }
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.platform, Platform::IOS);
        assert_eq!(config.compass.enabled, false);
        assert_eq!(config.compass.sample_interval, 50);
        assert_eq!(config.compass.smoothing, 0.15);
        assert_eq!(config.compass.speed_threshold, 2.0);
        assert_eq!(config.compass.axis_offset.android, Rotation::NoRotation);
        assert_eq!(config.compass.axis_offset.of(Platform::IOS), Rotation::Degree270);

        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_serialize_config() {
        use serde_json::json;

        use super::Config;

        let expected = json!({
            "platform": "android",
            "compass": {
                "enabled": true,
                "sample-interval": 100,
                "smoothing": 0.15f32,
                "speed-threshold": 1.4f32,
                "axis-offset": {"android": "0", "ios": "90"}
            }
        });
        assert_eq!(expected, serde_json::to_value(&Config::default()).unwrap());
    }

    #[test]
    fn test_apply() {
        use super::{pathset::Error, Config, Platform};
        use crate::types::sensor::Rotation;

        let mut config = Config::default();
        config.apply("compass.speed-threshold = 2.5").unwrap();
        assert_eq!(config.compass.speed_threshold, 2.5);
        config.apply("compass.speed-threshold=").unwrap();
        assert_eq!(config.compass.speed_threshold, 1.4);
        config.apply("compass.axis-offset.android=180").unwrap();
        assert_eq!(config.compass.axis_offset.android, Rotation::Degree180);
        config.apply("platform=ios").unwrap();
        assert_eq!(config.platform, Platform::IOS);
        config.apply("compass.enabled=false").unwrap();
        assert_eq!(config.compass.enabled, false);

        assert_eq!(config.apply("compass.smoothing=2"), Err(Error::InvalidValue));
        assert_eq!(config.apply("compass.sample-interval=0"), Err(Error::InvalidValue));
        assert_eq!(config.apply("compass.axis-offset.android=45"), Err(Error::InvalidValue));
        assert_eq!(config.apply("compass.unknown=1"), Err(Error::UnknownPath));
        assert_eq!(config.apply("compass.enabled.extra=true"), Err(Error::UnknownPath));
        assert_eq!(config.apply("compass.enabled"), Err(Error::ExpectValue));
    }

    #[test]
    fn test_validate() {
        use super::{pathset::Error, Config};

        assert_eq!(Config::default().validate(), Ok(()));

        let json = r#"{
            "compass": {"sample-interval": 0, "speed-threshold": -1.0, "smoothing": 7.0}
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.validate(), Err(Error::InvalidValue));

        let json = r#"{"compass": {"sample-interval": 0}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.validate(), Err(Error::InvalidValue));
        let config: Config = serde_json::from_str(r#"{"compass": {"smoothing": 1.5}}"#).unwrap();
        assert_eq!(config.validate(), Err(Error::InvalidValue));
        let json = r#"{"compass": {"speed-threshold": -0.5}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.validate(), Err(Error::InvalidValue));

        let json = r#"{
            "compass": {"sample-interval": 1, "smoothing": 1.0, "speed-threshold": 0.0}
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.validate(), Ok(()));
    }
}
