use serde::ser::SerializeStruct;

use crate::algorithm::round_degrees;

use super::{source::Source, Error};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Estimate {
    /// Degrees in [0, 360), full precision
    pub heading: f32,
    pub source: Source,
    pub has_compass: bool,
    pub error: Option<Error>,
}

impl Estimate {
    pub fn rounded(&self) -> u16 {
        round_degrees(self.heading)
    }

    /// Directional UI should be hidden when false
    pub fn is_directional(&self) -> bool {
        self.source != Source::None
    }
}

impl Default for Estimate {
    fn default() -> Self {
        Self { heading: 0.0, source: Source::None, has_compass: false, error: None }
    }
}

impl serde::Serialize for Estimate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut struct_ = serializer.serialize_struct("Estimate", 4)?;
        struct_.serialize_field("heading", &self.rounded())?;
        struct_.serialize_field("source", &self.source)?;
        struct_.serialize_field("has-compass", &self.has_compass)?;
        struct_.serialize_field("error", &self.error)?;
        struct_.end()
    }
}

mod test {
    #[test]
    fn test_serialize() {
        use serde_json::json;

        use super::{Error, Estimate, Source};

        let expected = json!({"heading": 0, "source": "none", "has-compass": false, "error": null});
        assert_eq!(expected, serde_json::to_value(&Estimate::default()).unwrap());

        let estimate = Estimate {
            heading: 359.7,
            source: Source::GPS,
            has_compass: false,
            error: Some(Error::CapabilityUnavailable),
        };
        let expected = json!({
            "heading": 0,
            "source": "gps",
            "has-compass": false,
            "error": "capability-unavailable"
        });
        assert_eq!(expected, serde_json::to_value(&estimate).unwrap());
    }
}
