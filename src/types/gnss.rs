use super::measurement::{unit, Course, Velocity};

/// Externally owned location fix, either field may be missing
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GNSS {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<Course>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground_speed: Option<Velocity<f32, unit::Ms>>,
}

impl GNSS {
    pub fn new(course: Option<f32>, ground_speed: Option<f32>) -> Self {
        Self {
            course: course.map(Course),
            ground_speed: ground_speed.map(|speed| Velocity::new(speed, unit::Ms)),
        }
    }
}

mod test {
    #[test]
    fn test_deserialize_gnss() {
        use super::GNSS;

        let gnss: GNSS = serde_json::from_str(r#"{"course": 90.0, "ground-speed": 2.5}"#).unwrap();
        assert_eq!(gnss, GNSS::new(Some(90.0), Some(2.5)));

        let gnss: GNSS = serde_json::from_str("{}").unwrap();
        assert_eq!(gnss, GNSS::default());
    }
}
