use crate::{
    algorithm::normalize,
    types::{
        gnss::GNSS,
        measurement::{unit::Ms, Velocity},
    },
};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Compass,
    GPS,
    None,
}

/// Everything source arbitration depends on, nothing else is consulted
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Inputs {
    pub smoothed: Option<f32>,
    pub has_compass: bool,
    pub enabled: bool,
    pub gnss: GNSS,
    pub speed_threshold: Velocity<f32, Ms>,
}

pub fn arbitrate(inputs: &Inputs) -> (f32, Source) {
    let course = inputs.gnss.course.filter(|c| c.is_valid()).map(|c| normalize(c.0));
    let moving = match inputs.gnss.ground_speed {
        Some(speed) => speed > inputs.speed_threshold,
        None => false,
    };
    match course {
        Some(course) if moving => return (course, Source::GPS),
        _ => (),
    }
    if inputs.has_compass && inputs.enabled {
        let heading = inputs.smoothed.map(normalize).unwrap_or(0.0);
        return (heading, Source::Compass);
    }
    match course {
        Some(course) => (course, Source::GPS),
        None => (0.0, Source::None),
    }
}

mod test {
    #[cfg(test)]
    fn inputs(
        smoothed: Option<f32>,
        compass: bool,
        course: Option<f32>,
        speed: Option<f32>,
    ) -> super::Inputs {
        use crate::types::{
            gnss::GNSS,
            measurement::{unit::Ms, Velocity},
        };

        super::Inputs {
            smoothed,
            has_compass: compass,
            enabled: compass,
            gnss: GNSS::new(course, speed),
            speed_threshold: Velocity::new(1.4, Ms),
        }
    }

    #[test]
    fn test_gps_preferred_when_moving() {
        use super::{arbitrate, Source};

        let result = arbitrate(&inputs(Some(45.0), true, Some(90.0), Some(2.0)));
        assert_eq!(result, (90.0, Source::GPS));
    }

    #[test]
    fn test_compass_preferred_at_rest() {
        use super::{arbitrate, Source};

        let result = arbitrate(&inputs(Some(45.0), true, Some(90.0), Some(0.0)));
        assert_eq!(result, (45.0, Source::Compass));
        let result = arbitrate(&inputs(Some(45.0), true, Some(90.0), Some(1.4)));
        assert_eq!(result, (45.0, Source::Compass));
        let result = arbitrate(&inputs(Some(45.0), true, Some(90.0), None));
        assert_eq!(result, (45.0, Source::Compass));
    }

    #[test]
    fn test_compass_before_first_sample() {
        use super::{arbitrate, Source};

        let result = arbitrate(&inputs(None, true, None, None));
        assert_eq!(result, (0.0, Source::Compass));
    }

    #[test]
    fn test_moving_without_course() {
        use super::{arbitrate, Source};

        let result = arbitrate(&inputs(Some(45.0), true, None, Some(5.0)));
        assert_eq!(result, (45.0, Source::Compass));
        let result = arbitrate(&inputs(None, false, None, Some(5.0)));
        assert_eq!(result, (0.0, Source::None));
    }

    #[test]
    fn test_gps_fallback_without_compass() {
        use super::{arbitrate, Source};

        let result = arbitrate(&inputs(Some(45.0), false, Some(120.0), Some(0.0)));
        assert_eq!(result, (120.0, Source::GPS));

        let mut disabled = inputs(Some(45.0), true, Some(-30.0), None);
        disabled.enabled = false;
        assert_eq!(arbitrate(&disabled), (330.0, Source::GPS));
    }

    #[test]
    fn test_no_heading() {
        use super::{arbitrate, Source};

        assert_eq!(arbitrate(&inputs(None, false, None, None)), (0.0, Source::None));
        let result = arbitrate(&inputs(None, false, Some(f32::NAN), Some(3.0)));
        assert_eq!(result, (0.0, Source::None));
    }
}
