pub mod compass;
pub mod lpf;

pub const FULL_CIRCLE: f32 = 360.0;

/// Maps any finite angle into [0, 360)
pub fn normalize(degrees: f32) -> f32 {
    let mut normalized = degrees % FULL_CIRCLE;
    if normalized < 0.0 {
        normalized += FULL_CIRCLE;
    }
    // -1e-6 + 360.0 rounds to 360.0 in f32, -0.0 % 360.0 stays negative zero
    if normalized >= FULL_CIRCLE || normalized == 0.0 {
        normalized = 0.0;
    }
    normalized
}

/// Shortest signed rotation from `from` to `to`, crossing north when shorter
pub fn wrapped_delta(from: f32, to: f32) -> f32 {
    let delta = to - from;
    if delta > FULL_CIRCLE / 2.0 {
        delta - FULL_CIRCLE
    } else if delta < -FULL_CIRCLE / 2.0 {
        delta + FULL_CIRCLE
    } else {
        delta
    }
}

/// Whole degrees for display, 359.5 and above wraps to 0
pub fn round_degrees(degrees: f32) -> u16 {
    let rounded = libm::roundf(normalize(degrees)) as u16;
    if rounded >= FULL_CIRCLE as u16 {
        0
    } else {
        rounded
    }
}

mod test {
    #[test]
    fn test_normalize() {
        use super::normalize;

        assert_eq!(normalize(0.0), 0.0);
        assert_eq!(normalize(360.0), 0.0);
        assert_eq!(normalize(450.0), 90.0);
        assert_eq!(normalize(-90.0), 270.0);
        assert_eq!(normalize(-720.0), 0.0);
        assert_eq!(normalize(-1e-6), 0.0);
    }

    #[test]
    fn test_wrapped_delta() {
        use super::wrapped_delta;

        assert_eq!(wrapped_delta(350.0, 10.0), 20.0);
        assert_eq!(wrapped_delta(10.0, 350.0), -20.0);
        assert_eq!(wrapped_delta(90.0, 135.0), 45.0);
        assert_eq!(wrapped_delta(0.0, 180.0), 180.0);
    }

    #[test]
    fn test_round_degrees() {
        use super::round_degrees;

        assert_eq!(round_degrees(44.6), 45);
        assert_eq!(round_degrees(359.4), 359);
        assert_eq!(round_degrees(359.6), 0);
    }
}
