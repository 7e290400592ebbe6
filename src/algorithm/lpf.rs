use super::{normalize, wrapped_delta};

pub const DEFAULT_ALPHA: f32 = 0.15;

/// Exponential smoothing over a circular quantity in degrees
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AngleLPF {
    alpha: f32,
}

impl Default for AngleLPF {
    fn default() -> Self {
        Self { alpha: DEFAULT_ALPHA }
    }
}

impl AngleLPF {
    pub fn new(alpha: f32) -> Self {
        if !alpha.is_finite() {
            return Self::default();
        }
        Self { alpha: alpha.max(0.0).min(1.0) }
    }

    /// Without previous value the filter starts from the sample itself
    pub fn update(&self, sample: f32, prev: Option<f32>) -> f32 {
        let sample = normalize(sample);
        match prev {
            Some(prev) => normalize(prev + self.alpha * wrapped_delta(prev, sample)),
            None => sample,
        }
    }
}

mod test {
    #[test]
    fn test_lpf_wrap_around() {
        use super::AngleLPF;

        let lpf = AngleLPF::default();
        let value = lpf.update(10.0, Some(350.0));
        assert!((value - 353.0).abs() < 1e-3);

        let value = lpf.update(350.0, Some(10.0));
        assert!((value - 7.0).abs() < 1e-3);

        let value = lpf.update(358.0, Some(1.0));
        assert!((value - 0.55).abs() < 1e-3);
    }

    #[test]
    fn test_lpf_converge() {
        use super::AngleLPF;

        let lpf = AngleLPF::default();
        let mut value = lpf.update(90.0, None);
        assert_eq!(value, 90.0);
        let value0 = lpf.update(120.0, Some(value));
        assert!(90.0 < value0 && value0 < 120.0);
        value = value0;
        for _ in 0..100 {
            value = lpf.update(120.0, Some(value));
        }
        assert!((value - 120.0).abs() < 0.01);
    }

    #[test]
    fn test_lpf_alpha() {
        use super::AngleLPF;

        assert_eq!(AngleLPF::new(1.5).update(200.0, Some(10.0)), 200.0);
        assert_eq!(AngleLPF::new(-0.5).update(200.0, Some(10.0)), 10.0);
        assert_eq!(AngleLPF::new(f32::NAN), AngleLPF::default());
        let value = AngleLPF::new(f32::NAN).update(10.0, Some(350.0));
        assert!((value - 353.0).abs() < 1e-3);
    }
}
