pub mod unit;
pub mod vector;

pub type Velocity<T, U> = vector::Vector<T, U>;

/// Degrees clockwise from north
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Course(pub f32);

impl Course {
    pub fn is_valid(&self) -> bool {
        self.0.is_finite()
    }
}

mod test {
    #[test]
    fn test_velocity_compare() {
        use super::{unit::Ms, Velocity};

        assert!(Velocity::new(2.0, Ms) > Velocity::new(1.4, Ms));
        assert!(!(Velocity::new(f32::NAN, Ms) > Velocity::new(1.4, Ms)));
    }
}
