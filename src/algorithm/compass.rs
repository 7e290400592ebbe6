use crate::types::sensor::{Magnetism, Rotation};

use super::normalize;

/// Heading from the horizontal field components, `offset` compensates
/// platform axis conventions
pub fn magnetic_heading(magnetism: &Magnetism, offset: Rotation) -> f32 {
    let angle = libm::atan2f(magnetism.y(), magnetism.x()).to_degrees();
    normalize(normalize(angle) + offset.degrees())
}

mod test {
    #[test]
    fn test_magnetic_heading_range() {
        use super::magnetic_heading;
        use crate::types::sensor::{Magnetism, Rotation};

        let values = [-1000.0, -1.0, -1e-7, 0.0, 1e-7, 0.5, 1.0, 1000.0];
        for &x in values.iter() {
            for &y in values.iter() {
                for rotation in [Rotation::NoRotation, Rotation::Degree90, Rotation::Degree270] {
                    let heading = magnetic_heading(&Magnetism::new(x, y, 0.0), rotation);
                    assert!(0.0 <= heading && heading < 360.0, "{} {} -> {}", x, y, heading);
                }
            }
        }
    }

    #[test]
    fn test_magnetic_heading() {
        use super::magnetic_heading;
        use crate::types::sensor::{Magnetism, Rotation};

        let heading = |x, y, r| magnetic_heading(&Magnetism::new(x, y, 42.0), r);
        assert!((heading(1.0, 0.0, Rotation::NoRotation) - 0.0).abs() < 1e-4);
        assert!((heading(0.0, 1.0, Rotation::NoRotation) - 90.0).abs() < 1e-4);
        assert!((heading(0.0, -1.0, Rotation::NoRotation) - 270.0).abs() < 1e-4);
        assert!((heading(0.0, -1.0, Rotation::Degree90) - 0.0).abs() < 1e-4);
        assert!((heading(-1.0, 0.0, Rotation::Degree90) - 270.0).abs() < 1e-4);
    }
}
