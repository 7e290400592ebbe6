mod rotation;

pub use rotation::Rotation;

use nalgebra::Vector3;

/// Raw magnetometer field vector, units are whatever the platform reports
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Magnetism(pub Vector3<f32>);

impl Magnetism {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self(Vector3::new(x, y, z))
    }

    pub fn x(&self) -> f32 {
        self.0[0]
    }

    pub fn y(&self) -> f32 {
        self.0[1]
    }

    pub fn is_valid(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

impl Default for Magnetism {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

impl From<[f32; 3]> for Magnetism {
    fn from(axes: [f32; 3]) -> Self {
        Self(axes.into())
    }
}

impl Into<[f32; 3]> for Magnetism {
    fn into(self) -> [f32; 3] {
        self.0.into()
    }
}

impl serde::Serialize for Magnetism {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let axes: [f32; 3] = (*self).into();
        axes.serialize(serializer)
    }
}

impl<'d> serde::Deserialize<'d> for Magnetism {
    fn deserialize<D: serde::Deserializer<'d>>(deserializer: D) -> Result<Self, D::Error> {
        let axes = <[f32; 3]>::deserialize(deserializer)?;
        Ok(axes.into())
    }
}

mod test {
    #[test]
    fn test_magnetism_validity() {
        use super::Magnetism;

        assert!(Magnetism::new(20.0, -3.5, 41.0).is_valid());
        assert!(!Magnetism::new(f32::NAN, 0.0, 0.0).is_valid());
        assert!(!Magnetism::new(0.0, f32::INFINITY, 0.0).is_valid());
    }

    #[test]
    fn test_serialize_magnetism() {
        use serde_json::json;

        use super::Magnetism;

        let magnetism = Magnetism::new(1.0, 2.0, 3.0);
        assert_eq!(json!([1.0, 2.0, 3.0]), serde_json::to_value(&magnetism).unwrap());
    }
}
