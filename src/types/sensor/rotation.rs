use core::{fmt, str::FromStr};

#[derive(Copy, Clone, Debug, PartialEq)]
#[repr(u8)]
pub enum Rotation {
    NoRotation,
    Degree90,
    Degree180,
    Degree270,
}

impl Rotation {
    pub fn degrees(self) -> f32 {
        match self {
            Self::NoRotation => 0.0,
            Self::Degree90 => 90.0,
            Self::Degree180 => 180.0,
            Self::Degree270 => 270.0,
        }
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::NoRotation
    }
}

impl FromStr for Rotation {
    type Err = ();

    fn from_str(name: &str) -> Result<Rotation, ()> {
        match name {
            "0" => Ok(Rotation::NoRotation),
            "90" => Ok(Rotation::Degree90),
            "180" => Ok(Rotation::Degree180),
            "270" => Ok(Rotation::Degree270),
            _ => Err(()),
        }
    }
}

impl serde::Serialize for Rotation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let s = match self {
            Self::NoRotation => "0",
            Self::Degree90 => "90",
            Self::Degree180 => "180",
            Self::Degree270 => "270",
        };
        serializer.serialize_str(s)
    }
}

impl<'d> serde::Deserialize<'d> for Rotation {
    fn deserialize<D: serde::Deserializer<'d>>(deserializer: D) -> Result<Self, D::Error> {
        struct RotationVisitor;

        impl<'de> serde::de::Visitor<'de> for RotationVisitor {
            type Value = Rotation;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("one of 0, 90, 180 or 270")
            }

            fn visit_str<E: serde::de::Error>(self, value: &str) -> Result<Rotation, E> {
                value.parse().map_err(|_| E::custom("Invalid rotation"))
            }

            fn visit_u64<E: serde::de::Error>(self, value: u64) -> Result<Rotation, E> {
                match value {
                    0 => Ok(Rotation::NoRotation),
                    90 => Ok(Rotation::Degree90),
                    180 => Ok(Rotation::Degree180),
                    270 => Ok(Rotation::Degree270),
                    _ => Err(E::custom("Invalid rotation")),
                }
            }

            fn visit_i64<E: serde::de::Error>(self, value: i64) -> Result<Rotation, E> {
                match u64::try_from(value) {
                    Ok(value) => self.visit_u64(value),
                    Err(_) => Err(E::custom("Invalid rotation")),
                }
            }
        }

        deserializer.deserialize_any(RotationVisitor)
    }
}

mod test {
    #[test]
    fn test_deserialize_rotation() {
        use super::Rotation;

        let rotation: Rotation = serde_json::from_str("90").unwrap();
        assert_eq!(rotation, Rotation::Degree90);
        let rotation: Rotation = serde_json::from_str("\"270\"").unwrap();
        assert_eq!(rotation, Rotation::Degree270);
        assert!(serde_json::from_str::<Rotation>("45").is_err());
    }
}
