use core::marker;

/// Scalar tagged with a unit marker, see `unit`
#[derive(Copy, Clone, Default, Debug)]
pub struct Vector<T, U> {
    pub raw: T,
    unit: marker::PhantomData<U>,
}

impl<T: Copy + Default, U: Copy> Vector<T, U> {
    pub fn new(value: T, _: U) -> Self {
        Self { raw: value, unit: marker::PhantomData }
    }
}

impl<T: PartialEq, U> PartialEq for Vector<T, U> {
    fn eq(&self, rhs: &Self) -> bool {
        self.raw == rhs.raw
    }
}

impl<T: PartialOrd, U> PartialOrd for Vector<T, U> {
    fn partial_cmp(&self, rhs: &Self) -> Option<core::cmp::Ordering> {
        self.raw.partial_cmp(&rhs.raw)
    }
}

impl<T: serde::Serialize, U> serde::Serialize for Vector<T, U> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'a, T: serde::Deserialize<'a>, U> serde::Deserialize<'a> for Vector<T, U> {
    fn deserialize<D: serde::Deserializer<'a>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self { raw: T::deserialize(deserializer)?, unit: marker::PhantomData })
    }
}
