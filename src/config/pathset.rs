use core::str::{FromStr, Split};

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Error {
    UnknownPath,
    ExpectValue,
    InvalidValue,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let err_string = match self {
            Self::UnknownPath => "Specified path not exists or invalid",
            Self::ExpectValue => "Expect value",
            Self::InvalidValue => "Value not valid",
        };
        write!(f, "{}", err_string)
    }
}

/// Right hand side of `path=value`, `None` resets the entry to its default
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Value<'a>(pub Option<&'a str>);

impl<'a> Value<'a> {
    pub fn of(string: &'a str) -> Value<'a> {
        Value(Some(string))
    }

    pub fn parse_or<T: FromStr>(&self, or: T) -> Result<T, Error> {
        match self.0 {
            Some(s) => FromStr::from_str(s.trim()).map_err(|_| Error::InvalidValue),
            None => Ok(or),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Path<'a>(Split<'a, char>);

impl<'a> Path<'a> {
    pub fn new(path: &'a str) -> Self {
        Self(path.split('.'))
    }

    pub fn str(&mut self) -> Result<&'a str, Error> {
        self.0.next().ok_or(Error::UnknownPath)
    }

    /// Fails when there are unconsumed path segments
    pub fn end(&mut self) -> Result<(), Error> {
        match self.0.next() {
            Some(_) => Err(Error::UnknownPath),
            None => Ok(()),
        }
    }
}

pub trait PathSet {
    fn set(&mut self, path: Path, value: Value) -> Result<(), Error>;
}

mod test {
    #[test]
    fn test_value_parse() {
        use super::{Error, Value};

        assert_eq!(Value::of(" 1.5").parse_or(0.0f32), Ok(1.5));
        assert_eq!(Value::of("abc").parse_or(0.0f32), Err(Error::InvalidValue));
        assert_eq!(Value(None).parse_or(3u32), Ok(3));
    }

    #[test]
    fn test_path() {
        use super::{Error, Path};

        let mut path = Path::new("compass.axis-offset.ios");
        assert_eq!(path.str(), Ok("compass"));
        assert_eq!(path.str(), Ok("axis-offset"));
        assert_eq!(path.end(), Err(Error::UnknownPath));
        assert_eq!(path.str(), Err(Error::UnknownPath));
    }
}
