/// Meters per second
#[derive(Copy, Clone, Default, Debug, PartialEq)]
pub struct Ms;
