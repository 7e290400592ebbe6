pub mod gnss;
pub mod measurement;
pub mod sensor;
