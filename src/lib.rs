#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;
extern crate hal;
extern crate libm;
#[macro_use]
extern crate log;
extern crate nalgebra;
extern crate nb;
#[macro_use]
extern crate serde;
extern crate spin;

pub mod algorithm;
pub mod config;
pub mod heading;
pub mod types;

pub use heading::{out::Estimate, source::Source, Error, HeadingEstimator};

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;
