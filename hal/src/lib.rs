#![no_std]

extern crate alloc;

pub mod magnetometer;

pub use magnetometer::{Callback, Magnetometer, SubscriptionId};
