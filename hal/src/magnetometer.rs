use alloc::boxed::Box;

use fugit::MillisDurationU32;

/// Raw x, y, z field strength, axis convention is up to the platform
pub type Callback = Box<dyn FnMut([f32; 3]) + Send>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub usize);

pub trait Magnetometer {
    type Error: core::fmt::Debug;

    /// Non-blocking capability probe, `WouldBlock` until the platform answers
    fn poll_available(&mut self) -> nb::Result<bool, Self::Error>;
    fn set_update_interval(&mut self, interval: MillisDurationU32);
    fn subscribe(&mut self, callback: Callback) -> SubscriptionId;
    fn unsubscribe(&mut self, id: SubscriptionId);
}
