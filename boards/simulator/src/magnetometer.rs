use std::sync::{Arc, Mutex};

use fugit::MillisDurationU32;
use hal::{Callback, Magnetometer, SubscriptionId};

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Probe {
    Pending,
    Answer(bool),
    Fail,
}

struct Inner {
    probe: Probe,
    interval: Option<MillisDurationU32>,
    live: Vec<(SubscriptionId, Callback)>,
    released: Vec<(SubscriptionId, Callback)>,
    sticky: bool,
    next_id: usize,
}

/// Software magnetometer fed from recorded samples, clones share one device
#[derive(Clone)]
pub struct ReplayMagnetometer(Arc<Mutex<Inner>>);

impl ReplayMagnetometer {
    /// A sticky device keeps delivering to released callbacks
    pub fn new(sticky: bool) -> Self {
        let inner = Inner {
            probe: Probe::Pending,
            interval: None,
            live: Vec::new(),
            released: Vec::new(),
            sticky,
            next_id: 0,
        };
        Self(Arc::new(Mutex::new(inner)))
    }

    pub fn resolve(&self, probe: Probe) {
        if let Ok(mut inner) = self.0.lock() {
            inner.probe = probe
        }
    }

    pub fn emit(&self, axes: [f32; 3]) {
        let mut inner = match self.0.lock() {
            Ok(inner) => inner,
            Err(_) => return,
        };
        let inner = &mut *inner;
        for (_, callback) in inner.live.iter_mut() {
            callback(axes)
        }
        if inner.sticky {
            for (_, callback) in inner.released.iter_mut() {
                callback(axes)
            }
        }
    }

    pub fn subscribers(&self) -> usize {
        self.0.lock().map(|inner| inner.live.len()).unwrap_or(0)
    }

    pub fn interval(&self) -> Option<MillisDurationU32> {
        self.0.lock().ok().and_then(|inner| inner.interval)
    }
}

impl Magnetometer for ReplayMagnetometer {
    type Error = &'static str;

    fn poll_available(&mut self) -> nb::Result<bool, &'static str> {
        let probe = self.0.lock().map_err(|_| nb::Error::Other("Poisoned"))?.probe;
        match probe {
            Probe::Pending => Err(nb::Error::WouldBlock),
            Probe::Answer(available) => Ok(available),
            Probe::Fail => Err(nb::Error::Other("Probe failed")),
        }
    }

    fn set_update_interval(&mut self, interval: MillisDurationU32) {
        if let Ok(mut inner) = self.0.lock() {
            inner.interval = Some(interval)
        }
    }

    fn subscribe(&mut self, callback: Callback) -> SubscriptionId {
        let mut inner = match self.0.lock() {
            Ok(inner) => inner,
            Err(poisoned) => poisoned.into_inner(),
        };
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.live.push((id, callback));
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        let mut inner = match self.0.lock() {
            Ok(inner) => inner,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(index) = inner.live.iter().position(|(live, _)| *live == id) {
            let entry = inner.live.remove(index);
            inner.released.push(entry);
        }
    }
}
