pub mod out;
pub mod source;

use alloc::{boxed::Box, sync::Arc};

use fugit::MillisDurationU32;
use hal::{Callback, Magnetometer, SubscriptionId};
use spin::Mutex;

use crate::{
    algorithm::{compass::magnetic_heading, lpf::AngleLPF},
    config::Config,
    types::{
        gnss::GNSS,
        measurement::{unit::Ms, Velocity},
        sensor::{Magnetism, Rotation},
    },
};

use out::Estimate;
use source::{arbitrate, Inputs};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Error {
    CapabilityUnavailable,
    CapabilityQueryFailed,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let err_string = match self {
            Self::CapabilityUnavailable => "Magnetometer not available",
            Self::CapabilityQueryFailed => "Magnetometer availability query failed",
        };
        write!(f, "{}", err_string)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Capability {
    Probing,
    Available,
    Unavailable,
}

/// Smoothing state of one subscription, written only from the sensor callback
struct Track {
    active: bool,
    lpf: AngleLPF,
    offset: Rotation,
    smoothed: Option<f32>,
}

impl Track {
    fn update(&mut self, magnetism: Magnetism) {
        if !self.active {
            return;
        }
        if !magnetism.is_valid() {
            trace!("Drop invalid magnetism {:?}", magnetism);
            return;
        }
        let raw = magnetic_heading(&magnetism, self.offset);
        let smoothed = self.lpf.update(raw, self.smoothed);
        trace!("Magnetic heading {} smoothed {}", raw, smoothed);
        self.smoothed = Some(smoothed);
    }
}

struct Subscription {
    id: SubscriptionId,
    track: Arc<Mutex<Track>>,
}

/// Fuses smoothed magnetometer heading with GNSS course.
///
/// The estimator never fails: capability problems are reported through
/// `Estimate::error` and the heading degrades to GNSS course or none.
pub struct HeadingEstimator<M: Magnetometer> {
    magnetometer: M,
    interval: MillisDurationU32,
    lpf: AngleLPF,
    offset: Rotation,
    speed_threshold: Velocity<f32, Ms>,
    enabled: bool,
    /// `compass.enabled` of the last applied config
    configured: bool,
    capability: Capability,
    error: Option<Error>,
    subscription: Option<Subscription>,
}

impl<M: Magnetometer> HeadingEstimator<M> {
    pub fn new(magnetometer: M, config: &Config) -> Self {
        let compass = &config.compass;
        Self {
            magnetometer,
            interval: MillisDurationU32::millis(compass.sample_interval),
            lpf: AngleLPF::new(compass.smoothing),
            offset: compass.axis_offset.of(config.platform),
            speed_threshold: Velocity::new(compass.speed_threshold, Ms),
            enabled: compass.enabled,
            configured: compass.enabled,
            capability: Capability::Probing,
            error: None,
            subscription: None,
        }
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn has_compass(&self) -> bool {
        self.capability == Capability::Available
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn error(&self) -> Option<Error> {
        self.error
    }

    /// Advances the availability probe, never blocks.
    ///
    /// An available magnetometer keeps being polled so a lost sensor releases
    /// the subscription. Unavailable is final.
    pub fn poll(&mut self) {
        if self.capability != Capability::Unavailable {
            match self.magnetometer.poll_available() {
                Ok(true) if self.capability == Capability::Probing => {
                    info!("Magnetometer available");
                    self.capability = Capability::Available;
                }
                Ok(true) | Err(nb::Error::WouldBlock) => (),
                Ok(false) => {
                    warn!("Magnetometer not available, heading from GNSS only");
                    self.capability = Capability::Unavailable;
                    self.error = Some(Error::CapabilityUnavailable);
                }
                Err(nb::Error::Other(e)) => {
                    warn!("Magnetometer probe failed: {:?}", e);
                    self.capability = Capability::Unavailable;
                    self.error = Some(Error::CapabilityQueryFailed);
                }
            }
        }
        self.reconcile();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.reconcile();
    }

    /// Applies a new config, a live subscription is restarted when sampling
    /// parameters changed. `compass.enabled` only overrides `set_enabled`
    /// when it differs from the previously applied config.
    pub fn configure(&mut self, config: &Config) {
        let compass = &config.compass;
        let interval = MillisDurationU32::millis(compass.sample_interval);
        let lpf = AngleLPF::new(compass.smoothing);
        let offset = compass.axis_offset.of(config.platform);
        let resample = interval != self.interval || lpf != self.lpf || offset != self.offset;
        self.interval = interval;
        self.lpf = lpf;
        self.offset = offset;
        self.speed_threshold = Velocity::new(compass.speed_threshold, Ms);
        if compass.enabled != self.configured {
            self.configured = compass.enabled;
            self.enabled = compass.enabled;
        }
        if resample {
            self.release();
        }
        self.reconcile();
    }

    /// Smoothed magnetic heading of the live subscription
    pub fn smoothed(&self) -> Option<f32> {
        self.subscription.as_ref().and_then(|s| s.track.lock().smoothed)
    }

    pub fn estimate(&self, gnss: &GNSS) -> Estimate {
        let inputs = Inputs {
            smoothed: self.smoothed(),
            has_compass: self.has_compass(),
            enabled: self.enabled,
            gnss: *gnss,
            speed_threshold: self.speed_threshold,
        };
        let (heading, source) = arbitrate(&inputs);
        Estimate { heading, source, has_compass: inputs.has_compass, error: self.error }
    }

    fn reconcile(&mut self) {
        let wanted = self.enabled && self.has_compass();
        match (wanted, self.subscription.is_some()) {
            (true, false) => self.subscribe(),
            (false, true) => self.release(),
            _ => (),
        }
    }

    fn subscribe(&mut self) {
        let track = Track { active: true, lpf: self.lpf, offset: self.offset, smoothed: None };
        let track = Arc::new(Mutex::new(track));
        let writer = track.clone();
        let callback: Callback =
            Box::new(move |axes: [f32; 3]| writer.lock().update(Magnetism::from(axes)));
        self.magnetometer.set_update_interval(self.interval);
        let id = self.magnetometer.subscribe(callback);
        debug!("Magnetometer subscribed with interval {}ms", self.interval.ticks());
        self.subscription = Some(Subscription { id, track });
    }

    fn release(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            // Callbacks still in flight observe inactive and leave state untouched
            subscription.track.lock().active = false;
            self.magnetometer.unsubscribe(subscription.id);
            debug!("Magnetometer released");
        }
    }
}

impl<M: Magnetometer> Drop for HeadingEstimator<M> {
    fn drop(&mut self) {
        self.release()
    }
}

#[cfg(test)]
mod mock {
    use std::{
        sync::{Arc, Mutex},
        vec::Vec,
    };

    use fugit::MillisDurationU32;
    use hal::{Callback, Magnetometer, SubscriptionId};

    pub enum Probe {
        Pending,
        Answer(bool),
        Fail,
    }

    pub struct Inner {
        pub probe: Probe,
        pub interval: Option<u32>,
        /// Keeps firing released callbacks like a misbehaving platform
        pub sticky: bool,
        callbacks: Vec<(SubscriptionId, Callback, bool)>,
        next_id: usize,
    }

    #[derive(Clone)]
    pub struct MockMagnetometer(pub Arc<Mutex<Inner>>);

    impl MockMagnetometer {
        pub fn new(probe: Probe) -> Self {
            let inner = Inner {
                probe,
                interval: None,
                sticky: false,
                callbacks: Vec::new(),
                next_id: 0,
            };
            Self(Arc::new(Mutex::new(inner)))
        }

        pub fn emit(&self, axes: [f32; 3]) {
            let mut inner = self.0.lock().unwrap();
            let sticky = inner.sticky;
            for (_, callback, live) in inner.callbacks.iter_mut() {
                if *live || sticky {
                    callback(axes)
                }
            }
        }

        pub fn live(&self) -> usize {
            self.0.lock().unwrap().callbacks.iter().filter(|(_, _, live)| *live).count()
        }
    }

    impl Magnetometer for MockMagnetometer {
        type Error = &'static str;

        fn poll_available(&mut self) -> nb::Result<bool, &'static str> {
            match self.0.lock().unwrap().probe {
                Probe::Pending => Err(nb::Error::WouldBlock),
                Probe::Answer(available) => Ok(available),
                Probe::Fail => Err(nb::Error::Other("sensor service crashed")),
            }
        }

        fn set_update_interval(&mut self, interval: MillisDurationU32) {
            self.0.lock().unwrap().interval = Some(interval.ticks());
        }

        fn subscribe(&mut self, callback: Callback) -> SubscriptionId {
            let mut inner = self.0.lock().unwrap();
            let id = SubscriptionId(inner.next_id);
            inner.next_id += 1;
            inner.callbacks.push((id, callback, true));
            id
        }

        fn unsubscribe(&mut self, id: SubscriptionId) {
            let mut inner = self.0.lock().unwrap();
            for (callback_id, _, live) in inner.callbacks.iter_mut() {
                if *callback_id == id {
                    *live = false;
                }
            }
        }
    }
}

mod test {
    #[cfg(test)]
    use super::{
        mock::{MockMagnetometer, Probe},
        HeadingEstimator,
    };

    #[cfg(test)]
    fn estimator(probe: Probe) -> (HeadingEstimator<MockMagnetometer>, MockMagnetometer) {
        let magnetometer = MockMagnetometer::new(probe);
        let estimator = HeadingEstimator::new(magnetometer.clone(), &Default::default());
        (estimator, magnetometer)
    }

    #[test]
    fn test_read_before_probe_resolved() {
        use super::{source::Source, Capability};
        use crate::types::gnss::GNSS;

        let (mut estimator, magnetometer) = estimator(Probe::Pending);
        estimator.poll();
        assert_eq!(estimator.capability(), Capability::Probing);
        assert_eq!(magnetometer.live(), 0);

        let estimate = estimator.estimate(&GNSS::default());
        assert_eq!((estimate.heading, estimate.source), (0.0, Source::None));
        assert_eq!(estimate.has_compass, false);
        assert_eq!(estimate.error, None);

        let estimate = estimator.estimate(&GNSS::new(Some(135.0), Some(0.5)));
        assert_eq!((estimate.heading, estimate.source), (135.0, Source::GPS));

        magnetometer.0.lock().unwrap().probe = Probe::Answer(true);
        estimator.poll();
        assert_eq!(estimator.capability(), Capability::Available);
        assert_eq!(magnetometer.live(), 1);
    }

    #[test]
    fn test_compass_sampling() {
        use super::source::Source;
        use crate::types::gnss::GNSS;

        let (mut estimator, magnetometer) = estimator(Probe::Answer(true));
        estimator.poll();
        assert!(estimator.is_subscribed());
        assert_eq!(magnetometer.0.lock().unwrap().interval, Some(100));

        let estimate = estimator.estimate(&GNSS::default());
        assert_eq!((estimate.heading, estimate.source), (0.0, Source::Compass));

        magnetometer.emit([0.0, 1.0, 0.0]);
        assert!((estimator.smoothed().unwrap() - 90.0).abs() < 1e-3);
        magnetometer.emit([1.0, 0.0, 0.0]);
        assert!((estimator.smoothed().unwrap() - 76.5).abs() < 1e-3);
        magnetometer.emit([f32::NAN, 0.0, 0.0]);
        assert!((estimator.smoothed().unwrap() - 76.5).abs() < 1e-3);

        let estimate = estimator.estimate(&GNSS::new(Some(200.0), Some(0.0)));
        assert_eq!(estimate.source, Source::Compass);
        assert!(estimate.has_compass);
        assert_eq!(estimate.rounded(), 77);
    }

    #[test]
    fn test_gps_preferred_at_speed() {
        use super::source::Source;
        use crate::types::gnss::GNSS;

        let (mut estimator, magnetometer) = estimator(Probe::Answer(true));
        estimator.poll();
        magnetometer.emit([1.0, 1.0, 0.0]);

        let estimate = estimator.estimate(&GNSS::new(Some(90.0), Some(2.0)));
        assert_eq!((estimate.heading, estimate.source), (90.0, Source::GPS));

        let estimate = estimator.estimate(&GNSS::new(Some(90.0), Some(0.0)));
        assert_eq!(estimate.source, Source::Compass);
        assert!((estimate.heading - 45.0).abs() < 1e-3);
    }

    #[test]
    fn test_capability_unavailable() {
        use super::{source::Source, Capability, Error};
        use crate::types::gnss::GNSS;

        let (mut estimator, magnetometer) = estimator(Probe::Answer(false));
        estimator.poll();
        assert_eq!(estimator.capability(), Capability::Unavailable);
        assert_eq!(magnetometer.live(), 0);

        let estimate = estimator.estimate(&GNSS::default());
        assert_eq!((estimate.heading, estimate.source), (0.0, Source::None));
        assert_eq!(estimate.error, Some(Error::CapabilityUnavailable));
        assert!(!estimate.is_directional());

        let estimate = estimator.estimate(&GNSS::new(Some(10.0), None));
        assert_eq!((estimate.heading, estimate.source), (10.0, Source::GPS));
    }

    #[test]
    fn test_capability_query_failed() {
        use super::{source::Source, Error};
        use crate::types::gnss::GNSS;

        let (mut estimator, magnetometer) = estimator(Probe::Fail);
        estimator.poll();
        assert!(!estimator.has_compass());
        assert_eq!(magnetometer.live(), 0);

        let estimate = estimator.estimate(&GNSS::new(Some(270.0), Some(0.2)));
        assert_eq!((estimate.heading, estimate.source), (270.0, Source::GPS));
        assert_eq!(estimate.error, Some(Error::CapabilityQueryFailed));

        // Capability is not probed again
        magnetometer.0.lock().unwrap().probe = Probe::Answer(true);
        estimator.poll();
        assert!(!estimator.has_compass());
    }

    #[test]
    fn test_no_update_after_disable() {
        use super::source::Source;
        use crate::types::gnss::GNSS;

        let (mut estimator, magnetometer) = estimator(Probe::Answer(true));
        magnetometer.0.lock().unwrap().sticky = true;
        estimator.poll();
        magnetometer.emit([1.0, 0.0, 0.0]);
        assert_eq!(estimator.smoothed(), Some(0.0));

        estimator.set_enabled(false);
        assert_eq!(magnetometer.live(), 0);
        magnetometer.emit([0.0, 1.0, 0.0]);
        assert_eq!(estimator.smoothed(), None);

        let estimate = estimator.estimate(&GNSS::new(Some(200.0), Some(0.0)));
        assert_eq!((estimate.heading, estimate.source), (200.0, Source::GPS));
        let estimate = estimator.estimate(&GNSS::default());
        assert_eq!((estimate.heading, estimate.source), (0.0, Source::None));
        assert!(estimate.has_compass);
    }

    #[test]
    fn test_resubscribe_starts_fresh() {
        let (mut estimator, magnetometer) = estimator(Probe::Answer(true));
        magnetometer.0.lock().unwrap().sticky = true;
        estimator.poll();
        magnetometer.emit([1.0, 0.0, 0.0]);
        assert_eq!(estimator.smoothed(), Some(0.0));

        estimator.set_enabled(false);
        estimator.set_enabled(false);
        estimator.set_enabled(true);
        estimator.set_enabled(true);
        assert_eq!(magnetometer.live(), 1);
        assert_eq!(estimator.smoothed(), None);

        // Released callback fires too, but only the new track is updated
        magnetometer.emit([-1.0, 0.0, 0.0]);
        assert!((estimator.smoothed().unwrap() - 180.0).abs() < 1e-3);
    }

    #[test]
    fn test_platform_offset() {
        use super::{mock::MockMagnetometer, HeadingEstimator};
        use crate::config::{Config, Platform};

        let magnetometer = MockMagnetometer::new(Probe::Answer(true));
        let config = Config { platform: Platform::IOS, ..Default::default() };
        let mut estimator = HeadingEstimator::new(magnetometer.clone(), &config);
        estimator.poll();
        magnetometer.emit([1.0, 0.0, 0.0]);
        assert!((estimator.smoothed().unwrap() - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_configure() {
        use crate::config::Config;

        let (mut estimator, magnetometer) = estimator(Probe::Answer(true));
        estimator.poll();
        magnetometer.emit([1.0, 0.0, 0.0]);

        let mut config = Config::default();
        config.compass.speed_threshold = 3.0;
        estimator.configure(&config);
        assert_eq!(estimator.smoothed(), Some(0.0));

        config.apply("compass.sample-interval=200").unwrap();
        estimator.configure(&config);
        assert_eq!(magnetometer.live(), 1);
        assert_eq!(magnetometer.0.lock().unwrap().interval, Some(200));
        assert_eq!(estimator.smoothed(), None);

        config.apply("compass.enabled=false").unwrap();
        estimator.configure(&config);
        assert!(!estimator.is_enabled());
        assert_eq!(magnetometer.live(), 0);
    }

    #[test]
    fn test_configure_keeps_runtime_disable() {
        use crate::config::Config;
        use crate::heading::source::Source;
        use crate::types::gnss::GNSS;

        let (mut estimator, magnetometer) = estimator(Probe::Answer(true));
        estimator.poll();
        estimator.set_enabled(false);
        assert_eq!(magnetometer.live(), 0);

        let mut config = Config::default();
        config.apply("compass.speed-threshold=5.0").unwrap();
        estimator.configure(&config);
        assert!(!estimator.is_enabled());
        assert_eq!(magnetometer.live(), 0);
        magnetometer.emit([1.0, 0.0, 0.0]);
        let estimate = estimator.estimate(&GNSS::new(Some(90.0), Some(0.0)));
        assert_eq!(estimate.source, Source::GPS);
        assert_eq!(estimate.heading, 90.0);

        config.apply("compass.enabled=false").unwrap();
        estimator.configure(&config);
        config.apply("compass.enabled=true").unwrap();
        estimator.configure(&config);
        assert!(estimator.is_enabled());
        assert_eq!(magnetometer.live(), 1);
    }

    #[test]
    fn test_capability_lost() {
        use super::{Capability, Error};
        use crate::heading::source::Source;
        use crate::types::gnss::GNSS;

        let (mut estimator, magnetometer) = estimator(Probe::Answer(true));
        estimator.poll();
        magnetometer.emit([1.0, 0.0, 0.0]);
        assert_eq!(magnetometer.live(), 1);

        magnetometer.0.lock().unwrap().probe = Probe::Pending;
        estimator.poll();
        assert_eq!(estimator.capability(), Capability::Available);
        assert_eq!(magnetometer.live(), 1);

        magnetometer.0.lock().unwrap().probe = Probe::Answer(false);
        estimator.poll();
        assert_eq!(estimator.capability(), Capability::Unavailable);
        assert_eq!(magnetometer.live(), 0);
        let estimate = estimator.estimate(&GNSS::new(Some(45.0), None));
        assert_eq!(estimate.source, Source::GPS);
        assert_eq!(estimate.error, Some(Error::CapabilityUnavailable));

        magnetometer.0.lock().unwrap().probe = Probe::Answer(true);
        estimator.poll();
        assert_eq!(estimator.capability(), Capability::Unavailable);
        assert_eq!(magnetometer.live(), 0);
    }

    #[test]
    fn test_capability_query_failed_after_available() {
        use super::{Capability, Error};

        let (mut estimator, magnetometer) = estimator(Probe::Answer(true));
        estimator.poll();
        magnetometer.0.lock().unwrap().probe = Probe::Fail;
        estimator.poll();
        assert_eq!(estimator.capability(), Capability::Unavailable);
        assert_eq!(estimator.error(), Some(Error::CapabilityQueryFailed));
        assert_eq!(magnetometer.live(), 0);
    }

    #[test]
    fn test_disable_while_sampling_on_another_thread() {
        use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
        use std::sync::Arc;
        use std::thread;

        for _ in 0..16 {
            let (mut estimator, magnetometer) = estimator(Probe::Answer(true));
            magnetometer.0.lock().unwrap().sticky = true;
            estimator.poll();
            let track = estimator.subscription.as_ref().unwrap().track.clone();

            let stop = Arc::new(AtomicBool::new(false));
            let emitted = Arc::new(AtomicUsize::new(0));
            let emitter = {
                let (magnetometer, stop, emitted) =
                    (magnetometer.clone(), stop.clone(), emitted.clone());
                thread::spawn(move || {
                    let mut i = 0usize;
                    while !stop.load(Ordering::Relaxed) {
                        let axes = if i % 2 == 0 { [1.0, 0.0, 0.0] } else { [0.0, 1.0, 0.0] };
                        magnetometer.emit(axes);
                        emitted.fetch_add(1, Ordering::Relaxed);
                        i += 1;
                    }
                })
            };

            while estimator.smoothed().is_none() {
                thread::yield_now();
            }
            estimator.set_enabled(false);
            assert_eq!(magnetometer.live(), 0);
            assert_eq!(estimator.smoothed(), None);

            let frozen = track.lock().smoothed;
            let mark = emitted.load(Ordering::Relaxed);
            while emitted.load(Ordering::Relaxed) < mark + 64 {
                thread::yield_now();
            }
            assert_eq!(track.lock().smoothed, frozen);

            stop.store(true, Ordering::Relaxed);
            emitter.join().unwrap();
        }
    }

    #[test]
    fn test_release_on_drop() {
        let (mut estimator, magnetometer) = estimator(Probe::Answer(true));
        estimator.poll();
        assert_eq!(magnetometer.live(), 1);
        drop(estimator);
        assert_eq!(magnetometer.live(), 0);
    }
}
