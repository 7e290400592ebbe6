#[macro_use]
extern crate log;
#[macro_use]
extern crate serde;
extern crate jeepney_compass;

pub mod magnetometer;

use jeepney_compass::{
    config::Config,
    types::{gnss::GNSS, sensor::Magnetism},
    Estimate, HeadingEstimator,
};

use magnetometer::{Probe, ReplayMagnetometer};

/// One line of a replay file
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Event {
    Available(bool),
    ProbeFailed,
    Magnetometer(Magnetism),
    Gnss(GNSS),
    Enabled(bool),
    /// `path=value` config update
    Set(String),
}

pub struct Simulator {
    config: Config,
    magnetometer: ReplayMagnetometer,
    estimator: HeadingEstimator<ReplayMagnetometer>,
    gnss: GNSS,
}

impl Simulator {
    pub fn new(config: Config, sticky: bool) -> Self {
        let magnetometer = ReplayMagnetometer::new(sticky);
        let estimator = HeadingEstimator::new(magnetometer.clone(), &config);
        Self { config, magnetometer, estimator, gnss: GNSS::default() }
    }

    pub fn magnetometer(&self) -> &ReplayMagnetometer {
        &self.magnetometer
    }

    pub fn estimate(&self) -> Estimate {
        self.estimator.estimate(&self.gnss)
    }

    pub fn update(&mut self, event: Event) -> Result<Estimate, String> {
        trace!("Apply {:?}", event);
        match event {
            Event::Available(available) => self.magnetometer.resolve(Probe::Answer(available)),
            Event::ProbeFailed => self.magnetometer.resolve(Probe::Fail),
            Event::Magnetometer(magnetism) => self.magnetometer.emit(magnetism.into()),
            Event::Gnss(gnss) => self.gnss = gnss,
            Event::Enabled(enabled) => {
                self.config.compass.enabled = enabled;
                self.estimator.set_enabled(enabled);
            }
            Event::Set(line) => {
                self.config.apply(&line).map_err(|e| format!("{}: {}", line, e))?;
                self.estimator.configure(&self.config);
            }
        }
        self.estimator.poll();
        Ok(self.estimate())
    }
}

mod test {
    #[test]
    fn test_replay() {
        use jeepney_compass::{config::Config, Source};

        use super::{Event, Simulator};

        let lines = [
            r#"{"magnetometer": [1.0, 0.0, 0.0]}"#,
            r#"{"available": true}"#,
            r#"{"magnetometer": [0.0, 1.0, 0.0]}"#,
            r#"{"gnss": {"course": 180.0, "ground-speed": 3.0}}"#,
            r#"{"gnss": {"course": 180.0, "ground-speed": 0.5}}"#,
            r#"{"enabled": false}"#,
        ];
        let mut simulator = Simulator::new(Config::default(), true);
        let mut estimates = Vec::new();
        for line in lines.iter() {
            let event: Event = serde_json::from_str(line).unwrap();
            estimates.push(simulator.update(event).unwrap());
        }
        let summary: Vec<(u16, Source)> = estimates.iter().map(|e| (e.rounded(), e.source)).collect();
        let expected = vec![
            (0, Source::None),
            (0, Source::Compass),
            (90, Source::Compass),
            (180, Source::GPS),
            (90, Source::Compass),
            (180, Source::GPS),
        ];
        assert_eq!(expected, summary);
        assert_eq!(simulator.magnetometer().subscribers(), 0);
    }

    #[test]
    fn test_set_config() {
        use jeepney_compass::config::Config;

        use super::{Event, Simulator};

        let mut simulator = Simulator::new(Config::default(), false);
        simulator.update(Event::Available(true)).unwrap();
        assert_eq!(simulator.magnetometer().interval().map(|i| i.ticks()), Some(100));
        simulator.update(Event::Set("compass.sample-interval=250".into())).unwrap();
        assert_eq!(simulator.magnetometer().interval().map(|i| i.ticks()), Some(250));
        assert!(simulator.update(Event::Set("compass.bogus=1".into())).is_err());
    }

    #[test]
    fn test_set_config_after_disable() {
        use jeepney_compass::{config::Config, types::gnss::GNSS, Source};

        use super::{Event, Simulator};

        let mut simulator = Simulator::new(Config::default(), false);
        simulator.update(Event::Available(true)).unwrap();
        assert_eq!(simulator.magnetometer().subscribers(), 1);
        simulator.update(Event::Enabled(false)).unwrap();
        let estimate = simulator.update(Event::Set("compass.speed-threshold=5.0".into())).unwrap();
        assert_eq!(simulator.magnetometer().subscribers(), 0);
        assert_eq!(estimate.source, Source::None);

        let estimate = simulator.update(Event::Gnss(GNSS::new(Some(270.0), Some(0.0)))).unwrap();
        assert_eq!(estimate.source, Source::GPS);
        assert_eq!(simulator.magnetometer().subscribers(), 0);
    }
}
