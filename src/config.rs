//! Items related to reading configuration from files

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::time::Duration;
use cycle::{CycleBounds, DEFAULT_MIN_CYCLE, DEFAULT_MAX_CYCLE};
use traffic_light::{LightError, TrafficLight};
use util;

quick_error!{
    /// An error that can be returned from config related methods
    #[derive(Debug)]
    pub enum ConfigError {
        /// The config file could not be read
        Io(err: io::Error) {
            from()
            display("error reading config file: {}", err)
            source(err)
        }
        /// The config was not valid JSON for a `Config`
        Json(err: ::serde_json::Error) {
            from()
            display("error parsing config: {}", err)
            source(err)
        }
        /// The config described an invalid light
        Light(err: LightError) {
            from()
            display("invalid light config: {}", err)
            source(err)
        }
    }
}

/// A result that can be returned from config related methods
pub type ConfigResult<T> = Result<T, ConfigError>;

fn default_min() -> Duration {
    DEFAULT_MIN_CYCLE
}

fn default_max() -> Duration {
    DEFAULT_MAX_CYCLE
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
/// Bounds on how long each phase lasts, in milliseconds
pub struct CycleConfig {
    #[serde(deserialize_with="util::deserialize_duration", default="default_min")]
    min: Duration,
    #[serde(deserialize_with="util::deserialize_duration", default="default_max")]
    max: Duration,
}

impl Default for CycleConfig {
    fn default() -> Self {
        CycleConfig {
            min: default_min(),
            max: default_max(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
/// A config for a single `TrafficLight`
pub struct LightConfig {
    name: String,
}

impl LightConfig {
    /// Creates a `TrafficLight` based on the config, which has not been started yet
    pub fn to_light(&self, bounds: CycleBounds) -> TrafficLight {
        TrafficLight::new(self.name.clone(), bounds)
    }
}

fn default_lights() -> Vec<LightConfig> {
    vec![LightConfig { name: "main".into() }]
}

fn deserialize_run_for<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where D: ::serde::Deserializer<'de>
{
    util::deserialize_duration(deserializer).map(Some)
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
/// The configuration format for trafficlight
pub struct Config {
    #[serde(default)]
    cycle: CycleConfig,
    #[serde(default="default_lights")]
    lights: Vec<LightConfig>,
    #[serde(deserialize_with="deserialize_run_for", default)]
    run_for: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cycle: CycleConfig::default(),
            lights: default_lights(),
            run_for: None,
        }
    }
}

impl Config {
    /// Reads a `Config` from JSON
    pub fn from_reader<R: Read>(reader: R) -> ConfigResult<Config> {
        Ok(::serde_json::from_reader(reader)?)
    }

    /// Reads a `Config` from the JSON file at `path`
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Config> {
        let file = File::open(path)?;
        Self::from_reader(io::BufReader::new(file))
    }

    /// Gets the validated bounds on the length of each phase
    pub fn cycle_bounds(&self) -> ConfigResult<CycleBounds> {
        Ok(CycleBounds::new(self.cycle.min, self.cycle.max)?)
    }

    /// How long to run for before stopping, or `None` to run forever
    pub fn run_for(&self) -> Option<Duration> {
        self.run_for
    }

    /// Gets the `TrafficLight`s specified in the config. None of them are started yet.
    pub fn to_lights(&self) -> ConfigResult<Vec<TrafficLight>> {
        let bounds = self.cycle_bounds()?;
        Ok(self.lights
            .iter()
            .map(|light_conf| light_conf.to_light(bounds))
            .collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use phase::Phase;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "cycle": { "min": 1000, "max": 2500 },
            "lights": [ { "name": "north" }, { "name": "east" } ],
            "run_for": 30000
        }"#;
        let config = Config::from_reader(json.as_bytes()).unwrap();
        assert_eq!(config.run_for(), Some(Duration::from_secs(30)));
        let bounds = config.cycle_bounds().unwrap();
        assert_eq!(bounds.min(), Duration::from_millis(1000));
        assert_eq!(bounds.max(), Duration::from_millis(2500));

        let lights = config.to_lights().unwrap();
        let names: Vec<&str> = lights.iter().map(|light| light.name()).collect();
        assert_eq!(names, vec!["north", "east"]);
        assert!(lights.iter().all(|light| light.current_phase() == Phase::Red));
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_reader("{}".as_bytes()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.run_for(), None);
        assert_eq!(config.cycle_bounds().unwrap(), CycleBounds::default());
        let lights = config.to_lights().unwrap();
        assert_eq!(lights.len(), 1);
        assert_eq!(lights[0].name(), "main");

        let config = Config::from_reader(r#"{ "cycle": { "max": 9000 } }"#.as_bytes()).unwrap();
        assert_eq!(config.cycle_bounds().unwrap().min(), DEFAULT_MIN_CYCLE);
        assert_eq!(config.cycle_bounds().unwrap().max(), Duration::from_millis(9000));
    }

    #[test]
    fn test_invalid_config() {
        let config = Config::from_reader(r#"{ "cycle": { "min": 5000, "max": 10 } }"#.as_bytes())
            .unwrap();
        match config.to_lights() {
            Err(ConfigError::Light(LightError::InvalidBounds { min, max })) => {
                assert_eq!(min, Duration::from_millis(5000));
                assert_eq!(max, Duration::from_millis(10));
            }
            other => panic!("expected InvalidBounds, got {:?}", other.map(|lights| lights.len())),
        }

        let config = Config::from_reader(r#"{ "cycle": { "min": 0, "max": 0 } }"#.as_bytes())
            .unwrap();
        match config.cycle_bounds() {
            Err(ConfigError::Light(LightError::InvalidBounds { .. })) => {}
            other => panic!("expected InvalidBounds, got {:?}", other),
        }

        match Config::from_reader(r#"{ "lights": 3 }"#.as_bytes()) {
            Err(ConfigError::Json(_)) => {}
            other => panic!("expected a json error, got {:?}", other),
        }
        match Config::from_file("/nonexistent/trafficlight.json") {
            Err(ConfigError::Io(_)) => {}
            other => panic!("expected an io error, got {:?}", other),
        }
    }
}
