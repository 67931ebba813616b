/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use std::fs;
use std::num::NonZeroU64;
use std::path::Path;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::{ConfigError, Floor};

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub system: SystemConfig,
    pub elevator: ElevatorConfig,
    pub traffic: TrafficConfig,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SystemConfig {
    pub elevator_count: usize,
    pub run_traffic_on_startup: bool,
}

/**
 * Per-elevator parameters. Every elevator booted by one dispatch shares them.
 *
 * # Fields
 * - `max_capacity`:        Passengers the car can hold at once.
 * - `movement_delay_ms`:   Time to travel one floor, in milliseconds.
 * - `boot_floor`:          Floor the elevator starts on, doors open.
 */
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ElevatorConfig {
    pub max_capacity: u32,
    pub movement_delay_ms: u64,
    pub boot_floor: Floor,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct TrafficConfig {
    pub request_count: usize,
    pub max_passengers_per_request: u32,
    pub submit_interval_ms: u64,
    pub seed: Option<u64>,
}

/// Named presets for the elevator models the control box ships with.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ElevatorKind {
    Standard,
    HighSpeed,
    Freight,
}

/***************************************/
/*             Defaults                */
/***************************************/
impl Default for SystemConfig {
    fn default() -> Self {
        SystemConfig {
            elevator_count: 3,
            run_traffic_on_startup: false,
        }
    }
}

impl Default for ElevatorConfig {
    fn default() -> Self {
        ElevatorKind::Standard.config()
    }
}

impl Default for TrafficConfig {
    fn default() -> Self {
        TrafficConfig {
            request_count: 3,
            max_passengers_per_request: 5,
            submit_interval_ms: 500,
            seed: None,
        }
    }
}

impl ElevatorKind {
    pub fn config(self) -> ElevatorConfig {
        let (max_capacity, movement_delay_ms) = match self {
            ElevatorKind::Standard => (20, 5000),
            ElevatorKind::HighSpeed => (20, 1000),
            ElevatorKind::Freight => (50, 2000),
        };
        ElevatorConfig {
            max_capacity,
            movement_delay_ms,
            boot_floor: Floor::Ground,
        }
    }
}

impl ElevatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        self.movement_delay().map(|_| ())
    }

    pub fn movement_delay(&self) -> Result<NonZeroU64, ConfigError> {
        NonZeroU64::new(self.movement_delay_ms).ok_or(ConfigError::ZeroMovementDelay)
    }
}

impl Config {
    pub fn from_toml_str(config_str: &str) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(config_str)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.system.elevator_count == 0 {
            return Err(ConfigError::NoElevators);
        }
        self.elevator.validate()
    }
}

/***************************************/
/*             Public API              */
/***************************************/
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let config_str = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Config::from_toml_str(&config_str)
}

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();

        assert_eq!(config.system.elevator_count, 3);
        assert_eq!(config.elevator.max_capacity, 20);
        assert_eq!(config.elevator.movement_delay_ms, 5000);
        assert_eq!(config.elevator.boot_floor, Floor::Ground);
        assert_eq!(config.traffic.max_passengers_per_request, 5);
        assert_eq!(config.traffic.seed, None);
    }

    #[test]
    fn test_partial_file_overrides_fields() {
        let config = Config::from_toml_str(
            r#"
            [system]
            elevator_count = 2

            [elevator]
            movement_delay_ms = 333
            boot_floor = "basement"

            [traffic]
            seed = 7
            "#,
        )
        .unwrap();

        assert_eq!(config.system.elevator_count, 2);
        assert_eq!(config.elevator.max_capacity, 20);
        assert_eq!(config.elevator.movement_delay_ms, 333);
        assert_eq!(config.elevator.boot_floor, Floor::Basement);
        assert_eq!(config.traffic.seed, Some(7));
    }

    #[test]
    fn test_zero_delay_is_rejected() {
        let result = Config::from_toml_str("[elevator]\nmovement_delay_ms = 0\n");
        assert!(matches!(result, Err(ConfigError::ZeroMovementDelay)));
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let config = ElevatorConfig {
            max_capacity: 0,
            ..ElevatorConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroCapacity)));
    }

    #[test]
    fn test_zero_elevators_is_rejected() {
        let result = Config::from_toml_str("[system]\nelevator_count = 0\n");
        assert!(matches!(result, Err(ConfigError::NoElevators)));
    }

    #[test]
    fn test_unknown_floor_is_a_parse_error() {
        let result = Config::from_toml_str("[elevator]\nboot_floor = \"roof\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let result = load_config(Path::new("does/not/exist.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_shipped_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config.toml");
        let config = load_config(&path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_presets() {
        assert_eq!(ElevatorKind::HighSpeed.config().movement_delay_ms, 1000);
        assert_eq!(ElevatorKind::Freight.config().max_capacity, 50);
        assert_eq!(ElevatorKind::Standard.config(), ElevatorConfig::default());
    }
}
