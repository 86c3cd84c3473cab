use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use paddle::PaddleMode;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Shortest accepted gap between simulated requests.
pub const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SceneConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub paddle: PaddleConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    pub paddle_mode: PaddleMode,
    pub background: [f32; 3],
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaddleConfig {
    #[serde(
        default = "default_return_duration",
        deserialize_with = "deserialize_duration"
    )]
    pub return_duration: Duration,
    #[serde(default = "default_paddle_colour")]
    pub default_colour: [f32; 4],
    /// Optional PNG drawn over each paddle.
    #[serde(default)]
    pub texture: Option<PathBuf>,
    /// Horizontal paddle position as a fraction of the viewport width.
    #[serde(default = "default_x_fraction")]
    pub x_fraction: f32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationConfig {
    #[serde(default = "default_tokens")]
    pub tokens: Vec<String>,
    #[serde(
        default = "default_request_interval",
        deserialize_with = "deserialize_duration"
    )]
    pub request_interval: Duration,
    #[serde(
        default = "default_min_travel",
        deserialize_with = "deserialize_duration"
    )]
    pub min_travel: Duration,
    #[serde(
        default = "default_max_travel",
        deserialize_with = "deserialize_duration"
    )]
    pub max_travel: Duration,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            display: DisplayConfig::default(),
            paddle: PaddleConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            paddle_mode: PaddleMode::default(),
            background: [0.0, 0.0, 0.0],
        }
    }
}

impl Default for PaddleConfig {
    fn default() -> Self {
        Self {
            return_duration: default_return_duration(),
            default_colour: default_paddle_colour(),
            texture: None,
            x_fraction: default_x_fraction(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tokens: default_tokens(),
            request_interval: default_request_interval(),
            min_travel: default_min_travel(),
            max_travel: default_max_travel(),
            seed: default_seed(),
        }
    }
}

fn default_version() -> u32 {
    1
}

fn default_return_duration() -> Duration {
    Duration::from_secs(4)
}

fn default_paddle_colour() -> [f32; 4] {
    [0.5, 0.5, 0.5, 1.0]
}

fn default_x_fraction() -> f32 {
    0.75
}

fn default_tokens() -> Vec<String> {
    ["www.example.com", "api.example.com", "cdn.example.com"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_request_interval() -> Duration {
    Duration::from_millis(250)
}

fn default_min_travel() -> Duration {
    Duration::from_secs(1)
}

fn default_max_travel() -> Duration {
    Duration::from_secs(3)
}

fn default_seed() -> u64 {
    7
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs(v as u64))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs_f64(v))
        }
    }

    deserializer.deserialize_any(Visitor)
}

impl SceneConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: SceneConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Loads `path` when it exists, otherwise falls back to the built-in defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if self.display.width == 0 || self.display.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "display size must be non-zero (got {}x{})",
                self.display.width, self.display.height
            )));
        }

        validate_unit_range("display.background", &self.display.background)?;
        validate_unit_range("paddle.default_colour", &self.paddle.default_colour)?;

        if !(0.0..=1.0).contains(&self.paddle.x_fraction) {
            return Err(ConfigError::Invalid(format!(
                "paddle.x_fraction must be within 0..=1 (got {})",
                self.paddle.x_fraction
            )));
        }

        let simulation = &self.simulation;
        if simulation.request_interval < MIN_REQUEST_INTERVAL {
            return Err(ConfigError::Invalid(format!(
                "simulation.request_interval must be at least {:?} (got {:?})",
                MIN_REQUEST_INTERVAL, simulation.request_interval
            )));
        }

        if simulation.min_travel.is_zero() {
            return Err(ConfigError::Invalid(
                "simulation.min_travel must be greater than zero".into(),
            ));
        }

        if simulation.max_travel < simulation.min_travel {
            return Err(ConfigError::Invalid(format!(
                "simulation.max_travel ({:?}) is shorter than min_travel ({:?})",
                simulation.max_travel, simulation.min_travel
            )));
        }

        if self.display.paddle_mode.groups_by_token() {
            if simulation.tokens.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "paddle mode '{}' needs at least one simulation token",
                    self.display.paddle_mode
                )));
            }

            if simulation.tokens.iter().any(|token| token.trim().is_empty()) {
                return Err(ConfigError::Invalid(
                    "simulation.tokens contains an empty token".into(),
                ));
            }
        }

        Ok(())
    }
}

fn validate_unit_range(field: &str, values: &[f32]) -> Result<(), ConfigError> {
    if values.iter().all(|value| (0.0..=1.0).contains(value)) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{field} components must be within 0..=1 (got {values:?})"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
version = 1

[display]
width = 1024
height = 768
paddle_mode = "vhost"
background = [0.1, 0.1, 0.1]

[paddle]
return_duration = "2s 500ms"
default_colour = [1.0, 1.0, 1.0, 0.8]
texture = "assets/overlay.png"

[simulation]
tokens = ["alpha.test", "beta.test"]
request_interval = 0.5
min_travel = "750ms"
max_travel = 2
seed = 99
"#;

    #[test]
    fn parses_sample_config() {
        let config = SceneConfig::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(config.display.width, 1024);
        assert_eq!(config.display.paddle_mode, PaddleMode::Vhost);
        assert_eq!(config.paddle.return_duration, Duration::from_millis(2500));
        assert_eq!(
            config.paddle.texture.as_deref(),
            Some(Path::new("assets/overlay.png"))
        );
        assert_eq!(config.simulation.request_interval, Duration::from_millis(500));
        assert_eq!(config.simulation.min_travel, Duration::from_millis(750));
        assert_eq!(config.simulation.max_travel, Duration::from_secs(2));
        assert_eq!(config.simulation.seed, 99);
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config = SceneConfig::from_toml_str("").expect("parse empty config");
        assert_eq!(config.display.width, 1280);
        assert_eq!(config.display.paddle_mode, PaddleMode::Single);
        assert_eq!(config.paddle.return_duration, Duration::from_secs(4));
        assert_eq!(config.paddle.x_fraction, 0.75);
        assert_eq!(config.simulation.tokens.len(), 3);
    }

    #[test]
    fn rejects_out_of_range_colour() {
        let err = SceneConfig::from_toml_str(
            r#"
[paddle]
default_colour = [1.5, 0.0, 0.0, 1.0]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_negative_duration() {
        let err = SceneConfig::from_toml_str(
            r#"
[paddle]
return_duration = -3
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn grouped_mode_requires_tokens() {
        let err = SceneConfig::from_toml_str(
            r#"
[display]
paddle_mode = "pid"

[simulation]
tokens = []
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_sub_millisecond_request_interval() {
        for interval in ["\"1ns\"", "\"999us\"", "0"] {
            let err = SceneConfig::from_toml_str(&format!(
                "[simulation]\nrequest_interval = {interval}\n"
            ))
            .unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{interval}: {err}");
        }

        let config =
            SceneConfig::from_toml_str("[simulation]\nrequest_interval = \"1ms\"\n").unwrap();
        assert_eq!(config.simulation.request_interval, MIN_REQUEST_INTERVAL);
    }

    #[test]
    fn rejects_inverted_travel_range() {
        let err = SceneConfig::from_toml_str(
            r#"
[simulation]
min_travel = "3s"
max_travel = "1s"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn load_or_default_handles_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let config = SceneConfig::load_or_default(&missing).unwrap();
        assert_eq!(config.display.height, 720);

        let present = dir.path().join("scene.toml");
        fs::write(&present, "[display]\nheight = 480\n").unwrap();
        let config = SceneConfig::load_or_default(&present).unwrap();
        assert_eq!(config.display.height, 480);
    }
}
