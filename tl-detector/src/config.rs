use crate::detect::property::point::Point;
use crate::detect::STATE_COUNT_THRESHOLD;
use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tl_inference::engine::inference_engine::ExecutionProvider;
use tl_inference::inference::yolo::inference_yolo_detect::{
    DEFAULT_IOU_THRESHOLD, DEFAULT_SCORE_THRESHOLD,
};
use tracing_subscriber::filter::LevelFilter;

pub const DEFAULT_CONFIG_PATH: &str = "./config/sim_traffic_light_config.yaml";
pub const CONFIG_PATH_ENV: &str = "TRAFFIC_LIGHT_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// True on the real vehicle, where no ground truth light states exist.
    pub is_site: bool,
    pub stop_line_positions: Vec<Vec<f64>>,
    #[serde(default)]
    pub light_source: Option<LightSourceKind>,
    #[serde(default = "default_state_count_threshold")]
    pub state_count_threshold: u32,
    #[serde(default)]
    pub detector: VisionConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightSourceKind {
    GroundTruth,
    Vision,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    pub model_dir: PathBuf,
    pub score_threshold: f32,
    pub iou_threshold: f32,
    pub execution_provider: String,
    pub timeout_ms: u64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("./data/model"),
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            execution_provider: "cpu".to_string(),
            timeout_ms: 250,
        }
    }
}

impl VisionConfig {
    pub fn execution_provider(&self) -> Result<ExecutionProvider> {
        self.execution_provider.parse()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted camera frame body in bytes.
    pub max_frame_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_frame_bytes: 32 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn level_filter(&self) -> Result<LevelFilter> {
        self.level
            .parse()
            .with_context(|| format!("invalid log level '{}'", self.level))
    }
}

fn default_state_count_threshold() -> u32 {
    STATE_COUNT_THRESHOLD
}

impl DetectorConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_yaml(&contents).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: DetectorConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Path from the first CLI argument, then the environment, then the default.
    pub fn resolve_path(argument: Option<String>) -> PathBuf {
        argument
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
            .into()
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.stop_line_positions.is_empty(),
            "stop_line_positions must list at least one stop line"
        );
        for (index, position) in self.stop_line_positions.iter().enumerate() {
            ensure!(
                position.len() == 2,
                "stop line {} must be [x, y], got {} values",
                index,
                position.len()
            );
            ensure!(
                position.iter().all(|value| value.is_finite()),
                "stop line {} has a non-finite coordinate",
                index
            );
        }
        ensure!(
            self.state_count_threshold >= 1,
            "state_count_threshold must be at least 1"
        );
        self.logging.level_filter()?;

        if self.light_source_kind() == LightSourceKind::Vision {
            let detector = &self.detector;
            self.detector.execution_provider()?;
            ensure!(
                (0.0..=1.0).contains(&detector.score_threshold),
                "detector.score_threshold must be within [0, 1]"
            );
            ensure!(
                (0.0..=1.0).contains(&detector.iou_threshold),
                "detector.iou_threshold must be within [0, 1]"
            );
            ensure!(detector.timeout_ms > 0, "detector.timeout_ms must be positive");
        }

        Ok(())
    }

    /// Vision on the real vehicle, ground truth in simulation, unless overridden.
    pub fn light_source_kind(&self) -> LightSourceKind {
        self.light_source.unwrap_or(if self.is_site {
            LightSourceKind::Vision
        } else {
            LightSourceKind::GroundTruth
        })
    }

    pub fn stop_lines(&self) -> Vec<Point<f64>> {
        self.stop_line_positions
            .iter()
            .map(|position| Point::new(position[0], position[1]))
            .collect()
    }
}
