use crate::error::{OnboardError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// FlowConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Pause between a single-choice selection and the automatic advance.
    #[serde(default = "default_auto_advance_delay")]
    pub auto_advance_delay_ms: u64,
    /// Longer pause used when the next screen is an interstitial.
    #[serde(default = "default_feedback_delay")]
    pub feedback_delay_ms: u64,
}

fn default_auto_advance_delay() -> u64 {
    400
}

fn default_feedback_delay() -> u64 {
    600
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            auto_advance_delay_ms: default_auto_advance_delay(),
            feedback_delay_ms: default_feedback_delay(),
        }
    }
}

impl FlowConfig {
    pub fn auto_advance_delay(&self) -> Duration {
        Duration::from_millis(self.auto_advance_delay_ms)
    }

    pub fn feedback_delay(&self) -> Duration {
        Duration::from_millis(self.feedback_delay_ms)
    }
}

// ---------------------------------------------------------------------------
// EstimatorConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// BMI units a body type may drift from its expected band before the
    /// advisory note is shown.
    #[serde(default = "default_tolerance")]
    pub consistency_tolerance: f64,
}

fn default_tolerance() -> f64 {
    2.0
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            consistency_tolerance: default_tolerance(),
        }
    }
}

// ---------------------------------------------------------------------------
// HandoffConfig / SignupConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandoffConfig {
    #[serde(default = "default_db_file")]
    pub db_file: String,
}

fn default_db_file() -> String {
    paths::HANDOFF_DB_FILE.to_string()
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            db_file: default_db_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:3001/api".to_string()
}

fn default_timeout() -> u64 {
    15
}

impl Default for SignupConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub flow: FlowConfig,
    #[serde(default)]
    pub estimator: EstimatorConfig,
    #[serde(default)]
    pub handoff: HandoffConfig,
    #[serde(default)]
    pub signup: SignupConfig,
}

fn default_version() -> u32 {
    1
}

impl Config {
    pub fn new() -> Self {
        Self {
            version: default_version(),
            ..Self::default()
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(OnboardError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn handoff_db_path(&self, root: &Path) -> std::path::PathBuf {
        paths::handoff_db_path(root, &self.handoff.db_file)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.flow.auto_advance_delay_ms == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "flow.auto_advance_delay_ms is 0: selections advance with no visual confirmation".to_string(),
            });
        }
        if self.flow.feedback_delay_ms < self.flow.auto_advance_delay_ms {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "flow.feedback_delay_ms ({}) is shorter than flow.auto_advance_delay_ms ({})",
                    self.flow.feedback_delay_ms, self.flow.auto_advance_delay_ms
                ),
            });
        }

        let tol = self.estimator.consistency_tolerance;
        if !tol.is_finite() || tol < 0.0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("estimator.consistency_tolerance must be a non-negative number, got {tol}"),
            });
        }

        if self.handoff.db_file.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "handoff.db_file is empty".to_string(),
            });
        }

        let url = self.signup.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!("signup.base_url '{url}' is not an http(s) URL"),
            });
        }
        if self.signup.timeout_secs == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "signup.timeout_secs is 0: requests will fail immediately".to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
