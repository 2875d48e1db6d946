//! Check configuration
//!
//! Thresholds and signal names used by the violation checks. Every field has a
//! default, so an empty TOML/JSON table deserializes to the standard ACC
//! battery.

use serde::{Deserialize, Serialize};

/// Configuration for the violation checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Maximum allowed vehicle speed (same unit as the speed signal)
    pub overspeed_threshold: f64,

    /// Maximum allowed gap between consecutive samples (seconds)
    pub timeout_seconds: f64,

    /// Only consider samples of this message for the timeout check
    pub timeout_message: Option<String>,

    /// Brake pressure above which a sample counts as hard braking
    pub brake_threshold: f64,

    /// Deceleration (speed units per second) above which braking is an emergency stop
    pub decel_threshold: f64,

    /// Half-width of the window used to correlate brake and speed samples (seconds)
    pub correlation_window: f64,

    /// Name of the vehicle speed signal
    pub speed_signal: String,

    /// Name of the brake pressure signal
    pub brake_signal: String,

    /// Name of the brake checksum signal
    pub checksum_signal: String,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            overspeed_threshold: 100.0,
            timeout_seconds: 2.0,
            timeout_message: None,
            brake_threshold: 200.0,
            decel_threshold: 20.0,
            correlation_window: 0.2,
            speed_signal: "Speed".to_string(),
            brake_signal: "BrakePressure".to_string(),
            checksum_signal: "BrakeChecksum".to_string(),
        }
    }
}

impl ValidatorConfig {
    /// Create a configuration with default thresholds
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the overspeed threshold
    pub fn with_overspeed_threshold(mut self, threshold: f64) -> Self {
        self.overspeed_threshold = threshold;
        self
    }

    /// Builder method: set the timeout threshold
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Builder method: restrict the timeout check to one message
    pub fn with_timeout_message(mut self, message: impl Into<String>) -> Self {
        self.timeout_message = Some(message.into());
        self
    }

    /// Builder method: set the emergency-stop thresholds
    pub fn with_emergency_thresholds(mut self, brake: f64, decel: f64) -> Self {
        self.brake_threshold = brake;
        self.decel_threshold = decel;
        self
    }

    /// Builder method: set the signal names used by the checks
    pub fn with_signal_names(
        mut self,
        speed: impl Into<String>,
        brake: impl Into<String>,
        checksum: impl Into<String>,
    ) -> Self {
        self.speed_signal = speed.into();
        self.brake_signal = brake.into();
        self.checksum_signal = checksum.into();
        self
    }
}
