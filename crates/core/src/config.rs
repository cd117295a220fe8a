use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::DomError;

/// Retry and observation policy for one page load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Offsets after start at which a check runs regardless of DOM activity.
    #[serde(with = "millis_list")]
    pub delayed_checks: Vec<Duration>,
    /// Quiet window between an insertion and the re-check it schedules.
    #[serde(with = "millis")]
    pub debounce: Duration,
    /// Hard ceiling on how long the mutation watch stays connected.
    #[serde(with = "millis")]
    pub observe_ceiling: Duration,
    /// Triggers past this count are no-ops.
    pub max_attempts: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            delayed_checks: vec![
                Duration::from_millis(500),
                Duration::from_millis(1000),
                Duration::from_millis(2000),
            ],
            debounce: Duration::from_millis(100),
            observe_ceiling: Duration::from_millis(30000),
            max_attempts: 50,
        }
    }
}

impl EngineConfig {
    pub fn with_max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = max;
        self
    }

    pub fn with_debounce(mut self, ms: u64) -> Self {
        self.debounce = Duration::from_millis(ms);
        self
    }

    pub fn with_observe_ceiling(mut self, ms: u64) -> Self {
        self.observe_ceiling = Duration::from_millis(ms);
        self
    }

    pub fn with_delayed_checks(mut self, offsets_ms: &[u64]) -> Self {
        self.delayed_checks = offsets_ms.iter().map(|ms| Duration::from_millis(*ms)).collect();
        self
    }

    /// For short-lived pages, e.g. batch visits.
    pub fn fast() -> Self {
        Self {
            delayed_checks: vec![Duration::from_millis(250), Duration::from_millis(750)],
            debounce: Duration::from_millis(50),
            observe_ceiling: Duration::from_millis(5000),
            max_attempts: 20,
        }
    }

    pub fn patient() -> Self {
        Self {
            delayed_checks: vec![
                Duration::from_millis(500),
                Duration::from_millis(1000),
                Duration::from_millis(2000),
                Duration::from_millis(5000),
            ],
            debounce: Duration::from_millis(200),
            observe_ceiling: Duration::from_millis(60000),
            max_attempts: 100,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, DomError> {
        serde_json::from_str(json)
            .map_err(|e| DomError::parsing_error(format!("Invalid engine config: {}", e)))
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

mod millis_list {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(values: &[Duration], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(|d| d.as_millis() as u64))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Duration>, D::Error> {
        let raw = Vec::<u64>::deserialize(deserializer)?;
        Ok(raw.into_iter().map(Duration::from_millis).collect())
    }
}
