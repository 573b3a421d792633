//! Configuration types for challenge-abstracts

use serde::{Deserialize, Serialize};

/// Phase gating configuration
///
/// The hook only processes submissions whose phase metadata carries
/// `phase_meta_key` with exactly the value `phase_meta_value`. The defaults
/// select ISIC 2018 Final Test phases; other deployments of the same
/// platform can point the hook at a different marker.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GateConfig {
    /// Phase metadata key to inspect (default: "isic2018")
    #[serde(default = "default_phase_meta_key")]
    pub phase_meta_key: String,

    /// Required metadata value (default: "final")
    #[serde(default = "default_phase_meta_value")]
    pub phase_meta_value: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            phase_meta_key: default_phase_meta_key(),
            phase_meta_value: default_phase_meta_value(),
        }
    }
}

/// Abstract publishing configuration
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Name of the subfolder created for the extracted PDF (default: "Abstract")
    #[serde(default = "default_folder_name")]
    pub folder_name: String,

    /// Base URL of the host platform's API, used to build the inline-download
    /// link recorded on the submission
    /// (default: "https://challenge.kitware.com/api/v1")
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            folder_name: default_folder_name(),
            api_base: default_api_base(),
        }
    }
}

/// Publish worker configuration
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Capacity of the publish job queue (default: 64)
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Buffer size of the event broadcast channel (default: 256)
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            event_capacity: default_event_capacity(),
        }
    }
}

/// Main configuration for [`ScoreHook`](crate::ScoreHook)
///
/// Sub-config fields are flattened for flat JSON/TOML serialization.
/// `Config::default()` targets the ISIC 2018 deployment (its phase marker,
/// folder name, and URL pattern).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Phase gating settings
    #[serde(flatten)]
    pub gate: GateConfig,

    /// Abstract publishing settings
    #[serde(flatten)]
    pub publish: PublishConfig,

    /// Publish worker settings
    #[serde(flatten)]
    pub worker: WorkerConfig,
}

fn default_phase_meta_key() -> String {
    "isic2018".to_string()
}

fn default_phase_meta_value() -> String {
    "final".to_string()
}

fn default_folder_name() -> String {
    "Abstract".to_string()
}

fn default_api_base() -> String {
    "https://challenge.kitware.com/api/v1".to_string()
}

fn default_queue_capacity() -> usize {
    64
}

fn default_event_capacity() -> usize {
    256
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_isic2018_final_phases() {
        let config = Config::default();

        assert_eq!(config.gate.phase_meta_key, "isic2018");
        assert_eq!(config.gate.phase_meta_value, "final");
        assert_eq!(config.publish.folder_name, "Abstract");
        assert_eq!(config.publish.api_base, "https://challenge.kitware.com/api/v1");
        assert_eq!(config.worker.queue_capacity, 64);
        assert_eq!(config.worker.event_capacity, 256);
    }

    #[test]
    fn empty_json_deserializes_to_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();

        assert_eq!(config.gate.phase_meta_key, "isic2018");
        assert_eq!(config.publish.folder_name, "Abstract");
        assert_eq!(config.worker.queue_capacity, 64);
    }

    #[test]
    fn flat_json_overrides_individual_fields() {
        let config: Config = serde_json::from_str(
            r#"{
                "phase_meta_value": "live",
                "folder_name": "Abstracts",
                "queue_capacity": 8
            }"#,
        )
        .unwrap();

        assert_eq!(config.gate.phase_meta_value, "live");
        // untouched fields keep their defaults
        assert_eq!(config.gate.phase_meta_key, "isic2018");
        assert_eq!(config.publish.folder_name, "Abstracts");
        assert_eq!(config.worker.queue_capacity, 8);
        assert_eq!(config.worker.event_capacity, 256);
    }

    #[test]
    fn config_round_trips_through_json() {
        let original = Config {
            gate: GateConfig {
                phase_meta_key: "marker".into(),
                phase_meta_value: "v1".into(),
            },
            ..Default::default()
        };

        let json = serde_json::to_string(&original).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(back.gate.phase_meta_key, "marker");
        assert_eq!(back.gate.phase_meta_value, "v1");
        assert_eq!(back.publish.api_base, original.publish.api_base);
    }
}
