use std::env;

/// Keys and endpoints for the external food services. A missing key is not
/// fatal here; the owning client reports it when it is actually used.
#[derive(Debug, Clone)]
pub struct FoodConfig {
    pub usda_api_key: Option<String>,
    pub usda_timeout_secs: u64,
    pub classifier_url: String,
    pub classifier_timeout_secs: u64,
    pub roboflow_api_key: Option<String>,
    pub roboflow_model: Option<String>,
    pub roboflow_version: String,
    pub roboflow_timeout_secs: u64,
}

impl Default for FoodConfig {
    fn default() -> Self {
        Self {
            usda_api_key: None,
            usda_timeout_secs: 10,
            classifier_url: "http://127.0.0.1:5001/classify".to_string(),
            classifier_timeout_secs: 30,
            roboflow_api_key: None,
            roboflow_model: None,
            roboflow_version: "1".to_string(),
            roboflow_timeout_secs: 30,
        }
    }
}

impl FoodConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            usda_api_key: env::var("USDA_API_KEY").ok(),
            usda_timeout_secs: env_secs("USDA_TIMEOUT_SECS", defaults.usda_timeout_secs),
            classifier_url: env::var("CLASSIFIER_URL").unwrap_or(defaults.classifier_url),
            classifier_timeout_secs: env_secs(
                "CLASSIFIER_TIMEOUT_SECS",
                defaults.classifier_timeout_secs,
            ),
            roboflow_api_key: env::var("ROBOFLOW_API_KEY").ok(),
            roboflow_model: env::var("ROBOFLOW_MODEL").ok(),
            roboflow_version: env::var("ROBOFLOW_VERSION").unwrap_or(defaults.roboflow_version),
            roboflow_timeout_secs: env_secs("ROBOFLOW_TIMEOUT_SECS", defaults.roboflow_timeout_secs),
        }
    }
}

fn env_secs(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
