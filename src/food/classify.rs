//! Hybrid food classification: a local Hugging Face classifier service
//! first, with Roboflow as the fallback tier when the local model is
//! missing, erroring, or unsure.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use log::{error, info, warn};
use reqwest::multipart;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use super::config::FoodConfig;

/// Primary-classifier confidence below this falls through to Roboflow.
pub const CONFIDENCE_THRESHOLD: f64 = 0.6;

#[derive(Debug, Clone, Deserialize)]
pub struct Classification {
    pub label: String,
    pub confidence: f64,
}

#[async_trait]
pub trait FoodClassifier: Send + Sync {
    /// Best guess for the food in the image, or `None` when no classifier
    /// tier produced one. Never a hard error.
    async fn classify(&self, image: &[u8]) -> Option<Classification>;
}

pub struct HybridClassifier {
    client: reqwest::Client,
    classifier_url: String,
    classifier_timeout: Duration,
    roboflow_api_key: Option<String>,
    roboflow_model: Option<String>,
    roboflow_version: String,
    roboflow_timeout: Duration,
}

impl HybridClassifier {
    pub fn new(config: &FoodConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            classifier_url: config.classifier_url.clone(),
            classifier_timeout: Duration::from_secs(config.classifier_timeout_secs),
            roboflow_api_key: config.roboflow_api_key.clone(),
            roboflow_model: config.roboflow_model.clone(),
            roboflow_version: config.roboflow_version.clone(),
            roboflow_timeout: Duration::from_secs(config.roboflow_timeout_secs),
        }
    }

    async fn classify_local(&self, image: &[u8]) -> Option<Classification> {
        info!("Sending image to local classifier at {}", self.classifier_url);

        let form = multipart::Form::new().part(
            "file",
            multipart::Part::bytes(image.to_vec()).file_name("upload.jpg"),
        );

        let response = self
            .client
            .post(&self.classifier_url)
            .multipart(form)
            .timeout(self.classifier_timeout)
            .send()
            .await;

        let response = match response {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                error!("Local classifier returned status {}", response.status());
                return None;
            }
            Err(e) => {
                error!("Local classifier error: {}", e);
                return None;
            }
        };

        match response.json::<Classification>().await {
            Ok(result) => Some(result),
            Err(e) => {
                error!("Local classifier sent an unreadable response: {}", e);
                None
            }
        }
    }

    async fn classify_roboflow(&self, image: &[u8]) -> Option<Classification> {
        let (api_key, model) = match (&self.roboflow_api_key, &self.roboflow_model) {
            (Some(api_key), Some(model)) => (api_key, model),
            _ => {
                error!("Roboflow API key or model not configured");
                return None;
            }
        };

        info!("Falling back to Roboflow model {}", model);

        let url = format!(
            "https://detect.roboflow.com/{}/{}",
            model, self.roboflow_version
        );

        let response = self
            .client
            .post(&url)
            .query(&[("api_key", api_key.as_str())])
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(base64::Engine::encode(&STANDARD, image))
            .timeout(self.roboflow_timeout)
            .send()
            .await;

        let response = match response {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                error!("Roboflow returned status {}", response.status());
                return None;
            }
            Err(e) => {
                error!("Roboflow error: {}", e);
                return None;
            }
        };

        let data: Value = match response.json().await {
            Ok(data) => data,
            Err(e) => {
                error!("Roboflow sent an unreadable response: {}", e);
                return None;
            }
        };

        // Predictions come back ranked; the first one is the best guess.
        let best = data.get("predictions").and_then(|p| p.as_array())?.first()?;
        let label = best.get("class").and_then(|c| c.as_str())?.to_string();
        let confidence = best.get("confidence").and_then(|c| c.as_f64()).unwrap_or(0.0);

        Some(Classification { label, confidence })
    }
}

#[async_trait]
impl FoodClassifier for HybridClassifier {
    async fn classify(&self, image: &[u8]) -> Option<Classification> {
        if let Some(result) = self.classify_local(image).await {
            if is_confident(&result) {
                info!(
                    "Local model confident: {} ({:.2})",
                    result.label, result.confidence
                );
                return Some(result);
            }
            warn!(
                "Local confidence {:.2} below {} for \"{}\", trying Roboflow",
                result.confidence, CONFIDENCE_THRESHOLD, result.label
            );
        }

        self.classify_roboflow(image).await
    }
}

fn is_confident(result: &Classification) -> bool {
    result.confidence >= CONFIDENCE_THRESHOLD
}

/// Scrub a classifier label down to a searchable food name.
pub fn clean_food_label(label: &str) -> String {
    let lowered = label.to_lowercase().replace('_', " ");
    let stripped: String = lowered
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_confidence_falls_through() {
        let result = Classification {
            label: "idli".to_string(),
            confidence: 0.59,
        };
        assert!(!is_confident(&result));
    }

    #[test]
    fn threshold_is_inclusive() {
        let result = Classification {
            label: "idli".to_string(),
            confidence: 0.6,
        };
        assert!(is_confident(&result));
    }

    #[test]
    fn labels_are_scrubbed() {
        assert_eq!(clean_food_label("Masala_Dosa"), "masala dosa");
        assert_eq!(clean_food_label("  Gulab   Jamun! "), "gulab jamun");
        assert_eq!(clean_food_label("pav-bhaji"), "pavbhaji");
    }
}
