use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use crate::food::config::FoodConfig;
use crate::food::traits::NutrientSource;
use crate::food::{FoodRecord, Nutrients};

/// USDA FoodData Central search client. Sends the query as a general search
/// term and trusts the service's own ranking: the top result wins.
#[derive(Debug, Clone)]
pub struct UsdaClient {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl UsdaClient {
    pub fn new(config: &FoodConfig) -> Self {
        Self {
            api_key: config.usda_api_key.clone(),
            base_url: "https://api.nal.usda.gov/fdc/v1".to_string(),
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(config.usda_timeout_secs),
        }
    }

    pub async fn search_food_and_nutrients(&self, query: &str) -> Result<Option<FoodRecord>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("USDA API key not configured"))?;

        let url = format!("{}/foods/search", self.base_url);
        let response = self
            .client
            .post(&url)
            .query(&[("api_key", api_key)])
            .json(&json!({
                "generalSearchInput": query,
                "requireAllWords": false,
                "pageSize": 5
            }))
            .timeout(self.timeout)
            .send()
            .await
            .context("USDA search request failed")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("USDA search failed with status {}", status));
        }

        let data: Value = response
            .json()
            .await
            .context("USDA search response was not JSON")?;

        Ok(top_match(&data))
    }
}

#[async_trait]
impl NutrientSource for UsdaClient {
    fn name(&self) -> &'static str {
        "USDA"
    }

    fn covers(&self, _indian_food: bool) -> bool {
        true
    }

    async fn lookup(&self, query: &str) -> Result<Option<FoodRecord>> {
        self.search_food_and_nutrients(query).await
    }
}

/// Top-ranked food from a `/foods/search` response, or `None` when the
/// service matched nothing.
fn top_match(data: &Value) -> Option<FoodRecord> {
    let top = data.get("foods").and_then(|f| f.as_array())?.first()?;
    let name = top
        .get("description")
        .and_then(|d| d.as_str())
        .unwrap_or_default()
        .to_string();

    Some(FoodRecord {
        name,
        nutrients: extract_nutrients(top),
    })
}

// Nutrient records are heterogeneous across USDA data types; match the
// canonical macros by name substring and leave everything else at 0.
fn extract_nutrients(food: &Value) -> Nutrients {
    let mut nutrients = Nutrients::default();

    let list = match food.get("foodNutrients").and_then(|n| n.as_array()) {
        Some(list) => list,
        None => return nutrients,
    };

    for entry in list {
        let name = entry
            .get("nutrientName")
            .and_then(|n| n.as_str())
            .unwrap_or_default()
            .to_lowercase();
        let amount = entry.get("value").and_then(|v| v.as_f64()).unwrap_or(0.0);

        if name.contains("energy") {
            nutrients.calories = amount.round();
        }
        if name.contains("protein") {
            nutrients.protein_g = amount;
        }
        if name.contains("carbohydrate") {
            nutrients.carbs_g = amount;
        }
        if name.contains("fat") {
            nutrients.fats_g = amount;
        }
    }

    nutrients
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_energy_defaults_to_zero() {
        let data = json!({
            "foods": [{
                "description": "Banana, raw",
                "foodNutrients": [
                    { "nutrientName": "Protein", "value": 12.3 }
                ]
            }]
        });

        let record = top_match(&data).unwrap();
        assert_eq!(record.name, "Banana, raw");
        assert_eq!(record.nutrients.protein_g, 12.3);
        assert_eq!(record.nutrients.calories, 0.0);
        assert_eq!(record.nutrients.carbs_g, 0.0);
        assert_eq!(record.nutrients.fats_g, 0.0);
    }

    #[test]
    fn nutrient_names_match_by_substring() {
        let data = json!({
            "foods": [{
                "description": "Banana, raw",
                "foodNutrients": [
                    { "nutrientName": "Energy", "value": 88.6, "unitName": "KCAL" },
                    { "nutrientName": "Total lipid (fat)", "value": 0.3 },
                    { "nutrientName": "Carbohydrate, by difference", "value": 22.8 }
                ]
            }]
        });

        let nutrients = top_match(&data).unwrap().nutrients;
        assert_eq!(nutrients.calories, 89.0);
        assert_eq!(nutrients.fats_g, 0.3);
        assert_eq!(nutrients.carbs_g, 22.8);
    }

    #[test]
    fn first_result_is_taken_as_is() {
        let data = json!({
            "foods": [
                { "description": "Bread, naan", "foodNutrients": [] },
                { "description": "Bread, white", "foodNutrients": [] }
            ]
        });
        assert_eq!(top_match(&data).unwrap().name, "Bread, naan");
    }

    #[test]
    fn empty_results_are_not_found() {
        assert!(top_match(&json!({ "foods": [] })).is_none());
        assert!(top_match(&json!({})).is_none());
    }

    #[tokio::test]
    async fn missing_api_key_is_an_error() {
        let client = UsdaClient::new(&FoodConfig::default());
        let result = client.search_food_and_nutrients("banana").await;
        assert!(result.is_err());
    }
}
