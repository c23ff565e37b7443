use log::info;
use serde::Serialize;
use thiserror::Error;

use super::aliases::AliasTable;
use super::classify::{clean_food_label, FoodClassifier};
use super::traits::NutrientSource;
use super::Nutrients;

#[derive(Default)]
pub struct IdentifyRequest {
    pub name: Option<String>,
    pub image: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Identification {
    pub source: &'static str,
    #[serde(rename = "matchName")]
    pub match_name: String,
    pub nutrients: Nutrients,
}

#[derive(Error, Debug)]
pub enum IdentifyError {
    #[error("Could not identify food from image. Please try typing the food name instead.")]
    ClassificationFailed,
    #[error("No food name provided and image classification failed.")]
    MissingName,
    #[error("Food \"{0}\" not found in our databases.")]
    NotFound(String),
    #[error("Food lookup failed: {0}")]
    Source(#[from] anyhow::Error),
}

/// End-to-end name/image → nutrient record resolution. Indian dishes check
/// the curated IFCT table first; everything else (and any local miss) goes
/// to the broader USDA source.
pub struct FoodResolver {
    aliases: AliasTable,
    classifier: Box<dyn FoodClassifier>,
    sources: Vec<Box<dyn NutrientSource>>,
}

impl FoodResolver {
    pub fn new(
        aliases: AliasTable,
        classifier: Box<dyn FoodClassifier>,
        sources: Vec<Box<dyn NutrientSource>>,
    ) -> Self {
        Self {
            aliases,
            classifier,
            sources,
        }
    }

    pub async fn identify(
        &self,
        request: IdentifyRequest,
    ) -> Result<Identification, IdentifyError> {
        let mut guessed = request
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        if guessed.is_none() {
            if let Some(image) = request.image.as_deref().filter(|image| !image.is_empty()) {
                info!("No name given, attempting image classification");

                let result = self
                    .classifier
                    .classify(image)
                    .await
                    .ok_or(IdentifyError::ClassificationFailed)?;

                let label = clean_food_label(&result.label);
                if label.is_empty() {
                    return Err(IdentifyError::ClassificationFailed);
                }

                info!("Image classified as \"{}\" ({:.2})", label, result.confidence);
                guessed = Some(label);
            }
        }

        let name = guessed.ok_or(IdentifyError::MissingName)?;
        let query = self
            .aliases
            .map_to_ifct(&name)
            .ok_or(IdentifyError::MissingName)?;
        let indian = self.aliases.is_indian_food(&query);
        info!("Searching for food \"{}\" (indian dish: {})", query, indian);

        for source in &self.sources {
            if !source.covers(indian) {
                continue;
            }
            if let Some(record) = source.lookup(&query).await? {
                info!("Found \"{}\" in {}", record.name, source.name());
                return Ok(Identification {
                    source: source.name(),
                    match_name: record.name,
                    nutrients: record.nutrients,
                });
            }
        }

        Err(IdentifyError::NotFound(query))
    }
}
