pub mod aliases;
pub mod api;
pub mod classify;
pub mod config;
pub mod ifct;
pub mod resolve;
pub mod traits;

use serde::{Deserialize, Serialize};

/// Macro totals per serving. Missing source fields deserialize to 0 so
/// downstream totals arithmetic never sees a null.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Nutrients {
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein_g: f64,
    #[serde(default)]
    pub carbs_g: f64,
    #[serde(default)]
    pub fats_g: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodRecord {
    pub name: String,
    pub nutrients: Nutrients,
}
