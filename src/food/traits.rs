use anyhow::Result;
use async_trait::async_trait;

use super::FoodRecord;

/// A nutrient database the resolver can consult. Sources are registered in
/// priority order and tried first-hit-wins.
#[async_trait]
pub trait NutrientSource: Send + Sync {
    /// Identifier reported back to the caller as `source`.
    fn name(&self) -> &'static str;

    /// Whether this source applies to a query flagged (or not) as an
    /// Indian dish.
    fn covers(&self, indian_food: bool) -> bool;

    /// `Ok(None)` means this source has no match. `Err` means the source
    /// itself failed and the failure must reach the caller unmasked.
    async fn lookup(&self, query: &str) -> Result<Option<FoodRecord>>;
}
