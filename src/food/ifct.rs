use anyhow::{Context, Result};
use async_trait::async_trait;
use log::info;

use super::traits::NutrientSource;
use super::FoodRecord;

// Per-serving IFCT-derived dataset, bundled with the binary.
const IFCT_DATASET: &str = include_str!("../../data/ifct.json");

/// In-memory Indian food composition table, loaded once at startup and
/// read-only afterwards.
#[derive(Debug, Clone)]
pub struct CompositionTable {
    foods: Vec<FoodRecord>,
}

impl CompositionTable {
    pub fn bundled() -> Result<Self> {
        let foods: Vec<FoodRecord> =
            serde_json::from_str(IFCT_DATASET).context("Invalid bundled IFCT dataset")?;
        info!("Loaded {} foods from the IFCT dataset", foods.len());
        Ok(Self { foods })
    }

    pub fn from_records(foods: Vec<FoodRecord>) -> Self {
        Self { foods }
    }

    /// Tiered lookup: exact match, then entry-name-contains-query, then
    /// query-contains-entry-name. Each tier scans in stored order and the
    /// first match wins.
    pub fn find(&self, query: &str) -> Option<&FoodRecord> {
        if query.trim().is_empty() {
            return None;
        }
        let clean = query.to_lowercase();

        if let Some(exact) = self.foods.iter().find(|f| f.name.to_lowercase() == clean) {
            return Some(exact);
        }

        if let Some(partial) = self
            .foods
            .iter()
            .find(|f| f.name.to_lowercase().contains(&clean))
        {
            return Some(partial);
        }

        self.foods
            .iter()
            .find(|f| clean.contains(&f.name.to_lowercase()))
    }
}

pub struct IfctSource {
    table: CompositionTable,
}

impl IfctSource {
    pub fn new(table: CompositionTable) -> Self {
        Self { table }
    }
}

#[async_trait]
impl NutrientSource for IfctSource {
    fn name(&self) -> &'static str {
        "IFCT"
    }

    fn covers(&self, indian_food: bool) -> bool {
        indian_food
    }

    async fn lookup(&self, query: &str) -> Result<Option<FoodRecord>> {
        Ok(self.table.find(query).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::food::Nutrients;

    fn record(name: &str) -> FoodRecord {
        FoodRecord {
            name: name.to_string(),
            nutrients: Nutrients::default(),
        }
    }

    fn table() -> CompositionTable {
        CompositionTable::from_records(vec![
            record("paneer curry"),
            record("palak paneer"),
            record("idli"),
        ])
    }

    #[test]
    fn exact_match_wins_over_substring() {
        let table = CompositionTable::from_records(vec![record("paneer butter"), record("paneer")]);
        assert_eq!(table.find("paneer").unwrap().name, "paneer");
    }

    #[test]
    fn entry_containing_query_matches_in_stored_order() {
        assert_eq!(table().find("paneer").unwrap().name, "paneer curry");
    }

    #[test]
    fn query_containing_entry_matches() {
        assert_eq!(table().find("idli with chutney").unwrap().name, "idli");
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(table().find("IDLI").unwrap().name, "idli");
        assert_eq!(table().find("Palak Paneer").unwrap().name, "palak paneer");
    }

    #[test]
    fn unknown_or_blank_queries_miss() {
        assert!(table().find("banana").is_none());
        assert!(table().find("").is_none());
    }

    #[test]
    fn bundled_dataset_parses_and_covers_aliases() {
        let table = CompositionTable::bundled().unwrap();
        assert!(table.find("idli").is_some());
        assert!(table.find("samosa, fried").is_some());
        assert!(table.find("gulab jamun (sweet)").is_some());
    }
}
