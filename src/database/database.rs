use log::info;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio_rusqlite::Connection;

use crate::food::Nutrients;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] tokio_rusqlite::Error),
    #[error("Database connection error: {0}")]
    Connection(String),
}

/// One logged food: what was eaten, at which meal, with which macros.
#[derive(Debug, Clone, Serialize)]
pub struct FoodEntry {
    pub id: i64,
    #[serde(rename = "mealType")]
    pub meal_type: String,
    pub name: String,
    pub nutrients: Nutrients,
    pub date: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

#[derive(Clone)]
pub struct Database {
    conn: Arc<Connection>,
}

impl Database {
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        let db = Self {
            conn: Arc::new(conn),
        };
        db.initialize().await?;
        Ok(db)
    }

    async fn initialize(&self) -> Result<(), DatabaseError> {
        // Create tables if they don't exist
        self.conn
            .call(|conn| {
                conn.execute_batch(
                    "CREATE TABLE IF NOT EXISTS food_log (
                        id INTEGER PRIMARY KEY,
                        meal_type TEXT NOT NULL,
                        name TEXT NOT NULL,
                        calories REAL NOT NULL DEFAULT 0,
                        protein_g REAL NOT NULL DEFAULT 0,
                        carbs_g REAL NOT NULL DEFAULT 0,
                        fats_g REAL NOT NULL DEFAULT 0,
                        date TEXT NOT NULL,
                        created_at DATETIME DEFAULT CURRENT_TIMESTAMP
                    );
                    CREATE INDEX IF NOT EXISTS idx_food_log_date ON food_log(date);",
                )
            })
            .await?;

        info!("Database initialized successfully");
        Ok(())
    }

    pub async fn save_food(
        &self,
        meal_type: String,
        name: String,
        nutrients: Nutrients,
        date: String,
    ) -> Result<i64, DatabaseError> {
        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO food_log (meal_type, name, calories, protein_g, carbs_g, fats_g, date)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    [
                        &meal_type,
                        &name,
                        &nutrients.calories.to_string(),
                        &nutrients.protein_g.to_string(),
                        &nutrients.carbs_g.to_string(),
                        &nutrients.fats_g.to_string(),
                        &date,
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await?;

        Ok(id)
    }

    pub async fn foods_for_date(&self, date: String) -> Result<Vec<FoodEntry>, DatabaseError> {
        let entries = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, meal_type, name, calories, protein_g, carbs_g, fats_g, date, created_at
                     FROM food_log
                     WHERE date = ?1
                     ORDER BY created_at DESC, id DESC",
                )?;

                let rows = stmt.query_map([&date], |row| {
                    Ok(FoodEntry {
                        id: row.get(0)?,
                        meal_type: row.get(1)?,
                        name: row.get(2)?,
                        nutrients: Nutrients {
                            calories: row.get(3)?,
                            protein_g: row.get(4)?,
                            carbs_g: row.get(5)?,
                            fats_g: row.get(6)?,
                        },
                        date: row.get(7)?,
                        created_at: row.get(8)?,
                    })
                })?;

                let mut entries = Vec::new();
                for row in rows {
                    entries.push(row?);
                }

                Ok(entries)
            })
            .await?;

        Ok(entries)
    }

    pub async fn delete_food(&self, id: i64) -> Result<bool, DatabaseError> {
        let deleted = self
            .conn
            .call(move |conn| {
                let affected = conn.execute("DELETE FROM food_log WHERE id = ?1", [id])?;
                Ok(affected > 0)
            })
            .await?;

        Ok(deleted)
    }

    /// Macro totals for one day, summed in SQL.
    pub async fn daily_summary(&self, date: String) -> Result<Nutrients, DatabaseError> {
        let totals = self
            .conn
            .call(move |conn| {
                conn.query_row(
                    "SELECT COALESCE(SUM(calories), 0), COALESCE(SUM(protein_g), 0),
                            COALESCE(SUM(carbs_g), 0), COALESCE(SUM(fats_g), 0)
                     FROM food_log
                     WHERE date = ?1",
                    [&date],
                    |row| {
                        Ok(Nutrients {
                            calories: row.get(0)?,
                            protein_g: row.get(1)?,
                            carbs_g: row.get(2)?,
                            fats_g: row.get(3)?,
                        })
                    },
                )
            })
            .await?;

        Ok(totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        Database::new(":memory:").await.expect("in-memory database")
    }

    fn nutrients(calories: f64, protein: f64, carbs: f64, fats: f64) -> Nutrients {
        Nutrients {
            calories,
            protein_g: protein,
            carbs_g: carbs,
            fats_g: fats,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[tokio::test]
    async fn saved_foods_come_back_for_their_date() {
        let db = test_db().await;

        db.save_food(
            "Breakfast".to_string(),
            "idli".to_string(),
            nutrients(58.0, 1.6, 12.3, 0.1),
            "2025-01-15".to_string(),
        )
        .await
        .unwrap();
        db.save_food(
            "Lunch".to_string(),
            "poha".to_string(),
            nutrients(180.0, 3.8, 29.4, 5.0),
            "2025-01-16".to_string(),
        )
        .await
        .unwrap();

        let entries = db.foods_for_date("2025-01-15".to_string()).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "idli");
        assert_eq!(entries[0].meal_type, "Breakfast");
        assert!(close(entries[0].nutrients.calories, 58.0));
    }

    #[tokio::test]
    async fn daily_summary_sums_macros_for_the_day_only() {
        let db = test_db().await;

        db.save_food(
            "Breakfast".to_string(),
            "idli".to_string(),
            nutrients(58.0, 1.6, 12.3, 0.1),
            "2025-01-15".to_string(),
        )
        .await
        .unwrap();
        db.save_food(
            "Lunch".to_string(),
            "dosa".to_string(),
            nutrients(168.0, 3.9, 29.0, 3.7),
            "2025-01-15".to_string(),
        )
        .await
        .unwrap();
        db.save_food(
            "Dinner".to_string(),
            "kheer".to_string(),
            nutrients(182.0, 4.8, 27.5, 5.6),
            "2025-01-16".to_string(),
        )
        .await
        .unwrap();

        let totals = db.daily_summary("2025-01-15".to_string()).await.unwrap();
        assert!(close(totals.calories, 226.0));
        assert!(close(totals.protein_g, 5.5));
        assert!(close(totals.carbs_g, 41.3));
        assert!(close(totals.fats_g, 3.8));
    }

    #[tokio::test]
    async fn summary_of_an_empty_day_is_all_zeroes() {
        let db = test_db().await;
        let totals = db.daily_summary("2025-01-15".to_string()).await.unwrap();
        assert_eq!(totals.calories, 0.0);
        assert_eq!(totals.protein_g, 0.0);
    }

    #[tokio::test]
    async fn delete_reports_missing_entries() {
        let db = test_db().await;

        let id = db
            .save_food(
                "Snack".to_string(),
                "jalebi".to_string(),
                nutrients(150.0, 1.1, 22.3, 6.7),
                "2025-01-15".to_string(),
            )
            .await
            .unwrap();

        assert!(db.delete_food(id).await.unwrap());
        assert!(!db.delete_food(id).await.unwrap());
        assert!(db
            .foods_for_date("2025-01-15".to_string())
            .await
            .unwrap()
            .is_empty());
    }
}
