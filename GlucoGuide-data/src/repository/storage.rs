use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use crate::database::DatabasePool;
use crate::models::{AdvisoryFlag, AdvisoryRecord, ReadingRecord, TargetRangeRecord};
use super::errors::RepositoryError;

const READING_COLUMNS: &str = "id, user_id, metric_family, value, unit, occurred_at, category, \
    value_before, value_after, pair_unit, duration_minutes, calories_burned, meal_items, notes, created_at";

const ADVISORY_COLUMNS: &str = "id, user_id, reading_id, category, priority, title, description, \
    suggested_action, trigger_type, trigger_payload, trigger_time, is_read, is_dismissed, action_taken, created_at";

/// Parse a JSON text column, reporting malformed content as a conversion failure
fn json_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<serde_json::Value>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(text) => serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))),
        None => Ok(None),
    }
}

fn reading_from_row(row: &Row<'_>) -> rusqlite::Result<ReadingRecord> {
    Ok(ReadingRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        metric_family: row.get(2)?,
        value: row.get(3)?,
        unit: row.get(4)?,
        occurred_at: row.get(5)?,
        category: row.get(6)?,
        value_before: row.get(7)?,
        value_after: row.get(8)?,
        pair_unit: row.get(9)?,
        duration_minutes: row.get(10)?,
        calories_burned: row.get(11)?,
        meal_items: json_column(row, 12)?,
        notes: row.get(13)?,
        created_at: row.get(14)?,
    })
}

fn advisory_from_row(row: &Row<'_>) -> rusqlite::Result<AdvisoryRecord> {
    Ok(AdvisoryRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        reading_id: row.get(2)?,
        category: row.get(3)?,
        priority: row.get(4)?,
        title: row.get(5)?,
        description: row.get(6)?,
        suggested_action: row.get(7)?,
        trigger_type: row.get(8)?,
        trigger_payload: json_column(row, 9)?.unwrap_or(serde_json::Value::Null),
        trigger_time: row.get(10)?,
        is_read: row.get(11)?,
        is_dismissed: row.get(12)?,
        action_taken: row.get(13)?,
        created_at: row.get(14)?,
    })
}

/// Database storage operations for readings, advisories and target ranges
pub struct DatabaseStorage;

impl DatabaseStorage {
    /// Store a reading in the database
    pub async fn store_reading(pool: &DatabasePool, reading: &ReadingRecord) -> Result<(), RepositoryError> {
        debug!("Storing reading in database: id={}", reading.id);

        let meal_items = reading.meal_items.as_ref().map(serde_json::to_string).transpose()?;

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                conn.execute(
                    &format!("INSERT INTO readings ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)", READING_COLUMNS),
                    params![
                        reading.id,
                        reading.user_id,
                        reading.metric_family,
                        reading.value,
                        reading.unit,
                        reading.occurred_at,
                        reading.category,
                        reading.value_before,
                        reading.value_after,
                        reading.pair_unit,
                        reading.duration_minutes,
                        reading.calories_burned,
                        meal_items,
                        reading.notes,
                        reading.created_at,
                    ],
                )?;
                Ok(())
            }
        }
    }

    /// Get a reading by ID from the database
    pub async fn get_reading(pool: &DatabasePool, id: &str) -> Result<Option<ReadingRecord>, RepositoryError> {
        debug!("Getting reading by ID from database: {}", id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let reading = conn.query_row(
                    &format!("SELECT {} FROM readings WHERE id = ?1", READING_COLUMNS),
                    params![id],
                    reading_from_row,
                ).optional()?;
                Ok(reading)
            }
        }
    }

    /// Readings of one user and family inside an inclusive time window, oldest first
    pub async fn readings_in_range(
        pool: &DatabasePool,
        user_id: &str,
        metric_family: &str,
        start: &str,
        end: &str,
    ) -> Result<Vec<ReadingRecord>, RepositoryError> {
        debug!("Querying {} readings for user {} between {} and {}", metric_family, user_id, start, end);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM readings
                     WHERE user_id = ?1 AND metric_family = ?2 AND occurred_at >= ?3 AND occurred_at <= ?4
                     ORDER BY occurred_at ASC, id ASC",
                    READING_COLUMNS
                ))?;

                let readings = stmt.query_map(params![user_id, metric_family, start, end], reading_from_row)?;

                let mut result = Vec::new();
                for reading in readings {
                    result.push(reading?);
                }
                Ok(result)
            }
        }
    }

    /// Delete a reading, returning whether a row was removed
    pub async fn delete_reading(pool: &DatabasePool, id: &str) -> Result<bool, RepositoryError> {
        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let affected = conn.execute("DELETE FROM readings WHERE id = ?1", params![id])?;
                Ok(affected > 0)
            }
        }
    }

    /// Store an advisory in the database
    pub async fn store_advisory(pool: &DatabasePool, advisory: &AdvisoryRecord) -> Result<(), RepositoryError> {
        debug!("Storing advisory in database: id={}, trigger={}", advisory.id, advisory.trigger_type);

        let payload = serde_json::to_string(&advisory.trigger_payload)?;

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                conn.execute(
                    &format!("INSERT INTO advisories ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)", ADVISORY_COLUMNS),
                    params![
                        advisory.id,
                        advisory.user_id,
                        advisory.reading_id,
                        advisory.category,
                        advisory.priority,
                        advisory.title,
                        advisory.description,
                        advisory.suggested_action,
                        advisory.trigger_type,
                        payload,
                        advisory.trigger_time,
                        advisory.is_read,
                        advisory.is_dismissed,
                        advisory.action_taken,
                        advisory.created_at,
                    ],
                )?;
                Ok(())
            }
        }
    }

    /// Get an advisory by ID from the database
    pub async fn get_advisory(pool: &DatabasePool, id: &str) -> Result<Option<AdvisoryRecord>, RepositoryError> {
        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let advisory = conn.query_row(
                    &format!("SELECT {} FROM advisories WHERE id = ?1", ADVISORY_COLUMNS),
                    params![id],
                    advisory_from_row,
                ).optional()?;
                Ok(advisory)
            }
        }
    }

    /// All advisories of a user, newest trigger time first
    pub async fn advisories_for_user(pool: &DatabasePool, user_id: &str) -> Result<Vec<AdvisoryRecord>, RepositoryError> {
        debug!("Listing advisories for user {}", user_id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM advisories WHERE user_id = ?1 ORDER BY trigger_time DESC, id ASC",
                    ADVISORY_COLUMNS
                ))?;

                let advisories = stmt.query_map(params![user_id], advisory_from_row)?;

                let mut result = Vec::new();
                for advisory in advisories {
                    result.push(advisory?);
                }
                Ok(result)
            }
        }
    }

    /// Set a state flag on an advisory and return the updated row
    pub async fn update_advisory_flag(
        pool: &DatabasePool,
        id: &str,
        flag: AdvisoryFlag,
    ) -> Result<Option<AdvisoryRecord>, RepositoryError> {
        debug!("Setting {} on advisory {}", flag.column(), id);

        let affected = match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                conn.execute(
                    &format!("UPDATE advisories SET {} = 1 WHERE id = ?1", flag.column()),
                    params![id],
                )?
            }
        };

        if affected == 0 {
            return Ok(None);
        }
        Self::get_advisory(pool, id).await
    }

    /// Delete an advisory, returning whether a row was removed
    pub async fn delete_advisory(pool: &DatabasePool, id: &str) -> Result<bool, RepositoryError> {
        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let affected = conn.execute("DELETE FROM advisories WHERE id = ?1", params![id])?;
                Ok(affected > 0)
            }
        }
    }

    /// Get the stored target range for a user and family
    pub async fn get_target_range(
        pool: &DatabasePool,
        user_id: &str,
        metric_family: &str,
    ) -> Result<Option<TargetRangeRecord>, RepositoryError> {
        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                let range = conn.query_row(
                    "SELECT user_id, metric_family, min_value, max_value, unit, updated_at
                     FROM target_ranges WHERE user_id = ?1 AND metric_family = ?2",
                    params![user_id, metric_family],
                    |row| Ok(TargetRangeRecord {
                        user_id: row.get(0)?,
                        metric_family: row.get(1)?,
                        min: row.get(2)?,
                        max: row.get(3)?,
                        unit: row.get(4)?,
                        updated_at: row.get(5)?,
                    }),
                ).optional()?;
                Ok(range)
            }
        }
    }

    /// Insert or replace a target range
    pub async fn upsert_target_range(pool: &DatabasePool, range: &TargetRangeRecord) -> Result<(), RepositoryError> {
        debug!("Upserting {} target range for user {}", range.metric_family, range.user_id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;
                conn.execute(
                    "INSERT INTO target_ranges (user_id, metric_family, min_value, max_value, unit, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     ON CONFLICT (user_id, metric_family) DO UPDATE SET
                        min_value = excluded.min_value,
                        max_value = excluded.max_value,
                        unit = excluded.unit,
                        updated_at = excluded.updated_at",
                    params![range.user_id, range.metric_family, range.min, range.max, range.unit, range.updated_at],
                )?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{create_in_memory_pool, DatabaseConfig};
    use serde_json::json;

    fn test_pool() -> DatabasePool {
        create_in_memory_pool(&DatabaseConfig::default()).unwrap()
    }

    fn meal_reading(id: &str, occurred_at: &str) -> ReadingRecord {
        ReadingRecord {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            metric_family: "meal".to_string(),
            value: 650.0,
            unit: "kcal".to_string(),
            occurred_at: occurred_at.to_string(),
            category: Some("lunch".to_string()),
            value_before: None,
            value_after: None,
            pair_unit: None,
            duration_minutes: None,
            calories_burned: None,
            meal_items: Some(json!([{ "name": "rice", "sugar": 1.0, "protein": 4.0 }])),
            notes: None,
            created_at: occurred_at.to_string(),
        }
    }

    #[tokio::test]
    async fn test_reading_roundtrip_keeps_meal_items() {
        let pool = test_pool();
        let reading = meal_reading("r-1", "2024-03-01T12:00:00.000Z");

        DatabaseStorage::store_reading(&pool, &reading).await.unwrap();
        let loaded = DatabaseStorage::get_reading(&pool, "r-1").await.unwrap();

        assert_eq!(loaded, Some(reading));
    }

    #[tokio::test]
    async fn test_readings_in_range_is_inclusive_and_sorted() {
        let pool = test_pool();
        for (id, at) in [
            ("late", "2024-03-03T00:00:00.000Z"),
            ("early", "2024-03-01T00:00:00.000Z"),
            ("outside", "2024-02-01T00:00:00.000Z"),
        ] {
            DatabaseStorage::store_reading(&pool, &meal_reading(id, at)).await.unwrap();
        }

        let readings = DatabaseStorage::readings_in_range(
            &pool, "user-1", "meal", "2024-03-01T00:00:00.000Z", "2024-03-03T00:00:00.000Z",
        ).await.unwrap();

        let ids: Vec<&str> = readings.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late"]);
    }

    #[tokio::test]
    async fn test_advisory_flags_persist() {
        let pool = test_pool();
        let advisory = AdvisoryRecord {
            id: "a-1".to_string(),
            user_id: "user-1".to_string(),
            reading_id: Some("r-1".to_string()),
            category: "alert".to_string(),
            priority: "high".to_string(),
            title: "Low blood sugar".to_string(),
            description: "55 mg/dL".to_string(),
            suggested_action: "Eat 15g of fast carbohydrates".to_string(),
            trigger_type: "blood_sugar_low".to_string(),
            trigger_payload: json!({ "reading_id": "r-1", "threshold": 70.0 }),
            trigger_time: "2024-03-01T08:00:00.000Z".to_string(),
            is_read: false,
            is_dismissed: false,
            action_taken: false,
            created_at: "2024-03-01T08:00:01.000Z".to_string(),
        };
        DatabaseStorage::store_advisory(&pool, &advisory).await.unwrap();

        let updated = DatabaseStorage::update_advisory_flag(&pool, "a-1", AdvisoryFlag::Dismissed)
            .await
            .unwrap()
            .unwrap();
        assert!(updated.is_dismissed);
        assert!(!updated.is_read);
        assert_eq!(updated.trigger_payload, advisory.trigger_payload);

        let missing = DatabaseStorage::update_advisory_flag(&pool, "nope", AdvisoryFlag::Read).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_target_range_upsert_replaces() {
        let pool = test_pool();
        let mut range = TargetRangeRecord {
            user_id: "user-1".to_string(),
            metric_family: "glucose".to_string(),
            min: 70.0,
            max: 180.0,
            unit: "mg/dL".to_string(),
            updated_at: "2024-03-01T00:00:00.000Z".to_string(),
        };
        DatabaseStorage::upsert_target_range(&pool, &range).await.unwrap();

        range.max = 160.0;
        DatabaseStorage::upsert_target_range(&pool, &range).await.unwrap();

        let stored = DatabaseStorage::get_target_range(&pool, "user-1", "glucose").await.unwrap();
        assert_eq!(stored.map(|r| r.max), Some(160.0));
    }
}
