use rusqlite::Connection;
use tracing::info;

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    info!("Running SQLite migrations");

    create_readings_table(conn)?;
    create_advisories_table(conn)?;
    create_target_ranges_table(conn)?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

/// Create the readings table and its range-query index
fn create_readings_table(conn: &Connection) -> Result<(), String> {
    info!("Creating readings table if not exists");

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS readings (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            metric_family TEXT NOT NULL,
            value REAL NOT NULL,
            unit TEXT NOT NULL,
            occurred_at TEXT NOT NULL,
            category TEXT,
            value_before REAL,
            value_after REAL,
            pair_unit TEXT,
            duration_minutes INTEGER,
            calories_burned REAL,
            meal_items TEXT,
            notes TEXT,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_readings_user_family_time
        ON readings (user_id, metric_family, occurred_at);"
    ).map_err(|e| format!("Failed to create readings table: {}", e))?;

    Ok(())
}

/// Create the advisories table
fn create_advisories_table(conn: &Connection) -> Result<(), String> {
    info!("Creating advisories table if not exists");

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS advisories (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            reading_id TEXT,
            category TEXT NOT NULL,
            priority TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            suggested_action TEXT NOT NULL,
            trigger_type TEXT NOT NULL,
            trigger_payload TEXT NOT NULL,
            trigger_time TEXT NOT NULL,
            is_read INTEGER NOT NULL DEFAULT 0,
            is_dismissed INTEGER NOT NULL DEFAULT 0,
            action_taken INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_advisories_user_time
        ON advisories (user_id, trigger_time DESC);"
    ).map_err(|e| format!("Failed to create advisories table: {}", e))?;

    Ok(())
}

/// Create the per-user target ranges table
fn create_target_ranges_table(conn: &Connection) -> Result<(), String> {
    info!("Creating target_ranges table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS target_ranges (
            user_id TEXT NOT NULL,
            metric_family TEXT NOT NULL,
            min_value REAL NOT NULL,
            max_value REAL NOT NULL,
            unit TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (user_id, metric_family)
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}
