//! Schema migrations for storage.duckdb and logs.duckdb
//!
//! Each database embeds its own ordered list of `(file name, sql)` pairs.
//! The first entry creates `sys_migrations` with `IF NOT EXISTS`, so it is
//! safe to execute on every open; the rest run once and are recorded there.

use std::collections::HashSet;

use anyhow::{Context, Result};
use duckdb::Connection;

/// Migrations applied by one [`apply`] call
#[derive(Debug, Default)]
pub struct MigrationResult {
    pub applied: Vec<String>,
}

/// Bring `conn` up to date with `migrations`
pub fn apply(conn: &Connection, migrations: &[(&str, &str)]) -> Result<MigrationResult> {
    let Some(((_, bootstrap), _)) = migrations.split_first() else {
        return Ok(MigrationResult::default());
    };
    conn.execute_batch(bootstrap)
        .context("Failed to create sys_migrations")?;

    let done: HashSet<String> = {
        let mut stmt = conn.prepare("SELECT migration_name FROM sys_migrations")?;
        let names: HashSet<String> = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<_, _>>()?;
        names
    };

    let mut result = MigrationResult::default();
    for (index, (name, sql)) in migrations.iter().enumerate() {
        if done.contains(*name) {
            continue;
        }
        if index > 0 {
            conn.execute_batch(sql)
                .with_context(|| format!("Migration {} failed", name))?;
        }
        conn.execute("INSERT INTO sys_migrations (migration_name) VALUES (?)", [*name])?;
        result.applied.push(name.to_string());
    }
    Ok(result)
}
