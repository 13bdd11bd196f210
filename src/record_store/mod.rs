/// Record store for submitted match results
///
/// Thin layer over the SQLite pool: the database assigns keys, and listings
/// come back in whatever order SQLite yields them.

pub mod models;

pub use models::{MatchResult, NewMatchResult};

use crate::error::ApiResult;
use models::MatchResultRow;
use sqlx::SqlitePool;

/// Match result persistence
#[derive(Clone)]
pub struct MatchResultStore {
    db: SqlitePool,
}

impl MatchResultStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Underlying pool, for readiness checks
    pub fn pool(&self) -> &SqlitePool {
        &self.db
    }

    /// Persist a new match result and return it with its assigned key
    pub async fn create(&self, result: NewMatchResult) -> ApiResult<MatchResult> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO match_result
                (map_name, hero_name, kills, objective_kills, objective_time, damage, heal, deaths, screenshot)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&result.map_name)
        .bind(&result.hero_name)
        .bind(result.kills)
        .bind(result.objective_kills)
        .bind(result.objective_time)
        .bind(result.damage)
        .bind(result.heal)
        .bind(result.deaths)
        .bind(&result.screenshot)
        .execute(&self.db)
        .await?;

        Ok(result.into_stored(inserted.last_insert_rowid().to_string()))
    }

    /// Fetch up to `limit` match results, unfiltered and unordered
    pub async fn query_all(&self, limit: u32) -> ApiResult<Vec<MatchResult>> {
        let rows = sqlx::query_as::<_, MatchResultRow>(
            r#"
            SELECT id, map_name, hero_name, kills, objective_kills, objective_time,
                   damage, heal, deaths, screenshot
            FROM match_result
            LIMIT ?
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(MatchResult::from).collect())
    }
}
