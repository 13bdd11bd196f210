/// Match result data models
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored match result
///
/// Serialized with the field names clients already consume
/// (`Key`, `MapName`, ..., `ScreenShot`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MatchResult {
    /// Opaque key assigned by the record store
    pub key: String,
    pub map_name: String,
    pub hero_name: String,
    pub kills: i64,
    pub objective_kills: i64,
    pub objective_time: i64,
    pub damage: i64,
    pub heal: i64,
    pub deaths: i64,
    #[serde(rename = "ScreenShot")]
    pub screenshot: String,
}

/// A match result as submitted, before the store assigns it a key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewMatchResult {
    /// Correlation token; accepted with the submission but never persisted
    pub token: String,
    pub map_name: String,
    pub hero_name: String,
    pub kills: i64,
    pub objective_kills: i64,
    pub objective_time: i64,
    pub damage: i64,
    pub heal: i64,
    pub deaths: i64,
    pub screenshot: String,
}

impl NewMatchResult {
    /// Attach the store-assigned key
    pub fn into_stored(self, key: String) -> MatchResult {
        MatchResult {
            key,
            map_name: self.map_name,
            hero_name: self.hero_name,
            kills: self.kills,
            objective_kills: self.objective_kills,
            objective_time: self.objective_time,
            damage: self.damage,
            heal: self.heal,
            deaths: self.deaths,
            screenshot: self.screenshot,
        }
    }
}

/// Row in the `match_result` table
#[derive(Debug, FromRow)]
pub(crate) struct MatchResultRow {
    pub id: i64,
    pub map_name: String,
    pub hero_name: String,
    pub kills: i64,
    pub objective_kills: i64,
    pub objective_time: i64,
    pub damage: i64,
    pub heal: i64,
    pub deaths: i64,
    pub screenshot: String,
}

impl From<MatchResultRow> for MatchResult {
    fn from(row: MatchResultRow) -> Self {
        Self {
            key: row.id.to_string(),
            map_name: row.map_name,
            hero_name: row.hero_name,
            kills: row.kills,
            objective_kills: row.objective_kills,
            objective_time: row.objective_time,
            damage: row.damage,
            heal: row.heal,
            deaths: row.deaths,
            screenshot: row.screenshot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let result = NewMatchResult {
            token: "secret-token".to_string(),
            map_name: "Hanamura".to_string(),
            hero_name: "Tracer".to_string(),
            kills: 5,
            screenshot: "/fs/overstat/abc".to_string(),
            ..Default::default()
        }
        .into_stored("7".to_string());

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "Key": "7",
                "MapName": "Hanamura",
                "HeroName": "Tracer",
                "Kills": 5,
                "ObjectiveKills": 0,
                "ObjectiveTime": 0,
                "Damage": 0,
                "Heal": 0,
                "Deaths": 0,
                "ScreenShot": "/fs/overstat/abc"
            })
        );
        assert!(!json.to_string().contains("secret-token"));
    }
}
