/// Match result ingest and listing endpoints
use crate::{
    blob_store::DEFAULT_CONTENT_TYPE,
    context::AppContext,
    error::{ApiError, ApiResult},
    record_store::{MatchResult, NewMatchResult},
};
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use std::collections::HashMap;
use tracing::{debug, error, info};

/// Form part carrying the screenshot file
pub const SCREENSHOT_FIELD: &str = "screenshot1";

/// Build result routes
pub fn routes() -> Router<AppContext> {
    Router::new().route("/api/v1/results", get(list_results).post(create_result))
}

/// List stored match results
///
/// Returns at most `list_limit` records in the store's natural order.
async fn list_results(State(ctx): State<AppContext>) -> ApiResult<Json<Vec<MatchResult>>> {
    let results = ctx
        .results
        .query_all(ctx.config.service.list_limit)
        .await
        .map_err(|e| {
            error!("Failed to query match results: {}", e);
            e
        })?;

    Ok(Json(results))
}

/// Ingest a match result submitted as `multipart/form-data`
///
/// The screenshot is written to blob storage first; the record is only
/// persisted once it has a screenshot path. A record-write failure leaves
/// the blob in place.
async fn create_result(
    State(ctx): State<AppContext>,
    Query(query): Query<HashMap<String, String>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<MatchResult>> {
    let multipart = multipart.map_err(|rejection| {
        error!("Rejected multipart request: {}", rejection.body_text());
        ApiError::InvalidForm(rejection.body_text())
    })?;

    let mut submission = read_submission(multipart).await.map_err(|e| {
        error!("Failed to parse multipart form: {}", e);
        e
    })?;
    submission.apply_query(query);

    let screenshot = submission.screenshot.take().ok_or_else(|| {
        error!("FormFile error: no {} part in submission", SCREENSHOT_FIELD);
        ApiError::MissingFile(format!("no file submitted as {}", SCREENSHOT_FIELD))
    })?;

    let screenshot_path = ctx
        .blob_store
        .store(screenshot.data, &screenshot.content_type)
        .await
        .map_err(|e| {
            error!("Failed to store screenshot: {}", e);
            e
        })?;

    let new_result = submission.into_new_result(screenshot_path);
    debug!("Submission token: {:?}", new_result.token);

    let created = ctx.results.create(new_result).await.map_err(|e| {
        error!("Failed to persist match result: {}", e);
        e
    })?;

    info!(
        "Stored match result {} ({} / {}) with screenshot {}",
        created.key, created.map_name, created.hero_name, created.screenshot
    );

    Ok(Json(created))
}

/// Uploaded screenshot held in memory
#[derive(Debug)]
struct Screenshot {
    data: Vec<u8>,
    content_type: String,
}

/// Parts collected from one submission
#[derive(Debug, Default)]
struct Submission {
    screenshot: Option<Screenshot>,
    /// Text parts by name; the first occurrence of a name wins
    fields: HashMap<String, String>,
}

impl Submission {
    /// Query-string values take precedence over form parts of the same name
    fn apply_query(&mut self, query: HashMap<String, String>) {
        self.fields.extend(query);
    }

    fn text(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    fn counter(&self, name: &str) -> i64 {
        parse_counter(self.fields.get(name).map(String::as_str))
    }

    fn into_new_result(self, screenshot: String) -> NewMatchResult {
        NewMatchResult {
            token: self.text("token"),
            map_name: self.text("map_name"),
            hero_name: self.text("hero_name"),
            kills: self.counter("kills"),
            objective_kills: self.counter("objective_kills"),
            objective_time: self.counter("objective_time"),
            damage: self.counter("objective_damage"),
            heal: self.counter("heal"),
            deaths: self.counter("deaths"),
            screenshot,
        }
    }
}

/// Drain the multipart stream into a [`Submission`]
///
/// Only file parts count as the screenshot, and only text parts count as
/// fields. Unknown names are kept but never read.
async fn read_submission(mut multipart: Multipart) -> ApiResult<Submission> {
    let mut submission = Submission::default();

    while let Some(field) = multipart.next_field().await.map_err(from_multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        // Browsers send `filename=""` when no file was chosen
        let is_file = field.file_name().is_some_and(|n| !n.is_empty());

        if name == SCREENSHOT_FIELD && is_file {
            if submission.screenshot.is_some() {
                continue;
            }
            let content_type = field
                .content_type()
                .filter(|ct| !ct.is_empty())
                .unwrap_or(DEFAULT_CONTENT_TYPE)
                .to_string();
            let data = field.bytes().await.map_err(from_multipart_error)?;
            submission.screenshot = Some(Screenshot {
                data: data.to_vec(),
                content_type,
            });
        } else if !is_file {
            let value = field.text().await.map_err(from_multipart_error)?;
            submission.fields.entry(name).or_insert(value);
        }
    }

    Ok(submission)
}

fn from_multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::InvalidForm(err.body_text())
    }
}

/// Parse a base-10 counter, falling back to zero for missing, malformed or negative input
fn parse_counter(value: Option<&str>) -> i64 {
    value
        .and_then(|v| v.parse::<i64>().ok())
        .filter(|v| *v >= 0)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_counter() {
        assert_eq!(parse_counter(Some("5")), 5);
        assert_eq!(parse_counter(Some("+7")), 7);
        assert_eq!(parse_counter(Some("bad")), 0);
        assert_eq!(parse_counter(Some("")), 0);
        assert_eq!(parse_counter(Some(" 5")), 0);
        assert_eq!(parse_counter(Some("-3")), 0);
        assert_eq!(parse_counter(Some("99999999999999999999999")), 0);
        assert_eq!(parse_counter(None), 0);
    }

    #[test]
    fn test_submission_maps_form_names() {
        let mut submission = Submission::default();
        for (name, value) in [
            ("token", "abc"),
            ("map_name", "Hanamura"),
            ("hero_name", "Genji"),
            ("kills", "5"),
            ("objective_kills", "bad"),
            ("objective_time", "42"),
            ("objective_damage", "9001"),
            ("heal", ""),
            ("deaths", "2"),
        ] {
            submission.fields.insert(name.to_string(), value.to_string());
        }

        let result = submission.into_new_result("/fs/overstat/x".to_string());
        assert_eq!(result.token, "abc");
        assert_eq!(result.map_name, "Hanamura");
        assert_eq!(result.hero_name, "Genji");
        assert_eq!(result.kills, 5);
        assert_eq!(result.objective_kills, 0);
        assert_eq!(result.objective_time, 42);
        assert_eq!(result.damage, 9001);
        assert_eq!(result.heal, 0);
        assert_eq!(result.deaths, 2);
        assert_eq!(result.screenshot, "/fs/overstat/x");
    }

    #[test]
    fn test_query_values_override_form_parts() {
        let mut submission = Submission::default();
        submission
            .fields
            .insert("map_name".to_string(), "Ilios".to_string());
        submission.fields.insert("kills".to_string(), "2".to_string());

        submission.apply_query(HashMap::from([
            ("map_name".to_string(), "Dorado".to_string()),
            ("deaths".to_string(), "4".to_string()),
        ]));

        let result = submission.into_new_result("/fs/overstat/z".to_string());
        assert_eq!(result.map_name, "Dorado");
        assert_eq!(result.kills, 2);
        assert_eq!(result.deaths, 4);
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let result = Submission::default().into_new_result("/fs/overstat/y".to_string());
        assert_eq!(
            result,
            NewMatchResult {
                screenshot: "/fs/overstat/y".to_string(),
                ..Default::default()
            }
        );
    }
}
