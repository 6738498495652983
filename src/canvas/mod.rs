pub mod dto;

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use reqwest::{Client, StatusCode, header::LINK};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::CanvasConfig;
use crate::error::AppError;
use crate::models::{RemoteAssignment, RemoteSnapshot};

use self::dto::Bucket;

const COURSES_PATH: &str = "/api/v1/courses?enrollment_state=active&enrollment_type=student&state[]=available&per_page=50";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[async_trait]
pub trait CanvasClient: Send + Sync {
    /// Pulls the upcoming assignments of every active course plus the ids
    /// already submitted or graded. `today` drops anything already past due.
    async fn fetch_snapshot(&self, today: NaiveDate) -> Result<RemoteSnapshot, AppError>;
}

pub struct CanvasHttpClient {
    client: Client,
    config: CanvasConfig,
}

#[derive(Debug)]
enum FetchError {
    Unauthorized,
    Status(StatusCode, String),
    Transport(String),
    Malformed(String),
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Unauthorized => AppError::Authentication(
                "Canvas API token is invalid or expired. Update CANVAS_TOKEN.".to_string(),
            ),
            FetchError::Status(status, body) => {
                AppError::Transport(format!("Canvas HTTP {}: {}", status, body))
            }
            FetchError::Transport(msg) => AppError::Transport(msg),
            FetchError::Malformed(msg) => AppError::MalformedRemoteData(msg),
        }
    }
}

impl CanvasHttpClient {
    pub fn new(config: CanvasConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// Fetches every page of a list endpoint, following `Link: rel="next"`.
    /// A next link that points back to a page already fetched is an error.
    async fn get_all(&self, path: &str) -> Result<Vec<serde_json::Value>, FetchError> {
        let mut results = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(format!("{}{}", self.config.base_url, path));

        while let Some(url) = next.take() {
            if !visited.insert(url.clone()) {
                return Err(FetchError::Malformed(format!(
                    "Canvas pagination revisits {}",
                    url
                )));
            }

            debug!("GET {}", url);
            let response = self
                .client
                .get(&url)
                .header("Authorization", format!("Bearer {}", self.config.token))
                .send()
                .await
                .map_err(|e| {
                    FetchError::Transport(format!(
                        "Could not reach Canvas ({}): {}",
                        self.config.base_url, e
                    ))
                })?;

            let status = response.status();
            if status == StatusCode::UNAUTHORIZED {
                return Err(FetchError::Unauthorized);
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(FetchError::Status(status, body));
            }

            next = response
                .headers()
                .get(LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(next_link);

            let body = response
                .text()
                .await
                .map_err(|e| FetchError::Transport(format!("Failed to read Canvas response: {}", e)))?;
            let page: Vec<serde_json::Value> = serde_json::from_str(&body).map_err(|e| {
                FetchError::Malformed(format!("Expected a JSON array from {}: {}", url, e))
            })?;
            results.extend(page);
        }

        Ok(results)
    }

    async fn fetch_courses(&self) -> Result<Vec<(i64, String)>, AppError> {
        let raw = self.get_all(COURSES_PATH).await?;
        let courses = parse_entries::<dto::Course>(raw, "course")?
            .into_iter()
            .filter_map(|course| {
                let id = course.id?;
                Some((id, course.display_name(id)))
            })
            .collect();
        Ok(courses)
    }

    /// A course that refuses one bucket (403/404) is skipped rather than
    /// failing the whole sync.
    async fn fetch_bucket(
        &self,
        course_id: i64,
        bucket: Bucket,
    ) -> Result<Vec<dto::Assignment>, AppError> {
        let raw = match self.get_all(&bucket.path(course_id)).await {
            Ok(raw) => raw,
            Err(FetchError::Status(status, _))
                if status == StatusCode::FORBIDDEN || status == StatusCode::NOT_FOUND =>
            {
                warn!(
                    "Skipping {} assignments for course {}: Canvas answered {}",
                    bucket.as_str(),
                    course_id,
                    status
                );
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        Ok(parse_entries(raw, "assignment")?)
    }
}

/// Decodes list entries. Non-object entries are skipped; an object that does
/// not fit `T` fails the whole fetch.
fn parse_entries<T: DeserializeOwned>(
    raw: Vec<serde_json::Value>,
    what: &str,
) -> Result<Vec<T>, FetchError> {
    let mut out = Vec::with_capacity(raw.len());
    for item in raw {
        if !item.is_object() {
            warn!("Skipping non-object {} entry: {}", what, item);
            continue;
        }
        let parsed = serde_json::from_value(item)
            .map_err(|e| FetchError::Malformed(format!("Unexpected {} entry: {}", what, e)))?;
        out.push(parsed);
    }
    Ok(out)
}

#[async_trait]
impl CanvasClient for CanvasHttpClient {
    async fn fetch_snapshot(&self, today: NaiveDate) -> Result<RemoteSnapshot, AppError> {
        let courses = self.fetch_courses().await?;
        let mut snapshot = RemoteSnapshot {
            courses_seen: courses.len(),
            ..RemoteSnapshot::default()
        };

        for (course_id, course_name) in &courses {
            let upcoming = self.fetch_bucket(*course_id, Bucket::Upcoming).await?;
            snapshot
                .upcoming
                .extend(normalize_upcoming(&upcoming, course_name, today, &chrono::Local)?);

            for bucket in [Bucket::Submitted, Bucket::Graded] {
                for a in self.fetch_bucket(*course_id, bucket).await? {
                    snapshot.resolved.insert(a.id);
                }
            }
        }

        info!(
            "Fetched {} upcoming and {} resolved assignments across {} courses",
            snapshot.upcoming.len(),
            snapshot.resolved.len(),
            snapshot.courses_seen
        );
        Ok(snapshot)
    }
}

/// Extracts the `rel="next"` target from an RFC 8288 `Link` header.
pub fn next_link(header: &str) -> Option<String> {
    for part in header.split(',') {
        let mut pieces = part.trim().split(';');
        let Some(target) = pieces.next() else {
            continue;
        };
        if pieces.any(|p| p.trim() == r#"rel="next""#) {
            return Some(target.trim().trim_start_matches('<').trim_end_matches('>').to_string());
        }
    }
    None
}

/// Parses a Canvas timestamp. A `Z` (or `UTC`) suffix means a zero offset;
/// a timestamp without any zone is read as UTC.
pub fn parse_due_at(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    let bare = raw
        .strip_suffix("UTC")
        .or_else(|| raw.strip_suffix('Z'))
        .or_else(|| raw.strip_suffix('z'))
        .unwrap_or(raw)
        .trim_end();
    NaiveDateTime::parse_from_str(bare, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(bare, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// The calendar date of a Canvas due timestamp in the given zone.
pub fn local_due_date<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<NaiveDate> {
    parse_due_at(raw).map(|dt| dt.with_timezone(tz).date_naive())
}

/// Turns one course's upcoming bucket into candidates: undated and already
/// past assignments are dropped. A due timestamp that cannot be parsed is
/// malformed data.
pub fn normalize_upcoming<Tz: TimeZone>(
    items: &[dto::Assignment],
    course: &str,
    today: NaiveDate,
    tz: &Tz,
) -> Result<Vec<RemoteAssignment>, AppError> {
    let mut out = Vec::new();
    for item in items {
        let Some(raw) = item.due_at.as_deref().filter(|raw| !raw.trim().is_empty()) else {
            continue;
        };
        let due_date = local_due_date(raw, tz).ok_or_else(|| {
            AppError::MalformedRemoteData(format!(
                "assignment {} has unparseable due_at {:?}",
                item.id, raw
            ))
        })?;
        if due_date < today {
            continue;
        }

        out.push(RemoteAssignment {
            remote_id: item.id.clone(),
            title: item
                .name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Unnamed Assignment".to_string()),
            course: course.to_string(),
            due_date,
        });
    }
    Ok(out)
}
