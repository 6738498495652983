use serde::Deserialize;

use crate::models::RemoteId;

/// Canvas course ids are integers; they are placed in request paths as-is.
#[derive(Debug, Deserialize)]
pub struct Course {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub course_code: Option<String>,
}

impl Course {
    /// `name`, then `course_code`, then a placeholder built from the id.
    pub fn display_name(&self, id: i64) -> String {
        [self.name.as_deref(), self.course_code.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Course {}", id))
    }
}

#[derive(Debug, Deserialize)]
pub struct Assignment {
    pub id: RemoteId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub due_at: Option<String>,
}

/// Named assignment views offered by the Canvas assignments endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Upcoming,
    Submitted,
    Graded,
}

impl Bucket {
    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::Upcoming => "upcoming",
            Bucket::Submitted => "submitted",
            Bucket::Graded => "graded",
        }
    }

    pub fn path(self, course_id: i64) -> String {
        match self {
            Bucket::Upcoming => format!(
                "/api/v1/courses/{}/assignments?bucket=upcoming&per_page=100&order_by=due_at",
                course_id
            ),
            other => format!(
                "/api/v1/courses/{}/assignments?bucket={}&per_page=100",
                course_id,
                other.as_str()
            ),
        }
    }
}
