use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;

use super::RemoteId;

/// An upcoming assignment as normalized by the Canvas client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteAssignment {
    pub remote_id: RemoteId,
    pub title: String,
    pub course: String,
    pub due_date: NaiveDate,
}

/// Everything one sync pulls from Canvas before it touches the store.
#[derive(Debug, Clone, Default)]
pub struct RemoteSnapshot {
    /// Upcoming, unsubmitted, not past due.
    pub upcoming: Vec<RemoteAssignment>,
    /// Ids seen in the submitted or graded buckets.
    pub resolved: HashSet<RemoteId>,
    pub courses_seen: usize,
}
