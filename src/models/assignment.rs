use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity assigned by Canvas. Canvas hands out integers, but ids are
/// accepted as strings too so a differently shaped payload still round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RemoteId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteId::Int(id) => write!(f, "{}", id),
            RemoteId::Text(id) => f.write_str(id),
        }
    }
}

/// Where a record came from. Manual records are keyed by their local `id`,
/// remote records by `remote_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "origin", rename_all = "snake_case")]
pub enum Origin {
    Manual,
    Remote { remote_id: RemoteId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Milestone {
    #[serde(rename = "3_days")]
    ThreeDays,
    #[serde(rename = "1_day")]
    OneDay,
    #[serde(rename = "morning")]
    Morning,
}

impl Milestone {
    pub const ALL: [Milestone; 3] = [Milestone::ThreeDays, Milestone::OneDay, Milestone::Morning];

    /// Days before the due date on which this milestone fires.
    pub fn days_before_due(self) -> i64 {
        match self {
            Milestone::ThreeDays => 3,
            Milestone::OneDay => 1,
            Milestone::Morning => 0,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Milestone::ThreeDays => "3_days",
            Milestone::OneDay => "1_day",
            Milestone::Morning => "morning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    #[serde(flatten)]
    pub origin: Origin,
    pub title: String,
    pub course: String,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub notifications_sent: BTreeSet<Milestone>,
}

impl Assignment {
    pub fn manual(title: String, course: String, due_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            origin: Origin::Manual,
            title,
            course,
            due_date,
            completed: false,
            notifications_sent: BTreeSet::new(),
        }
    }

    pub fn remote_id(&self) -> Option<&RemoteId> {
        match &self.origin {
            Origin::Remote { remote_id } => Some(remote_id),
            Origin::Manual => None,
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(self.origin, Origin::Manual)
    }

    pub fn days_until_due(&self, today: NaiveDate) -> i64 {
        (self.due_date - today).num_days()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAssignmentRequest {
    pub title: String,
    pub course: String,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAssignmentRequest {
    pub completed: Option<bool>,
}
