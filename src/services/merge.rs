//! Reconciliation of the local store against a Canvas snapshot.
//!
//! Manual records pass through untouched. Remote records are keyed by
//! `remote_id`: refreshed when still upcoming, marked complete when Canvas
//! reports them submitted or graded, and dropped when they vanish from the
//! upcoming view without being resolved or completed.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::models::{Assignment, Origin, RemoteAssignment, RemoteId, RemoteSnapshot};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStats {
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
    pub auto_completed: usize,
    pub total_remote: usize,
    pub courses_seen: usize,
}

pub fn reconcile(existing: Vec<Assignment>, snapshot: &RemoteSnapshot) -> (Vec<Assignment>, SyncStats) {
    let mut manual = Vec::new();
    let mut by_remote: HashMap<RemoteId, Assignment> = HashMap::new();

    for record in existing {
        let Some(remote_id) = record.remote_id().cloned() else {
            manual.push(record);
            continue;
        };
        if by_remote.contains_key(&remote_id) {
            warn!("Dropping duplicate local row for Canvas assignment {}", remote_id);
            continue;
        }
        by_remote.insert(remote_id, record);
    }

    let mut stats = SyncStats {
        courses_seen: snapshot.courses_seen,
        ..SyncStats::default()
    };
    let mut reconciled = Vec::with_capacity(snapshot.upcoming.len() + by_remote.len());
    let mut seen: HashSet<&RemoteId> = HashSet::new();

    for candidate in &snapshot.upcoming {
        if !seen.insert(&candidate.remote_id) {
            continue;
        }

        match by_remote.remove(&candidate.remote_id) {
            Some(mut row) => {
                if refresh(&mut row, candidate) {
                    stats.updated += 1;
                }
                if snapshot.resolved.contains(&candidate.remote_id) && mark_completed(&mut row) {
                    stats.auto_completed += 1;
                }
                reconciled.push(row);
            }
            None => {
                reconciled.push(new_remote_record(candidate));
                stats.added += 1;
            }
        }
    }

    // Rows Canvas no longer lists as upcoming.
    for (remote_id, mut row) in by_remote {
        if snapshot.resolved.contains(&remote_id) {
            if mark_completed(&mut row) {
                stats.auto_completed += 1;
            }
            reconciled.push(row);
        } else if row.completed {
            reconciled.push(row);
        } else {
            stats.removed += 1;
        }
    }

    reconciled.sort_by(|a, b| {
        a.due_date
            .cmp(&b.due_date)
            .then_with(|| a.remote_id().cmp(&b.remote_id()))
    });
    stats.total_remote = reconciled.len();

    manual.extend(reconciled);
    (manual, stats)
}

/// Copies the Canvas-owned fields onto `row`. Returns whether any changed.
fn refresh(row: &mut Assignment, candidate: &RemoteAssignment) -> bool {
    let changed = row.title != candidate.title
        || row.course != candidate.course
        || row.due_date != candidate.due_date;

    row.title = candidate.title.clone();
    row.course = candidate.course.clone();
    row.due_date = candidate.due_date;
    row.origin = Origin::Remote {
        remote_id: candidate.remote_id.clone(),
    };
    changed
}

fn mark_completed(row: &mut Assignment) -> bool {
    if row.completed {
        return false;
    }
    row.completed = true;
    true
}

fn new_remote_record(candidate: &RemoteAssignment) -> Assignment {
    Assignment {
        id: Uuid::new_v4().to_string(),
        origin: Origin::Remote {
            remote_id: candidate.remote_id.clone(),
        },
        title: candidate.title.clone(),
        course: candidate.course.clone(),
        due_date: candidate.due_date,
        completed: false,
        notifications_sent: BTreeSet::new(),
    }
}
