use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::delivery::{Notification, Notifier};
use crate::error::AppError;
use crate::models::{Assignment, Milestone};
use crate::store::Store;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub assignment_id: String,
    pub milestone: Milestone,
    pub notification: Notification,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotificationReport {
    pub announced: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// The milestone that fires for `assignment` on `today`, if any.
/// Past-due assignments never fire.
pub fn due_milestone(assignment: &Assignment, today: NaiveDate) -> Option<Milestone> {
    let days = assignment.days_until_due(today);
    if days < 0 {
        return None;
    }
    Milestone::ALL
        .into_iter()
        .find(|m| m.days_before_due() == days && !assignment.notifications_sent.contains(m))
}

/// Records every milestone due today in `notifications_sent` and returns what
/// should be announced. Tags are only ever added.
pub fn plan_announcements(
    assignments: &mut [Assignment],
    today: NaiveDate,
    notify_completed: bool,
) -> Vec<Announcement> {
    let mut out = Vec::new();
    for assignment in assignments.iter_mut() {
        if assignment.completed && !notify_completed {
            continue;
        }
        let Some(milestone) = due_milestone(assignment, today) else {
            continue;
        };

        assignment.notifications_sent.insert(milestone);
        out.push(Announcement {
            assignment_id: assignment.id.clone(),
            milestone,
            notification: compose(assignment, milestone),
        });
    }
    out
}

pub fn compose(assignment: &Assignment, milestone: Milestone) -> Notification {
    let course = &assignment.course;
    let title = &assignment.title;
    match milestone {
        Milestone::ThreeDays => Notification {
            title: format!("Due in 3 days: {}", course),
            message: format!("{} is due {}", title, assignment.due_date.format("%A, %B %d")),
        },
        Milestone::OneDay => Notification {
            title: format!("Due TOMORROW: {}", course),
            message: format!("{} is due tomorrow!", title),
        },
        Milestone::Morning => Notification {
            title: format!("Due TODAY: {}", course),
            message: format!("{} is due today. Good luck!", title),
        },
    }
}

pub struct NotificationService {
    store: Arc<Store>,
    channels: Vec<Arc<dyn Notifier>>,
    notify_completed: bool,
}

impl NotificationService {
    pub fn new(store: Arc<Store>, channels: Vec<Arc<dyn Notifier>>, notify_completed: bool) -> Self {
        Self {
            store,
            channels,
            notify_completed,
        }
    }

    /// Marks due milestones as sent, persists, then delivers. A failed
    /// delivery is logged and not retried.
    pub async fn run(&self, today: NaiveDate) -> Result<NotificationReport, AppError> {
        let notify_completed = self.notify_completed;
        let announcements = self
            .store
            .update(move |doc| Ok(plan_announcements(&mut doc.assignments, today, notify_completed)))
            .await?;

        let mut report = NotificationReport {
            announced: announcements.len(),
            ..NotificationReport::default()
        };

        for announcement in &announcements {
            for channel in &self.channels {
                match channel.deliver(&announcement.notification).await {
                    Ok(()) => report.delivered += 1,
                    Err(e) => {
                        warn!(
                            "{} delivery failed for {} ({}): {}",
                            channel.channel(),
                            announcement.assignment_id,
                            announcement.milestone.tag(),
                            e
                        );
                        report.failed += 1;
                    }
                }
            }
        }

        info!(
            "Notification check for {}: {} announced, {} delivered, {} failed",
            today, report.announced, report.delivered, report.failed
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Origin, RemoteId};
    use std::collections::BTreeSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn remote(due: NaiveDate, sent: &[Milestone]) -> Assignment {
        Assignment {
            id: "a-501".to_string(),
            origin: Origin::Remote {
                remote_id: RemoteId::Int(501),
            },
            title: "Lab report".to_string(),
            course: "Biology".to_string(),
            due_date: due,
            completed: false,
            notifications_sent: sent.iter().copied().collect::<BTreeSet<_>>(),
        }
    }

    #[test]
    fn test_already_sent_milestone_is_not_repeated() {
        let today = date(2026, 3, 2);
        let record = remote(date(2026, 3, 5), &[Milestone::ThreeDays]);

        assert_eq!(due_milestone(&record, today), None);
        assert_eq!(due_milestone(&record, date(2026, 3, 4)), Some(Milestone::OneDay));
        assert_eq!(due_milestone(&record, date(2026, 3, 5)), Some(Milestone::Morning));
    }

    #[test]
    fn test_milestones_fire_only_on_their_day() {
        let record = remote(date(2026, 3, 5), &[]);
        assert_eq!(due_milestone(&record, date(2026, 3, 2)), Some(Milestone::ThreeDays));
        assert_eq!(due_milestone(&record, date(2026, 3, 1)), None);
        assert_eq!(due_milestone(&record, date(2026, 3, 3)), None);
    }

    #[test]
    fn test_past_due_is_suppressed() {
        let record = remote(date(2026, 3, 5), &[]);
        assert_eq!(due_milestone(&record, date(2026, 3, 6)), None);
        assert_eq!(due_milestone(&record, date(2026, 4, 1)), None);
    }

    #[test]
    fn test_plan_marks_sent_once() {
        let today = date(2026, 3, 4);
        let mut records = vec![remote(date(2026, 3, 5), &[Milestone::ThreeDays])];

        let first = plan_announcements(&mut records, today, true);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].milestone, Milestone::OneDay);
        assert_eq!(first[0].notification.title, "Due TOMORROW: Biology");
        assert!(records[0].notifications_sent.contains(&Milestone::ThreeDays));
        assert!(records[0].notifications_sent.contains(&Milestone::OneDay));

        let second = plan_announcements(&mut records, today, true);
        assert!(second.is_empty());
        assert_eq!(records[0].notifications_sent.len(), 2);
    }

    #[test]
    fn test_completed_records_follow_flag() {
        let today = date(2026, 3, 5);
        let mut done = remote(date(2026, 3, 5), &[]);
        done.completed = true;

        let mut suppressed = vec![done.clone()];
        assert!(plan_announcements(&mut suppressed, today, false).is_empty());
        assert!(suppressed[0].notifications_sent.is_empty());

        let mut announced = vec![done];
        let plan = plan_announcements(&mut announced, today, true);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].milestone, Milestone::Morning);
    }

    #[test]
    fn test_three_day_message_names_the_weekday() {
        let record = remote(date(2026, 3, 5), &[]);
        let note = compose(&record, Milestone::ThreeDays);
        assert_eq!(note.title, "Due in 3 days: Biology");
        assert_eq!(note.message, "Lab report is due Thursday, March 05");
    }
}
