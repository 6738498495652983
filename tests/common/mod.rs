#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use homework_tracker::canvas::CanvasClient;
use homework_tracker::delivery::{DeliveryError, Notification, Notifier};
use homework_tracker::error::AppError;
use homework_tracker::models::{RemoteAssignment, RemoteId, RemoteSnapshot};
use tokio::sync::Notify;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn candidate(remote_id: i64, title: &str, due: NaiveDate) -> RemoteAssignment {
    RemoteAssignment {
        remote_id: RemoteId::Int(remote_id),
        title: title.to_string(),
        course: "Biology".to_string(),
        due_date: due,
    }
}

pub fn snapshot(upcoming: Vec<RemoteAssignment>, resolved: &[i64]) -> RemoteSnapshot {
    RemoteSnapshot {
        upcoming,
        resolved: resolved.iter().map(|id| RemoteId::Int(*id)).collect(),
        courses_seen: 1,
    }
}

#[derive(Clone)]
pub enum Outcome {
    Snapshot(RemoteSnapshot),
    AuthFailure,
    TransportFailure,
}

/// Canvas stand-in. With a gate, each fetch waits until the test releases it.
pub struct FakeCanvas {
    outcome: Mutex<Outcome>,
    gate: Option<Arc<Notify>>,
    pub calls: AtomicUsize,
}

impl FakeCanvas {
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome: Mutex::new(outcome),
            gate: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn gated(outcome: Outcome, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(outcome)
        }
    }

    pub fn set_outcome(&self, outcome: Outcome) {
        *self.outcome.lock().unwrap() = outcome;
    }
}

#[async_trait]
impl CanvasClient for FakeCanvas {
    async fn fetch_snapshot(&self, _today: NaiveDate) -> Result<RemoteSnapshot, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let outcome = self.outcome.lock().unwrap().clone();
        match outcome {
            Outcome::Snapshot(snapshot) => Ok(snapshot),
            Outcome::AuthFailure => Err(AppError::Authentication("token expired".to_string())),
            Outcome::TransportFailure => Err(AppError::Transport("connection refused".to_string())),
        }
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn titles(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|n| n.title.clone()).collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn channel(&self) -> &'static str {
        "recording"
    }

    async fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    fn channel(&self) -> &'static str {
        "failing"
    }

    async fn deliver(&self, _notification: &Notification) -> Result<(), DeliveryError> {
        Err(DeliveryError::Url("relay unreachable".to_string()))
    }
}
