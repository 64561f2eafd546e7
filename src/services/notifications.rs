//! Dismissible toast queue for user-visible messages

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{config::NotificationsConfig, error::Notice};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub level: Level,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub created_at: DateTime<Utc>,
}

/// Bounded FIFO shared between the controller and the front-end.
/// When full, the oldest entry is dropped.
#[derive(Debug, Clone)]
pub struct Notifications {
    queue: Arc<Mutex<VecDeque<Notification>>>,
    capacity: usize,
    ttl: Duration,
}

impl Notifications {
    pub fn new(config: &NotificationsConfig) -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::new())),
            capacity: config.capacity.max(1),
            ttl: Duration::seconds(config.ttl_seconds),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Notification>> {
        // A panic while holding the lock cannot leave the queue inconsistent
        self.queue.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn push(&self, level: Level, message: impl Into<String>, status: Option<u16>) -> Uuid {
        let notification = Notification {
            id: Uuid::new_v4(),
            level,
            message: message.into(),
            status,
            created_at: Utc::now(),
        };
        let id = notification.id;
        let mut queue = self.lock();
        while queue.len() >= self.capacity {
            queue.pop_front();
        }
        queue.push_back(notification);
        id
    }

    pub fn info(&self, message: impl Into<String>) -> Uuid {
        self.push(Level::Info, message, None)
    }

    pub fn success(&self, message: impl Into<String>) -> Uuid {
        self.push(Level::Success, message, None)
    }

    pub fn error(&self, notice: Notice) -> Uuid {
        self.push(Level::Error, notice.message, notice.status)
    }

    /// Remove one entry; returns false if it was already gone
    pub fn dismiss(&self, id: Uuid) -> bool {
        let mut queue = self.lock();
        let before = queue.len();
        queue.retain(|n| n.id != id);
        queue.len() != before
    }

    /// Drop entries older than the configured time-to-live
    pub fn expire(&self, now: DateTime<Utc>) -> usize {
        let mut queue = self.lock();
        let before = queue.len();
        queue.retain(|n| now - n.created_at < self.ttl);
        before - queue.len()
    }

    /// Remove and return everything queued
    pub fn drain(&self) -> Vec<Notification> {
        self.lock().drain(..).collect()
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
