//! # Shift History
//!
//! Summaries of finished shifts. The store is created once by the caller and handed to
//! [`Restaurant`](crate::lifecycle::Restaurant); it is the only state that outlives a shift.

use crate::workers::LoadMode;
use chrono::{DateTime, Local};
use std::fmt::Display;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Append-only record list.
pub trait HistoryStore: Send + Sync {
    fn append(&self, record: String);
    fn read_all(&self) -> Vec<String>;
    fn clear(&self);
}

/// Process-lifetime history. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistory {
    records: Arc<Mutex<Vec<String>>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for InMemoryHistory {
    fn append(&self, record: String) {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(record);
    }

    fn read_all(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaiterSummary {
    pub name: String,
    pub accepted: u64,
    pub served: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CookSummary {
    pub name: String,
    pub cooked: u64,
}

/// Final counters of one shift, captured before the shift's queues are cleared.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftSummary {
    pub started_at: DateTime<Local>,
    pub duration: Duration,
    pub total_orders: u32,
    pub waiting: u64,
    pub cooking: u64,
    pub ready: u64,
    pub delivered: u64,
    pub unassigned: u64,
    pub abandoned: u64,
    pub dropped: u64,
    pub final_load_mode: LoadMode,
    pub waiters: Vec<WaiterSummary>,
    pub cooks: Vec<CookSummary>,
}

impl ShiftSummary {
    /// Whether every order is accounted for in exactly one stage.
    pub fn is_balanced(&self) -> bool {
        self.waiting + self.cooking + self.ready + self.delivered == u64::from(self.total_orders)
    }
}

impl Display for ShiftSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== SHIFT START ===")?;
        writeln!(f, "Started: {}", self.started_at.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(f, "Duration: {}s", self.duration.as_secs())?;
        writeln!(f, "Final load mode: {}", self.final_load_mode)?;
        writeln!(f, "Total orders: {}", self.total_orders)?;
        writeln!(f, "Delivered: {}", self.delivered)?;
        writeln!(f, "Ready, not delivered: {}", self.ready)?;
        writeln!(f, "In kitchen: {}", self.cooking)?;
        writeln!(f, "Not cooked: {}", self.waiting)?;
        writeln!(
            f,
            "  of which unassigned: {}, abandoned: {}, dropped: {}",
            self.unassigned, self.abandoned, self.dropped
        )?;
        for waiter in &self.waiters {
            writeln!(
                f,
                "Waiter {}: accepted {}, served {}",
                waiter.name, waiter.accepted, waiter.served
            )?;
        }
        for cook in &self.cooks {
            writeln!(f, "Cook {}: cooked {}", cook.name, cook.cooked)?;
        }
        write!(f, "=== SHIFT END ===")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> ShiftSummary {
        ShiftSummary {
            started_at: Local::now(),
            duration: Duration::from_secs(42),
            total_orders: 5,
            waiting: 1,
            cooking: 1,
            ready: 0,
            delivered: 3,
            unassigned: 1,
            abandoned: 0,
            dropped: 0,
            final_load_mode: LoadMode::Normal,
            waiters: vec![WaiterSummary {
                name: "Waiter-1".into(),
                accepted: 4,
                served: 3,
            }],
            cooks: vec![CookSummary {
                name: "Cook-1".into(),
                cooked: 3,
            }],
        }
    }

    #[test]
    fn test_history_clones_share_records() {
        let history = InMemoryHistory::new();
        let view = history.clone();
        history.append("first".into());
        history.append("second".into());
        assert_eq!(view.read_all(), vec!["first", "second"]);
        view.clear();
        assert!(history.read_all().is_empty());
    }

    #[test]
    fn test_summary_renders_between_markers() {
        let text = summary().to_string();
        assert!(text.starts_with("=== SHIFT START ==="));
        assert!(text.ends_with("=== SHIFT END ==="));
        assert!(text.contains("Total orders: 5"));
        assert!(text.contains("Waiter Waiter-1: accepted 4, served 3"));
        assert!(text.contains("Cook Cook-1: cooked 3"));
    }

    #[test]
    fn test_balanced_summary() {
        let mut s = summary();
        assert!(s.is_balanced());
        s.delivered += 1;
        assert!(!s.is_balanced());
    }
}
