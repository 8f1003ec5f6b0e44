//! # Kitchen Queue
//!
//! Bounded FIFO between waiters and cooks. Any number of waiters push through the shared
//! sender; cooks take turns on the receiver behind an async mutex, which makes the channel
//! multi-consumer. Occupancy can never exceed the channel bound.

use crate::model::OrderId;
use std::fmt::Display;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};

/// How crowded the kitchen queue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoadLevel {
    Low,
    Medium,
    High,
    Full,
}

impl LoadLevel {
    /// Below 40% is `Low`, below 70% `Medium`, anything short of capacity `High`.
    pub fn from_occupancy(len: usize, capacity: usize) -> LoadLevel {
        if capacity == 0 || len >= capacity {
            return LoadLevel::Full;
        }
        let percent = len * 100 / capacity;
        if percent < 40 {
            LoadLevel::Low
        } else if percent < 70 {
            LoadLevel::Medium
        } else {
            LoadLevel::High
        }
    }
}

impl Display for LoadLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LoadLevel::Low => "low",
            LoadLevel::Medium => "medium",
            LoadLevel::High => "high",
            LoadLevel::Full => "full",
        };
        f.write_str(label)
    }
}

#[derive(Debug)]
pub struct KitchenQueue {
    tx: mpsc::Sender<OrderId>,
    rx: Mutex<mpsc::Receiver<OrderId>>,
    capacity: usize,
}

impl KitchenQueue {
    /// `capacity` must be non-zero; [`SimConfig::validate`](crate::config::SimConfig::validate)
    /// guarantees it for configured queues.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        Self {
            tx,
            rx: Mutex::new(rx),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.capacity - self.tx.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.tx.capacity() == 0
    }

    pub fn load_level(&self) -> LoadLevel {
        LoadLevel::from_occupancy(self.len(), self.capacity)
    }

    /// Inserts without waiting. A full queue hands the id back.
    pub fn try_push(&self, id: OrderId) -> Result<(), OrderId> {
        self.tx.try_send(id).map_err(|e| match e {
            mpsc::error::TrySendError::Full(id) | mpsc::error::TrySendError::Closed(id) => id,
        })
    }

    /// Waits for a slot, giving up after `timeout`.
    pub async fn push_timeout(&self, id: OrderId, timeout: Duration) -> Result<(), OrderId> {
        self.tx.send_timeout(id, timeout).await.map_err(|e| match e {
            mpsc::error::SendTimeoutError::Timeout(id)
            | mpsc::error::SendTimeoutError::Closed(id) => id,
        })
    }

    /// Blocking take. Cooks queue up on the receiver lock in arrival order.
    pub async fn pop(&self) -> Option<OrderId> {
        self.rx.lock().await.recv().await
    }

    /// Removes whatever is queued right now. Used at shutdown.
    pub async fn drain(&self) -> Vec<OrderId> {
        let mut rx = self.rx.lock().await;
        let mut drained = Vec::new();
        while let Ok(id) = rx.try_recv() {
            drained.push(id);
        }
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_level_thresholds() {
        assert_eq!(LoadLevel::from_occupancy(0, 20), LoadLevel::Low);
        assert_eq!(LoadLevel::from_occupancy(7, 20), LoadLevel::Low);
        assert_eq!(LoadLevel::from_occupancy(8, 20), LoadLevel::Medium);
        assert_eq!(LoadLevel::from_occupancy(14, 20), LoadLevel::High);
        assert_eq!(LoadLevel::from_occupancy(19, 20), LoadLevel::High);
        assert_eq!(LoadLevel::from_occupancy(20, 20), LoadLevel::Full);
    }

    #[tokio::test]
    async fn test_occupancy_is_bounded_and_fifo() {
        let queue = KitchenQueue::new(2);
        queue.try_push(OrderId(1)).unwrap();
        queue.try_push(OrderId(2)).unwrap();
        assert!(queue.is_full());
        assert_eq!(queue.try_push(OrderId(3)), Err(OrderId(3)));
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.pop().await, Some(OrderId(1)));
        assert_eq!(queue.len(), 1);
        queue.try_push(OrderId(3)).unwrap();
        assert_eq!(queue.drain().await, vec![OrderId(2), OrderId(3)]);
        assert!(queue.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_push_timeout_gives_up_when_nobody_takes() {
        let queue = KitchenQueue::new(1);
        queue.try_push(OrderId(1)).unwrap();
        let result = queue
            .push_timeout(OrderId(2), Duration::from_secs(1))
            .await;
        assert_eq!(result, Err(OrderId(2)));
        assert_eq!(queue.len(), 1);
    }
}
