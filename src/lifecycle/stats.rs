//! Point-in-time statistics handed to callers and observers.

use super::kitchen::LoadLevel;
use crate::model::OrderId;
use crate::workers::LoadMode;

/// Shift-wide counters plus the kitchen and scheduler state.
///
/// `waiting` counts every placed order that has not entered the kitchen, including
/// unassigned, abandoned and dropped ones, so that
/// `waiting + cooking + ready + delivered == total_orders` once the shift is quiet.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftStats {
    pub total_orders: u32,
    pub waiting: u64,
    pub cooking: u64,
    pub ready: u64,
    pub delivered: u64,
    pub unassigned: u64,
    pub abandoned: u64,
    pub dropped: u64,
    pub kitchen_len: usize,
    pub kitchen_capacity: usize,
    pub kitchen_load: LoadLevel,
    pub load_mode: LoadMode,
    pub paused: bool,
}

impl ShiftStats {
    /// Orders the counters account for. Equals `total_orders` at quiescence.
    pub fn accounted(&self) -> u64 {
        self.waiting + self.cooking + self.ready + self.delivered
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaiterStats {
    pub name: String,
    pub working: bool,
    pub paused: bool,
    pub current_orders: u32,
    pub concurrency_cap: u32,
    pub accepted: u64,
    pub served: u64,
    pub total_handled: u32,
    /// `current_orders * 100 / concurrency_cap`.
    pub load_percent: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CookStats {
    pub name: String,
    pub cooking: bool,
    pub paused: bool,
    pub cooked: u64,
    pub current_order: Option<OrderId>,
}
