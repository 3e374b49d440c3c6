//! # Statistics State
//!
//! The statistics filter (period and indicator). It survives between views,
//! so `stats` without flags repeats the last chart.

use std::sync::{Mutex, PoisonError};

use lounge_core::StatisticsQuery;

#[derive(Debug, Default)]
pub struct StatisticsState {
    query: Mutex<StatisticsQuery>,
}

impl StatisticsState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> StatisticsQuery {
        *self.query.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_query(&self, query: StatisticsQuery) {
        *self.query.lock().unwrap_or_else(PoisonError::into_inner) = query;
    }
}
