//! Live operational data contract

use std::collections::BTreeMap;
use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Point-in-time view of the trading platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveDataSnapshot {
    pub trade_volume: u64,
    pub trade_volume_unit: String,
    pub time_range: String,
    pub match_count: u64,
    pub component_status: BTreeMap<String, String>,
}

/// Source of live metrics for data-intent queries
#[async_trait]
pub trait LiveDataSource: Send + Sync + Debug {
    /// Trade volume over a range such as `last_hour` or `today`
    async fn trade_volume(&self, time_range: &str) -> Result<u64, DomainError>;

    /// Status per component; `None` means every component
    async fn system_status(
        &self,
        component: Option<&str>,
    ) -> Result<BTreeMap<String, String>, DomainError>;

    /// Matched orders today
    async fn match_count(&self) -> Result<u64, DomainError>;
}
