//! Simulated live trading-platform data

use std::collections::BTreeMap;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::{DomainError, LiveDataSource};

pub const COMPONENTS: [&str; 3] = ["OrderMatching", "Gateway", "RiskEngine"];

pub const COMPONENT_STATUSES: [&str; 3] = ["Healthy", "Degraded", "Down"];

/// Live data tools returning randomised readings
#[derive(Debug, Clone, Default)]
pub struct SimulatedLiveData;

impl SimulatedLiveData {
    pub fn new() -> Self {
        Self
    }

    fn random_status() -> String {
        COMPONENT_STATUSES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or("Healthy")
            .to_string()
    }
}

#[async_trait]
impl LiveDataSource for SimulatedLiveData {
    async fn trade_volume(&self, _time_range: &str) -> Result<u64, DomainError> {
        Ok(rand::thread_rng().gen_range(1_000..=50_000))
    }

    async fn system_status(
        &self,
        component: Option<&str>,
    ) -> Result<BTreeMap<String, String>, DomainError> {
        let status = match component.filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all")) {
            Some(component) => BTreeMap::from([(component.to_string(), Self::random_status())]),
            None => COMPONENTS
                .iter()
                .map(|c| (c.to_string(), Self::random_status()))
                .collect(),
        };

        Ok(status)
    }

    async fn match_count(&self) -> Result<u64, DomainError> {
        Ok(rand::thread_rng().gen_range(500..=2_000))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trade_volume_in_range() {
        let data = SimulatedLiveData::new();
        let volume = data.trade_volume("last_hour").await.unwrap();
        assert!((1_000..=50_000).contains(&volume));
    }

    #[tokio::test]
    async fn test_system_status_all_components() {
        let data = SimulatedLiveData::new();

        for component in [None, Some("all"), Some("")] {
            let status = data.system_status(component).await.unwrap();
            assert_eq!(status.len(), 3);
            assert!(status
                .values()
                .all(|s| COMPONENT_STATUSES.contains(&s.as_str())));
        }
    }

    #[tokio::test]
    async fn test_system_status_single_component() {
        let data = SimulatedLiveData::new();

        let status = data.system_status(Some("Gateway")).await.unwrap();
        assert_eq!(status.keys().collect::<Vec<_>>(), vec!["Gateway"]);
    }

    #[tokio::test]
    async fn test_match_count_in_range() {
        let count = SimulatedLiveData::new().match_count().await.unwrap();
        assert!((500..=2_000).contains(&count));
    }
}
