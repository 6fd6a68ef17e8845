//! Chat routing API types

use serde::{Deserialize, Serialize};

use crate::infrastructure::chatops::ChatRouting;

/// Body of `POST /v1/chat/route`
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRouteRequest {
    pub query: String,
    /// Prior conversation, newest last
    #[serde(default)]
    pub history: Vec<String>,
}

impl ChatRouteRequest {
    pub fn history_text(&self) -> String {
        self.history.join("\n")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRouteResponse {
    pub query: String,
    #[serde(flatten)]
    pub routing: ChatRouting,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_defaults_to_empty() {
        let request: ChatRouteRequest = serde_json::from_str(r#"{"query": "status?"}"#).unwrap();
        assert_eq!(request.history_text(), "");
    }

    #[test]
    fn test_history_joined_by_line() {
        let request: ChatRouteRequest =
            serde_json::from_str(r#"{"query": "q", "history": ["a", "b"]}"#).unwrap();
        assert_eq!(request.history_text(), "a\nb");
    }
}
