//! Incident API types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Alert, CaseRecord, GateState};

/// Body of `POST /v1/incidents`
#[derive(Debug, Clone, Deserialize)]
pub struct StartIncidentRequest {
    /// Becomes the case id; generated when omitted
    #[serde(default)]
    pub alert_id: Option<String>,
    pub alert_type: String,
    #[serde(default)]
    pub alert_details: Value,
    /// Decide up front instead of parking at the gate
    #[serde(default)]
    pub decision: Option<bool>,
}

impl From<StartIncidentRequest> for Alert {
    fn from(request: StartIncidentRequest) -> Self {
        Alert {
            alert_id: request.alert_id.unwrap_or_default(),
            alert_type: request.alert_type,
            alert_details: request.alert_details,
            decision: request.decision,
        }
    }
}

/// Body of `POST /v1/incidents/{case_id}/decision`
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionRequest {
    pub approved: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaseQueryParams {
    #[serde(default)]
    pub state: Option<String>,
}

/// The case record plus its gate state
#[derive(Debug, Clone, Serialize)]
pub struct CaseResponse {
    #[serde(flatten)]
    pub record: CaseRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gate: Option<GateState>,
}

impl From<CaseRecord> for CaseResponse {
    fn from(record: CaseRecord) -> Self {
        let gate = GateState::of(&record);
        Self { record, gate }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseListResponse {
    pub object: &'static str,
    pub data: Vec<CaseResponse>,
    pub total: usize,
}

impl CaseListResponse {
    pub fn new(records: Vec<CaseRecord>) -> Self {
        let data: Vec<CaseResponse> = records.into_iter().map(CaseResponse::from).collect();
        Self {
            object: "list",
            total: data.len(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_start_request_into_alert() {
        let request: StartIncidentRequest =
            serde_json::from_value(json!({"alert_type": "High CPU Usage"})).unwrap();

        let alert = Alert::from(request);
        assert_eq!(alert.alert_id, "");
        assert!(alert.alert_details.is_null());
        assert_eq!(alert.decision, None);
    }

    #[test]
    fn test_case_response_is_flat() {
        let record = CaseRecord::open(&Alert::new("inc-1", "High CPU Usage")).unwrap();
        let json = serde_json::to_value(CaseResponse::from(record)).unwrap();

        assert_eq!(json["case_id"], "inc-1");
        assert_eq!(json["alert_type"], "High CPU Usage");
        assert_eq!(json["state"], "diagnosing");
        assert!(json.get("gate").is_none());
    }
}
