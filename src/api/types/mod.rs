//! HTTP request and response types

pub mod chat;
pub mod error;
pub mod incident;
pub mod json;

pub use chat::{ChatRouteRequest, ChatRouteResponse};
pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use incident::{
    CaseListResponse, CaseQueryParams, CaseResponse, DecisionRequest, StartIncidentRequest,
};
pub use json::Json;
