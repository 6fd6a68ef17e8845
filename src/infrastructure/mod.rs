//! Infrastructure layer - External service implementations

pub mod chatops;
pub mod incident;
pub mod logging;
pub mod observability;
pub mod storage;
