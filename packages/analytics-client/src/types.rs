//! Endpoint paths and response types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Conversions grouped by location.
pub const CONVERSIONS_BY_LOCATION: &str = "/analytics/conversions-by-location";

/// Revenue grouped by location.
pub const REVENUE_BY_LOCATION: &str = "/analytics/revenue-by-location";

/// Conversions grouped by source/medium.
pub const CONVERSIONS_BY_SOURCE: &str = "/analytics/conversions-by-source";

/// Combined result of the aggregate fetch, keyed by the call that produced it.
///
/// Payloads are backend-defined and passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllData {
    pub session_data: Value,
    pub revenue_data: Value,
    pub source_data: Value,
}
