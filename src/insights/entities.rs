use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::percentage::Percentage;

/// Envelope of every insights response.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsResponse {
    #[serde(default)]
    pub data: InsightsData,
}

/// Payload of the `insights/days/{range}` resource. Day entries are kept as raw json because
/// their shape differs between accounts and API versions.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsData {
    #[serde(default, deserialize_with = "nullable_vec")]
    pub days: Vec<Value>,
    #[serde(default)]
    pub is_up_to_date: Option<bool>,
    #[serde(default)]
    pub percent_calculated: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub range: Option<Value>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

impl InsightsData {
    /// A missing flag means the server does not track freshness, so the data is used as is.
    pub fn is_ready(&self) -> bool {
        self.is_up_to_date.unwrap_or(true)
    }

    pub fn progress(&self) -> Percentage {
        Percentage::or_zero(self.percent_calculated)
    }

    pub fn status_or_stale(&self) -> &str {
        self.status.as_deref().unwrap_or("stale")
    }
}

fn nullable_vec<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default())
}
