use serde::{Deserialize, Serialize};

use super::content::ContentPart;

/// Body of the streaming prompt POST
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PromptRequest {
    #[serde(rename = "userID")]
    pub user_id: String,

    /// Content parts in caller order; interleaving is meaningful
    pub input: Vec<ContentPart>,

    #[serde(rename = "personalitySummary")]
    pub personality_summary: String,

    #[serde(rename = "userLocalTime")]
    pub user_local_time: String,

    #[serde(rename = "deviceID")]
    pub device_id: String,

    /// Empty when the caller supplied none
    #[serde(rename = "memoryStats")]
    pub memory_stats: String,
}
