use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntryView {
    pub account_id: String,
    pub display_name: String,
    pub points: u64,
    pub rank: u32,
}
