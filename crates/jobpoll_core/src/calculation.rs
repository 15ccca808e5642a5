use serde::{Deserialize, Serialize};

/// Recipient count and suppression breakdown of a broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CalculationSummary {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub suppressed: u64,
    #[serde(default)]
    pub remaining: u64,
    #[serde(default)]
    pub unavailable: u64,
}
