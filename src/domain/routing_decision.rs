use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingDecisionRecord {
    pub id: Uuid,
    pub payment_id: Uuid,
    pub chosen_provider: String,
    pub reason: String,
    pub decided_at: chrono::DateTime<chrono::Utc>,
}

impl RoutingDecisionRecord {
    pub fn new(payment_id: Uuid, chosen_provider: &str, reason: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            payment_id,
            chosen_provider: chosen_provider.to_string(),
            reason: reason.to_string(),
            decided_at: chrono::Utc::now(),
        }
    }
}
