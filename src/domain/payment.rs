use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub amount: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub idempotency_key: String,
}

fn default_currency() -> String {
    "EUR".to_string()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Succeeded,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Succeeded => "SUCCEEDED",
            PaymentStatus::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Some(PaymentStatus::Pending),
            "SUCCEEDED" => Some(PaymentStatus::Succeeded),
            "FAILED" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

/// A persisted payment row. Created `Pending`, finalised once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub provider: String,
    pub message: Option<String>,
    pub idempotency_key: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Payment {
    pub fn pending(req: &CreatePaymentRequest, provider: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount: req.amount,
            currency: req.currency.clone(),
            status: PaymentStatus::Pending,
            provider: provider.to_string(),
            message: None,
            idempotency_key: req.idempotency_key.clone(),
            created_at: chrono::Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentResponse {
    pub payment_id: Uuid,
    pub status: PaymentStatus,
    pub provider: String,
    pub message: Option<String>,
}

impl From<&Payment> for CreatePaymentResponse {
    fn from(p: &Payment) -> Self {
        Self {
            payment_id: p.id,
            status: p.status,
            provider: p.provider.clone(),
            message: p.message.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentSearch {
    pub query: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub size: u32,
}

fn default_page_size() -> u32 {
    30
}

impl PaymentSearch {
    /// Blank query and blank/`ALL` status mean "no filter".
    pub fn normalized(&self) -> (Option<String>, Option<PaymentStatus>) {
        let query = self
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);
        let status = self
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("ALL"))
            .and_then(PaymentStatus::parse);
        (query, status)
    }

    pub fn page_size(&self) -> u32 {
        self.size.clamp(1, 200)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentPage {
    pub items: Vec<Payment>,
    pub page: u32,
    pub size: u32,
    pub total: u64,
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorPayload,
}

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}
