//! Contact-form DTOs

use lorry_services::ContactMessage;
use serde::{Deserialize, Serialize};

/// Contact-form submission
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactRequest {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: String,

    pub phone: Option<String>,

    #[serde(default)]
    pub subject: String,

    #[serde(default)]
    pub message: String,
}

impl From<ContactRequest> for ContactMessage {
    fn from(req: ContactRequest) -> Self {
        ContactMessage {
            name: req.name,
            email: req.email,
            phone: req.phone,
            subject: req.subject,
            message: req.message,
        }
    }
}

/// Contact-form response
#[derive(Debug, Clone, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
}

impl Default for ContactResponse {
    fn default() -> Self {
        Self {
            success: true,
            message: "Query sent successfully.".to_string(),
        }
    }
}
