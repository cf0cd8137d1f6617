//! Offers (supplier quotes)

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A quote stored by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub id: i32,
    pub supplier_id: i32,
    pub request_id: i32,
    pub price: f64,
    #[serde(default)]
    pub delivery_time: String,
    #[serde(default)]
    pub conditions: String,
    #[serde(default)]
    pub attachments: String,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub status: String,
    /// Legacy rows may lack a creation time
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl Offer {
    pub fn is_winner(&self) -> bool {
        self.status == "ganadora"
    }
}

/// Body of `POST /ofertas`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewOffer {
    pub supplier_id: i32,
    pub request_id: i32,
    pub price: f64,
    pub delivery_time: String,
    pub conditions: String,
    pub attachments: String,
    pub photo: Option<String>,
    pub status: String,
}
