//! Procurement requests

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A procurement need suppliers can quote against (`GET /solicitudes`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcurementRequest {
    pub id: i32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub quantity: i32,
    #[serde(default)]
    pub units: String,
    pub deadline: NaiveDateTime,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub origin_erp: String,
}

impl ProcurementRequest {
    pub fn is_open(&self) -> bool {
        self.status == "open"
    }
}
