//! Portal Endpoints
//!
//! One typed method per backend route.

use super::client::ApiClient;
use super::error::ApiResult;
use super::transport::FilePart;
use crate::models::{
    ComplianceUpdate, EmailConfig, ErpItem, ImportResponse, NewOffer, NewSupplier, Offer,
    ProcurementRequest, Supplier,
};
use serde::{Deserialize, Serialize};

/// Header carrying the static ERP key
pub const ERP_KEY_HEADER: &str = "X-API-KEY";

/// Credentials for `POST /login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Reply of `POST /login`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: LoginUser,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginUser {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Role claim; absent for plain suppliers
    #[serde(default)]
    pub role: Option<String>,
}

/// Reply of `POST /upload`; older backends answer `{"file": ...}`
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    #[serde(alias = "file")]
    pub filename: String,
}

#[derive(Debug, Serialize)]
struct DocumentsUpdate<'a> {
    documents: &'a str,
}

/// Typed facade over the portal REST API
#[derive(Clone)]
pub struct PortalApi {
    client: ApiClient,
}

impl PortalApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    // ============ Auth ============

    pub async fn login(&self, credentials: &LoginRequest) -> ApiResult<LoginResponse> {
        self.client.post_json("/login", credentials).await
    }

    pub async fn register(&self, supplier: &NewSupplier) -> ApiResult<()> {
        self.client.post_text("/register", supplier).await.map(|_| ())
    }

    // ============ Supplier side ============

    pub async fn list_requests(&self) -> ApiResult<Vec<ProcurementRequest>> {
        self.client.get_json("/solicitudes").await
    }

    pub async fn submit_offer(&self, offer: &NewOffer) -> ApiResult<Offer> {
        self.client.post_json("/ofertas", offer).await
    }

    /// `None` when the backend has no profile body for this id
    pub async fn supplier(&self, id: i32) -> ApiResult<Option<Supplier>> {
        self.client.get_json(&format!("/suppliers/{}", id)).await
    }

    pub async fn update_documents(&self, id: i32, documents: &str) -> ApiResult<()> {
        self.client
            .put_text(
                &format!("/suppliers/{}/docs", id),
                &DocumentsUpdate { documents },
            )
            .await
            .map(|_| ())
    }

    pub async fn upload(&self, part: FilePart) -> ApiResult<UploadResponse> {
        self.client.upload("/upload", part).await
    }

    // ============ Admin ============

    pub async fn email_config(&self) -> ApiResult<EmailConfig> {
        self.client.get_json("/admin/config/email").await
    }

    pub async fn save_email_config(&self, config: &EmailConfig) -> ApiResult<EmailConfig> {
        self.client.post_json("/admin/config/email", config).await
    }

    /// Sends a test email with the given settings; returns the server's text
    pub async fn test_email_config(&self, config: &EmailConfig) -> ApiResult<String> {
        self.client.post_text("/admin/config/test", config).await
    }

    pub async fn pending_suppliers(&self) -> ApiResult<Vec<Supplier>> {
        self.client.get_json("/admin/suppliers").await
    }

    pub async fn approved_suppliers(&self) -> ApiResult<Vec<Supplier>> {
        self.client.get_json("/admin/suppliers/approved").await
    }

    pub async fn approve_supplier(&self, id: i32) -> ApiResult<()> {
        self.client
            .put_empty(&format!("/admin/approve/{}", id))
            .await
            .map(|_| ())
    }

    pub async fn reject_supplier(&self, id: i32) -> ApiResult<String> {
        self.client.delete_text(&format!("/admin/reject/{}", id)).await
    }

    pub async fn update_compliance(
        &self,
        id: i32,
        flags: &ComplianceUpdate,
    ) -> ApiResult<()> {
        self.client
            .put_text(&format!("/admin/compliance/{}", id), flags)
            .await
            .map(|_| ())
    }

    pub async fn all_offers(&self) -> ApiResult<Vec<Offer>> {
        self.client.get_json("/admin/ofertas").await
    }

    /// Wipes suppliers, requests and offers on the backend
    pub async fn reset(&self) -> ApiResult<String> {
        self.client.delete_text("/admin/reset").await
    }

    pub async fn erp_import(&self, api_key: &str, items: &[ErpItem]) -> ApiResult<ImportResponse> {
        self.client
            .post_json_with_headers("/erp/import", &items, &[(ERP_KEY_HEADER, api_key)])
            .await
    }
}
