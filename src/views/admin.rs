//! Admin console
//!
//! Supplier review (pending/approved lists, approve, reject, compliance
//! flags), offer and request listings, SMTP settings with a test log, the
//! destructive reset, and ERP imports.

use super::{lock, InFlight, Slot, ViewContext, ViewError, ViewResult};
use crate::models::{
    resolve_upload_url, shorten_document_name, ComplianceFlag, EmailConfig, ErpItem,
    ImportResponse, Offer, ProcurementRequest, Supplier, ERP_TIMESTAMP_FORMAT,
};
use chrono::{Duration, Local, Utc};
use std::sync::Mutex;

const RESET_PROMPT: &str = "ARE YOU SURE?\n\nThis deletes the WHOLE database (suppliers, requests, offers).\n\nThis action can NOT be undone.";
const RESET_FINAL_PROMPT: &str = "Final confirmation: do you really want to delete everything?";
const REJECT_PROMPT: &str = "Are you sure you want to REJECT and delete this application?";

/// Supplier counters shown on the overview tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminStats {
    pub total: usize,
    pub pending: usize,
    pub active: usize,
}

/// Timestamped activity lines, newest first
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    lines: Vec<String>,
}

impl ActivityLog {
    pub fn push(&mut self, message: &str) {
        let line = format!("[{}] {}", Local::now().format("%H:%M:%S"), message);
        tracing::info!(target: "supplier_portal::activity", "{}", message);
        self.lines.insert(0, line);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

#[derive(Default)]
struct AdminState {
    pending: Slot<Vec<Supplier>>,
    approved: Slot<Vec<Supplier>>,
    config: Slot<EmailConfig>,
    offers: Slot<Vec<Offer>>,
    requests: Slot<Vec<ProcurementRequest>>,
    log: ActivityLog,
}

/// Admin controller
///
/// Handlers take `&self`; a second run of a pending action is `Busy`.
pub struct AdminView {
    ctx: ViewContext,
    state: Mutex<AdminState>,
    erp_api_key: String,
    in_flight: InFlight,
}

impl AdminView {
    pub fn new(ctx: ViewContext, erp_api_key: impl Into<String>) -> Self {
        Self {
            ctx,
            state: Mutex::new(AdminState::default()),
            erp_api_key: erp_api_key.into(),
            in_flight: InFlight::new(),
        }
    }

    /// Load every tab's data together; each slot fails on its own
    pub async fn mount(&self) {
        let api = self.ctx.api.clone();
        let (pending, approved, config, offers, requests) = tokio::join!(
            api.pending_suppliers(),
            api.approved_suppliers(),
            api.email_config(),
            api.all_offers(),
            api.list_requests(),
        );

        let mut state = lock(&self.state);
        state.pending = Slot::from_result(pending, "pending suppliers");
        state.approved = Slot::from_result(approved, "approved suppliers");
        state.config = Slot::from_result(config, "email config");
        state.offers = Slot::from_result(offers, "offers");
        state.requests = Slot::from_result(requests, "requests");
    }

    pub fn pending(&self) -> Slot<Vec<Supplier>> {
        lock(&self.state).pending.clone()
    }

    pub fn approved(&self) -> Slot<Vec<Supplier>> {
        lock(&self.state).approved.clone()
    }

    pub fn config(&self) -> Slot<EmailConfig> {
        lock(&self.state).config.clone()
    }

    pub fn offers(&self) -> Slot<Vec<Offer>> {
        lock(&self.state).offers.clone()
    }

    pub fn requests(&self) -> Slot<Vec<ProcurementRequest>> {
        lock(&self.state).requests.clone()
    }

    pub fn activity(&self) -> ActivityLog {
        lock(&self.state).log.clone()
    }

    pub fn stats(&self) -> AdminStats {
        let state = lock(&self.state);
        let pending = state.pending.items().len();
        let active = state.approved.items().len();
        AdminStats {
            total: pending + active,
            pending,
            active,
        }
    }

    /// `(label, url)` pairs for a supplier's uploaded documents
    pub fn document_links(&self, supplier: &Supplier) -> Vec<(String, String)> {
        supplier
            .document_names()
            .into_iter()
            .map(|name| {
                (
                    shorten_document_name(name),
                    resolve_upload_url(self.ctx.api.base_url(), name),
                )
            })
            .collect()
    }

    fn log(&self, message: &str) {
        lock(&self.state).log.push(message);
    }

    /// Re-fetch both supplier lists
    pub async fn refresh_suppliers(&self) {
        let api = self.ctx.api.clone();
        let (pending, approved) =
            tokio::join!(api.pending_suppliers(), api.approved_suppliers());
        let mut state = lock(&self.state);
        state.pending.refresh(pending, "pending suppliers");
        state.approved.refresh(approved, "approved suppliers");
    }

    pub async fn refresh_requests(&self) {
        let result = self.ctx.api.list_requests().await;
        lock(&self.state).requests.refresh(result, "requests");
    }

    pub async fn refresh_offers(&self) {
        let result = self.ctx.api.all_offers().await;
        lock(&self.state).offers.refresh(result, "offers");
    }

    pub async fn refresh_config(&self) {
        let result = self.ctx.api.email_config().await;
        lock(&self.state).config.refresh(result, "email config");
    }

    pub async fn approve(&self, supplier_id: i32) -> ViewResult<()> {
        let _guard = self.in_flight.begin(&format!("approve:{}", supplier_id))?;

        match self.ctx.api.approve_supplier(supplier_id).await {
            Ok(()) => {
                tracing::info!(supplier_id, "Supplier approved");
                self.ctx.alert("Supplier approved and notified.");
                self.refresh_suppliers().await;
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, supplier_id, "Approval failed");
                self.ctx.alert("Error approving supplier.");
                Err(ViewError::Api(e))
            }
        }
    }

    pub async fn reject(&self, supplier_id: i32) -> ViewResult<()> {
        if !self.ctx.confirm(REJECT_PROMPT) {
            return Err(ViewError::Cancelled);
        }
        let _guard = self.in_flight.begin(&format!("reject:{}", supplier_id))?;

        match self.ctx.api.reject_supplier(supplier_id).await {
            Ok(_) => {
                tracing::info!(supplier_id, "Supplier rejected");
                self.ctx.alert("Supplier rejected and deleted.");
                self.refresh_suppliers().await;
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, supplier_id, "Rejection failed");
                self.ctx.alert("Error rejecting supplier.");
                Err(ViewError::Api(e))
            }
        }
    }

    /// Set one compliance flag of an approved supplier, keeping the others
    pub async fn set_compliance(
        &self,
        supplier_id: i32,
        flag: ComplianceFlag,
        value: bool,
    ) -> ViewResult<()> {
        let current = lock(&self.state)
            .approved
            .items()
            .iter()
            .find(|s| s.id == supplier_id)
            .map(Supplier::compliance)
            .ok_or_else(|| {
                ViewError::Validation(format!("Supplier {} is not in the directory", supplier_id))
            })?;

        let _guard = self.in_flight.begin(&format!("compliance:{}", supplier_id))?;

        let flags = current.with(flag, value);
        match self.ctx.api.update_compliance(supplier_id, &flags).await {
            Ok(()) => {
                self.refresh_suppliers().await;
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, supplier_id, "Compliance update failed");
                self.ctx.alert("Error updating compliance");
                Err(ViewError::Api(e))
            }
        }
    }

    pub async fn save_config(&self, config: EmailConfig) -> ViewResult<()> {
        let _guard = self.in_flight.begin("save-config")?;

        match self.ctx.api.save_email_config(&config).await {
            Ok(saved) => {
                if let Some(theme) = saved.ui_theme.as_deref().filter(|t| !t.is_empty()) {
                    self.ctx.session.set_theme(theme)?;
                }
                lock(&self.state).config = Slot::Ready(saved);
                self.ctx.alert("Email configuration updated");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Saving email config failed");
                self.ctx.alert("Error saving config");
                Err(ViewError::Api(e))
            }
        }
    }

    /// Ask the backend to send a test email with `config`
    pub async fn test_config(&self, config: &EmailConfig) -> ViewResult<String> {
        let _guard = self.in_flight.begin("test-config")?;

        self.log(&format!("Starting test email to: {}...", config.smtp_from));
        self.log(&format!(
            "Settings: Host={}, Port={}, User={}",
            config.smtp_host, config.smtp_port, config.smtp_user
        ));

        let result = self.ctx.api.test_email_config(config).await;
        let outcome = match result {
            Ok(reply) => {
                self.log(&format!("Success: {}", reply));
                self.ctx.alert("Test email sent successfully.");
                Ok(reply)
            }
            Err(e) => {
                let message = e.server_message().map(str::to_string).unwrap_or_else(|| e.to_string());
                self.log(&format!("ERROR: {}", message));
                self.ctx.alert(&format!("Error sending test: {}", message));
                Err(ViewError::Api(e))
            }
        };
        self.log("Test finished.");
        outcome
    }

    /// Wipe all backend data after two confirmations
    pub async fn reset(&self) -> ViewResult<()> {
        if !self.ctx.confirm(RESET_PROMPT) || !self.ctx.confirm(RESET_FINAL_PROMPT) {
            return Err(ViewError::Cancelled);
        }
        let _guard = self.in_flight.begin("reset")?;

        match self.ctx.api.reset().await {
            Ok(_) => {
                tracing::warn!("Portal database reset");
                self.ctx.alert("Database cleared successfully.");
                self.mount().await;
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Database reset failed");
                self.ctx.alert("Error clearing the database.");
                Err(ViewError::Api(e))
            }
        }
    }

    /// Push generated test items through the ERP endpoint
    pub async fn simulate_erp(&self, count: usize) -> ViewResult<ImportResponse> {
        let prompt = format!("Generate and load {} test products from the 'ERP'?", count);
        if !self.ctx.confirm(&prompt) {
            return Err(ViewError::Cancelled);
        }
        let items = simulated_items(count);
        self.import_erp(&items).await
    }

    /// Send `items` to the ERP import endpoint and refresh the request list
    pub async fn import_erp(&self, items: &[ErpItem]) -> ViewResult<ImportResponse> {
        let _guard = self.in_flight.begin("erp-import")?;

        match self.ctx.api.erp_import(&self.erp_api_key, items).await {
            Ok(response) => {
                tracing::info!(
                    sent = items.len(),
                    processed = response.processed,
                    "ERP import finished"
                );
                self.ctx.alert(&format!("Success: {}", response.message));
                self.refresh_requests().await;
                Ok(response)
            }
            Err(e) => {
                tracing::error!(error = %e, "ERP import failed");
                let message = e.server_message().map(str::to_string).unwrap_or_else(|| e.to_string());
                self.ctx.alert(&format!("Simulation error: {}", message));
                Err(ViewError::Api(e))
            }
        }
    }
}

/// Generated ERP items: `SIM-{millis}-{i}`, random quantity, due in a week
pub fn simulated_items(count: usize) -> Vec<ErpItem> {
    let now = Utc::now();
    let stamp = now.timestamp_millis();
    let deadline = (now + Duration::days(7))
        .naive_utc()
        .format(ERP_TIMESTAMP_FORMAT)
        .to_string();

    (0..count)
        .map(|i| ErpItem {
            external_id: format!("SIM-{}-{}", stamp, i),
            title: format!("Test product {}", i + 1),
            description: format!("Simulated description for product {}. Urgent requirement.", i + 1),
            quantity: pseudo_random_quantity(i),
            units: "Piezas".to_string(),
            deadline: Some(deadline.clone()),
            tags: Some("simulacion,urgente".to_string()),
        })
        .collect()
}

/// Quantity in 1..=100 derived from the clock
fn pseudo_random_quantity(salt: usize) -> i32 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0) as usize;
    (nanos.wrapping_add(salt.wrapping_mul(7919)) % 100) as i32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockTransport;
    use crate::api::Method;
    use crate::views::testing::{harness, harness_with};
    use serde_json::json;
    use std::time::Duration as StdDuration;

    fn supplier(id: i32, reviewed: bool, approved: bool, audited: bool) -> serde_json::Value {
        json!({
            "id": id,
            "name": format!("Supplier {}", id),
            "email": format!("s{}@portal.test", id),
            "created_at": "2025-01-10T09:30:00",
            "is_reviewed": reviewed,
            "is_approved": approved,
            "is_audited": audited
        })
    }

    fn script_lists(mock: &MockTransport) {
        mock.reply_json(Method::Get, "/admin/suppliers", 200, json!([supplier(1, false, false, false)]));
        mock.reply_json(
            Method::Get,
            "/admin/suppliers/approved",
            200,
            json!([supplier(2, true, false, false), supplier(3, true, true, true)]),
        );
    }

    #[tokio::test]
    async fn test_mount_and_stats() {
        let h = harness(&[]);
        script_lists(&h.mock);
        h.mock.reply_json(Method::Get, "/admin/ofertas", 200, json!([]));

        let view = AdminView::new(h.ctx.clone(), "key");
        view.mount().await;

        assert_eq!(
            view.stats(),
            AdminStats {
                total: 3,
                pending: 1,
                active: 2
            }
        );
        assert!(view.offers().ready().unwrap().is_empty());
        assert!(view.config().is_failed());
        assert!(view.requests().is_failed());
    }

    #[tokio::test]
    async fn test_approve_then_refetch_both_lists_once() {
        let h = harness(&[]);
        script_lists(&h.mock);
        h.mock.reply_text(Method::Put, "/admin/approve/1", 200, "");

        let view = AdminView::new(h.ctx.clone(), "key");
        view.approve(1).await.unwrap();

        let calls = h.mock.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!((calls[0].method, calls[0].path.as_str()), (Method::Put, "/admin/approve/1"));
        assert_eq!(h.mock.count(Method::Get, "/admin/suppliers"), 1);
        assert_eq!(h.mock.count(Method::Get, "/admin/suppliers/approved"), 1);
        assert_eq!(view.stats().pending, 1);
    }

    #[tokio::test]
    async fn test_failed_approve_does_not_refetch() {
        let h = harness(&[]);
        h.mock.reply_text(Method::Put, "/admin/approve/1", 500, "boom");

        let view = AdminView::new(h.ctx.clone(), "key");
        assert!(view.approve(1).await.is_err());
        assert_eq!(h.mock.calls().len(), 1);
        assert_eq!(h.notifier.messages(), vec!["Error approving supplier.".to_string()]);
    }

    #[tokio::test]
    async fn test_double_approve_sends_one_put() {
        let h = harness_with(MockTransport::with_delay(StdDuration::from_millis(50)), &[]);
        script_lists(&h.mock);
        h.mock.reply_text(Method::Put, "/admin/approve/1", 200, "");

        let view = AdminView::new(h.ctx.clone(), "key");
        let (first, second) = tokio::join!(view.approve(1), view.approve(1));

        assert!(first.is_ok());
        assert!(matches!(second, Err(ViewError::Busy(_))));
        assert_eq!(h.mock.count(Method::Put, "/admin/approve/1"), 1);
        assert_eq!(h.notifier.messages(), vec!["Supplier approved and notified.".to_string()]);
    }

    #[tokio::test]
    async fn test_different_suppliers_approve_concurrently() {
        let h = harness_with(MockTransport::with_delay(StdDuration::from_millis(20)), &[]);
        script_lists(&h.mock);
        h.mock.reply_text(Method::Put, "/admin/approve/1", 200, "");
        h.mock.reply_text(Method::Put, "/admin/approve/2", 200, "");

        let view = AdminView::new(h.ctx.clone(), "key");
        let (first, second) = tokio::join!(view.approve(1), view.approve(2));

        assert!(first.is_ok());
        assert!(second.is_ok());
        assert_eq!(h.mock.count(Method::Put, "/admin/approve/1"), 1);
        assert_eq!(h.mock.count(Method::Put, "/admin/approve/2"), 1);
    }

    #[tokio::test]
    async fn test_reject_requires_confirmation() {
        let h = harness(&[false]);
        let view = AdminView::new(h.ctx.clone(), "key");

        assert!(matches!(view.reject(1).await, Err(ViewError::Cancelled)));
        assert!(h.mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_reject_confirmed() {
        let h = harness(&[true]);
        script_lists(&h.mock);
        h.mock.reply_text(Method::Delete, "/admin/reject/1", 200, "Deleted");

        let view = AdminView::new(h.ctx.clone(), "key");
        view.reject(1).await.unwrap();
        assert_eq!(h.mock.count(Method::Delete, "/admin/reject/1"), 1);
        assert_eq!(h.mock.count(Method::Get, "/admin/suppliers"), 1);
    }

    #[tokio::test]
    async fn test_reset_single_confirmation_issues_no_call() {
        let h = harness(&[true, false]);
        let view = AdminView::new(h.ctx.clone(), "key");

        assert!(matches!(view.reset().await, Err(ViewError::Cancelled)));
        assert_eq!(h.confirmer.asked(), 2);
        assert!(h.mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_reset_declined_first_prompt_stops_early() {
        let h = harness(&[false]);
        let view = AdminView::new(h.ctx.clone(), "key");

        assert!(view.reset().await.is_err());
        assert_eq!(h.confirmer.asked(), 1);
        assert!(h.mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_reset_double_confirmation() {
        let h = harness(&[true, true]);
        h.mock.reply_text(Method::Delete, "/admin/reset", 200, "ok");

        let view = AdminView::new(h.ctx.clone(), "key");
        view.reset().await.unwrap();
        assert_eq!(h.mock.count(Method::Delete, "/admin/reset"), 1);
    }

    #[tokio::test]
    async fn test_compliance_flips_one_flag() {
        let h = harness(&[]);
        script_lists(&h.mock);
        h.mock.reply_text(Method::Put, "/admin/compliance/2", 200, "");

        let view = AdminView::new(h.ctx.clone(), "key");
        view.refresh_suppliers().await;
        view.set_compliance(2, ComplianceFlag::Audited, true)
            .await
            .unwrap();

        let call = h
            .mock
            .calls()
            .into_iter()
            .find(|c| c.path == "/admin/compliance/2")
            .unwrap();
        assert_eq!(
            call.json_body(),
            Some(&json!({"is_reviewed": true, "is_approved": false, "is_audited": true}))
        );
        assert_eq!(h.mock.count(Method::Get, "/admin/suppliers/approved"), 2);
    }

    #[tokio::test]
    async fn test_compliance_unknown_supplier() {
        let h = harness(&[]);
        let view = AdminView::new(h.ctx.clone(), "key");

        let err = view
            .set_compliance(42, ComplianceFlag::Reviewed, true)
            .await
            .unwrap_err();
        assert!(matches!(err, ViewError::Validation(_)));
        assert!(h.mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_config_test_logs_activity() {
        let h = harness(&[]);
        h.mock.reply_text(
            Method::Post,
            "/admin/config/test",
            400,
            "Failed to send email: auth rejected",
        );

        let view = AdminView::new(h.ctx.clone(), "key");
        let config = EmailConfig {
            smtp_host: "smtp.portal.test".into(),
            smtp_from: "noreply@portal.test".into(),
            ..EmailConfig::default()
        };
        assert!(view.test_config(&config).await.is_err());

        let log = view.activity();
        let lines = log.lines();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].ends_with("Test finished."));
        assert!(lines[1].ends_with("ERROR: Failed to send email: auth rejected"));
        assert!(lines[3].contains("noreply@portal.test"));
    }

    #[tokio::test]
    async fn test_save_config_caches_theme() {
        let h = harness(&[]);
        h.mock.reply_json(
            Method::Post,
            "/admin/config/email",
            200,
            json!({"smtp_host": "h", "smtp_password": "********", "ui_theme": "light"}),
        );

        let view = AdminView::new(h.ctx.clone(), "key");
        view.save_config(EmailConfig::default()).await.unwrap();

        assert_eq!(h.ctx.session.theme(), "light");
        assert!(view.config().ready().unwrap().password_is_masked());
    }

    #[tokio::test]
    async fn test_simulate_erp_sends_items_with_key() {
        let h = harness(&[true]);
        h.mock.reply_json(
            Method::Post,
            "/erp/import",
            200,
            json!({"status": "success", "message": "Imported 10 requests", "processed": 10}),
        );
        h.mock.reply_json(Method::Get, "/solicitudes", 200, json!([]));

        let view = AdminView::new(h.ctx.clone(), "secret-erp-key");
        let response = view.simulate_erp(10).await.unwrap();

        assert_eq!(response.processed, 10);
        let call = &h.mock.calls()[0];
        assert_eq!(
            call.headers,
            vec![("X-API-KEY".to_string(), "secret-erp-key".to_string())]
        );
        assert_eq!(call.json_body().unwrap().as_array().unwrap().len(), 10);
        assert_eq!(h.mock.count(Method::Get, "/solicitudes"), 1);
        assert_eq!(h.notifier.messages(), vec!["Success: Imported 10 requests".to_string()]);
    }

    #[tokio::test]
    async fn test_simulate_erp_declined() {
        let h = harness(&[false]);
        let view = AdminView::new(h.ctx.clone(), "key");

        assert!(matches!(view.simulate_erp(10).await, Err(ViewError::Cancelled)));
        assert!(h.mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_document_links() {
        let h = harness(&[]);
        h.mock.reply_json(
            Method::Get,
            "/admin/suppliers/approved",
            200,
            json!([{
                "id": 4,
                "name": "Acme",
                "email": "a@acme.test",
                "created_at": "2025-01-10T09:30:00",
                "documents": "acta_constitutiva_2025_final.pdf, rfc.pdf"
            }]),
        );

        let view = AdminView::new(h.ctx.clone(), "key");
        view.refresh_suppliers().await;
        let supplier = view.approved().items()[0].clone();

        assert_eq!(
            view.document_links(&supplier),
            vec![
                (
                    "acta_const...l.pdf".to_string(),
                    "http://portal.test/api/uploads/acta_constitutiva_2025_final.pdf".to_string()
                ),
                (
                    "rfc.pdf".to_string(),
                    "http://portal.test/api/uploads/rfc.pdf".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_simulated_items_shape() {
        let items = simulated_items(10);
        assert_eq!(items.len(), 10);
        for (i, item) in items.iter().enumerate() {
            assert!(item.external_id.starts_with("SIM-"));
            assert!(item.external_id.ends_with(&format!("-{}", i)));
            assert!((1..=100).contains(&item.quantity));
            assert_eq!(item.units, "Piezas");
            assert_eq!(item.deadline.as_ref().unwrap().len(), 19);
        }
    }
}
