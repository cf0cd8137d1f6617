//! Supplier dashboard
//!
//! Open requests (gated behind the supplier's review flag), quote
//! submission, and the supplier's own document list.
//!
//! Which requests count as quoted is the union of the offers the backend
//! holds for this supplier and the local quote history. The local history
//! only grows; entries the backend has not confirmed yet stay visible as an
//! overlay.

use super::{lock, InFlight, Slot, ViewContext, ViewError, ViewResult};
use crate::api::FilePart;
use crate::guard::Route;
use crate::models::{split_documents, NewOffer, ProcurementRequest, Supplier};
use std::collections::BTreeSet;
use std::sync::Mutex;

/// Delivery time pre-filled when a quote form opens
pub const DEFAULT_DELIVERY: &str = "Inmediato";
/// Attachment name used when no PDF was picked
pub const DEFAULT_ATTACHMENT: &str = "oferta.pdf";

const OFFER_CONDITIONS: &str = "Standard terms";
const OFFER_STATUS: &str = "sent";
const DOCUMENTS_NOT_LOADED: &str =
    "Profile not loaded; the stored document list was left unchanged";

/// Quote form state
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteForm {
    pub price: String,
    pub delivery_time: String,
    pub attachments: String,
    pub photo: String,
}

impl Default for QuoteForm {
    fn default() -> Self {
        Self {
            price: String::new(),
            delivery_time: DEFAULT_DELIVERY.to_string(),
            attachments: DEFAULT_ATTACHMENT.to_string(),
            photo: String::new(),
        }
    }
}

/// What the requests tab shows
#[derive(Debug, PartialEq)]
pub enum RequestGate {
    /// Profile still loading
    Loading,
    /// Profile not reviewed yet (or unavailable): list hidden
    PendingReview,
    /// Reviewed supplier: the open requests
    Open(Vec<ProcurementRequest>),
}

#[derive(Default)]
struct DashboardState {
    requests: Slot<Vec<ProcurementRequest>>,
    profile: Slot<Option<Supplier>>,
    server_quoted: Slot<BTreeSet<i32>>,
    local_quoted: Vec<i32>,
    documents: String,
    /// `documents` holds the stored list or an explicit edit of it
    documents_loaded: bool,
    quoting: Option<(i32, QuoteForm)>,
}

impl DashboardState {
    fn is_reviewed(&self) -> bool {
        matches!(self.profile.ready(), Some(Some(s)) if s.is_reviewed)
    }

    fn quoted_ids(&self) -> BTreeSet<i32> {
        let mut ids = self.server_quoted.ready().cloned().unwrap_or_default();
        ids.extend(self.local_quoted.iter().copied());
        ids
    }
}

/// Dashboard controller
///
/// Handlers take `&self`; a second run of a pending action is `Busy`.
pub struct DashboardView {
    ctx: ViewContext,
    state: Mutex<DashboardState>,
    in_flight: InFlight,
}

impl DashboardView {
    pub fn new(ctx: ViewContext) -> Self {
        Self {
            ctx,
            state: Mutex::new(DashboardState::default()),
            in_flight: InFlight::new(),
        }
    }

    /// Load requests, profile and quote state together
    pub async fn mount(&self) {
        let supplier_id = self.ctx.session.supplier_id();
        let api = self.ctx.api.clone();

        let profile_fetch = async {
            match supplier_id {
                Some(id) => api.supplier(id).await,
                None => Ok(None),
            }
        };
        let offers_fetch = async {
            match supplier_id {
                Some(id) => api.all_offers().await.map(|offers| {
                    offers
                        .into_iter()
                        .filter(|o| o.supplier_id == id)
                        .map(|o| o.request_id)
                        .collect::<BTreeSet<_>>()
                }),
                None => Ok(BTreeSet::new()),
            }
        };

        let (requests, profile, offers) =
            tokio::join!(api.list_requests(), profile_fetch, offers_fetch);
        let local_quoted = supplier_id
            .map(|id| self.ctx.session.load_quoted(id))
            .unwrap_or_default();

        let mut guard = lock(&self.state);
        let state = &mut *guard;
        state.requests = Slot::from_result(requests, "requests");
        state.profile = Slot::from_result(profile, "supplier profile");
        state.server_quoted = Slot::from_result(offers, "quoted offers");

        if let Some(Some(supplier)) = state.profile.ready() {
            state.documents = supplier.documents.clone();
            state.documents_loaded = true;
        }
        state.local_quoted = local_quoted;

        tracing::debug!(
            supplier_id = ?supplier_id,
            requests = state.requests.items().len(),
            quoted = state.quoted_ids().len(),
            "Dashboard mounted"
        );
    }

    pub fn requests(&self) -> Slot<Vec<ProcurementRequest>> {
        lock(&self.state).requests.clone()
    }

    pub fn profile(&self) -> Slot<Option<Supplier>> {
        lock(&self.state).profile.clone()
    }

    /// Name from the profile, else the one stored at login
    pub fn supplier_name(&self) -> Option<String> {
        match lock(&self.state).profile.ready() {
            Some(Some(supplier)) => Some(supplier.name.clone()),
            _ => self.ctx.session.supplier_name(),
        }
    }

    pub fn is_reviewed(&self) -> bool {
        lock(&self.state).is_reviewed()
    }

    /// Request list, hidden until the profile is reviewed
    pub fn request_gate(&self) -> RequestGate {
        let state = lock(&self.state);
        if state.profile.is_loading() {
            RequestGate::Loading
        } else if state.is_reviewed() {
            RequestGate::Open(state.requests.items().to_vec())
        } else {
            RequestGate::PendingReview
        }
    }

    /// Quoted request ids: backend offers plus the local overlay
    pub fn quoted_ids(&self) -> BTreeSet<i32> {
        lock(&self.state).quoted_ids()
    }

    /// Locally recorded quotes the backend did not report
    pub fn unconfirmed_quotes(&self) -> Vec<i32> {
        let state = lock(&self.state);
        match state.server_quoted.ready() {
            Some(server) => state
                .local_quoted
                .iter()
                .copied()
                .filter(|id| !server.contains(id))
                .collect(),
            None => state.local_quoted.clone(),
        }
    }

    pub fn is_quoted(&self, request_id: i32) -> bool {
        self.quoted_ids().contains(&request_id)
    }

    /// Open the quote form for a request with default values
    pub fn start_quoting(&self, request_id: i32) -> QuoteForm {
        let form = QuoteForm::default();
        lock(&self.state).quoting = Some((request_id, form.clone()));
        form
    }

    pub fn quoting(&self) -> Option<(i32, QuoteForm)> {
        lock(&self.state).quoting.clone()
    }

    pub fn cancel_quoting(&self) {
        lock(&self.state).quoting = None;
    }

    /// Send a quote for `request_id`
    pub async fn submit_quote(&self, request_id: i32, form: &QuoteForm) -> ViewResult<()> {
        let Some(supplier_id) = self.ctx.session.supplier_id() else {
            let raw = self.ctx.session.supplier_id_raw().unwrap_or_default();
            let message = format!(
                "Session error (ID={}). Please log out and sign in again.",
                raw
            );
            self.ctx.alert(&message);
            return Err(ViewError::Session(message));
        };

        let price = match form.price.trim().parse::<f64>() {
            Ok(price) if price.is_finite() => price,
            _ => {
                let message = format!("Invalid price: {}", form.price);
                self.ctx.alert(&message);
                return Err(ViewError::Validation(message));
            }
        };

        let _guard = self.in_flight.begin(&format!("quote:{}", request_id))?;

        let offer = NewOffer {
            supplier_id,
            request_id,
            price,
            delivery_time: form.delivery_time.trim().to_string(),
            conditions: OFFER_CONDITIONS.to_string(),
            attachments: form.attachments.clone(),
            photo: Some(form.photo.trim().to_string()).filter(|p| !p.is_empty()),
            status: OFFER_STATUS.to_string(),
        };

        match self.ctx.api.submit_offer(&offer).await {
            Ok(created) => {
                tracing::info!(supplier_id, request_id, offer_id = created.id, "Offer submitted");
                self.ctx.alert("Offer sent successfully!");
                let quoted = self.ctx.session.record_quoted(supplier_id, request_id)?;
                let mut state = lock(&self.state);
                state.local_quoted = quoted;
                state.quoting = None;
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, supplier_id, request_id, "Offer submission failed");
                let reason = e
                    .server_message()
                    .map(str::to_string)
                    .unwrap_or_else(|| e.to_string());
                self.ctx.alert(&format!("Error sending offer: {}", reason));
                Err(ViewError::Api(e))
            }
        }
    }

    /// Comma-joined document list being edited
    pub fn documents(&self) -> String {
        lock(&self.state).documents.clone()
    }

    pub fn document_names(&self) -> Vec<String> {
        split_documents(&lock(&self.state).documents)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// True once the list came from the profile or was set explicitly
    pub fn documents_loaded(&self) -> bool {
        lock(&self.state).documents_loaded
    }

    pub fn set_documents(&self, documents: impl Into<String>) {
        let mut state = lock(&self.state);
        state.documents = documents.into();
        state.documents_loaded = true;
    }

    /// Persist the document list on the supplier profile
    ///
    /// Refused while the list was never loaded, so a failed profile fetch
    /// cannot replace the stored list.
    pub async fn save_documents(&self) -> ViewResult<()> {
        let Some(supplier_id) = self.ctx.session.supplier_id() else {
            return Err(ViewError::Session("no supplier id stored".to_string()));
        };
        let documents = {
            let state = lock(&self.state);
            if !state.documents_loaded {
                drop(state);
                self.ctx.alert(DOCUMENTS_NOT_LOADED);
                return Err(ViewError::Validation(DOCUMENTS_NOT_LOADED.to_string()));
            }
            state.documents.clone()
        };
        let _guard = self.in_flight.begin("save-documents")?;

        match self.ctx.api.update_documents(supplier_id, &documents).await {
            Ok(()) => {
                self.ctx.alert("Documents updated successfully");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, supplier_id, "Saving documents failed");
                self.ctx.alert("Error saving documents");
                Err(ViewError::Api(e))
            }
        }
    }

    /// Upload a file and append its stored name to the document list
    ///
    /// The list is only edited locally; call [`save_documents`] to persist.
    ///
    /// [`save_documents`]: DashboardView::save_documents
    pub async fn upload_document(&self, file_name: &str, bytes: Vec<u8>) -> ViewResult<String> {
        let _guard = self.in_flight.begin("upload")?;

        match self.ctx.api.upload(FilePart::file(file_name, bytes)).await {
            Ok(uploaded) => {
                {
                    let mut state = lock(&self.state);
                    if state.documents.trim().is_empty() {
                        state.documents = uploaded.filename.clone();
                    } else {
                        state.documents = format!("{}, {}", state.documents, uploaded.filename);
                    }
                }
                self.ctx.alert(&format!("File uploaded: {}", file_name));
                Ok(uploaded.filename)
            }
            Err(e) => {
                tracing::error!(error = %e, file_name, "Upload failed");
                self.ctx.alert("Error uploading file");
                Err(ViewError::Api(e))
            }
        }
    }

    /// Drop the credential and go back to the login view
    pub fn logout(&self) -> ViewResult<Route> {
        self.ctx.session.sign_out()?;
        Ok(Route::Login)
    }
}
