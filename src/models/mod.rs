//! Portal Data Model
//!
//! Plain records mirrored from the portal backend. The client never owns
//! their lifecycle; it only reads them and sends the request bodies below.

mod email_config;
mod erp;
mod offer;
mod request;
mod supplier;

pub use email_config::{resolve_upload_url, EmailConfig, PASSWORD_MASK};
pub use erp::{
    load_erp_file, parse_erp_csv, parse_erp_json, ErpFileError, ErpItem, ImportResponse,
    ERP_TIMESTAMP_FORMAT,
};
pub use offer::{NewOffer, Offer};
pub use request::ProcurementRequest;
pub use supplier::{
    shorten_document_name, split_documents, ComplianceFlag, ComplianceUpdate, NewSupplier,
    Supplier,
};
