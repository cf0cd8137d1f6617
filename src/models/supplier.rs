//! Supplier records and compliance updates

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A supplier as returned by the portal backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub contact: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub created_at: NaiveDateTime,
    /// Comma-joined stored file names
    #[serde(default)]
    pub documents: String,
    #[serde(default)]
    pub earnings_count: i32,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub is_reviewed: bool,
    #[serde(default)]
    pub is_approved: bool,
    #[serde(default)]
    pub is_audited: bool,
}

impl Supplier {
    /// Current compliance flags as an update body
    pub fn compliance(&self) -> ComplianceUpdate {
        ComplianceUpdate {
            is_reviewed: self.is_reviewed,
            is_approved: self.is_approved,
            is_audited: self.is_audited,
        }
    }

    /// Document names, trimmed, empty entries skipped
    pub fn document_names(&self) -> Vec<&str> {
        split_documents(&self.documents)
    }
}

/// Registration body sent to `POST /register`
#[derive(Debug, Clone, Serialize)]
pub struct NewSupplier {
    pub name: String,
    pub contact: String,
    pub email: String,
    pub phone: String,
    /// Plain password; the backend hashes it on insert
    pub password_hash: String,
    pub created_at: String,
    pub documents: String,
    pub active: bool,
    pub is_reviewed: bool,
    pub is_approved: bool,
    pub is_audited: bool,
}

/// Body of `PUT /admin/compliance/{id}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceUpdate {
    pub is_reviewed: bool,
    pub is_approved: bool,
    pub is_audited: bool,
}

/// One of the three compliance checkboxes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplianceFlag {
    Reviewed,
    Approved,
    Audited,
}

impl ComplianceUpdate {
    /// Copy of these flags with exactly one field replaced
    pub fn with(mut self, flag: ComplianceFlag, value: bool) -> Self {
        match flag {
            ComplianceFlag::Reviewed => self.is_reviewed = value,
            ComplianceFlag::Approved => self.is_approved = value,
            ComplianceFlag::Audited => self.is_audited = value,
        }
        self
    }
}

impl std::str::FromStr for ComplianceFlag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reviewed" | "rev" => Ok(ComplianceFlag::Reviewed),
            "approved" | "apro" => Ok(ComplianceFlag::Approved),
            "audited" | "audi" => Ok(ComplianceFlag::Audited),
            other => Err(format!("unknown compliance flag: {}", other)),
        }
    }
}

/// Split a comma-joined document list into trimmed, non-empty names
pub fn split_documents(documents: &str) -> Vec<&str> {
    documents
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect()
}

/// Shorten long file names for link labels: `first10...last5`
pub fn shorten_document_name(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= 20 {
        return name.to_string();
    }
    let head: String = chars[..10].iter().collect();
    let tail: String = chars[chars.len() - 5..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supplier_json() -> &'static str {
        r#"{
            "id": 7,
            "name": "Acme",
            "contact": "Ana",
            "email": "ana@acme.test",
            "phone": "555",
            "created_at": "2025-01-10T09:30:00",
            "documents": "acta.pdf, , rfc.pdf",
            "earnings_count": 0,
            "active": true,
            "is_reviewed": true,
            "is_approved": false,
            "is_audited": false
        }"#
    }

    #[test]
    fn test_deserialize_supplier() {
        let supplier: Supplier = serde_json::from_str(supplier_json()).unwrap();
        assert_eq!(supplier.id, 7);
        assert!(supplier.is_reviewed);
        assert_eq!(supplier.document_names(), vec!["acta.pdf", "rfc.pdf"]);
    }

    #[test]
    fn test_minimal_supplier_parses() {
        // The backend skips password_hash; a missing phone still parses
        let supplier: Supplier = serde_json::from_str(
            r#"{"id":1,"name":"X","email":"x@y.z","created_at":"2025-01-10T09:30:00.123"}"#,
        )
        .unwrap();
        assert_eq!(supplier.phone, "");
        assert!(!supplier.active);
    }

    #[test]
    fn test_compliance_with_flips_one_flag() {
        let base = ComplianceUpdate {
            is_reviewed: true,
            is_approved: false,
            is_audited: true,
        };
        let updated = base.with(ComplianceFlag::Approved, true);
        assert_eq!(
            updated,
            ComplianceUpdate {
                is_reviewed: true,
                is_approved: true,
                is_audited: true,
            }
        );
    }

    #[test]
    fn test_parse_compliance_flag() {
        assert_eq!("rev".parse::<ComplianceFlag>(), Ok(ComplianceFlag::Reviewed));
        assert_eq!("Audited".parse::<ComplianceFlag>(), Ok(ComplianceFlag::Audited));
        assert!("other".parse::<ComplianceFlag>().is_err());
    }

    #[test]
    fn test_shorten_document_name() {
        assert_eq!(shorten_document_name("short.pdf"), "short.pdf");
        assert_eq!(
            shorten_document_name("0123456789abcdefghij-long.pdf"),
            "0123456789...g.pdf"
        );
    }
}
