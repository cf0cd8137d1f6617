//! ERP import items
//!
//! Items can be read from a JSON array or a CSV file whose header row names
//! the fields (`external_id,title,description,quantity,units,deadline,tags`).

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Deadline format accepted by the ERP endpoint
pub const ERP_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One procurement item pushed through `POST /erp/import`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErpItem {
    pub external_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub quantity: i32,
    #[serde(default)]
    pub units: String,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
}

/// Reply of the ERP import endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportResponse {
    pub status: String,
    pub message: String,
    #[serde(default)]
    pub processed: usize,
}

/// Errors reading an ERP item file
#[derive(Error, Debug)]
pub enum ErpFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Line {line}: {message}")]
    Csv { line: usize, message: String },

    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("Item {0}: external_id and title are required")]
    MissingField(usize),
}

/// Parse a JSON array of items
pub fn parse_erp_json(data: &str) -> Result<Vec<ErpItem>, ErpFileError> {
    let items: Vec<ErpItem> = serde_json::from_str(data)?;
    check_required(&items)?;
    Ok(items)
}

/// Parse CSV with a header row; empty optional cells become `None`
pub fn parse_erp_csv(data: &str) -> Result<Vec<ErpItem>, ErpFileError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(data.as_bytes());

    let mut items = Vec::new();
    for (line_num, result) in reader.deserialize::<ErpItem>().enumerate() {
        let item = result.map_err(|e| ErpFileError::Csv {
            line: line_num + 2,
            message: e.to_string(),
        })?;
        items.push(item);
    }

    check_required(&items)?;
    Ok(items)
}

/// Read items from `path`, choosing the parser by extension
pub fn load_erp_file(path: &Path) -> Result<Vec<ErpItem>, ErpFileError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let data = std::fs::read_to_string(path)?;
    match extension.as_str() {
        "json" => parse_erp_json(&data),
        "csv" => parse_erp_csv(&data),
        other => Err(ErpFileError::UnsupportedFormat(other.to_string())),
    }
}

fn check_required(items: &[ErpItem]) -> Result<(), ErpFileError> {
    match items
        .iter()
        .position(|i| i.external_id.trim().is_empty() || i.title.trim().is_empty())
    {
        Some(index) => Err(ErpFileError::MissingField(index + 1)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_csv_with_empty_optionals() {
        let data = "external_id,title,description,quantity,units,deadline,tags\n\
                    ERP-1, Steel bolts ,M8 zinc,500,Piezas,2025-03-01T00:00:00,hardware\n\
                    ERP-2,Gloves,,20,Pares,,\n";

        let items = parse_erp_csv(data).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Steel bolts");
        assert_eq!(items[0].quantity, 500);
        assert_eq!(items[0].deadline.as_deref(), Some("2025-03-01T00:00:00"));
        assert_eq!(items[1].description, "");
        assert!(items[1].deadline.is_none());
        assert!(items[1].tags.is_none());
    }

    #[test]
    fn test_parse_csv_reports_line() {
        let data = "external_id,title,description,quantity,units,deadline,tags\n\
                    ERP-1,Bolts,,many,Piezas,,\n";

        match parse_erp_csv(data) {
            Err(ErpFileError::Csv { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected csv error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_json_requires_title() {
        let data = r#"[
            {"external_id": "A", "title": "Paper", "quantity": 3},
            {"external_id": "B", "title": "", "quantity": 1}
        ]"#;

        assert!(matches!(
            parse_erp_json(data),
            Err(ErpFileError::MissingField(2))
        ));
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("items.JSON");
        std::fs::write(
            &json_path,
            r#"[{"external_id": "A", "title": "Paper", "quantity": 3}]"#,
        )
        .unwrap();
        let items = load_erp_file(&json_path).unwrap();
        assert_eq!(items[0].units, "");

        let txt_path = dir.path().join("items.txt");
        let mut file = std::fs::File::create(&txt_path).unwrap();
        writeln!(file, "nothing").unwrap();
        assert!(matches!(
            load_erp_file(&txt_path),
            Err(ErpFileError::UnsupportedFormat(_))
        ));
    }
}
