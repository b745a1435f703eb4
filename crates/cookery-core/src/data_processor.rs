//! CSV ingestion for the knowledge base.
//!
//! Every row becomes one [`Document`]. The header is checked once against the
//! declared text and keyword columns; absent columns are logged and the
//! affected fields stay missing (the index treats them as empty/null).
//!
//! Files in the cooking schema (`ID`, `type`, `question`, `response`) are read
//! as typed [`CookingEntry`] records; any other layout goes through the
//! generic column mapping.
use csv::{Reader, ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use serde_json::{Number, Value};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::types::{DocId, Document};

/// Column synthesized from the row position when the file has none.
pub const ID_COLUMN: &str = "ID";

/// Text columns of the cooking knowledge base.
pub const COOKING_COLUMNS: [&str; 3] = ["type", "question", "response"];

/// One row of the cooking knowledge base.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CookingEntry {
    #[serde(rename = "ID", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub r#type: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
}

impl CookingEntry {
    /// Convert into a [`Document`] at row position `row`. Empty or absent
    /// cells leave the field missing; a missing `ID` becomes null unless
    /// `synthesize_id` asks for the row position.
    pub fn into_document(self, row: DocId, synthesize_id: bool) -> Document {
        let mut fields = BTreeMap::new();
        let id = if synthesize_id {
            Value::Number(Number::from(row))
        } else {
            self.id.as_deref().map_or(Value::Null, keyword_value)
        };
        fields.insert(ID_COLUMN.to_string(), id);
        for (name, cell) in COOKING_COLUMNS.iter().zip([self.r#type, self.question, self.response]) {
            if let Some(cell) = cell {
                fields.insert(name.to_string(), Value::String(cell));
            }
        }
        Document { id: row, fields }
    }
}

#[derive(Debug, Clone)]
pub struct DataProcessor {
    text_columns: Vec<String>,
    keyword_columns: Vec<String>,
}

impl Default for DataProcessor {
    fn default() -> Self {
        Self::new(["type", "question", "response"], [ID_COLUMN])
    }
}

impl DataProcessor {
    pub fn new<T, K>(text_columns: T, keyword_columns: K) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        K: IntoIterator,
        K::Item: Into<String>,
    {
        Self {
            text_columns: text_columns.into_iter().map(Into::into).collect(),
            keyword_columns: keyword_columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn process_csv(&self, path: &Path) -> Result<Vec<Document>> {
        info!(path = %path.display(), "Loading knowledge base");
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::NotFound(format!("knowledge base {}", path.display())),
            _ => Error::Io(e),
        })?;
        self.process_reader(BufReader::new(file))
    }

    pub fn process_reader<R: Read>(&self, reader: R) -> Result<Vec<Document>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::Headers)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        self.check_headers(&headers);
        let synthesize_id = !headers.iter().any(|h| h == ID_COLUMN);

        let documents = if self.is_cooking_schema(&headers) {
            debug!("Reading rows as cooking entries");
            read_entries(&mut reader)?
                .into_iter()
                .enumerate()
                .map(|(row, entry)| entry.into_document(row, synthesize_id))
                .collect()
        } else {
            let mut documents = Vec::new();
            for (row, record) in reader.records().enumerate() {
                let record = record?;
                documents.push(self.record_to_document(row, &record, &headers, synthesize_id));
            }
            documents
        };
        info!(documents = documents.len(), "Knowledge base loaded");
        Ok(documents)
    }

    /// Declared columns are the cooking ones and the file carries nothing else.
    fn is_cooking_schema(&self, headers: &StringRecord) -> bool {
        self.text_columns.iter().map(String::as_str).eq(COOKING_COLUMNS)
            && self.keyword_columns.iter().all(|k| k == ID_COLUMN)
            && headers.iter().all(|h| h == ID_COLUMN || COOKING_COLUMNS.contains(&h))
    }

    fn check_headers(&self, headers: &StringRecord) {
        for column in self.text_columns.iter().chain(&self.keyword_columns) {
            if column == ID_COLUMN {
                continue;
            }
            if !headers.iter().any(|h| h == column) {
                warn!(column = %column, "Declared column missing from CSV header; values default to empty");
            }
        }
    }

    fn record_to_document(&self, row: usize, record: &StringRecord, headers: &StringRecord, synthesize_id: bool) -> Document {
        let mut fields = BTreeMap::new();
        if synthesize_id {
            fields.insert(ID_COLUMN.to_string(), Value::Number(Number::from(row)));
        }
        for (i, name) in headers.iter().enumerate() {
            let Some(cell) = record.get(i) else {
                debug!(row, column = name, "Short row; leaving field missing");
                continue;
            };
            let value = if self.keyword_columns.iter().any(|k| k == name) {
                keyword_value(cell)
            } else {
                Value::String(cell.to_string())
            };
            fields.insert(name.to_string(), value);
        }
        Document { id: row, fields }
    }
}

fn read_entries<R: Read>(reader: &mut Reader<R>) -> Result<Vec<CookingEntry>> {
    let mut entries = Vec::new();
    for entry in reader.deserialize::<CookingEntry>() {
        entries.push(entry?);
    }
    Ok(entries)
}

/// Keyword cells keep their scalar type so filters compare like with like:
/// empty → null, then integer, float, bool, and finally string.
fn keyword_value(cell: &str) -> Value {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::Number(Number::from(i));
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if let Some(n) = Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    match trimmed {
        "true" | "True" | "TRUE" => Value::Bool(true),
        "false" | "False" | "FALSE" => Value::Bool(false),
        _ => Value::String(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_values_are_typed() {
        assert_eq!(keyword_value(""), Value::Null);
        assert_eq!(keyword_value(" 42 "), Value::from(42));
        assert_eq!(keyword_value("1.5"), Value::from(1.5));
        assert_eq!(keyword_value("true"), Value::Bool(true));
        assert_eq!(keyword_value("basic"), Value::from("basic"));
    }

    #[test]
    fn synthesizes_id_from_row_position() {
        let csv = "type,question,response\nbasic,How do I boil an egg,Boil water\nbasic,How do I dice an onion,Cut it\n";
        let docs = DataProcessor::default().process_reader(csv.as_bytes()).expect("process");
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, 0);
        assert_eq!(docs[1].get(ID_COLUMN), Some(&Value::from(1)));
        assert_eq!(docs[1].text("question"), "How do I dice an onion");
    }

    #[test]
    fn keeps_existing_id_column() {
        let csv = "ID,type,question,response\n7,basic,q,r\n";
        let docs = DataProcessor::default().process_reader(csv.as_bytes()).expect("process");
        assert_eq!(docs[0].get(ID_COLUMN), Some(&Value::from(7)));
        assert_eq!(docs[0].id, 0);
    }

    #[test]
    fn cooking_rows_read_as_typed_entries() {
        let csv = "ID,type,question,response\n3,basic,How do I boil an egg,\"Boil water, add egg\"\n,storage,,Keep cool\n";
        let mut reader = ReaderBuilder::new().flexible(true).from_reader(csv.as_bytes());
        let entries = read_entries(&mut reader).expect("entries");
        assert_eq!(entries[0], CookingEntry {
            id: Some("3".to_string()),
            r#type: Some("basic".to_string()),
            question: Some("How do I boil an egg".to_string()),
            response: Some("Boil water, add egg".to_string()),
        });
        assert_eq!(entries[1].id, None);
        assert_eq!(entries[1].question, None);

        let doc = entries[1].clone().into_document(1, false);
        assert_eq!(doc.get(ID_COLUMN), Some(&Value::Null));
        assert_eq!(doc.get("question"), None);
        assert_eq!(doc.text("response"), "Keep cool");
    }

    #[test]
    fn extra_columns_use_generic_mapping() {
        let csv = "type,question,response,source\nbasic,q,r,grandma\n";
        let docs = DataProcessor::default().process_reader(csv.as_bytes()).expect("process");
        assert_eq!(docs[0].text("source"), "grandma");
        assert_eq!(docs[0].get(ID_COLUMN), Some(&Value::from(0)));

        let typed = DataProcessor::default().process_reader("type,question,response\nbasic,q,r\n".as_bytes()).expect("process");
        assert_eq!(typed[0].fields.len(), 4);
    }

    #[test]
    fn short_rows_leave_fields_missing() {
        let csv = "type,question,response\nbasic,Only a question\n";
        let docs = DataProcessor::default().process_reader(csv.as_bytes()).expect("process");
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].get("response"), None);
        assert_eq!(docs[0].text("response"), "");
    }
}
