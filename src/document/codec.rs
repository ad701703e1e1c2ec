use std::fs;
use std::path::Path;

use crate::document::{Mapping, Node};
use crate::error::{MonobumpError, Result};

/// On-disk format of a versioning document, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// `.json` (any case) is JSON, everything else is YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => DocumentFormat::Json,
            _ => DocumentFormat::Yaml,
        }
    }
}

/// Decode document bytes. `path` only selects the format and names errors.
///
/// An empty or `null` document decodes to an empty mapping; any other
/// non-mapping root is rejected.
pub fn decode(path: &Path, content: &[u8]) -> Result<Mapping> {
    let root = match DocumentFormat::from_path(path) {
        DocumentFormat::Json => {
            let value: serde_json::Value = serde_json::from_slice(content)
                .map_err(|e| MonobumpError::document_io(path, format!("parse JSON: {}", e)))?;
            Node::from_json(value)
        }
        DocumentFormat::Yaml => {
            let value: serde_yaml::Value = serde_yaml::from_slice(content)
                .map_err(|e| MonobumpError::document_io(path, format!("parse YAML: {}", e)))?;
            Node::from_yaml(value)
                .map_err(|e| MonobumpError::document_io(path, format!("parse YAML: {}", e)))?
        }
    };

    match root {
        Node::Mapping(map) => Ok(map),
        Node::Scalar(crate::document::Scalar::Null) => Ok(Mapping::new()),
        _ => Err(MonobumpError::document_io(
            path,
            "document root is not a mapping",
        )),
    }
}

/// Encode a document. JSON uses a two-space indent and a trailing newline.
pub fn encode(path: &Path, doc: &Mapping) -> Result<Vec<u8>> {
    match DocumentFormat::from_path(path) {
        DocumentFormat::Json => {
            let mut out = serde_json::to_vec_pretty(doc)
                .map_err(|e| MonobumpError::document_io(path, format!("marshal JSON: {}", e)))?;
            out.push(b'\n');
            Ok(out)
        }
        DocumentFormat::Yaml => serde_yaml::to_string(doc)
            .map(String::into_bytes)
            .map_err(|e| MonobumpError::document_io(path, format!("marshal YAML: {}", e))),
    }
}

/// Read and decode the document at `path`
pub fn read_document(path: &Path) -> Result<Mapping> {
    let content = fs::read(path).map_err(|e| MonobumpError::document_io(path, e))?;
    decode(path, &content)
}

/// Encode `doc` and overwrite the file at `path`
pub fn write_document(path: &Path, doc: &Mapping) -> Result<()> {
    let out = encode(path, doc)?;
    fs::write(path, out).map_err(|e| MonobumpError::document_io(path, e))
}
