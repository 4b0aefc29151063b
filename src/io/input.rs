use std::{fs, path::Path};

use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use super::DocumentFormat;

/// Parse structured data in any supported format into a `serde_json::Value`.
pub fn parse_document_str(contents: &str, format: DocumentFormat) -> Result<Value> {
    match format {
        DocumentFormat::Json => {
            serde_json::from_str::<Value>(contents).with_context(|| "failed to parse JSON document")
        }
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => {
            serde_yaml::from_str::<Value>(contents).with_context(|| "failed to parse YAML document")
        }
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => contents
            .parse::<toml::Value>()
            .with_context(|| "failed to parse TOML document")
            .and_then(|value| {
                serde_json::to_value(value).context("failed to convert TOML to JSON")
            }),
    }
}

/// Parse with the preferred format first, then every other available format.
pub fn parse_document_any(contents: &str, preferred: DocumentFormat) -> Result<Value> {
    let primary = match parse_document_str(contents, preferred) {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };
    for candidate in DocumentFormat::available_formats() {
        if candidate == preferred {
            continue;
        }
        if let Ok(value) = parse_document_str(contents, candidate) {
            return Ok(value);
        }
    }
    Err(anyhow!(
        "failed to parse document as any of {} (first error: {primary:#})",
        DocumentFormat::available_formats()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    ))
}

/// Read a site document from disk; a missing file yields an empty document.
pub fn load_document(path: &Path) -> Result<(Value, DocumentFormat)> {
    let format = DocumentFormat::from_path(path).unwrap_or_default();
    if !path.exists() {
        tracing::info!(path = %path.display(), "document not found; starting empty");
        return Ok((Value::Object(Default::default()), format));
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read file {}", path.display()))?;
    let value = parse_document_any(&contents, format)
        .with_context(|| format!("failed to load document from {}", path.display()))?;
    Ok((value, format))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_json_documents() {
        let value = parse_document_str(r#"{"headerNav": []}"#, DocumentFormat::Json).unwrap();
        assert_eq!(value, json!({"headerNav": []}));
    }

    #[test]
    fn reports_all_tried_formats() {
        let err = parse_document_any("{not json", DocumentFormat::Json).unwrap_err();
        assert!(err.to_string().contains("json"));
    }

    #[test]
    fn missing_file_loads_as_empty_document() {
        let path = std::env::temp_dir().join("blockedit-missing-document.json");
        let _ = fs::remove_file(&path);
        let (value, format) = load_document(&path).unwrap();
        assert_eq!(value, json!({}));
        assert_eq!(format, DocumentFormat::Json);
    }
}
