use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use super::DocumentFormat;

/// Where a saved site document goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDestination {
    Stdout,
    File(PathBuf),
}

impl OutputDestination {
    pub fn file(path: impl AsRef<Path>) -> Self {
        OutputDestination::File(path.as_ref().to_path_buf())
    }
}

/// Encoding and destinations used by `DocumentEditor::save`.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format: DocumentFormat,
    pub pretty: bool,
    pub destinations: Vec<OutputDestination>,
}

impl OutputOptions {
    pub fn new(format: DocumentFormat) -> Self {
        Self {
            format,
            pretty: true,
            destinations: vec![OutputDestination::Stdout],
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_destinations(mut self, destinations: Vec<OutputDestination>) -> Self {
        self.destinations = destinations;
        self
    }
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self::new(DocumentFormat::Json)
    }
}

/// Encodes the document once and writes it to every destination.
///
/// Files are replaced atomically: the payload goes to a sibling temp file that
/// is renamed over the target, so a failed save never leaves a truncated
/// document behind.
pub fn write_document(document: &Value, options: &OutputOptions) -> Result<()> {
    if options.destinations.is_empty() {
        return Ok(());
    }
    let payload = encode_document(document, options)?;
    for destination in &options.destinations {
        match destination {
            OutputDestination::Stdout => {
                print_payload(&payload).context("failed to print site document to stdout")?
            }
            OutputDestination::File(path) => replace_file(path, &payload)
                .with_context(|| format!("failed to save site document to {}", path.display()))?,
        }
    }
    Ok(())
}

/// The document text exactly as `write_document` would write it, minus the
/// trailing newline.
pub fn encode_document(document: &Value, options: &OutputOptions) -> Result<String> {
    let format = options.format;
    let encoded = match format {
        DocumentFormat::Json if options.pretty => {
            serde_json::to_string_pretty(document).map_err(anyhow::Error::from)
        }
        DocumentFormat::Json => serde_json::to_string(document).map_err(anyhow::Error::from),
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => serde_yaml::to_string(document).map_err(anyhow::Error::from),
        #[cfg(feature = "toml")]
        DocumentFormat::Toml if options.pretty => {
            toml::to_string_pretty(document).map_err(anyhow::Error::from)
        }
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => toml::to_string(document).map_err(anyhow::Error::from),
    };
    encoded.with_context(|| format!("cannot encode site document as {format}"))
}

fn print_payload(payload: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(payload.as_bytes())?;
    stdout.write_all(b"\n")?;
    stdout.flush()
}

fn replace_file(path: &Path, payload: &str) -> Result<()> {
    let name = path
        .file_name()
        .ok_or_else(|| anyhow!("destination has no file name"))?;
    let mut temp_name = name.to_os_string();
    temp_name.push(".blockedit-tmp");
    let temp = path.with_file_name(temp_name);

    let written = fs::File::create(&temp).and_then(|mut file| {
        file.write_all(payload.as_bytes())?;
        file.write_all(b"\n")?;
        file.sync_all()
    });
    if let Err(err) = written {
        let _ = fs::remove_file(&temp);
        return Err(err).with_context(|| format!("cannot write {}", temp.display()));
    }
    if let Err(err) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(err).with_context(|| format!("cannot move {} into place", temp.display()));
    }
    tracing::debug!(path = %path.display(), bytes = payload.len(), "site document saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use serde_json::json;

    use super::*;

    fn scratch_dir(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("blockedit-{label}-{nanos}"));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn to(path: &Path) -> OutputOptions {
        OutputOptions::default().with_destinations(vec![OutputDestination::file(path)])
    }

    #[test]
    fn nothing_is_written_without_destinations() {
        let options = OutputOptions::default().with_destinations(Vec::new());
        write_document(&json!({"footer": []}), &options).unwrap();
    }

    #[test]
    fn compact_json_has_no_newlines() {
        let options = OutputOptions::new(DocumentFormat::Json).with_pretty(false);
        let payload = encode_document(&json!({"headerNav": [{"label": "A"}]}), &options).unwrap();
        assert_eq!(payload, r#"{"headerNav":[{"label":"A"}]}"#);
    }

    #[test]
    fn save_replaces_the_document_and_leaves_no_temp_file() {
        let dir = scratch_dir("replace");
        let path = dir.join("site.json");
        fs::write(&path, "{\"headerNav\": [\"old\"]}").unwrap();

        write_document(&json!({"headerNav": []}), &to(&path)).unwrap();

        let saved: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved, json!({"headerNav": []}));
        let leftovers: Vec<_> = fs::read_dir(&dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("site.json")]);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn failed_save_names_the_document() {
        let dir = scratch_dir("missing");
        let path = dir.join("no-such-dir").join("site.json");
        let err = write_document(&json!({}), &to(&path)).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("failed to save site document to"));
        assert!(message.contains("site.json"));
        assert!(!path.exists());
        let _ = fs::remove_dir_all(dir);
    }
}
