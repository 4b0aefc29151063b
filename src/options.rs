use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{
    io::{DocumentFormat, OutputOptions, parse_document_str},
    list::DragConfig,
};

/// Settings shared by every list a document editor opens.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorOptions {
    pub drag: DragConfig,
    /// Validate against the site schema before writing.
    pub auto_validate: bool,
    #[serde(skip)]
    pub output: OutputOptions,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            drag: DragConfig::default(),
            auto_validate: true,
            output: OutputOptions::default(),
        }
    }
}

impl EditorOptions {
    /// Reads options from a settings file body; missing keys keep their defaults.
    pub fn from_settings(contents: &str, format: DocumentFormat) -> Result<Self> {
        let value = parse_document_str(contents, format)?;
        serde_json::from_value(value).context("invalid editor options")
    }

    pub fn with_drag(mut self, drag: DragConfig) -> Self {
        self.drag = drag;
        self
    }

    pub fn with_auto_validate(mut self, enabled: bool) -> Self {
        self.auto_validate = enabled;
        self
    }

    pub fn with_output(mut self, output: OutputOptions) -> Self {
        self.output = output;
        self
    }
}
