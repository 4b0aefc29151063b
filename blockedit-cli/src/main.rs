use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::{Report, Result, WrapErr, eyre};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

mod terminal;

use blockedit::{
    DocumentEditor, EditorOptions, KeySession, ListOp, ListPath,
    cms::{BlockKind, ContentBlock},
    io::{DocumentFormat, OutputDestination, OutputOptions, load_document, parse_document_str},
    keymap::help_text,
    validate::site_schema,
};

#[derive(Debug, Parser)]
#[command(
    name = "blockedit",
    version,
    about = "Edit the navigation, content blocks and footer of a site document"
)]
struct Cli {
    /// Site document to edit; created on first write when missing
    #[arg(short = 'd', long = "document", value_name = "PATH", default_value = "site.json")]
    document: PathBuf,

    /// Editor settings file (drag thresholds, validation)
    #[arg(long = "settings", value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Output destinations ("-" writes to stdout). Defaults to the document itself.
    #[arg(short = 'o', long = "output", value_name = "DEST", num_args = 1.., action = ArgAction::Append)]
    outputs: Vec<String>,

    /// Emit compact JSON/TOML rather than pretty formatting
    #[arg(long = "no-pretty")]
    no_pretty: bool,

    /// Overwrite output files other than the document even if they already exist
    #[arg(short = 'f', long = "force", short_alias = 'y', alias = "yes")]
    force: bool,

    /// Write even when the document fails validation
    #[arg(long = "no-validate")]
    no_validate: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print an outline of every list
    Show {
        /// Expand nested lists
        #[arg(short = 'e', long = "expand")]
        expand: bool,
    },
    /// Append an item to a list (nav, blocks, footer, nav/0/subItems, ...)
    Add {
        list: ListPath,
        /// Item as inline JSON; defaults to the list's blank item
        #[arg(long = "item", value_name = "JSON", conflicts_with = "kind")]
        item: Option<String>,
        /// Block type to add (blocks list only)
        #[arg(long = "kind", value_name = "TYPE")]
        kind: Option<BlockKind>,
    },
    /// Shallow-merge a JSON patch into one item
    Update {
        list: ListPath,
        index: usize,
        #[arg(value_name = "PATCH")]
        patch: String,
    },
    /// Remove one item
    Delete { list: ListPath, index: usize },
    /// Move one item to another position
    Move {
        list: ListPath,
        from: usize,
        to: usize,
    },
    /// Check the document against the site schema
    Validate,
    /// Print the site document JSON Schema
    Schema,
    /// Edit one list from the keyboard (see `keys` for the bindings)
    Edit {
        #[arg(default_value = "nav")]
        list: ListPath,
    },
    /// List the key bindings used by `edit`
    Keys,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Command::Schema => {
            let schema = serde_json::to_string_pretty(&site_schema())
                .wrap_err("failed to serialize schema")?;
            println!("{schema}");
            return Ok(());
        }
        Command::Keys => {
            for line in help_text() {
                println!("{line}");
            }
            return Ok(());
        }
        _ => {}
    }

    let (document, format) = load_document(&cli.document).map_err(anyhow_report)?;
    tracing::info!(document = %cli.document.display(), %format, "loaded site document");
    let options = load_settings(cli.settings.as_deref())?;
    let mut editor = DocumentEditor::new(document).with_options(options);

    if let Command::Edit { list } = &cli.command {
        if cli.outputs.iter().any(|raw| raw == "-") {
            return Err(eyre!("edit cannot save to stdout while it owns the terminal"));
        }
        configure_save(&cli, format, &mut editor)?;
        return terminal::run(&mut editor, KeySession::new(*list));
    }

    let (path, op) = match &cli.command {
        Command::Show { expand } => {
            let lines = editor
                .outline(*expand)
                .wrap_err("document does not match the site layout")?;
            for line in lines {
                println!("{line}");
            }
            return Ok(());
        }
        Command::Validate => return report_issues(&editor),
        Command::Add { list, item, kind } => (*list, add_op(list, item.as_deref(), *kind)?),
        Command::Update { list, index, patch } => (
            *list,
            ListOp::Update {
                index: *index,
                patch: parse_inline(patch, "patch")?,
            },
        ),
        Command::Delete { list, index } => (*list, ListOp::Delete { index: *index }),
        Command::Move { list, from, to } => (
            *list,
            ListOp::Move {
                from: *from,
                to: *to,
            },
        ),
        Command::Schema | Command::Keys | Command::Edit { .. } => unreachable!("handled above"),
    };

    tracing::debug!(%path, ?op, "applying list operation");
    let changed = editor.apply(&path, op)?;
    if !changed {
        tracing::warn!(%path, "operation left the list unchanged");
        eprintln!("nothing to change in {path}");
        return Ok(());
    }

    configure_save(&cli, format, &mut editor)?;
    editor.save().map_err(anyhow_report)?;
    tracing::info!(%path, "site document saved");
    Ok(())
}

fn configure_save(cli: &Cli, format: DocumentFormat, editor: &mut DocumentEditor) -> Result<()> {
    let mut diagnostics = DiagnosticCollector::default();
    let output = build_output_options(cli, format, &mut diagnostics);
    diagnostics.into_result()?;

    let options = editor.options_mut();
    options.output = output;
    if cli.no_validate {
        options.auto_validate = false;
    }
    Ok(())
}

fn anyhow_report(err: impl std::fmt::Display) -> Report {
    eyre!("{err:#}")
}

fn load_settings(path: Option<&Path>) -> Result<EditorOptions> {
    let Some(path) = path else {
        return Ok(EditorOptions::default());
    };
    let contents = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read settings {}", path.display()))?;
    let format = DocumentFormat::from_path(path).unwrap_or_default();
    EditorOptions::from_settings(&contents, format).map_err(anyhow_report)
}

fn add_op(list: &ListPath, item: Option<&str>, kind: Option<BlockKind>) -> Result<ListOp> {
    if let Some(kind) = kind {
        if *list != ListPath::Blocks {
            return Err(eyre!("--kind only applies to the blocks list, not {list}"));
        }
        let block = serde_json::to_value(ContentBlock::new(kind))
            .wrap_err("failed to build block")?;
        return Ok(ListOp::Add(Some(block)));
    }
    item.map(|raw| parse_inline(raw, "item"))
        .transpose()
        .map(ListOp::Add)
}

fn parse_inline(raw: &str, label: &str) -> Result<Value> {
    parse_document_str(raw, DocumentFormat::Json)
        .map_err(anyhow_report)
        .wrap_err_with(|| format!("invalid {label}"))
}

fn report_issues(editor: &DocumentEditor) -> Result<()> {
    let issues = editor.validate().map_err(anyhow_report)?;
    if issues.is_empty() {
        println!("document is valid");
        return Ok(());
    }
    let mut body = format!("{} issue(s) found:\n", issues.len());
    for issue in &issues {
        let _ = writeln!(body, "  {issue}");
    }
    Err(eyre!(body))
}

#[derive(Default)]
struct DiagnosticCollector {
    messages: Vec<String>,
}

impl DiagnosticCollector {
    fn push_output(&mut self, message: impl Into<String>) {
        self.messages.push(format!("output: {}", message.into()));
    }

    fn into_result(self) -> Result<()> {
        if self.messages.is_empty() {
            return Ok(());
        }
        let mut body = String::from("encountered output issues:\n");
        for (idx, msg) in self.messages.iter().enumerate() {
            let _ = writeln!(body, "  {}. {}", idx + 1, msg);
        }
        Err(eyre!(body))
    }
}

fn build_output_options(
    cli: &Cli,
    document_format: DocumentFormat,
    diagnostics: &mut DiagnosticCollector,
) -> OutputOptions {
    let mut destinations = Vec::new();
    for raw in &cli.outputs {
        if raw.trim().is_empty() {
            diagnostics.push_output("output destination cannot be empty");
            continue;
        }
        if raw == "-" {
            destinations.push(OutputDestination::Stdout);
        } else {
            destinations.push(OutputDestination::file(raw));
        }
    }
    if cli.outputs.is_empty() {
        destinations.push(OutputDestination::file(&cli.document));
    }

    let file_paths: Vec<PathBuf> = destinations
        .iter()
        .filter_map(|dest| match dest {
            OutputDestination::File(path) => Some(path.clone()),
            OutputDestination::Stdout => None,
        })
        .collect();
    if !cli.force {
        for path in &file_paths {
            if path != &cli.document && path.exists() {
                diagnostics.push_output(format!(
                    "file {} already exists (pass --force to overwrite)",
                    path.display()
                ));
            }
        }
    }

    let format = if file_paths.is_empty() {
        document_format
    } else {
        infer_format_from_files(&file_paths, diagnostics).unwrap_or(document_format)
    };
    OutputOptions::new(format)
        .with_pretty(!cli.no_pretty)
        .with_destinations(destinations)
}

fn infer_format_from_files(
    file_paths: &[PathBuf],
    diagnostics: &mut DiagnosticCollector,
) -> Option<DocumentFormat> {
    let mut detected: Option<DocumentFormat> = None;
    for path in file_paths {
        match DocumentFormat::from_path(path) {
            Some(format) => match detected {
                Some(existing) if existing != format => diagnostics.push_output(format!(
                    "output file {} uses {format} but other destinations use {existing}; align extensions",
                    path.display()
                )),
                Some(_) => {}
                None => detected = Some(format),
            },
            None => diagnostics.push_output(format!(
                "cannot infer format from output file {}; use {}",
                path.display(),
                extension_list()
            )),
        }
    }
    detected
}

fn extension_list() -> String {
    DocumentFormat::available_formats()
        .into_iter()
        .map(|fmt| format!(".{fmt}"))
        .collect::<Vec<_>>()
        .join("/")
}
