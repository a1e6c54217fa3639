//! docfill CLI - template merges from the command line
//!
//! This binary provides command-line interfaces for:
//! - serve: run the native-messaging host on stdin/stdout
//! - merge: merge one JSON record into a template and exit
//! - templates: list the templates available in a directory

use clap::{Parser, Subcommand, ValueEnum};
use docfill_engine::{ArrayPolicy, MergeSettings, Transform};
use docfill_host::config::default_config_path;
use docfill_host::{list_templates, HostConfig, NativeHost};
use serde_json::{json, Map, Value};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "docfill")]
#[command(about = "Run-aware placeholder substitution for document templates")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the native-messaging host on stdin/stdout
    ///
    /// Stdout carries framed responses, so all diagnostics go to stderr.
    Serve {
        /// Configuration file (defaults to the per-user config location)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Merge a JSON record into a template once
    ///
    /// Examples:
    ///   docfill merge invoice.json record.json
    ///   docfill merge letter.txt record.json --transform uppercase
    Merge {
        /// Template file (.json document model or .txt)
        template: PathBuf,
        /// JSON file holding the record to merge
        data: PathBuf,
        /// Directory for the generated document
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
        /// Array-collapse policy, overriding the record's settings
        #[arg(long, value_enum)]
        array_handling: Option<ArrayArg>,
        /// Text transform, overriding the record's settings
        #[arg(long, value_enum)]
        transform: Option<TransformArg>,
        /// Keep unresolved tokens visible as literal text
        #[arg(long)]
        preserve_empty: bool,
        /// Open the generated document when done
        #[arg(long)]
        open: bool,
    },
    /// List templates in a directory
    Templates {
        /// Directory to scan
        #[arg(default_value = ".")]
        dir: PathBuf,
        /// Output format (table, json)
        #[arg(long, value_enum, default_value_t = ListFormat::Table)]
        format: ListFormat,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum ArrayArg {
    First,
    JoinComma,
    JoinSpace,
    JoinNewline,
    Count,
}

impl From<ArrayArg> for ArrayPolicy {
    fn from(arg: ArrayArg) -> Self {
        match arg {
            ArrayArg::First => ArrayPolicy::First,
            ArrayArg::JoinComma => ArrayPolicy::JoinComma,
            ArrayArg::JoinSpace => ArrayPolicy::JoinSpace,
            ArrayArg::JoinNewline => ArrayPolicy::JoinNewline,
            ArrayArg::Count => ArrayPolicy::Count,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum TransformArg {
    None,
    Uppercase,
    Lowercase,
    Capitalize,
    Sentence,
}

impl From<TransformArg> for Transform {
    fn from(arg: TransformArg) -> Self {
        match arg {
            TransformArg::None => Transform::None,
            TransformArg::Uppercase => Transform::Uppercase,
            TransformArg::Lowercase => Transform::Lowercase,
            TransformArg::Capitalize => Transform::Capitalize,
            TransformArg::Sentence => Transform::Sentence,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum ListFormat {
    Table,
    Json,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => {
            handle_serve(config)?;
        }
        Commands::Merge {
            template,
            data,
            output_dir,
            array_handling,
            transform,
            preserve_empty,
            open,
        } => {
            handle_merge(
                template,
                data,
                output_dir,
                array_handling,
                transform,
                preserve_empty,
                open,
            )?;
        }
        Commands::Templates { dir, format } => {
            handle_templates(dir, format)?;
        }
    }

    Ok(())
}

fn handle_serve(config: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let mut host = match config {
        Some(path) => {
            let config = HostConfig::load(&path);
            NativeHost::with_config(config, path)
        }
        None => NativeHost::new(),
    };
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut reader = stdin.lock();
    let mut writer = stdout.lock();
    host.run(&mut reader, &mut writer)?;
    Ok(())
}

fn handle_merge(
    template: PathBuf,
    data: PathBuf,
    output_dir: PathBuf,
    array_handling: Option<ArrayArg>,
    transform: Option<TransformArg>,
    preserve_empty: bool,
    open: bool,
) -> Result<(), Box<dyn Error>> {
    let raw = fs::read_to_string(&data)?;
    let parsed: Value = serde_json::from_str(&raw)?;
    let mut record = parsed
        .as_object()
        .cloned()
        .ok_or("data file must contain a JSON object")?;
    apply_setting_overrides(&mut record, array_handling, transform, preserve_empty)?;

    let template = fs::canonicalize(&template)?;
    let config = HostConfig {
        template_path: template
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
        output_path: output_dir,
        auto_open: open,
        ..HostConfig::default()
    };
    let host = NativeHost::with_config(config, default_config_path());

    let outcome = host.process_template(&json!({
        "template": template.to_string_lossy(),
        "extractedData": record,
    }))?;

    println!(
        "Merged {} -> {}",
        template.display(),
        outcome.output_path.display()
    );
    if let Some(stats) = outcome.stats {
        println!(
            "  {} replacements across {} of {} paragraphs ({} assets, {} cells)",
            stats.replacements,
            stats.paragraphs_touched,
            stats.paragraphs_scanned,
            stats.assets_dispatched,
            stats.cells_touched
        );
    }
    Ok(())
}

/// Fold command-line overrides into the record's `settings` object before
/// resolution. Flags win over whatever the record carried.
fn apply_setting_overrides(
    record: &mut Map<String, Value>,
    array_handling: Option<ArrayArg>,
    transform: Option<TransformArg>,
    preserve_empty: bool,
) -> Result<(), Box<dyn Error>> {
    if array_handling.is_none() && transform.is_none() && !preserve_empty {
        return Ok(());
    }
    let mut settings = match record.get("settings") {
        Some(value) => serde_json::from_value::<MergeSettings>(value.clone()).unwrap_or_default(),
        None => MergeSettings::default(),
    };
    if let Some(policy) = array_handling {
        settings.array_handling = policy.into();
    }
    if let Some(transform) = transform {
        settings.text_transform = transform.into();
    }
    if preserve_empty {
        settings.preserve_empty_placeholders = true;
    }
    record.insert("settings".to_string(), serde_json::to_value(&settings)?);
    Ok(())
}

fn handle_templates(dir: PathBuf, format: ListFormat) -> Result<(), Box<dyn Error>> {
    let templates = list_templates(&[dir])?;
    match format {
        ListFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&templates)?);
        }
        ListFormat::Table => {
            if templates.is_empty() {
                println!("No templates found");
                return Ok(());
            }
            println!("{:<32} {:<10} {:>10}  {}", "NAME", "KIND", "SIZE", "MODIFIED");
            for template in &templates {
                println!(
                    "{:<32} {:<10} {:>10}  {}",
                    template.name, template.kind, template.size, template.modified
                );
            }
        }
    }
    Ok(())
}
