//! CLI: check declarations, decode documents through a declared union
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use json_union::declare::UnionKind;
use json_union::{Catalog, Document};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// validate union declarations and decode JSON/NDJSON documents through them
#[derive(Parser, Debug)]
#[command(name = "json-union")]
pub struct CommandLineInterface {
    /// tracing filter directive (overrides RUST_LOG), e.g. `json_union=trace`
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// load a declaration file and print every union it declares
    Check(CheckCmd),
    /// decode documents through one declared union, one NDJSON report line each
    Decode(DecodeCmd),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document; every output is decoded
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct CheckCmd {
    /// declaration file (.json)
    #[arg(long, short)]
    declarations: PathBuf,
}

#[derive(clap::Parser, Debug)]
struct DecodeCmd {
    /// declaration file (.json)
    #[arg(long, short)]
    declarations: PathBuf,

    /// name of the union to decode with
    #[arg(long, short)]
    union: String,

    #[command(flatten)]
    input_settings: InputSettings,

    /// output .ndjson report (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

/// One input document after pre-processing.
struct SourceDocument {
    source: String,
    index: usize,
    value: Value,
}

#[derive(Serialize)]
struct ReportLine<'a> {
    source: &'a str,
    index: usize,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    variant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    route: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_documents(&self) -> Result<Vec<SourceDocument>> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let mut documents = Vec::new();
        for source_path in source_paths {
            let source_path_str = source_path.to_string_lossy().to_string();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read source file ({source_path_str})"))?;
            let mut index = 0;
            for raw in self.parse_source(&source, &source_path_str)? {
                for value in self.preprocess(raw, &source_path_str)? {
                    documents.push(SourceDocument { source: source_path_str.clone(), index, value });
                    index += 1;
                }
            }
        }
        tracing::debug!(documents = documents.len(), "inputs loaded");
        Ok(documents)
    }

    fn parse_source(&self, source: &str, source_path_str: &str) -> Result<Vec<Value>> {
        if !self.ndjson {
            let value = serde_json::from_str::<Value>(source)
                .with_context(|| format!("failed to parse JSON source file ({source_path_str})"))?;
            return Ok(vec![value]);
        }
        source
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(line_no, line)| {
                serde_json::from_str::<Value>(line).with_context(|| {
                    format!("failed to parse NDJSON line {} ({source_path_str})", line_no + 1)
                })
            })
            .collect()
    }

    fn preprocess(&self, value: Value, source_path_str: &str) -> Result<Vec<Value>> {
        let value = match self.json_pointer.as_deref() {
            None => value,
            Some(pointer) => value.pointer(pointer).cloned().ok_or_else(|| {
                anyhow!("JSON pointer `{pointer}` selects nothing in ({source_path_str})")
            })?,
        };
        match self.jq_expr.as_deref() {
            None => Ok(vec![value]),
            Some(jq_expr) => crate::jq_exec::run_jaq(jq_expr, &value).with_context(|| {
                format!("failed to apply jq expression to source file ({source_path_str})")
            }),
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn log_directive(&self) -> Option<&str> {
        self.log.as_deref()
    }

    pub fn run(&self) -> Result<ExitCode> {
        match &self.cmd {
            Command::Check(target) => {
                let catalog = load_catalog(&target.declarations)?;
                print_catalog(&catalog);
                Ok(ExitCode::SUCCESS)
            }
            Command::Decode(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(ExitCode::SUCCESS);
                }

                let catalog = load_catalog(&target.declarations)?;
                let union = catalog.union(&target.union).ok_or_else(|| {
                    anyhow!(
                        "no union named `{}` in {}",
                        target.union,
                        target.declarations.display()
                    )
                })?;
                let documents = target.input_settings.load_documents()?;

                let lines = documents
                    .par_iter()
                    .map(|doc| decode_document(&union, doc))
                    .collect::<Vec<_>>();

                let failed = lines.iter().filter(|line| !line.ok).count();
                write_report(&lines, target.out.as_deref())?;
                print_summary(&union, lines.len(), failed);

                if failed > 0 {
                    Ok(ExitCode::FAILURE)
                } else {
                    Ok(ExitCode::SUCCESS)
                }
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn load_catalog(path: &Path) -> Result<Catalog> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read declaration file ({})", path.display()))?;
    let catalog = Catalog::from_str(&source)
        .with_context(|| format!("invalid declarations in {}", path.display()))?;
    tracing::debug!(
        literal_unions = catalog.literal_unions().count(),
        shapes = catalog.shapes().count(),
        type_unions = catalog.type_unions().count(),
        "declarations loaded"
    );
    Ok(catalog)
}

fn decode_document<'a>(union: &UnionKind<'_>, doc: &'a SourceDocument) -> ReportLine<'a> {
    let outcome = union.decode(&Document::new(&doc.value));
    match outcome {
        Ok(matched) => {
            let encoded = union.encode(&matched);
            let (value, error) = match encoded {
                Ok(value) => (Some(value), None),
                Err(error) => (None, Some(error.to_string())),
            };
            ReportLine {
                source: &doc.source,
                index: doc.index,
                ok: error.is_none(),
                variant: Some(matched.name().to_string()),
                route: matched.route().map(|route| route.as_str()),
                value,
                error_kind: error.as_ref().map(|_| "encode_failed"),
                error,
            }
        }
        Err(error) => ReportLine {
            source: &doc.source,
            index: doc.index,
            ok: false,
            variant: None,
            route: None,
            value: None,
            error_kind: Some(error.kind()),
            error: Some(error.to_string()),
        },
    }
}

fn write_report(lines: &[ReportLine<'_>], out: Option<&Path>) -> Result<()> {
    let mut buffer = Vec::new();
    for line in lines {
        serde_json::to_writer(&mut buffer, line)?;
        buffer.push(b'\n');
    }
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(out, &buffer)
                .with_context(|| format!("failed to write report ({})", out.display()))?;
        }
        None => std::io::stdout().lock().write_all(&buffer)?,
    }
    Ok(())
}

fn print_summary(union: &UnionKind<'_>, total: usize, failed: usize) {
    let passed = total - failed;
    let name = union.name().bold();
    if failed == 0 {
        eprintln!("{} {name}: {passed}/{total} documents decoded", "✔".green());
    } else {
        eprintln!(
            "{} {name}: {passed}/{total} documents decoded, {} failed",
            "✘".red(),
            failed.to_string().red()
        );
    }
}

fn print_catalog(catalog: &Catalog) {
    for spec in catalog.literal_unions() {
        println!("{} {} ({})", "literal union".cyan(), spec.name().bold(), spec.representation());
        for case in spec.cases() {
            println!("  {} = {}", case.identifier, case.value);
        }
    }
    for schema in catalog.shapes() {
        let tag = match catalog.discriminators().get(schema.name()) {
            Some(binding) => format!(" discriminated by `{}`", binding.field()),
            None => String::new(),
        };
        println!("{} {}{tag}", "shape".cyan(), schema.name().bold());
        for field in schema.fields() {
            let marker = if field.required { "" } else { "?" };
            println!("  {}{marker}: {}", field.name, field.ty.describe());
        }
    }
    for spec in catalog.type_unions() {
        println!("{} {}", "type union".cyan(), spec.name().bold());
        for variant in spec.variants() {
            match variant.discriminator() {
                Some(binding) => {
                    let tags = binding
                        .allowed()
                        .literals()
                        .map(|literal| literal.to_string())
                        .collect::<Vec<_>>()
                        .join(" | ");
                    println!("  {} when `{}` is {tags}", variant.name(), binding.field());
                }
                None => println!("  {} (ordered trial)", variant.name()),
            }
        }
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
