use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

use deobf_index::report::{self, InvocationStats};
use deobf_index::telemetry::{init_logging, timed};
use deobf_index::{
    ClassEntry, ClassRenames, IndexOptions, JarIndex, MethodDescriptor, MethodEntry, read_input,
};

/// CLI arguments for deobf-index execution.
#[derive(Parser, Debug)]
#[command(
    name = "deobf-index",
    about = "Build a cross-reference index of an obfuscated JVM archive.",
    version
)]
struct Cli {
    /// A .jar, a .class file or a directory of class files.
    #[arg(long, value_name = "PATH")]
    input: PathBuf,
    /// Detect outer and anonymous classes (the default).
    #[arg(long, overrides_with = "no_inner_classes")]
    inner_classes: bool,
    /// Skip outer and anonymous class detection.
    #[arg(long, overrides_with = "inner_classes")]
    no_inner_classes: bool,
    /// Rename a class before reporting, as OLD=NEW. May be repeated.
    #[arg(long, value_name = "OLD=NEW", value_parser = parse_rename)]
    rename: Vec<(String, String)>,
    /// Print the override group of OWNER.NAME(DESCRIPTOR).
    #[arg(long, value_name = "METHOD", value_parser = parse_method)]
    related: Vec<MethodEntry>,
    #[arg(long, value_enum, default_value_t = Format::Summary)]
    format: Format,
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
    #[arg(long)]
    quiet: bool,
    #[arg(long)]
    timing: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Summary,
    Sarif,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if !cli.quiet {
        init_logging();
    }
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    if !cli.input.exists() {
        anyhow::bail!("input not found: {}", cli.input.display());
    }

    let started_at = Instant::now();
    let (sources, read_ms) = timed("read", || read_input(&cli.input));
    let sources = sources?;
    let entry_count = sources.len();
    let options = IndexOptions {
        build_inner_classes: cli.inner_classes || !cli.no_inner_classes,
        ..IndexOptions::default()
    };
    let (output, build_ms) = timed("index", || JarIndex::build(sources, options));
    let output = output.with_context(|| format!("failed to index {}", cli.input.display()))?;
    let mut index = output.index;

    if !cli.rename.is_empty() {
        let renames: ClassRenames = cli.rename.iter().cloned().collect();
        index = index
            .rename_classes(&renames)
            .context("failed to apply class renames")?;
        info!(renames = renames.len(), "applied class renames");
    }

    let mut writer = output_writer(cli.output.as_deref())?;
    for method in &cli.related {
        writeln!(writer, "{method}:").context("failed to write related methods")?;
        for related in index.related_method_implementations(method) {
            writeln!(writer, "  {related}").context("failed to write related methods")?;
        }
    }

    match cli.format {
        Format::Summary => {
            let summary = report::summarize(&index, &output.report);
            serde_json::to_writer_pretty(&mut writer, &summary)
                .context("failed to serialize index summary")?;
        }
        Format::Sarif => {
            let stats = InvocationStats {
                build_duration_ms: build_ms,
                entry_count,
                class_count: index.classes().count(),
            };
            let invocation = report::build_invocation(&stats, std::env::args().collect());
            let sarif = report::build_sarif(&output.report, invocation);
            serde_json::to_writer_pretty(&mut writer, &sarif)
                .context("failed to serialize SARIF output")?;
        }
    }
    writer
        .write_all(b"\n")
        .context("failed to write output")?;

    if cli.timing && !cli.quiet {
        eprintln!(
            "timing: total_ms={} read_ms={} build_ms={} entries={} classes={}",
            started_at.elapsed().as_millis(),
            read_ms,
            build_ms,
            entry_count,
            index.classes().count()
        );
    }

    Ok(())
}

fn output_writer(output: Option<&Path>) -> Result<Box<dyn Write>> {
    match output {
        Some(path) if path == Path::new("-") => Ok(Box::new(io::stdout())),
        Some(path) => Ok(Box::new(
            File::create(path).with_context(|| format!("failed to open {}", path.display()))?,
        )),
        None => Ok(Box::new(io::stdout())),
    }
}

fn parse_rename(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((old, new)) if !old.is_empty() && !new.is_empty() => {
            Ok((old.to_string(), new.to_string()))
        }
        _ => Err(format!("expected OLD=NEW, got {value}")),
    }
}

fn parse_method(value: &str) -> Result<MethodEntry, String> {
    let invalid = || format!("expected OWNER.NAME(DESCRIPTOR), got {value}");
    let paren = value.find('(').ok_or_else(invalid)?;
    let (qualified, descriptor) = value.split_at(paren);
    let (owner, name) = qualified.rsplit_once('.').ok_or_else(invalid)?;
    if owner.is_empty() || name.is_empty() {
        return Err(invalid());
    }
    let descriptor = MethodDescriptor::parse(descriptor).map_err(|err| err.to_string())?;
    Ok(MethodEntry::new(
        ClassEntry::new(owner.replace('.', "/")),
        name,
        descriptor,
    ))
}
