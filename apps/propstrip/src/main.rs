use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use ignore::WalkBuilder;
use log::{debug, info, warn};
use propstrip_core::{FilterPattern, JS_TS_EXTENSIONS, Options, Stripper};
use rayon::prelude::*;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// The CLI acts as the host pipeline and reports its own version to the
/// transform's compatibility check.
const HOST_VERSION: &str = env!("CARGO_PKG_VERSION");
const COMPONENT: &str = "propstrip";

#[derive(Debug, Parser)]
#[command(name = "propstrip")]
#[command(about = "Strip prop-types imports and propTypes/defaultProps assignments from JS/TS sources", long_about = None)]
struct Cli {
    /// Root directory to scan (defaults to the current directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Include pattern, glob or /regex/ (repeatable; defaults to **/*.jsx and **/*.tsx)
    #[arg(long)]
    include: Vec<String>,

    /// Exclude pattern, glob or /regex/ (repeatable; defaults to node_modules/**)
    #[arg(long)]
    exclude: Vec<String>,

    /// Extra module name to strip in addition to prop-types (repeatable)
    #[arg(long = "strip-import")]
    imports: Vec<String>,

    /// Emit a .map file next to each rewritten file
    #[arg(long)]
    source_map: bool,

    /// JSON options file ({"include", "exclude", "imports", "sourceMap"});
    /// flags given on the command line take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Rewrite files in place (default is a dry run)
    #[arg(long)]
    write: bool,
}

enum Outcome {
    Skipped,
    Unchanged,
    Stripped { rel: String, bytes_removed: usize },
    Failed { rel: String, message: String },
}

fn main() -> Result<()> {
    env_logger::init();

    // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
    // See https://github.com/rust-lang/rust/issues/60673
    let mut stdout = BufWriter::new(std::io::stdout());

    let cli = Cli::parse();
    debug!("Parsed CLI arguments: {:?}", cli);

    let start = Instant::now();

    let options = build_options(&cli)?;
    let stripper = Stripper::new(COMPONENT, &options, HOST_VERSION)?;
    info!(
        "Stripping {} target module(s), source maps {}",
        stripper.targets().len(),
        if options.source_map { "on" } else { "off" }
    );

    let root = cli.root.clone().unwrap_or_else(|| PathBuf::from("."));
    let files = collect_files(&root)?;
    info!("Found {} JS/TS files under {}", files.len(), root.display());

    let num_threads = rayon::current_num_threads();
    let outcomes: Vec<Outcome> = files
        .par_iter()
        .map(|path| process_file(&stripper, &root, path, &cli))
        .collect();

    let elapsed_ms = start.elapsed().as_millis();

    let mut stripped = 0usize;
    let mut failed = 0usize;
    let mut scanned = 0usize;
    for outcome in &outcomes {
        match outcome {
            Outcome::Skipped => {}
            Outcome::Unchanged => scanned += 1,
            Outcome::Stripped { rel, bytes_removed } => {
                scanned += 1;
                stripped += 1;
                let verb = if cli.write { "stripped" } else { "would strip" };
                writeln!(
                    stdout,
                    "{} {} {} ({} bytes removed)",
                    "✓".green().bold(),
                    verb,
                    rel.blue(),
                    bytes_removed.to_string().cyan()
                )?;
            }
            Outcome::Failed { rel, message } => {
                scanned += 1;
                failed += 1;
                writeln!(stdout, "{} {} {}", "✗".red().bold(), rel.blue(), message)?;
            }
        }
    }

    writeln!(
        stdout,
        "\n{} Finished in {}ms on {} files ({} stripped, {} failed, using {} threads).",
        "●".bright_blue(),
        elapsed_ms.to_string().cyan(),
        scanned.to_string().cyan(),
        stripped.to_string().cyan(),
        failed.to_string().cyan(),
        num_threads.to_string().cyan()
    )?;
    stdout.flush()?;

    if failed > 0 {
        // Non-zero exit to fail CI
        std::process::exit(1);
    }

    Ok(())
}

/// Merge the JSON options file (if any) with command-line flags; flags win.
fn build_options(cli: &Cli) -> Result<Options> {
    let mut options = if let Some(config_path) = &cli.config {
        debug!("Reading options file: {}", config_path.display());
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let value: serde_json::Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;
        Options::from_json(COMPONENT, &value)?
    } else {
        Options::default()
    };

    if !cli.include.is_empty() {
        options.include = Some(cli.include.iter().map(|p| FilterPattern::parse(p)).collect());
    }
    if !cli.exclude.is_empty() {
        options.exclude = Some(cli.exclude.iter().map(|p| FilterPattern::parse(p)).collect());
    }
    if !cli.imports.is_empty() {
        options.imports = cli.imports.clone();
    }
    if cli.source_map {
        options.source_map = true;
    }

    Ok(options)
}

fn collect_files(root: &Path) -> Result<Vec<PathBuf>> {
    debug!("Walking directory tree from root: {}", root.display());
    let mut files = Vec::new();
    let walker = WalkBuilder::new(root).hidden(false).ignore(true).git_ignore(true).build();

    for res in walker {
        let dent = res?;
        let path = dent.path();
        if !path.is_file() {
            continue;
        }
        if let Some(ext) = path.extension().and_then(|e| e.to_str())
            && JS_TS_EXTENSIONS.contains(&ext)
        {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

fn process_file(stripper: &Stripper, root: &Path, path: &Path, cli: &Cli) -> Outcome {
    let rel = path
        .strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string();

    let code = match fs::read_to_string(path) {
        Ok(code) => code,
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            return Outcome::Failed { rel, message: e.to_string() };
        }
    };

    let output = match stripper.transform(&rel, &code) {
        Ok(Some(output)) => output,
        Ok(None) => {
            debug!("Filtered out: {}", rel);
            return Outcome::Skipped;
        }
        Err(e) => {
            warn!("Transform failed for {}: {}", rel, e);
            return Outcome::Failed { rel, message: e.to_string() };
        }
    };

    if output.code == code {
        return Outcome::Unchanged;
    }
    let bytes_removed = code.len() - output.code.len();

    if cli.write {
        if let Err(e) = fs::write(path, &output.code) {
            warn!("Failed to write {}: {}", path.display(), e);
            return Outcome::Failed { rel, message: e.to_string() };
        }
        if let Some(map) = &output.map {
            let map_path = {
                let mut os = path.to_path_buf().into_os_string();
                os.push(".map");
                PathBuf::from(os)
            };
            let mut buf = Vec::new();
            if let Err(e) = map.to_writer(&mut buf) {
                warn!("Failed to render map for {}: {}", rel, e);
                return Outcome::Failed { rel, message: e.to_string() };
            }
            if let Err(e) = fs::write(&map_path, buf) {
                warn!("Failed to write {}: {}", map_path.display(), e);
                return Outcome::Failed { rel, message: e.to_string() };
            }
        }
    }

    Outcome::Stripped { rel, bytes_removed }
}
