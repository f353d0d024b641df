mod report;

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use mismo_compare::{xml, Comparison, ElementTree, Value, XmlParser, DEFAULT_TAGS};

#[derive(Debug, Parser)]
#[command(
    name = "mismo-compare",
    version,
    about = "Compare two MISMO XML documents element by element"
)]
struct Args {
    /// Primary document
    #[arg(short, long, value_name = "FILE")]
    primary: PathBuf,
    /// Basis document, the source of truth
    #[arg(short, long, value_name = "FILE")]
    basis: PathBuf,
    /// Element type to compare; repeat for several (defaults to ASSET, COLLATERAL,
    /// EXPENSE, LIABILITY, LOAN and PARTY)
    #[arg(short, long = "tag", value_name = "TAG")]
    tags: Vec<String>,
    /// Log every pairing decision
    #[arg(short, long)]
    debug: bool,
    /// Write each document's converted mapping and tree into this directory
    #[arg(long, value_name = "DIR")]
    dump_dir: Option<PathBuf>,
    /// Report file (defaults to stdout)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,
    /// Log file (defaults to stderr)
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

/// A document read from disk, before and after tree construction
struct Loaded {
    value: Value,
    tree: ElementTree,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug, args.log_file.as_deref())?;

    run(&args).inspect_err(|err| error!("{err:#}"))
}

fn init_logging(debug: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time();

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(io::stderr).try_init(),
    }
    .map_err(|err| anyhow!("failed to install logger: {err}"))
}

fn run(args: &Args) -> Result<()> {
    let primary = load(&args.primary)?;
    let basis = load(&args.basis)?;

    if let Some(dir) = &args.dump_dir {
        dump(dir, &args.primary, &primary)?;
        dump(dir, &args.basis, &basis)?;
    }

    let tags: Vec<&str> = if args.tags.is_empty() {
        DEFAULT_TAGS.to_vec()
    } else {
        args.tags.iter().map(String::as_str).collect()
    };

    let comparison = Comparison::new(&primary.tree, &basis.tree);
    let results = comparison.compare_all(tags.iter().copied());
    let report = report::render(&results, &comparison.symmetric_differences());

    write_output(args.output.as_deref(), report.as_bytes())
}

fn load(path: &Path) -> Result<Loaded> {
    info!("Reading file: {}", path.display());
    let bytes =
        fs::read(path).with_context(|| format!("failed to read input file {}", path.display()))?;

    let document = XmlParser::new(&bytes)
        .parse()
        .with_context(|| format!("failed to parse {}", path.display()))?;
    let value = xml::to_value(&document);
    let tree = ElementTree::from_value(&value)
        .with_context(|| format!("failed to build element tree for {}", path.display()))?;

    Ok(Loaded { value, tree })
}

/// `<stem>.json` holds the converted mapping, `<stem>.tree.txt` the tree dump
fn dump(dir: &Path, source: &Path, loaded: &Loaded) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create dump directory {}", dir.display()))?;
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");

    let json = dir.join(format!("{stem}.json"));
    fs::write(&json, loaded.value.to_json())
        .with_context(|| format!("failed to write {}", json.display()))?;
    let tree = dir.join(format!("{stem}.tree.txt"));
    fs::write(&tree, loaded.tree.dump())
        .with_context(|| format!("failed to write {}", tree.display()))?;

    info!("Wrote {} and {}", json.display(), tree.display());
    Ok(())
}

fn write_output(path: Option<&Path>, data: &[u8]) -> Result<()> {
    match path {
        Some(path) => fs::write(path, data)
            .with_context(|| format!("failed to write output file {}", path.display())),
        None => {
            let mut stdout = io::stdout();
            stdout.write_all(data).context("failed to write stdout")?;
            Ok(())
        }
    }
}
