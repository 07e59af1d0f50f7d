use anyhow::Result;
use clap::Parser as ClapParser;
use log::LevelFilter;
use mpersist_decoder::{ParseOutcome, Parser};
use mpersist_inspect::{config, registry::NameRegistry, render};
use std::fs;
use std::path::PathBuf;

/// Prints the object graph of a persist snapshot.
#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    file: PathBuf,

    /// The magic as 8 hex digits. Falls back to $MPERSIST_MAGIC, then `4d508001`.
    #[arg(long)]
    magic: Option<String>,

    /// Names of externally resolved objects. Falls back to $MPERSIST_NAMES.
    #[arg(long)]
    names: Option<PathBuf>,

    /// Log every decoded value.
    #[arg(long)]
    trace: bool,

    /// Print every top-level value, not only the root.
    #[arg(long)]
    all: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if args.trace {
        logger.filter_module("mpersist_decoder", LevelFilter::Debug);
    }
    logger.init();

    let config = config::parser_config(args.magic.as_deref())?;
    let registry = match config::names_path(args.names) {
        None => NameRegistry::default(),
        Some(path) => NameRegistry::load(&path)?,
    };

    let buf = fs::read(&args.file)?;
    let snap = match Parser::with_config(&buf, &registry, config).parse()? {
        ParseOutcome::NotThisFormat { found } => {
            println!(
                "{}: not a persist snapshot; leading bytes {found:02x?}",
                args.file.display()
            );
            return Ok(());
        }
        ParseOutcome::Parsed(snap) => snap,
    };

    let header = snap.header();
    println!(
        "{} {} ({:?}): {} nodes, {} filed offsets",
        header.format_name,
        header.version_line,
        header.version,
        snap.graph().len(),
        snap.table().len()
    );

    if args.all {
        for &id in snap.top_level().iter() {
            print!("{}", render::render(snap.graph(), id)?);
        }
    } else {
        print!("{}", render::render(snap.graph(), snap.root())?);
    }

    Ok(())
}
