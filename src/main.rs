//! pathconf command-line tool
//!
//! Loads one or more configuration documents into a store and runs a single
//! query or edit against it.

use anyhow::{Context, Result};
use clap::Parser;
use pathconf::cli::{Cli, Command};
use pathconf::format::{self, OutputFormat};
use pathconf::layers::LayeredLoader;
use pathconf::source::{self, FileProvider};
use pathconf::{Node, Store, logging};
use std::path::Path;
use tracing::{debug, info};

/// Build the store: the tiered configuration when asked, then each --file
/// merged on top in order.
fn load_store(cli: &Cli) -> Result<Store> {
    let store = if cli.command.wants_layers() {
        let layered = LayeredLoader::default()
            .delimiter(cli.delimiter)
            .load()
            .context("Failed to load layered configuration")?;
        for loaded in &layered.sources {
            debug!(tier = %loaded.tier, path = ?loaded.path, "config tier applied");
        }
        layered.store
    } else {
        Store::with_delimiter(cli.delimiter)
    };

    for file in &cli.files {
        load_file(&store, file, cli)?;
    }
    Ok(store)
}

fn load_file(store: &Store, file: &Path, cli: &Cli) -> Result<()> {
    let parser = match cli.format {
        Some(format) => format.parser(cli.delimiter),
        None => source::parser_for_path(file).with_context(|| {
            format!(
                "Cannot tell the format of {}; pass --format",
                file.display()
            )
        })?,
    };
    let data = source::read_mapping(&FileProvider::new(file), parser.as_ref())
        .with_context(|| format!("Failed to load {}", file.display()))?;
    store
        .merge_mapping(&data)
        .with_context(|| format!("Failed to merge {}", file.display()))?;
    info!(path = %file.display(), "loaded config file");
    Ok(())
}

fn render_tree(store: &Store, output: OutputFormat) -> Result<String> {
    format::render(&Node::Mapping(store.to_mapping()), output, store.delimiter())
}

/// Run the subcommand and return what to print.
fn run(cli: &Cli, store: &Store) -> Result<String> {
    match &cli.command {
        Command::Get { path } => {
            let node = store.get(path).with_context(|| format!("get {path}"))?;
            format::render(&node, cli.output, store.delimiter())
        }
        Command::Has { path } => Ok(store.has(path).to_string()),
        Command::Set { path, value } => {
            store
                .set(path, Node::parse_yaml(value))
                .with_context(|| format!("set {path}"))?;
            render_tree(store, cli.output)
        }
        Command::Delete { path } => {
            store.delete(path).with_context(|| format!("delete {path}"))?;
            render_tree(store, cli.output)
        }
        Command::Keys => Ok(store.keys().join("\n")),
        Command::Paths => Ok(store.paths().join("\n")),
        Command::Flatten => render_tree(store, OutputFormat::Flat),
        Command::Cut { path } => render_tree(&store.cut(path), cli.output),
        Command::Show { .. } => render_tree(store, cli.output),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on --log option
    logging::init(cli.verbose, &cli.log)?;

    let store = load_store(&cli)?;
    let out = run(&cli, &store)?;
    if !out.is_empty() {
        println!("{out}");
    }

    if let Command::Has { path } = &cli.command
        && !store.has(path)
    {
        std::process::exit(1);
    }
    Ok(())
}
