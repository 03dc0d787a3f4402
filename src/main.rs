use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use wikiexpand::{Expander, TemplateSource};

#[derive(Parser)]
#[command(name = "wikiexpand")]
#[command(about = "Expand the templates of a wiki page", long_about = None)]
struct Cli {
    /// Page to expand; reads stdin when omitted
    file: Option<PathBuf>,

    /// Directory holding one `<name>.wiki` file per template or article
    #[arg(long, short, default_value = ".")]
    templates: PathBuf,

    /// Name of the page being expanded
    #[arg(long, default_value = "")]
    page: String,

    /// Maximum template nesting
    #[arg(long)]
    max_depth: Option<usize>,

    /// Print the parsed tree instead of expanding it
    #[arg(long)]
    show_tree: bool,
}

/// Templates and articles stored as files in one directory
struct DirSource {
    root: PathBuf,
}

impl DirSource {
    fn read(&self, name: &str) -> Option<String> {
        let name = name.trim();
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return None;
        }
        let path = self.root.join(format!("{name}.wiki"));
        match std::fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(e) => {
                log::debug!("cannot read {}: {e}", path.display());
                None
            }
        }
    }
}

impl TemplateSource for DirSource {
    fn get_template(&self, name: &str) -> Option<String> {
        self.read(name)
    }

    fn get_raw_article(&self, title: &str) -> Option<String> {
        self.read(title)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let text = match &cli.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            text
        }
    };

    let mut builder = Expander::builder(text)
        .page(cli.page)
        .source(DirSource {
            root: cli.templates,
        });
    if let Some(max_depth) = cli.max_depth {
        builder = builder.max_depth(max_depth);
    }
    let mut expander = builder.build()?;

    if cli.show_tree {
        print!("{}", expander.tree().show());
        return Ok(());
    }

    print!("{}", expander.expand());
    for diagnostic in expander.diagnostics() {
        eprintln!("wikiexpand: {diagnostic}");
    }

    Ok(())
}
