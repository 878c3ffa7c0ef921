use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use flavormark::{Flavor, Markdown, Options};

/// Convert Markdown to HTML
#[derive(Parser, Debug)]
#[command(name = "flavormark", version, about)]
struct Cli {
    /// Input file (reads stdin when omitted)
    input: Option<PathBuf>,

    /// Markdown flavor: markdown, gfm, extra or leanpub
    #[arg(short, long)]
    flavor: Option<Flavor>,

    /// Emit HTML5 void tags (`<br>` instead of `<br />`)
    #[arg(long)]
    html5: bool,

    /// Treat every newline in a paragraph as a line break (gfm and leanpub)
    #[arg(long)]
    newlines: bool,

    /// Keep the start number of ordered lists
    #[arg(long)]
    keep_list_start: bool,

    /// JSON options file; command-line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Parse inline markup only
    #[arg(long)]
    paragraph: bool,

    /// Print the parsed document as JSON instead of HTML
    #[arg(long)]
    ast: bool,
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn load_options(cli: &Cli) -> Result<Options> {
    let mut options = match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
            log::debug!("Using options from: {}", path.display());
            Options::from_json(&json).with_context(|| format!("invalid options in {}", path.display()))?
        }
        None => Options::default(),
    };
    if let Some(flavor) = cli.flavor {
        options.flavor = flavor;
    }
    options.html5 |= cli.html5;
    options.enable_newlines |= cli.newlines;
    options.keep_list_start_number |= cli.keep_list_start;
    Ok(options)
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let options = load_options(&cli)?;
    log::debug!("Converting with flavor {}", options.flavor);
    let markdown = Markdown::with_options(options)?;
    let input = read_input(cli.input.as_ref())?;

    if cli.ast {
        let document = markdown.parse_document(&input);
        println!("{}", serde_json::to_string_pretty(&document)?);
    } else if cli.paragraph {
        print!("{}", markdown.parse_paragraph(&input));
    } else {
        print!("{}", markdown.parse(&input));
    }
    Ok(())
}
