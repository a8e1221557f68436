//! gloss CLI - pandoc filter that highlights code blocks.
//!
//! Use as `pandoc --filter gloss`. Logs go to stderr, controlled by
//! `GLOSS_LOG` (an `EnvFilter` directive) or `--verbose`.

use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use facet::Facet;
use facet_args as args;
use gloss::{Config, Document, FilterOptions, Highlighter, filter_document, parse_html_format};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Pandoc JSON filter: replaces code blocks with syntax-highlighted HTML.
///
/// Reads the document from stdin and writes it to stdout.
#[derive(Debug, Facet)]
struct Args {
    /// Output format pandoc is producing (e.g. html). Accepted and ignored.
    #[facet(args::positional, default)]
    target_format: Option<String>,

    /// TextMate grammar to load (defaults to assets/janet.tmLanguage.json)
    #[facet(args::named, default)]
    grammar: Option<PathBuf>,

    /// Built-in theme: solarized-light, solarized-dark, github-light, github-dark
    #[facet(args::named, default)]
    theme: Option<String>,

    /// Helix-style TOML theme file, overrides --theme
    #[facet(args::named, default)]
    theme_file: Option<PathBuf>,

    /// HTML format: inline, elements[:PREFIX] or classes[:PREFIX]
    #[facet(args::named, default)]
    format: Option<String>,

    /// Highlight blocks in parallel
    #[facet(args::named, default)]
    parallel: bool,

    /// Log debug output to stderr
    #[facet(args::named, args::short = 'v', default)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> Result<Config> {
        let mut config = Config {
            theme_file: self.theme_file,
            parallel: self.parallel,
            ..Config::default()
        };
        if let Some(grammar) = self.grammar {
            config.grammar_path = grammar;
        }
        if let Some(theme) = self.theme {
            config.theme = theme;
        }
        if let Some(format) = self.format {
            let Some(html_format) = parse_html_format(&format) else {
                bail!("unknown --format {format:?}, expected inline, elements or classes");
            };
            config.html_format = html_format;
        }
        Ok(config)
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("GLOSS_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args: Args = match facet_args::from_std_args() {
        Ok(args) => args,
        Err(e) => {
            if let Some(text) = e.help_text() {
                println!("{text}");
                return Ok(());
            }
            return Err(e.into());
        }
    };
    init_logging(args.verbose);

    if let Some(target) = &args.target_format {
        debug!(target = %target, "pandoc target format");
    }
    let config = args.into_config()?;

    // Configuration errors surface before any input is consumed.
    let highlighter = Highlighter::from_config(&config).context("failed to initialize highlighter")?;
    info!(
        theme = %highlighter.theme().id,
        languages = ?highlighter.store().languages(),
        "highlighter ready"
    );

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read document from stdin")?;

    let doc = Document::from_json(&input).context("failed to parse pandoc document")?;
    let options = FilterOptions {
        parallel: config.parallel,
    };
    let (doc, _stats) = filter_document(doc, &highlighter, options).context("failed to filter document")?;
    let output = doc.to_json().context("failed to serialize document")?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
