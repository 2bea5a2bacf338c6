//! tagscan CLI
//!
//! Dumps the event stream of a markup document, as colored text or JSON.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use owo_colors::OwoColorize;
use serde_json::json;
use tagscan::{AttributeMap, Event, EventCollector, Tokenizer, TokenizerConfig};
use tracing_subscriber::EnvFilter;

/// Output rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// One colored line per event
    Text,
    /// A single JSON document
    Json,
}

/// Print the tokens of an HTML-like document
#[derive(Parser, Debug)]
#[command(name = "tagscan")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r"EXAMPLES:
    # Tokenize a file
    tagscan page.html

    # Tokenize a Latin-1 file as JSON
    tagscan --encoding latin1 --format json page.html

    # Tokenize standard input
    cat page.html | tagscan -

    # Expand template references
    tagscan --html 'Hello &name;!' -D name=World
")]
struct Cli {
    /// Path to the document, or `-` for standard input
    #[arg(value_name = "FILE", required_unless_present = "html", conflicts_with = "html")]
    path: Option<PathBuf>,

    /// Tokenize this markup string instead of a file
    #[arg(long, value_name = "MARKUP")]
    html: Option<String>,

    /// Encoding label of the input bytes (ignored with --html)
    #[arg(short, long, default_value = "utf-8")]
    encoding: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Treat the whole input as preformatted text
    #[arg(long)]
    plain_text: bool,

    /// Print the consumed document source after the events
    #[arg(long)]
    cache_source: bool,

    /// Expand `&NAME;` to VALUE when NAME is not a known entity
    #[arg(short = 'D', long = "define", value_name = "NAME=VALUE", value_parser = parse_define)]
    defines: Vec<(String, String)>,

    /// Log markup errors to stderr as they are found
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut tokenizer = build_tokenizer(&cli)?;
    let mut sink = EventCollector::with_substitutions(cli.defines.iter().cloned().collect());
    let result = if cli.plain_text {
        tokenizer.parse_plain_text(&mut sink)
    } else {
        tokenizer.parse(&mut sink)
    };
    result.context("failed to tokenize input")?;
    tracing::info!(events = sink.events().len(), "tokenized");

    let source = tokenizer.document_source();
    match cli.format {
        Format::Text => print_text(&sink, source.as_deref()),
        Format::Json => print_json(&sink, source.as_deref())?,
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "tagscan=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn build_tokenizer(cli: &Cli) -> Result<Tokenizer> {
    let config = TokenizerConfig::default().with_cache_source(cli.cache_source);
    let mut tokenizer = Tokenizer::new(config);

    if let Some(markup) = &cli.html {
        tokenizer.set_input_str(markup.as_str());
        return Ok(tokenizer);
    }
    let Some(path) = &cli.path else {
        bail!("either FILE or --html is required");
    };
    if path.as_os_str() == "-" {
        tokenizer.set_input_bytes(io::stdin(), &cli.encoding)?;
    } else {
        let file =
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        tokenizer.set_input_bytes(BufReader::new(file), &cli.encoding)?;
    }
    Ok(tokenizer)
}

fn parse_define(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{s}`"))?;
    if name.is_empty() {
        return Err(format!("empty name in `{s}`"));
    }
    Ok((name.to_owned(), value.to_owned()))
}

// =============================================================================
// Output
// =============================================================================

fn print_text(sink: &EventCollector, source: Option<&str>) {
    if let Some(declaration) = sink.xml_declaration_attributes() {
        println!("{}{}", "xml".yellow(), render_attributes(declaration));
    }
    for event in sink.events() {
        println!("{}", render_event(event));
    }

    let errors = sink
        .events()
        .iter()
        .filter(|event| matches!(event, Event::Error { .. }))
        .count();
    println!("\n{} events, {} errors", sink.events().len(), errors);

    if let Some(source) = source {
        println!("\n=== Source ===\n{source}");
    }
}

fn print_json(sink: &EventCollector, source: Option<&str>) -> Result<()> {
    let output = json!({
        "xml_declaration": sink.xml_declaration_attributes(),
        "events": sink.events(),
        "source": source,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn render_event(event: &Event) -> String {
    match event {
        Event::Text(text) => format!("{} {text:?}", "text".dimmed()),
        Event::Tag {
            name,
            attributes,
            end_tag,
            empty_tag,
        } => {
            let kind = match (*end_tag, *empty_tag) {
                (_, true) => "empty",
                (true, false) => "end",
                (false, false) => "start",
            };
            format!(
                "{} {kind} {}{}",
                "tag".green(),
                name.bold(),
                render_attributes(attributes)
            )
        }
        Event::Comment(text) => format!("{} {text:?}", "comment".blue()),
        Event::Pi { target, data } => format!("{} {} {data:?}", "pi".magenta(), target.bold()),
        Event::Doctype {
            root,
            public_id,
            system_id,
        } => format!(
            "{} {} public={public_id:?} system={system_id:?}",
            "doctype".cyan(),
            root.bold()
        ),
        Event::Error { text, error } => format!("{} {error}: {text:?}", "error".red().bold()),
    }
}

fn render_attributes(attributes: &AttributeMap) -> String {
    attributes
        .iter()
        .map(|attribute| format!(" {}={:?}", attribute.name, attribute.value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_or_html_is_required() {
        assert!(Cli::try_parse_from(["tagscan"]).is_err());
        assert!(Cli::try_parse_from(["tagscan", "page.html", "--html", "<a>"]).is_err());
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["tagscan", "page.html"]).unwrap();
        assert_eq!(cli.path, Some(PathBuf::from("page.html")));
        assert_eq!(cli.encoding, "utf-8");
        assert_eq!(cli.format, Format::Text);
        assert!(!cli.plain_text && !cli.cache_source && !cli.verbose);
        assert!(cli.defines.is_empty());
    }

    #[test]
    fn test_defines_and_format() {
        let cli = Cli::try_parse_from([
            "tagscan",
            "--html",
            "&who;",
            "-D",
            "who=me",
            "--define",
            "eq=a=b",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.format, Format::Json);
        assert_eq!(
            cli.defines,
            vec![
                ("who".to_owned(), "me".to_owned()),
                ("eq".to_owned(), "a=b".to_owned()),
            ]
        );
    }

    #[test]
    fn test_parse_define_rejects_malformed() {
        assert!(parse_define("novalue").is_err());
        assert!(parse_define("=x").is_err());
        assert_eq!(parse_define("k=").unwrap(), ("k".to_owned(), String::new()));
    }

    #[test]
    fn test_html_input_is_tokenized_with_defines() {
        let cli = Cli::try_parse_from(["tagscan", "--html", "Hi &who;", "-D", "who=you"]).unwrap();
        let mut tokenizer = build_tokenizer(&cli).unwrap();
        let mut sink = EventCollector::with_substitutions(cli.defines.iter().cloned().collect());
        tokenizer.parse(&mut sink).unwrap();
        assert_eq!(sink.events(), &[Event::Text("Hi you".to_owned())]);
    }

    #[test]
    fn test_unknown_encoding_is_reported() {
        let cli = Cli::try_parse_from(["tagscan", "Cargo.toml", "-e", "klingon"]).unwrap();
        let err = build_tokenizer(&cli).err().expect("label should be rejected");
        assert!(err.to_string().contains("klingon"));
    }

    #[test]
    fn test_render_attributes() {
        let attributes: AttributeMap = [("a", "1"), ("b", "x y")].into_iter().collect();
        assert_eq!(render_attributes(&attributes), " a=\"1\" b=\"x y\"");
    }
}
