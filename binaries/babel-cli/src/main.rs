//! Babel CLI
//!
//! Search the library for a snippet, open addresses, share links.

mod render;

use std::io::{IsTerminal, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use babel_config::{BabelConfig, LogConfig};
use babel_core::{
    Address, Coordinate, EncodedPage, Library, PageBuffer, RngSource, ShareLink, ShareView,
    SnippetMark,
};

#[derive(Parser)]
#[command(name = "babel")]
#[command(about = "Library of Babel - every page of text has an address")]
#[command(version)]
struct Cli {
    /// Config file (default: $BABEL_CONFIG or <config dir>/babel/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a snippet onto a page and print the page's address
    Search {
        /// Text to place (a-z, space, comma, period)
        snippet: String,

        /// Coordinate as wall-shelf-volume-page (random if omitted)
        #[arg(short, long)]
        coords: Option<String>,

        /// Offset of the snippet on the page (random if omitted)
        #[arg(short, long)]
        at: Option<usize>,

        #[arg(long)]
        json: bool,
    },

    /// Open an address ("-" reads it from stdin)
    Browse {
        address: String,

        /// Coordinate the address was issued for (recovered from the address if omitted)
        #[arg(short, long)]
        coords: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Show the untouched page at a coordinate
    Page {
        /// wall-shelf-volume-page
        coords: String,

        #[arg(long)]
        json: bool,
    },

    /// Open a share link or fragment ("-" reads it from stdin)
    Open {
        link: String,

        #[arg(long)]
        json: bool,
    },

    /// Pick a random coordinate
    Random,
}

/// Machine-readable form of any opened page
#[derive(Serialize)]
struct PageReport {
    address: Address,
    coordinate: Coordinate,
    insert_at: Option<usize>,
    page: PageBuffer,
    link: String,
}

struct App {
    config: BabelConfig,
    styled: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => BabelConfig::load_from(path),
        None => BabelConfig::load(),
    }
    .context("loading configuration")?;

    init_tracing(&config.log);

    let app = App {
        styled: config.highlight && std::io::stdout().is_terminal(),
        config,
    };

    match cli.command {
        Commands::Search { snippet, coords, at, json } => cmd_search(&app, snippet, coords, at, json),
        Commands::Browse { address, coords, json } => cmd_browse(&app, address, coords, json),
        Commands::Page { coords, json } => cmd_page(&app, coords, json),
        Commands::Open { link, json } => cmd_open(&app, link, json),
        Commands::Random => cmd_random(),
    }
}

fn init_tracing(log: &LogConfig) {
    // RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn cmd_search(app: &App, snippet: String, coords: Option<String>, at: Option<usize>, json: bool) -> Result<()> {
    let mut rng = RngSource::thread();
    let coordinate = match coords {
        Some(coords) => parse_coords(&coords)?,
        None => Library::random_coordinate(&mut rng),
    };

    tracing::info!(%coordinate, len = snippet.len(), "searching");
    let encoded = Library::encode(&coordinate, &snippet, at, &mut rng)
        .context("encoding snippet")?;

    print_encoded(app, "SEARCH", &encoded, json)
}

fn cmd_browse(app: &App, address: String, coords: Option<String>, json: bool) -> Result<()> {
    let address = read_arg(address)?;

    let (coordinate, page) = match coords {
        Some(coords) => {
            let coordinate = parse_coords(&coords)?;
            let page = Library::decode(&address, &coordinate).context("decoding address")?;
            (coordinate, page)
        }
        None => Library::locate(&address).context("locating address")?,
    };

    let view = ShareView {
        address: address.parse().context("parsing address")?,
        coordinate,
        page,
        highlight: None,
    };
    print_view(app, "BROWSE", &view, json)
}

fn cmd_page(app: &App, coords: String, json: bool) -> Result<()> {
    let coordinate = parse_coords(&coords)?;
    let encoded = Library::browse(&coordinate).context("browsing coordinate")?;
    print_encoded(app, "PAGE", &encoded, json)
}

fn cmd_open(app: &App, link: String, json: bool) -> Result<()> {
    let link = read_arg(link)?;
    let link = ShareLink::parse(&link).context("parsing link")?;
    let view = link.resolve().context("opening link")?;
    print_view(app, "OPEN", &view, json)
}

fn cmd_random() -> Result<()> {
    let mut rng = RngSource::thread();
    let coordinate = Library::random_coordinate(&mut rng);
    println!("{}", coordinate.to_link_part());
    Ok(())
}

fn parse_coords(coords: &str) -> Result<Coordinate> {
    coords
        .parse()
        .with_context(|| format!("invalid coordinate {:?} (expected wall-shelf-volume-page)", coords))
}

/// `-` means stdin
fn read_arg(arg: String) -> Result<String> {
    if arg != "-" {
        return Ok(arg);
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("reading stdin")?;
    Ok(buf.trim().to_string())
}

fn share_url(app: &App, link: &ShareLink) -> Result<String> {
    let base = app.config.link_base_url()?;
    Ok(link.to_url(&base).to_string())
}

fn print_encoded(app: &App, title: &str, encoded: &EncodedPage, json: bool) -> Result<()> {
    let link = ShareLink::for_page(encoded);
    let view = ShareView {
        address: encoded.address.clone(),
        coordinate: encoded.coordinate,
        page: encoded.page.clone(),
        highlight: encoded.snippet,
    };
    print_page(app, title, &view, &link, json)
}

fn print_view(app: &App, title: &str, view: &ShareView, json: bool) -> Result<()> {
    let mut link = ShareLink::new(view.address.clone()).with_coordinate(view.coordinate);
    if let Some(mark) = view.highlight {
        if let Some(text) = view.page.slice(mark.range()) {
            link = link.with_snippet(mark.at, text);
        }
    }
    print_page(app, title, view, &link, json)
}

fn print_page(app: &App, title: &str, view: &ShareView, link: &ShareLink, json: bool) -> Result<()> {
    let url = share_url(app, link)?;

    if json {
        let report = PageReport {
            address: view.address.clone(),
            coordinate: view.coordinate,
            insert_at: view.highlight.map(|mark: SnippetMark| mark.at),
            page: view.page.clone(),
            link: url,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("\n  {}", title);
    println!("  {}\n", "=".repeat(title.len()));
    println!("  Address:  {}", render::abbreviate(view.address.as_str(), 24));
    println!("  Location: {}", view.coordinate);
    if let Some(mark) = view.highlight {
        println!("  Snippet:  offset {}, {} chars", mark.at, mark.len);
    }

    println!("\n  --- Full Page ---");
    print!("{}", render::wrap_page(&view.page, app.config.line_width, view.highlight, app.styled));

    println!("\n  --- Address ---");
    println!("{}", view.address);

    println!("\n  --- Link ---");
    println!("{}", url);
    Ok(())
}
