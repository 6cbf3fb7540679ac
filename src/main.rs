use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio_docs::api::{self, AppState};
use folio_docs::client::{DocsClient, DocumentViewer, ViewState};
use folio_docs::config::ServerConfig;
use folio_docs::content::{ContentFetcher, ContentPipeline};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Documentation pipeline and server for the folio site")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the docs server
    Serve {
        /// Port for HTTP API
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind
        #[arg(short, long)]
        bind: Option<String>,

        /// Directory holding the markdown documents
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// JSON catalog replacing the built-in one
        #[arg(short, long)]
        catalog: Option<PathBuf>,
    },
    /// Fetch a document from a running server and print it as HTML
    Render {
        /// Document file name, e.g. `installation.md`
        file: String,

        /// Server base URL (defaults to FOLIO_URL)
        #[arg(short, long)]
        url: Option<String>,
    },
    /// Search the catalog
    Search {
        query: String,

        /// JSON catalog replacing the built-in one
        #[arg(short, long)]
        catalog: Option<PathBuf>,
    },
    /// Load and serialize every catalog entry, reporting failures
    Check {
        /// Directory holding the markdown documents
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// JSON catalog replacing the built-in one
        #[arg(short, long)]
        catalog: Option<PathBuf>,
    },
}

/// Initialize tracing with output to stderr (for printing commands) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "folio_docs=debug,tower_http=debug".into()),
    );

    if use_stderr {
        // Keep stdout clean for command output
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let use_stderr = !matches!(cli.command, None | Some(Commands::Serve { .. }));
    init_tracing(use_stderr);

    match cli.command {
        Some(Commands::Serve {
            port,
            bind,
            root,
            catalog,
        }) => {
            let config = ServerConfig::from_env()
                .with_port(port)
                .with_bind(bind)
                .with_content_root(root)
                .with_catalog(catalog);
            serve(config).await?;
        }
        Some(Commands::Render { file, url }) => {
            render(&file, url).await?;
        }
        Some(Commands::Search { query, catalog }) => {
            let catalog = ServerConfig::from_env().with_catalog(catalog).load_catalog()?;
            let results = catalog.search(&query);
            if results.is_empty() {
                println!("No results for \"{}\"", query);
            }
            for entry in results {
                println!("{}\t{}\t{}", entry.file_name, entry.title, entry.description);
            }
        }
        Some(Commands::Check { root, catalog }) => {
            let config = ServerConfig::from_env()
                .with_content_root(root)
                .with_catalog(catalog);
            check(&config)?;
        }
        None => {
            // Default: start server
            serve(ServerConfig::from_env()).await?;
        }
    }

    Ok(())
}

fn build_state(config: &ServerConfig) -> anyhow::Result<AppState> {
    let catalog = config.load_catalog()?;
    let fetcher = ContentFetcher::new(&config.content_root).with_context(|| {
        format!(
            "Content root {} is not accessible",
            config.content_root.display()
        )
    })?;
    Ok(AppState::new(catalog, ContentPipeline::new(fetcher)))
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    tracing::info!("Starting folio server on {}", config.addr());

    let state = build_state(&config)?;
    tracing::info!(
        "Serving {} documents from {}",
        state.catalog.entries().len(),
        state.pipeline.fetcher().root().display()
    );

    let app = api::create_router_with_origins(state, config.cors_origins.as_deref());

    let listener = tokio::net::TcpListener::bind(config.addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.addr()))?;
    tracing::info!("folio server listening on http://{}", config.addr());

    axum::serve(listener, app).await?;
    Ok(())
}

async fn render(file: &str, url: Option<String>) -> anyhow::Result<()> {
    let client = match url {
        Some(url) => DocsClient::new(&url)?,
        None => DocsClient::from_env()?,
    };
    let catalog = ServerConfig::from_env().load_catalog()?;
    let mut viewer = DocumentViewer::new(Arc::new(catalog));

    match viewer.open(&client, file).await {
        ViewState::Ready(doc) => {
            println!("{}", doc.html);
            if !doc.toc.is_empty() {
                println!();
                println!("On this page:");
                for item in &doc.toc {
                    let indent = "  ".repeat(usize::from(item.level.saturating_sub(2)));
                    println!("{}- {} (#{})", indent, item.text, item.id);
                }
            }
            if let Some(prev) = &doc.neighbors.prev {
                println!("Previous: {} ({})", prev.title, prev.file_name);
            }
            if let Some(next) = &doc.neighbors.next {
                println!("Next: {} ({})", next.title, next.file_name);
            }
            Ok(())
        }
        ViewState::NotFound(page) => anyhow::bail!("{}: {}", page.file, page.message),
        state => anyhow::bail!("Unexpected view state: {:?}", state),
    }
}

fn check(config: &ServerConfig) -> anyhow::Result<()> {
    let state = build_state(config)?;
    let mut failures = Vec::new();

    for entry in state.catalog.entries() {
        match state.pipeline.load(&entry.file_name) {
            Ok(doc) if doc.recovered => {
                tracing::warn!("{} only serializes through the fallback", entry.file_name);
                println!("ok (fallback)\t{}", entry.file_name);
            }
            Ok(_) => println!("ok\t{}", entry.file_name),
            Err(e) => {
                println!("FAILED\t{}\t{}", entry.file_name, e);
                failures.push(entry.file_name.clone());
            }
        }
    }

    if !failures.is_empty() {
        anyhow::bail!("{} document(s) failed: {}", failures.len(), failures.join(", "));
    }
    Ok(())
}
