// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! `CalDAV`/`CardDAV` account tool.
//!
//! A standalone CLI for exercising the client against real servers: resolve
//! an account, list its collections, read and write objects, and keep a
//! local JSON snapshot of the collection list in sync.

use std::error::Error;
use std::io::Write as _;
use std::path::Path;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize as _;
use davsync::{
    Account, AccountKind, AuthMethod, Collection, CollectionObject, DavClient, DavConfig,
    DavError, ETag, LoadOptions, ObjectFilter,
};
use reqwest::header::HeaderMap;
use tracing_subscriber::EnvFilter;
use url::Url;

/// `CalDAV`/`CardDAV` account tool.
#[derive(Parser)]
#[command(name = "dav_cli")]
#[command(about = "CalDAV/CardDAV account tool", long_about = None)]
#[command(version)]
struct Cli {
    /// Server URL
    #[arg(long)]
    server: Option<String>,
    /// Protocol of the account
    #[arg(long, value_enum, default_value_t = Kind::Caldav)]
    kind: Kind,
    /// Username for basic auth
    #[arg(long)]
    username: Option<String>,
    /// Password for basic auth
    #[arg(long)]
    password: Option<String>,
    /// Bearer token for OAuth
    #[arg(long)]
    token: Option<String>,
    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Caldav,
    Carddav,
}

impl From<Kind> for AccountKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Caldav => Self::CalDav,
            Kind::Carddav => Self::CardDav,
        }
    }
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Resolve root, principal and home URLs
    Discover,
    /// List the collections under the home URL
    List,
    /// List the objects of a collection
    Objects {
        /// Collection URL
        collection: String,
        /// Start of a time range, e.g. 20250101T000000Z (calendars only)
        #[arg(long)]
        start: Option<String>,
        /// End of the time range
        #[arg(long)]
        end: Option<String>,
        /// Print object data as well
        #[arg(long)]
        data: bool,
    },
    /// Create an object in a collection
    Put {
        /// Collection URL
        collection: String,
        /// iCalendar or vCard file path (or "-" for stdin)
        input: String,
        /// File name on the server; a random one is generated when omitted
        #[arg(long)]
        filename: Option<String>,
    },
    /// Delete an object
    Delete {
        /// Object URL
        object: String,
        /// Only delete if the object still has this ETag
        #[arg(long)]
        etag: Option<String>,
    },
    /// Reconcile a JSON snapshot of the collection list with the server
    Sync {
        /// Snapshot file; created when missing
        snapshot: String,
    },
}

impl Cli {
    fn build_config(&self) -> Result<DavConfig, Box<dyn Error>> {
        // Read from environment variables first
        let server_url = self
            .server
            .clone()
            .or_else(|| std::env::var("DAVSYNC_SERVER").ok())
            .ok_or_else(|| {
                "DAVSYNC_SERVER must be provided via --server or DAVSYNC_SERVER env var".to_string()
            })?;

        let username = self
            .username
            .clone()
            .or_else(|| std::env::var("DAVSYNC_USERNAME").ok());

        let password = self
            .password
            .clone()
            .or_else(|| std::env::var("DAVSYNC_PASSWORD").ok());

        let token = self
            .token
            .clone()
            .or_else(|| std::env::var("DAVSYNC_TOKEN").ok());

        let auth = if let Some(token) = token {
            AuthMethod::Bearer { token }
        } else if let (Some(username), Some(password)) = (username, password) {
            AuthMethod::Basic { username, password }
        } else {
            AuthMethod::None
        };

        Ok(DavConfig {
            server_url,
            account_type: self.kind.into(),
            auth,
            timeout_secs: self.timeout,
            ..DavConfig::default()
        })
    }
}

async fn resolve_account(
    client: &DavClient,
    config: &DavConfig,
    options: LoadOptions,
) -> Result<Account, DavError> {
    client.create_account(config.account()?, options).await
}

fn print_url(label: &str, url: Option<&Url>) {
    match url {
        Some(url) => println!("{label:<16} {url}"),
        None => println!("{label:<16} {}", "-".dimmed()),
    }
}

async fn cmd_discover(client: &DavClient, config: &DavConfig) -> Result<(), Box<dyn Error>> {
    let account = resolve_account(client, config, LoadOptions::DISCOVERY_ONLY).await?;

    println!("{}", format!("✓ {} account resolved", account.kind()).green());
    print_url("Server:", Some(account.server_url()));
    print_url("Root:", account.root_url());
    print_url("Principal:", account.principal_url());
    print_url("Home:", account.home_url());

    Ok(())
}

fn print_collections(collections: &[Collection]) {
    println!("{:-<100}", "");
    println!("{:<50} {:<20} {:<20}", "URL", "Name", "Components");
    println!("{:-<100}", "");

    for collection in collections {
        let name = collection.display_name.as_deref().unwrap_or("Unnamed");
        let components = collection.supported_components.join(", ");
        println!("{:<50} {:<20} {}", collection.url.path(), name, components);
    }
}

async fn cmd_list(client: &DavClient, config: &DavConfig) -> Result<(), Box<dyn Error>> {
    let account = resolve_account(client, config, LoadOptions::COLLECTIONS).await?;

    if account.collections().is_empty() {
        println!("No collections found");
        return Ok(());
    }

    print_collections(account.collections());
    Ok(())
}

async fn cmd_objects(
    client: &DavClient,
    config: &DavConfig,
    collection: &str,
    range: Option<(String, Option<String>)>,
    show_data: bool,
) -> Result<(), Box<dyn Error>> {
    let account = resolve_account(client, config, LoadOptions::DISCOVERY_ONLY).await?;
    let collection = Collection::new(Url::parse(collection)?, account.kind());

    let filter = match range {
        Some((start, end)) => Some(account.kind().default_filter().time_range(start, end)),
        None => None,
    };
    let objects = client
        .fetch_collection_objects(&collection, &account, filter.as_ref())
        .await?;

    if objects.is_empty() {
        println!("No objects found");
        return Ok(());
    }

    println!("{:-<80}", "");
    println!("{:<50} {:<30}", "URL", "ETag");
    println!("{:-<80}", "");

    for object in &objects {
        let etag = object.etag.as_ref().map_or("-", ETag::as_str);
        println!("{:<50} {:<30}", object.url.path(), etag);
        if show_data {
            println!("{}", object.data.trim_end().dimmed());
        }
    }

    Ok(())
}

/// Read object data from a file or stdin.
fn read_input(input: &str) -> Result<String, Box<dyn Error>> {
    let content = if input == "-" {
        use std::io::Read;
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(input)?
    };

    if content.trim().is_empty() {
        return Err("No object data found in input".into());
    }
    Ok(content)
}

async fn cmd_put(
    client: &DavClient,
    config: &DavConfig,
    collection: &str,
    input: &str,
    filename: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let kind = config.account_type;
    let collection = Collection::new(Url::parse(collection)?, kind);
    let data = read_input(input)?;
    let filename = filename.unwrap_or_else(|| kind.object_filename());

    let written = client
        .create_object(&collection, &filename, &data, &HeaderMap::new())
        .await?;

    println!("{}", "✓ Object created successfully".green());
    println!("URL: {}", written.url);
    println!("Status: {}", written.status);
    if let Some(etag) = written.etag {
        println!("ETag: {etag}");
    }

    Ok(())
}

async fn cmd_delete(
    client: &DavClient,
    config: &DavConfig,
    object: &str,
    etag: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let url = Url::parse(object)?;
    let object = CollectionObject::new(url, config.account_type, etag.map(ETag::new), String::new());

    client.delete_object(&object, &HeaderMap::new()).await?;

    println!("{}", "✓ Object deleted successfully".green());
    println!("URL: {}", object.url);

    Ok(())
}

fn load_snapshot(path: &Path) -> Result<Vec<Collection>, Box<dyn Error>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

async fn cmd_sync(
    client: &DavClient,
    config: &DavConfig,
    snapshot: &str,
) -> Result<(), Box<dyn Error>> {
    let path = Path::new(snapshot);
    let local = load_snapshot(path)?;
    let account = resolve_account(client, config, LoadOptions::DISCOVERY_ONLY).await?;

    let changes = client.sync_collections_detailed(&account, &local).await?;
    if changes.is_empty() {
        println!("{}", "✓ Snapshot is up to date".green());
        return Ok(());
    }

    for collection in &changes.created {
        println!("{} {}", "+".green(), collection.url);
    }
    for collection in &changes.updated {
        println!("{} {}", "~".yellow(), collection.url);
    }
    for collection in &changes.deleted {
        println!("{} {}", "-".red(), collection.url);
    }

    let merged = changes.into_merged();
    std::fs::write(path, serde_json::to_string_pretty(&merged)?)?;
    println!(
        "{}",
        format!("✓ Snapshot written with {} collections", merged.len()).green()
    );

    Ok(())
}

/// Format error for user-friendly display.
fn format_error(err: &(dyn Error + 'static)) -> String {
    let prefix = "Error:".red().bold();
    match err.downcast_ref::<DavError>() {
        Some(DavError::Http { status, .. }) if *status == 401 || *status == 403 => {
            format!("{prefix} Authentication failed")
        }
        Some(DavError::Http { status, .. }) if *status == 404 => {
            format!("{prefix} Resource not found")
        }
        Some(DavError::StaleETag(url)) => format!(
            "{prefix} ETag conflict - {url} was modified by another client"
        ),
        Some(DavError::Conflict(url)) => format!("{prefix} {url} already exists"),
        Some(DavError::Transport(_)) => format!(
            "{prefix} Network error - check server URL and connection"
        ),
        _ => format!("{prefix} {err}"),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    // Priority: .env.local (highest) -> .env -> existing environment variables (lowest)
    dotenvy::dotenv().ok();
    dotenvy::from_filename(".env.local").ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.build_config()?;
    let client = DavClient::new(&config)?;

    let runtime = tokio::runtime::Runtime::new()?;

    let result = runtime.block_on(async {
        match cli.command {
            Commands::Discover => cmd_discover(&client, &config).await,
            Commands::List => cmd_list(&client, &config).await,
            Commands::Objects {
                collection,
                start,
                end,
                data,
            } => {
                let range = start.map(|start| (start, end));
                cmd_objects(&client, &config, &collection, range, data).await
            }
            Commands::Put {
                collection,
                input,
                filename,
            } => cmd_put(&client, &config, &collection, &input, filename).await,
            Commands::Delete { object, etag } => cmd_delete(&client, &config, &object, etag).await,
            Commands::Sync { snapshot } => cmd_sync(&client, &config, &snapshot).await,
        }
    });

    if let Err(e) = result {
        // Flush stdout before printing error
        std::io::stdout().flush().ok();
        eprintln!("{}", format_error(e.as_ref()));
        std::process::exit(1);
    }

    Ok(())
}
