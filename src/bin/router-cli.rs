use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};

use trie_router::config::load_config;
use trie_router::http::normalize_host;
use trie_router::Router;

#[derive(Parser)]
#[command(name = "router-cli")]
#[command(about = "Inspect and exercise trie-router route tables", long_about = None)]
struct Cli {
    /// Route table config file (TOML), used by the local commands.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the config and compile every route
    Check,
    /// List compiled routes with their priority
    Routes,
    /// Match a single request against the table
    Match {
        method: String,
        path: String,
        #[arg(long)]
        host: Option<String>,
    },
    /// Print table and cache statistics
    Stats,
    /// Query a running server's introspection endpoints
    Remote {
        url: String,
        #[command(subcommand)]
        query: RemoteQuery,
    },
}

#[derive(Subcommand)]
enum RemoteQuery {
    Routes,
    Stats,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            let router = build(cli.config.as_deref())?;
            let stats = router.stats();
            print_json(&json!({
                "ok": true,
                "routes": stats.routes,
                "nodes": stats.combined_nodes,
                "param_conflicts": stats.param_conflicts,
            }))?;
        }
        Commands::Routes => {
            let router = build(cli.config.as_deref())?;
            print_json(&router.route_infos())?;
        }
        Commands::Match { method, path, host } => {
            let router = build(cli.config.as_deref())?;
            let domain = host.as_deref().and_then(normalize_host);
            let result = match router.match_route(&path, &method, domain.as_deref()) {
                Some(m) => json!({
                    "matched": true,
                    "method": m.route.method,
                    "route": m.route.path,
                    "name": m.route.name,
                    "priority": m.priority(),
                    "params": m.params,
                }),
                None => json!({ "matched": false }),
            };
            print_json(&result)?;
        }
        Commands::Stats => {
            let router = build(cli.config.as_deref())?;
            print_json(&router.stats())?;
        }
        Commands::Remote { url, query } => {
            let endpoint = match query {
                RemoteQuery::Routes => "routes",
                RemoteQuery::Stats => "stats",
            };
            let res = reqwest::Client::new()
                .get(format!("{}/_router/{}", url.trim_end_matches('/'), endpoint))
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

fn build(config: Option<&Path>) -> Result<Router, Box<dyn std::error::Error>> {
    let path = config.ok_or("--config <FILE> is required for this command")?;
    Ok(load_config(path)?.build_router()?)
}

fn print_json(value: &impl Serialize) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: router returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    print_json(&json)
}
