use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reqwest::Client;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

// ── CLI definition ─────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "hush", about = "Hush — secrets that burn after reading", version)]
struct Cli {
    /// Hush server URL (default: http://localhost:8080 or $HUSH_SERVER)
    #[arg(long, env = "HUSH_SERVER", default_value = "http://localhost:8080")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Hush HTTP server
    Serve {
        /// Port to listen on (default: $HUSH_PORT or 8080)
        #[arg(long, env = "HUSH_PORT", default_value = "8080")]
        port: u16,
        /// Host to bind (default: $HUSH_HOST or 0.0.0.0)
        #[arg(long, env = "HUSH_HOST", default_value = "0.0.0.0")]
        host: String,
    },
    /// Store a secret and print its hash
    Create {
        /// Secret text
        text: String,
        /// Number of times the secret may be read
        #[arg(long, default_value_t = 1)]
        views: i32,
        /// Time to live e.g. 30m, 2h, 7d ("0" for no expiry)
        #[arg(long, default_value = "0")]
        ttl: String,
    },
    /// Read a secret by hash (consumes one view)
    Read {
        /// Secret hash
        hash: String,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("HUSH_LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, host } => cmd_serve(host, port).await,
        Commands::Create { text, views, ttl } => {
            let ttl_minutes = parse_ttl_minutes(&ttl)?;
            cmd_create(&cli.server, &text, views, ttl_minutes).await
        }
        Commands::Read { hash } => cmd_read(&cli.server, &hash).await,
    }
}

// ── Command implementations ───────────────────────────────────────────────────

async fn cmd_serve(host: String, port: u16) -> Result<()> {
    let cfg = hush_server::ServerConfig {
        host,
        port,
        ..Default::default()
    };
    hush_server::run(cfg).await
}

async fn cmd_create(server: &str, text: &str, views: i32, ttl_minutes: i64) -> Result<()> {
    let server = server.trim_end_matches('/');
    let body = serde_json::json!({
        "secret": text,
        "expireAfterViews": views,
        "expireAfter": ttl_minutes,
    });

    let resp = Client::new()
        .post(format!("{server}/secret"))
        .json(&body)
        .send()
        .await
        .context("HTTP request failed")?;

    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        anyhow::bail!("server returned {status}: {}", error_message(&text));
    }
    let json: Value = resp.json().await.context("parse response")?;

    let hash = json["hash"].as_str().context("response is missing hash")?;
    println!("{hash}");
    eprintln!("share: {server}/secret/{hash}");
    Ok(())
}

async fn cmd_read(server: &str, hash: &str) -> Result<()> {
    let resp = Client::new()
        .get(format!("{}/secret/{}", server.trim_end_matches('/'), hash))
        .send()
        .await
        .context("HTTP request failed")?;

    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        anyhow::bail!("server returned {status}: {}", error_message(&text));
    }
    let json: Value = resp.json().await.context("parse response")?;

    println!("{}", json["secretText"].as_str().unwrap_or(""));
    if let Some(remaining) = json["remainingViews"].as_i64() {
        eprintln!("{remaining} view(s) remaining");
    }
    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Pull `error` out of a JSON error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(json) => match json["error"].as_str() {
            Some(msg) => msg.to_owned(),
            None => body.to_owned(),
        },
        Err(_) if body.trim().is_empty() => "unknown error".to_owned(),
        Err(_) => body.trim().to_owned(),
    }
}

/// Parse a TTL like "30m" or "2h" into whole minutes, rounding up.
/// "0" means no expiry.
fn parse_ttl_minutes(s: &str) -> Result<i64> {
    if s.trim() == "0" {
        return Ok(0);
    }
    let d: humantime::Duration = s
        .parse()
        .with_context(|| format!("invalid duration: {s}"))?;
    let minutes = d.as_secs().div_ceil(60);
    i64::try_from(minutes).with_context(|| format!("duration too long: {s}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_parsing() {
        assert_eq!(parse_ttl_minutes("0").unwrap(), 0);
        assert_eq!(parse_ttl_minutes("30m").unwrap(), 30);
        assert_eq!(parse_ttl_minutes("2h").unwrap(), 120);
        assert_eq!(parse_ttl_minutes("90s").unwrap(), 2);
        assert!(parse_ttl_minutes("soon").is_err());
    }

    #[test]
    fn error_message_from_json_or_text() {
        assert_eq!(
            error_message(r#"{"error":"secret has expired"}"#),
            "secret has expired"
        );
        assert_eq!(
            error_message("Failed to parse the request body as JSON\n"),
            "Failed to parse the request body as JSON"
        );
        assert_eq!(error_message(""), "unknown error");
    }

    #[test]
    fn cli_parses_create() {
        let cli = Cli::parse_from(["hush", "create", "pw", "--views", "3", "--ttl", "1h"]);
        match cli.command {
            Commands::Create { text, views, ttl } => {
                assert_eq!(text, "pw");
                assert_eq!(views, 3);
                assert_eq!(ttl, "1h");
            }
            _ => panic!("expected create"),
        }
    }
}
