//! One-shot reaction trigger.
//!
//! ```text
//! wfl-react terry_laugh
//! ```
//!
//! Asks a running relay (`WFL_RELAY_URL`, default `http://127.0.0.1:3000`)
//! to play the named reaction, sending `WFL_CONTROL_TOKEN` if set. Exits 1
//! for an unknown reaction or a failed request.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, bail};

use wfl_relay::api::auth::TOKEN_HEADER;
use wfl_relay::sequence::reactions::{Reaction, UnknownReaction};

const DEFAULT_RELAY_URL: &str = "http://127.0.0.1:3000";

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let Some(name) = std::env::args().nth(1) else {
        eprintln!("usage: wfl-react <reaction>");
        print_available();
        return ExitCode::FAILURE;
    };

    let reaction = match name.parse::<Reaction>() {
        Ok(reaction) => reaction,
        Err(e) => {
            eprintln!("{e}");
            print_available();
            return ExitCode::FAILURE;
        }
    };

    match trigger(reaction).await {
        Ok(()) => {
            println!("{reaction}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn print_available() {
    eprintln!("available reactions:");
    for name in UnknownReaction::available() {
        eprintln!("  {name}");
    }
}

async fn trigger(reaction: Reaction) -> anyhow::Result<()> {
    let base = std::env::var("WFL_RELAY_URL").unwrap_or_else(|_| DEFAULT_RELAY_URL.to_string());
    let url = format!("{}/react?name={}", base.trim_end_matches('/'), reaction.name());

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .context("failed to build HTTP client")?;

    let mut request = client.get(&url);
    if let Ok(token) = std::env::var("WFL_CONTROL_TOKEN") {
        let token = token.trim();
        if !token.is_empty() {
            request = request.header(TOKEN_HEADER, token);
        }
    }

    let response = request
        .send()
        .await
        .with_context(|| format!("request to {url} failed"))?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        bail!("relay answered {status}: {body}");
    }
    Ok(())
}
