use std::time::Duration;

use anyhow::{Context, Result, anyhow};

use super::model::{LiveQuote, Snapshot};
use super::parse::{parse_detail, parse_snapshot};

pub const SNAPSHOT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DETAIL_TIMEOUT: Duration = Duration::from_secs(3);

pub fn fetch_snapshot(base_url: &str) -> Result<Snapshot> {
    let url = format!("{}/api/stocks", base_url.trim_end_matches('/'));
    let body = http_get(&url, SNAPSHOT_TIMEOUT)
        .with_context(|| format!("failed to fetch market snapshot from {url}"))?;
    parse_snapshot(&body).context("failed to parse market snapshot payload")
}

pub fn fetch_detail(base_url: &str, ticker: &str) -> Result<LiveQuote> {
    let url = format!("{}/api/stock/{ticker}", base_url.trim_end_matches('/'));
    let body = http_get(&url, DETAIL_TIMEOUT)
        .with_context(|| format!("failed to fetch live detail for {ticker}"))?;
    parse_detail(&body).with_context(|| format!("failed to parse live detail for {ticker}"))
}

fn http_get(url: &str, timeout: Duration) -> Result<String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .context("failed to build HTTP client")?;

    let response = client
        .get(url)
        .send()
        .with_context(|| format!("request to {url} failed"))?;

    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("request to {url} returned {status}"));
    }

    response
        .text()
        .with_context(|| format!("failed to read response body from {url}"))
}
