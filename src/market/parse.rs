use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;

use super::model::{LiveQuote, Sector, SecurityRecord, Snapshot};

#[derive(Clone, Debug, Deserialize)]
struct RawSecurity {
    #[serde(default)]
    ticker: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    sector: String,
    #[serde(default)]
    price: f64,
    #[serde(default)]
    change_percent: f64,
    #[serde(default)]
    market_cap: f64,
    #[serde(default)]
    weight: f64,
}

impl RawSecurity {
    fn into_record(self) -> Option<SecurityRecord> {
        let ticker = self.ticker.trim().to_owned();
        if ticker.is_empty() {
            return None;
        }
        let sector = Sector::from_label(&self.sector)?;

        Some(SecurityRecord {
            name: if self.name.trim().is_empty() {
                ticker.clone()
            } else {
                self.name.trim().to_owned()
            },
            ticker,
            sector,
            price: self.price,
            change_percent: self.change_percent,
            market_cap: self.market_cap,
            weight: self.weight,
        })
    }
}

pub(super) fn parse_snapshot(raw: &str) -> Result<Snapshot> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON from market service")?;
    let object = parsed
        .as_object()
        .ok_or_else(|| anyhow!("unexpected JSON type from market snapshot endpoint"))?;

    let entries = object
        .get("stocks")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("snapshot JSON is missing the stocks array"))?;

    let as_of = object
        .get("last_updated")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_owned();

    let mut securities = Vec::with_capacity(entries.len());
    let mut excluded_records = 0usize;

    for entry in entries {
        let Ok(raw_security) = RawSecurity::deserialize(entry) else {
            excluded_records += 1;
            continue;
        };

        match raw_security.into_record() {
            Some(record) => securities.push(record),
            None => excluded_records += 1,
        }
    }

    Ok(Snapshot {
        securities,
        as_of,
        excluded_records,
    })
}

pub(super) fn parse_detail(raw: &str) -> Result<LiveQuote> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON from detail endpoint")?;

    if !parsed
        .get("success")
        .and_then(Value::as_bool)
        .unwrap_or(false)
    {
        return Err(anyhow!("detail endpoint reported no live data"));
    }

    let quote = parsed
        .get("stock")
        .ok_or_else(|| anyhow!("detail response is missing the stock payload"))?;

    Ok(LiveQuote {
        price: quote.get("price").and_then(Value::as_f64).unwrap_or(0.0),
        change_percent: quote
            .get("change_percent")
            .and_then(Value::as_f64)
            .unwrap_or(0.0),
        market_cap: quote
            .get("market_cap")
            .and_then(Value::as_f64)
            .unwrap_or(0.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_parses_records_and_counts_exclusions() {
        let raw = r#"{
            "stocks": [
                {"ticker": "AAPL", "name": "Apple Inc.", "sector": "Information Technology",
                 "price": 227.63, "change_percent": 1.1, "market_cap": 3.2e12, "weight": 6.5},
                {"ticker": "", "name": "Nameless", "sector": "Energy",
                 "price": 10.0, "change_percent": 0.0, "market_cap": 1e9, "weight": 0.1},
                {"ticker": "ZZZZ", "name": "Mystery Corp", "sector": "Conglomerates",
                 "price": 10.0, "change_percent": 0.0, "market_cap": 1e9, "weight": 0.1}
            ],
            "last_updated": "2026-02-10T16:00:00Z"
        }"#;

        let snapshot = parse_snapshot(raw).unwrap();
        assert_eq!(snapshot.securities.len(), 1);
        assert_eq!(snapshot.excluded_records, 2);
        assert_eq!(snapshot.as_of, "2026-02-10T16:00:00Z");

        let record = &snapshot.securities[0];
        assert_eq!(record.ticker, "AAPL");
        assert_eq!(record.sector, Sector::InformationTechnology);
        assert_eq!(record.market_cap, 3.2e12);
    }

    #[test]
    fn snapshot_without_stocks_array_is_an_error() {
        assert!(parse_snapshot(r#"{"count": 0}"#).is_err());
        assert!(parse_snapshot("[]").is_err());
        assert!(parse_snapshot("not json").is_err());
    }

    #[test]
    fn empty_stocks_array_is_a_valid_empty_snapshot() {
        let snapshot = parse_snapshot(r#"{"stocks": []}"#).unwrap();
        assert!(snapshot.securities.is_empty());
        assert_eq!(snapshot.excluded_records, 0);
        assert_eq!(snapshot.as_of, "unknown");
    }

    #[test]
    fn detail_requires_success_flag() {
        let ok = r#"{"success": true, "stock": {"price": 228.0, "change_percent": 1.3, "market_cap": 3.21e12}}"#;
        let quote = parse_detail(ok).unwrap();
        assert_eq!(quote.price, 228.0);
        assert_eq!(quote.change_percent, 1.3);

        assert!(parse_detail(r#"{"success": false, "error": "Missing ticker"}"#).is_err());
        assert!(parse_detail(r#"{"stock": {"price": 1.0}}"#).is_err());
        assert!(parse_detail(r#"{"success": true}"#).is_err());
    }
}
