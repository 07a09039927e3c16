use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use crate::market::{LiveQuote, Sector, SecurityRecord, fetch_detail};

use super::GraphNode;

/// The record currently surfaced to the detail panel. Starts from the last
/// bulk snapshot values and may later be upgraded in place by a live lookup.
pub(super) struct HoverCard {
    pub(super) ticker: String,
    pub(super) name: String,
    pub(super) sector: Sector,
    pub(super) price: f64,
    pub(super) change_percent: f64,
    pub(super) market_cap: f64,
    pub(super) weight: f64,
    pub(super) live: bool,
}

impl HoverCard {
    fn from_node(node: &GraphNode) -> Self {
        Self {
            ticker: node.ticker.clone(),
            name: node.name.clone(),
            sector: node.sector,
            price: node.price,
            change_percent: node.change_percent,
            market_cap: node.market_cap,
            weight: node.weight,
            live: false,
        }
    }

    fn from_record(record: &SecurityRecord) -> Self {
        Self {
            ticker: record.ticker.clone(),
            name: record.name.clone(),
            sector: record.sector,
            price: record.price,
            change_percent: record.change_percent,
            market_cap: record.market_cap,
            weight: record.weight,
            live: false,
        }
    }
}

struct LookupOutcome {
    generation: u64,
    ticker: String,
    quote: Option<LiveQuote>,
}

pub(super) struct HoverController {
    card: Option<HoverCard>,
    generation: u64,
    lookup_rx: Option<Receiver<LookupOutcome>>,
    lookup_pending: bool,
}

impl HoverController {
    pub(super) fn new() -> Self {
        Self {
            card: None,
            generation: 0,
            lookup_rx: None,
            lookup_pending: false,
        }
    }

    pub(super) fn card(&self) -> Option<&HoverCard> {
        self.card.as_ref()
    }

    pub(super) fn lookup_pending(&self) -> bool {
        self.lookup_pending
    }

    pub(super) fn hovered_ticker(&self) -> Option<&str> {
        self.card.as_ref().map(|card| card.ticker.as_str())
    }

    /// Graph hover: surface the node's known values immediately, then start a
    /// live lookup unless the caller is offline (`live_source` is None).
    pub(super) fn hover_node(&mut self, node: &GraphNode, live_source: Option<&str>) {
        if self.hovered_ticker() == Some(node.ticker.as_str()) {
            return;
        }

        self.supersede();
        self.card = Some(HoverCard::from_node(node));
        if let Some(base_url) = live_source {
            self.spawn_lookup(base_url, node.ticker.clone());
        }
    }

    /// Panel hover (rankings): surface the record without a live lookup.
    pub(super) fn show_record(&mut self, record: &SecurityRecord) {
        if self.hovered_ticker() == Some(record.ticker.as_str()) {
            return;
        }

        self.supersede();
        self.card = Some(HoverCard::from_record(record));
    }

    pub(super) fn clear(&mut self) {
        if self.card.is_none() {
            return;
        }
        self.supersede();
        self.card = None;
    }

    fn supersede(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.lookup_rx = None;
        self.lookup_pending = false;
    }

    fn spawn_lookup(&mut self, base_url: &str, ticker: String) {
        let (tx, rx) = mpsc::channel();
        let generation = self.generation;
        let base_url = base_url.to_owned();

        self.lookup_rx = Some(rx);
        self.lookup_pending = true;

        thread::spawn(move || {
            let quote = fetch_detail(&base_url, &ticker).ok();
            let _ = tx.send(LookupOutcome {
                generation,
                ticker,
                quote,
            });
        });
    }

    pub(super) fn poll(&mut self) {
        let Some(rx) = &self.lookup_rx else {
            return;
        };

        match rx.try_recv() {
            Ok(outcome) => {
                self.lookup_rx = None;
                self.apply(outcome);
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.lookup_rx = None;
                self.lookup_pending = false;
            }
        }
    }

    /// Last hover wins: a result is merged only when it still pertains to the
    /// currently hovered ticker at arrival time. A failed or timed-out lookup
    /// silently keeps the snapshot values.
    fn apply(&mut self, outcome: LookupOutcome) {
        if outcome.generation != self.generation {
            return;
        }
        self.lookup_pending = false;

        let Some(card) = self.card.as_mut() else {
            return;
        };
        if card.ticker != outcome.ticker {
            return;
        }
        let Some(quote) = outcome.quote else {
            return;
        };

        card.price = quote.price;
        card.change_percent = quote.change_percent;
        card.market_cap = quote.market_cap;
        card.live = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ticker: &str, price: f64) -> SecurityRecord {
        SecurityRecord {
            ticker: ticker.to_owned(),
            name: format!("{ticker} Corp."),
            sector: Sector::Energy,
            price,
            change_percent: 0.4,
            market_cap: 1.0e11,
            weight: 0.2,
        }
    }

    fn quote(price: f64) -> LiveQuote {
        LiveQuote {
            price,
            change_percent: 2.2,
            market_cap: 1.5e11,
        }
    }

    #[test]
    fn matching_result_upgrades_the_card_to_live() {
        let mut hover = HoverController::new();
        hover.show_record(&record("AAA", 100.0));

        hover.apply(LookupOutcome {
            generation: hover.generation,
            ticker: "AAA".to_owned(),
            quote: Some(quote(101.5)),
        });

        let card = hover.card().unwrap();
        assert!(card.live);
        assert_eq!(card.price, 101.5);
        assert_eq!(card.change_percent, 2.2);
        assert_eq!(card.market_cap, 1.5e11);
    }

    #[test]
    fn stale_result_is_dropped_after_hover_moves_on() {
        let mut hover = HoverController::new();
        hover.show_record(&record("AAA", 100.0));
        let first_generation = hover.generation;

        hover.show_record(&record("BBB", 50.0));
        hover.apply(LookupOutcome {
            generation: first_generation,
            ticker: "AAA".to_owned(),
            quote: Some(quote(999.0)),
        });

        let card = hover.card().unwrap();
        assert_eq!(card.ticker, "BBB");
        assert_eq!(card.price, 50.0);
        assert!(!card.live);
    }

    #[test]
    fn failed_lookup_keeps_snapshot_values() {
        let mut hover = HoverController::new();
        hover.show_record(&record("AAA", 100.0));

        hover.apply(LookupOutcome {
            generation: hover.generation,
            ticker: "AAA".to_owned(),
            quote: None,
        });

        let card = hover.card().unwrap();
        assert!(!card.live);
        assert_eq!(card.price, 100.0);
        assert!(!hover.lookup_pending());
    }

    #[test]
    fn result_for_a_cleared_hover_is_ignored() {
        let mut hover = HoverController::new();
        hover.show_record(&record("AAA", 100.0));
        let first_generation = hover.generation;

        hover.clear();
        hover.apply(LookupOutcome {
            generation: first_generation,
            ticker: "AAA".to_owned(),
            quote: Some(quote(1.0)),
        });

        assert!(hover.card().is_none());
    }

    #[test]
    fn re_hovering_the_same_ticker_does_not_supersede() {
        let mut hover = HoverController::new();
        hover.show_record(&record("AAA", 100.0));
        let generation = hover.generation;

        hover.show_record(&record("AAA", 100.0));
        assert_eq!(hover.generation, generation);
    }
}
