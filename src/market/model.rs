#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sector {
    InformationTechnology,
    CommunicationServices,
    ConsumerDiscretionary,
    ConsumerStaples,
    HealthCare,
    Industrials,
    Utilities,
    Energy,
    Financials,
    RealEstate,
    Materials,
}

impl Sector {
    pub const ALL: [Sector; 11] = [
        Sector::InformationTechnology,
        Sector::CommunicationServices,
        Sector::ConsumerDiscretionary,
        Sector::ConsumerStaples,
        Sector::HealthCare,
        Sector::Industrials,
        Sector::Utilities,
        Sector::Energy,
        Sector::Financials,
        Sector::RealEstate,
        Sector::Materials,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::InformationTechnology => "Information Technology",
            Self::CommunicationServices => "Communication Services",
            Self::ConsumerDiscretionary => "Consumer Discretionary",
            Self::ConsumerStaples => "Consumer Staples",
            Self::HealthCare => "Health Care",
            Self::Industrials => "Industrials",
            Self::Utilities => "Utilities",
            Self::Energy => "Energy",
            Self::Financials => "Financials",
            Self::RealEstate => "Real Estate",
            Self::Materials => "Materials",
        }
    }

    /// Accepts the GICS names plus the alias spellings the quote feeds use.
    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim() {
            "Information Technology" | "Technology" => Some(Self::InformationTechnology),
            "Communication Services" => Some(Self::CommunicationServices),
            "Consumer Discretionary" | "Consumer Cyclical" => Some(Self::ConsumerDiscretionary),
            "Consumer Staples" | "Consumer Defensive" => Some(Self::ConsumerStaples),
            "Health Care" | "Healthcare" => Some(Self::HealthCare),
            "Industrials" => Some(Self::Industrials),
            "Utilities" => Some(Self::Utilities),
            "Energy" => Some(Self::Energy),
            "Financials" | "Financial Services" => Some(Self::Financials),
            "Real Estate" => Some(Self::RealEstate),
            "Materials" | "Basic Materials" => Some(Self::Materials),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SectorFilter {
    All,
    Only(Sector),
}

impl SectorFilter {
    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Only(sector) => sector.label(),
        }
    }

    pub fn matches(self, sector: Sector) -> bool {
        match self {
            Self::All => true,
            Self::Only(only) => only == sector,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SecurityRecord {
    pub ticker: String,
    pub name: String,
    pub sector: Sector,
    pub price: f64,
    pub change_percent: f64,
    pub market_cap: f64,
    pub weight: f64,
}

/// Live values fetched on demand for a single hovered ticker.
#[derive(Clone, Copy, Debug)]
pub struct LiveQuote {
    pub price: f64,
    pub change_percent: f64,
    pub market_cap: f64,
}

#[derive(Clone, Debug)]
pub struct Snapshot {
    pub securities: Vec<SecurityRecord>,
    pub as_of: String,
    pub excluded_records: usize,
}

impl Snapshot {
    pub fn filtered(&self, filter: SectorFilter) -> impl Iterator<Item = &SecurityRecord> {
        self.securities
            .iter()
            .filter(move |record| filter.matches(record.sector))
    }

    pub fn total_market_cap(&self, filter: SectorFilter) -> f64 {
        self.filtered(filter)
            .map(|record| record.market_cap.max(0.0))
            .sum()
    }

    pub fn gainer_count(&self, filter: SectorFilter) -> usize {
        self.filtered(filter)
            .filter(|record| record.change_percent > 0.0)
            .count()
    }

    pub fn loser_count(&self, filter: SectorFilter) -> usize {
        self.filtered(filter)
            .filter(|record| record.change_percent < 0.0)
            .count()
    }

    pub fn top_gainers(&self, filter: SectorFilter, limit: usize) -> Vec<&SecurityRecord> {
        let mut ranked = self
            .filtered(filter)
            .filter(|record| record.change_percent > 0.0)
            .collect::<Vec<_>>();
        ranked.sort_by(|a, b| b.change_percent.total_cmp(&a.change_percent));
        ranked.truncate(limit);
        ranked
    }

    pub fn top_losers(&self, filter: SectorFilter, limit: usize) -> Vec<&SecurityRecord> {
        let mut ranked = self
            .filtered(filter)
            .filter(|record| record.change_percent < 0.0)
            .collect::<Vec<_>>();
        ranked.sort_by(|a, b| a.change_percent.total_cmp(&b.change_percent));
        ranked.truncate(limit);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ticker: &str, sector: Sector, change_percent: f64, market_cap: f64) -> SecurityRecord {
        SecurityRecord {
            ticker: ticker.to_owned(),
            name: ticker.to_owned(),
            sector,
            price: 100.0,
            change_percent,
            market_cap,
            weight: 0.1,
        }
    }

    #[test]
    fn sector_labels_round_trip() {
        for sector in Sector::ALL {
            assert_eq!(Sector::from_label(sector.label()), Some(sector));
        }
    }

    #[test]
    fn sector_aliases_resolve() {
        assert_eq!(
            Sector::from_label("Technology"),
            Some(Sector::InformationTechnology)
        );
        assert_eq!(Sector::from_label("Healthcare"), Some(Sector::HealthCare));
        assert_eq!(
            Sector::from_label("Financial Services"),
            Some(Sector::Financials)
        );
        assert_eq!(Sector::from_label("Conglomerates"), None);
    }

    #[test]
    fn filter_all_matches_every_sector() {
        for sector in Sector::ALL {
            assert!(SectorFilter::All.matches(sector));
        }
        assert!(SectorFilter::Only(Sector::Energy).matches(Sector::Energy));
        assert!(!SectorFilter::Only(Sector::Energy).matches(Sector::Utilities));
    }

    #[test]
    fn snapshot_stats_respect_filter() {
        let snapshot = Snapshot {
            securities: vec![
                record("AAPL", Sector::InformationTechnology, 1.2, 3.0e12),
                record("MSFT", Sector::InformationTechnology, -0.4, 3.1e12),
                record("XOM", Sector::Energy, 0.8, 5.0e11),
            ],
            as_of: "test".to_owned(),
            excluded_records: 0,
        };

        let it = SectorFilter::Only(Sector::InformationTechnology);
        assert_eq!(snapshot.filtered(it).count(), 2);
        assert_eq!(snapshot.gainer_count(it), 1);
        assert_eq!(snapshot.loser_count(it), 1);
        assert_eq!(snapshot.total_market_cap(it), 6.1e12);

        let gainers = snapshot.top_gainers(SectorFilter::All, 10);
        assert_eq!(gainers[0].ticker, "AAPL");
        assert_eq!(gainers[1].ticker, "XOM");
    }
}
