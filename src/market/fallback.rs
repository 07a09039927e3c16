use super::model::{Sector, SecurityRecord, Snapshot};

/// Static dataset used when the market service is unreachable. Prices and
/// capitalizations are a frozen capture, so the constellation still renders
/// in offline mode.
const FALLBACK_SECURITIES: &[(&str, &str, Sector, f64, f64, f64)] = &[
    ("AAPL", "Apple Inc.", Sector::InformationTechnology, 227.63, 0.84, 3.20e12),
    ("MSFT", "Microsoft Corp.", Sector::InformationTechnology, 409.04, -0.32, 3.10e12),
    ("NVDA", "NVIDIA Corp.", Sector::InformationTechnology, 129.84, 2.41, 2.90e12),
    ("AVGO", "Broadcom Inc.", Sector::InformationTechnology, 238.59, 1.12, 8.50e11),
    ("ORCL", "Oracle Corp.", Sector::InformationTechnology, 174.59, -0.85, 3.00e11),
    ("CRM", "Salesforce Inc.", Sector::InformationTechnology, 330.92, 0.45, 3.20e11),
    ("AMD", "Advanced Micro Devices", Sector::InformationTechnology, 112.58, -1.74, 2.30e11),
    ("CSCO", "Cisco Systems Inc.", Sector::InformationTechnology, 64.49, 0.21, 2.10e11),
    ("GOOGL", "Alphabet Inc.", Sector::CommunicationServices, 185.34, 1.05, 2.10e12),
    ("META", "Meta Platforms Inc.", Sector::CommunicationServices, 719.76, 1.93, 1.40e12),
    ("NFLX", "Netflix Inc.", Sector::CommunicationServices, 982.54, -0.58, 3.50e11),
    ("DIS", "Walt Disney Co.", Sector::CommunicationServices, 111.34, -0.12, 2.00e11),
    ("VZ", "Verizon Communications", Sector::CommunicationServices, 39.27, 0.33, 1.65e11),
    ("AMZN", "Amazon.com Inc.", Sector::ConsumerDiscretionary, 235.42, 0.67, 2.00e12),
    ("TSLA", "Tesla Inc.", Sector::ConsumerDiscretionary, 361.62, -2.85, 1.10e12),
    ("HD", "Home Depot Inc.", Sector::ConsumerDiscretionary, 406.66, 0.18, 4.00e11),
    ("MCD", "McDonald's Corp.", Sector::ConsumerDiscretionary, 294.50, 0.52, 2.10e11),
    ("NKE", "Nike Inc.", Sector::ConsumerDiscretionary, 71.56, -1.22, 1.08e11),
    ("WMT", "Walmart Inc.", Sector::ConsumerStaples, 102.38, 0.41, 3.70e11),
    ("PG", "Procter & Gamble Co.", Sector::ConsumerStaples, 169.30, 0.09, 3.90e11),
    ("COST", "Costco Wholesale Corp.", Sector::ConsumerStaples, 1026.61, 0.73, 4.20e11),
    ("KO", "Coca-Cola Co.", Sector::ConsumerStaples, 62.70, -0.27, 2.70e11),
    ("PEP", "PepsiCo Inc.", Sector::ConsumerStaples, 142.41, -0.44, 2.40e11),
    ("LLY", "Eli Lilly & Co.", Sector::HealthCare, 821.79, 1.38, 7.00e11),
    ("UNH", "UnitedHealth Group", Sector::HealthCare, 517.08, -0.91, 5.50e11),
    ("JNJ", "Johnson & Johnson", Sector::HealthCare, 150.73, 0.14, 3.80e11),
    ("MRK", "Merck & Co.", Sector::HealthCare, 89.91, -0.63, 2.60e11),
    ("ABBV", "AbbVie Inc.", Sector::HealthCare, 181.35, 0.88, 2.50e11),
    ("JPM", "JPMorgan Chase & Co.", Sector::Financials, 276.00, 0.95, 7.00e11),
    ("V", "Visa Inc.", Sector::Financials, 344.26, 0.36, 6.00e11),
    ("MA", "Mastercard Inc.", Sector::Financials, 553.08, 0.29, 4.80e11),
    ("BAC", "Bank of America Corp.", Sector::Financials, 46.67, -0.51, 3.10e11),
    ("GS", "Goldman Sachs Group", Sector::Financials, 635.22, 1.47, 2.10e11),
    ("XOM", "Exxon Mobil Corp.", Sector::Energy, 105.10, -1.05, 5.00e11),
    ("CVX", "Chevron Corp.", Sector::Energy, 147.68, -0.78, 2.80e11),
    ("COP", "ConocoPhillips", Sector::Energy, 98.75, -1.31, 1.20e11),
    ("CAT", "Caterpillar Inc.", Sector::Industrials, 365.92, 0.62, 1.80e11),
    ("GE", "GE Aerospace", Sector::Industrials, 199.87, 1.21, 2.20e11),
    ("HON", "Honeywell International", Sector::Industrials, 224.53, 0.05, 1.50e11),
    ("BA", "Boeing Co.", Sector::Industrials, 174.88, -2.14, 1.10e11),
    ("NEE", "NextEra Energy Inc.", Sector::Utilities, 69.56, 0.48, 1.45e11),
    ("SO", "Southern Co.", Sector::Utilities, 84.32, 0.22, 9.20e10),
    ("DUK", "Duke Energy Corp.", Sector::Utilities, 105.67, 0.11, 8.20e10),
    ("PLD", "Prologis Inc.", Sector::RealEstate, 112.34, -0.36, 1.05e11),
    ("LIN", "Linde plc", Sector::Materials, 452.88, 0.57, 2.00e11),
];

pub fn fallback_snapshot() -> Snapshot {
    let total_cap: f64 = FALLBACK_SECURITIES.iter().map(|entry| entry.5).sum();

    let securities = FALLBACK_SECURITIES
        .iter()
        .map(
            |&(ticker, name, sector, price, change_percent, market_cap)| SecurityRecord {
                ticker: ticker.to_owned(),
                name: name.to_owned(),
                sector,
                price,
                change_percent,
                market_cap,
                weight: market_cap / total_cap * 100.0,
            },
        )
        .collect();

    Snapshot {
        securities,
        as_of: "cached snapshot".to_owned(),
        excluded_records: 0,
    }
}
