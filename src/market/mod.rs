mod fallback;
mod fetch;
mod model;
mod parse;

pub use fallback::fallback_snapshot;
pub use fetch::{fetch_detail, fetch_snapshot};
pub use model::{LiveQuote, Sector, SectorFilter, SecurityRecord, Snapshot};
