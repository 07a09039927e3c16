use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub fn format_market_cap(value: f64) -> String {
    if value >= 1e12 {
        format!("${:.2}T", value / 1e12)
    } else if value >= 1e9 {
        format!("${:.2}B", value / 1e9)
    } else if value >= 1e6 {
        format!("${:.2}M", value / 1e6)
    } else {
        format!("${value:.0}")
    }
}

pub fn format_change(change_percent: f64) -> String {
    if change_percent >= 0.0 {
        format!("+{change_percent:.2}%")
    } else {
        format!("{change_percent:.2}%")
    }
}

pub fn stable_pair(key: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_cap_picks_unit_by_magnitude() {
        assert_eq!(format_market_cap(3_200_000_000_000.0), "$3.20T");
        assert_eq!(format_market_cap(850_000_000_000.0), "$850.00B");
        assert_eq!(format_market_cap(5_000_000.0), "$5.00M");
        assert_eq!(format_market_cap(950.0), "$950");
    }

    #[test]
    fn change_keeps_explicit_sign() {
        assert_eq!(format_change(1.5), "+1.50%");
        assert_eq!(format_change(-0.25), "-0.25%");
        assert_eq!(format_change(0.0), "+0.00%");
    }

    #[test]
    fn stable_pair_is_deterministic_and_bounded() {
        let (x1, y1) = stable_pair("AAPL");
        let (x2, y2) = stable_pair("AAPL");
        assert_eq!((x1, y1), (x2, y2));
        assert!((-1.0..=1.0).contains(&x1));
        assert!((-1.0..=1.0).contains(&y1));
        assert_ne!(stable_pair("AAPL"), stable_pair("MSFT"));
    }
}
