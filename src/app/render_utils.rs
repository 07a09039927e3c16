use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

use crate::market::Sector;

pub(super) const BACKGROUND: Color32 = Color32::from_rgb(0, 0, 32);

const DENSE_SIZE_RANGE: (f32, f32) = (2.0, 18.0);
const SPARSE_SIZE_RANGE: (f32, f32) = (3.0, 32.0);

pub(super) fn size_range(dense: bool) -> (f32, f32) {
    if dense { DENSE_SIZE_RANGE } else { SPARSE_SIZE_RANGE }
}

fn normalize_log(value: f64, min: f64, max: f64) -> f32 {
    if value <= 0.0 || min <= 0.0 || max <= 0.0 {
        return 0.5;
    }

    let denominator = max.ln() - min.ln();
    if denominator.abs() < f64::EPSILON {
        return 0.5;
    }

    ((value.ln() - min.ln()) / denominator).clamp(0.0, 1.0) as f32
}

pub(super) fn node_size(market_cap: f64, min_cap: f64, max_cap: f64, dense: bool) -> f32 {
    let (min_size, max_size) = size_range(dense);
    min_size + normalize_log(market_cap, min_cap, max_cap) * (max_size - min_size)
}

/// Green for gainers, red for losers, gray for unchanged. A three-point move
/// saturates the channel; bigger moves do not get louder.
pub(super) fn change_color(change_percent: f64) -> Color32 {
    if change_percent > 0.0 {
        let intensity = (change_percent / 3.0).min(1.0);
        Color32::from_rgb(0, (150.0 + intensity * 105.0) as u8, 0)
    } else if change_percent < 0.0 {
        let intensity = (change_percent.abs() / 3.0).min(1.0);
        Color32::from_rgb((150.0 + intensity * 105.0) as u8, 0, 0)
    } else {
        Color32::from_rgb(128, 128, 128)
    }
}

pub(super) fn sector_line_color(sector: Sector) -> Color32 {
    match sector {
        Sector::InformationTechnology => Color32::from_rgb(0x00, 0xAA, 0xFF),
        Sector::CommunicationServices => Color32::from_rgb(0xFF, 0xD7, 0x00),
        Sector::ConsumerDiscretionary => Color32::from_rgb(0xFF, 0x6B, 0x6B),
        Sector::ConsumerStaples => Color32::from_rgb(0x90, 0xEE, 0x90),
        Sector::HealthCare => Color32::from_rgb(0xDD, 0xA0, 0xDD),
        Sector::Industrials => Color32::from_rgb(0xFF, 0xA5, 0x00),
        Sector::Utilities => Color32::from_rgb(0x87, 0xCE, 0xEB),
        Sector::Energy => Color32::from_rgb(0xFF, 0x45, 0x00),
        Sector::Financials => Color32::from_rgb(0x32, 0xCD, 0x32),
        Sector::RealEstate => Color32::from_rgb(0xBA, 0x55, 0xD3),
        Sector::Materials => Color32::from_rgb(0xCD, 0x85, 0x3F),
    }
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

pub(super) fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    let opacity = opacity.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), (opacity * 255.0) as u8)
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, BACKGROUND);

    let step = (64.0 * zoom.clamp(0.6, 1.8)).max(24.0);
    let origin = rect.center() + pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(40, 50, 90, 36));

    let mut x = origin.x.rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = origin.y.rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn square_visible(rect: Rect, position: Pos2, half_size: f32) -> bool {
    !(position.x + half_size < rect.left()
        || position.x - half_size > rect.right()
        || position.y + half_size < rect.top()
        || position.y - half_size > rect.bottom())
}

pub(super) fn segment_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let min_x = start.x.min(end.x) - padding;
    let max_x = start.x.max(end.x) + padding;
    let min_y = start.y.min(end.y) - padding;
    let max_y = start.y.max(end.y) + padding;

    !(max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom())
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use eframe::egui::vec2;

    use super::*;

    #[test]
    fn node_size_is_monotonic_and_bounded() {
        let caps = [1e9, 5e9, 2e10, 1e11, 5e11, 3.2e12];
        for dense in [false, true] {
            let (min_size, max_size) = size_range(dense);
            let sizes = caps
                .iter()
                .map(|&cap| node_size(cap, caps[0], caps[caps.len() - 1], dense))
                .collect::<Vec<_>>();

            for pair in sizes.windows(2) {
                assert!(pair[0] <= pair[1]);
            }
            assert_relative_eq!(sizes[0], min_size);
            assert_relative_eq!(sizes[sizes.len() - 1], max_size);
        }
    }

    #[test]
    fn non_positive_cap_takes_the_scale_midpoint() {
        let size = node_size(0.0, 1e9, 1e12, false);
        let (min_size, max_size) = size_range(false);
        assert_relative_eq!(size, (min_size + max_size) / 2.0);
        assert_relative_eq!(node_size(-5.0, 1e9, 1e12, false), size);
    }

    #[test]
    fn degenerate_cap_range_takes_the_scale_midpoint() {
        let (min_size, max_size) = size_range(true);
        assert_relative_eq!(node_size(7e9, 7e9, 7e9, true), (min_size + max_size) / 2.0);
    }

    #[test]
    fn change_color_saturates_at_three_percent() {
        assert_eq!(change_color(3.0), change_color(4.5));
        assert_eq!(change_color(3.0), change_color(250.0));
        assert_eq!(change_color(-3.0), change_color(-9.9));
        assert_eq!(change_color(0.0), Color32::from_rgb(128, 128, 128));

        assert_eq!(change_color(3.0), Color32::from_rgb(0, 255, 0));
        assert_eq!(change_color(-3.0), Color32::from_rgb(255, 0, 0));
        assert_eq!(change_color(1.5), Color32::from_rgb(0, 202, 0));
    }

    #[test]
    fn screen_transforms_round_trip() {
        let rect = Rect::from_min_size(Pos2::ZERO, vec2(800.0, 600.0));
        let pan = vec2(14.0, -32.0);
        let zoom = 1.7;
        let world = vec2(120.0, -44.0);

        let screen = world_to_screen(rect, pan, zoom, world);
        let back = screen_to_world(rect, pan, zoom, screen);
        assert_relative_eq!(back.x, world.x, epsilon = 1e-3);
        assert_relative_eq!(back.y, world.y, epsilon = 1e-3);
    }
}
