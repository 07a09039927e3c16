use std::collections::VecDeque;

use eframe::egui::{self, Align, Color32, Context, Layout, RichText, Vec2, vec2};

use crate::market::{Sector, SectorFilter, Snapshot};
use crate::util::{format_change, format_market_cap};

use super::super::ViewModel;
use super::super::hover::HoverController;

const RANKING_ROWS: usize = 15;
const GAIN_COLOR: Color32 = Color32::from_rgb(0, 255, 65);
const LOSS_COLOR: Color32 = Color32::from_rgb(255, 80, 80);
const WARN_COLOR: Color32 = Color32::from_rgb(255, 210, 60);

impl ViewModel {
    pub(in crate::app) fn new(snapshot: Snapshot, offline: bool, api_url: String) -> Self {
        Self {
            snapshot,
            offline,
            api_url,
            sector_filter: SectorFilter::All,
            search: String::new(),
            pan: Vec2::ZERO,
            zoom: 1.0,
            viewport: vec2(1280.0, 800.0),
            graph_dirty: true,
            graph_revision: 0,
            constellation: None,
            search_match_cache: None,
            hover: HoverController::new(),
            drag: None,
            show_fps_bar: true,
            fps_current: 0.0,
            fps_samples: VecDeque::new(),
            visible_node_count: 0,
            visible_link_count: 0,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        refresh_requested: &mut bool,
        is_refreshing: bool,
    ) {
        self.update_fps_counter(ctx);
        self.hover.poll();

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("CONSTELLATION TERMINAL");
                    ui.separator();
                    ui.label(format!("as of: {}", self.snapshot.as_of));
                    if self.offline {
                        ui.colored_label(WARN_COLOR, "OFFLINE MODE");
                    }
                    let refresh_button =
                        ui.add_enabled(!is_refreshing, egui::Button::new("Refresh data"));
                    if refresh_button.clicked() {
                        *refresh_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(visible_text) = self.visible_graph_text() {
                            ui.label(visible_text);
                        }
                        if let Some(fps_text) = self.fps_display_text() {
                            ui.label(fps_text);
                        }
                    });
                });
            });

        egui::TopBottomPanel::bottom("status_bar")
            .resizable(false)
            .show(ctx, |ui| self.draw_status_bar(ui, is_refreshing));

        egui::SidePanel::left("market_panel")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt("market_scroll")
                    .show(ui, |ui| self.draw_market_panel(ui));
            });

        egui::SidePanel::right("detail_panel")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt("detail_scroll")
                    .show(ui, |ui| self.draw_detail_panel(ui));
            });

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));
    }

    pub(in crate::app) fn set_sector_filter(&mut self, filter: SectorFilter) {
        if self.sector_filter == filter {
            return;
        }
        self.sector_filter = filter;
        self.graph_dirty = true;
    }

    pub(in crate::app) fn apply_snapshot(&mut self, snapshot: Snapshot, offline: bool) {
        self.snapshot = snapshot;
        self.offline = offline;
        self.graph_dirty = true;
    }

    fn draw_market_panel(&mut self, ui: &mut egui::Ui) {
        let filter = self.sector_filter;

        ui.heading("Market Data");
        ui.add_space(4.0);
        ui.label("TOTAL MCAP:");
        ui.label(
            RichText::new(format_market_cap(self.snapshot.total_market_cap(filter))).strong(),
        );
        ui.horizontal(|ui| {
            ui.colored_label(GAIN_COLOR, format!("▲ {}", self.snapshot.gainer_count(filter)));
            ui.colored_label(LOSS_COLOR, format!("▼ {}", self.snapshot.loser_count(filter)));
        });
        ui.small(format!(
            "securities: {} / {}",
            self.snapshot.filtered(filter).count(),
            self.snapshot.securities.len()
        ));

        ui.separator();
        ui.heading("Sector Filter");
        ui.add_space(4.0);
        let mut pending_filter = None;
        if ui
            .selectable_label(filter == SectorFilter::All, "[ ALL SECTORS ]")
            .clicked()
        {
            pending_filter = Some(SectorFilter::All);
        }
        for sector in Sector::ALL {
            let selected = filter == SectorFilter::Only(sector);
            if ui.selectable_label(selected, sector.label()).clicked() {
                pending_filter = Some(SectorFilter::Only(sector));
            }
        }
        if let Some(filter) = pending_filter {
            self.set_sector_filter(filter);
        }

        ui.separator();
        ui.heading("Search");
        ui.add_space(4.0);
        ui.text_edit_singleline(&mut self.search);
        ui.small("matching securities stay bright");

        ui.separator();
        ui.collapsing("Legend", |ui| {
            ui.colored_label(GAIN_COLOR, "green square = price up");
            ui.colored_label(LOSS_COLOR, "red square = price down");
            ui.label("size = market cap (log scale)");
            ui.label("lines = same-sector constellations");
            ui.small("drag nodes to pin, scroll to zoom");
        });
    }

    fn draw_detail_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Security Detail");
        ui.add_space(4.0);

        let offline = self.offline;
        let lookup_pending = self.hover.lookup_pending();

        if let Some(card) = self.hover.card() {
            ui.vertical_centered(|ui| {
                ui.label(RichText::new(card.ticker.as_str()).strong().size(22.0));
                ui.small(card.name.as_str());
            });
            ui.separator();

            ui.label(format!("SECTOR: {}", card.sector.label()));
            ui.label(format!("PRICE: ${:.2}", card.price));
            let change_color = if card.change_percent >= 0.0 {
                GAIN_COLOR
            } else {
                LOSS_COLOR
            };
            ui.colored_label(change_color, format!("CHANGE: {}", format_change(card.change_percent)));
            ui.label(format!("MARKET CAP: {}", format_market_cap(card.market_cap)));
            ui.label(format!("WEIGHT: {:.4}%", card.weight));

            ui.separator();
            if offline {
                ui.colored_label(WARN_COLOR, "OFFLINE MODE - STATIC DATA");
            } else if lookup_pending {
                ui.colored_label(WARN_COLOR, "LOADING LIVE DATA...");
            } else if card.live {
                ui.colored_label(GAIN_COLOR, "● LIVE DATA");
            } else {
                ui.small("hover to load live data");
            }
        } else {
            ui.add_space(12.0);
            ui.vertical_centered(|ui| {
                ui.label("HOVER OVER A SECURITY");
                ui.label("TO VIEW DETAILS");
            });
            ui.add_space(12.0);
        }

        ui.separator();
        ui.heading("Top Gainers");
        let gainers = self.snapshot.top_gainers(self.sector_filter, RANKING_ROWS);
        if gainers.is_empty() {
            ui.small("no gainers in this filter");
        }
        for record in gainers {
            let row = ui.selectable_label(
                false,
                RichText::new(format!(
                    "{:<6} {}",
                    record.ticker,
                    format_change(record.change_percent)
                ))
                .monospace()
                .color(GAIN_COLOR),
            );
            if row.hovered() {
                self.hover.show_record(record);
            }
        }

        ui.separator();
        ui.heading("Top Losers");
        let losers = self.snapshot.top_losers(self.sector_filter, RANKING_ROWS);
        if losers.is_empty() {
            ui.small("no losers in this filter");
        }
        for record in losers {
            let row = ui.selectable_label(
                false,
                RichText::new(format!(
                    "{:<6} {}",
                    record.ticker,
                    format_change(record.change_percent)
                ))
                .monospace()
                .color(LOSS_COLOR),
            );
            if row.hovered() {
                self.hover.show_record(record);
            }
        }
    }

    fn draw_status_bar(&self, ui: &mut egui::Ui, is_refreshing: bool) {
        ui.horizontal(|ui| {
            let state = if is_refreshing {
                "FETCHING..."
            } else if self.offline {
                "OFFLINE"
            } else {
                "READY"
            };
            ui.label(RichText::new(state).monospace());
            ui.separator();
            ui.label(
                RichText::new(format!("FILTER: {}", self.sector_filter.label())).monospace(),
            );
            ui.separator();
            if let Some(graph) = &self.constellation {
                let mode = if graph.dense { "DENSE" } else { "SPARSE" };
                ui.label(RichText::new(format!("MODE: {mode}")).monospace());
                ui.separator();
            }
            if self.hover.lookup_pending() {
                ui.label(RichText::new("LIVE LOOKUP...").monospace());
                ui.separator();
            }
            if self.snapshot.excluded_records > 0 {
                ui.label(
                    RichText::new(format!(
                        "EXCLUDED: {} malformed",
                        self.snapshot.excluded_records
                    ))
                    .monospace()
                    .color(WARN_COLOR),
                );
                ui.separator();
            }
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                ui.label(RichText::new(format!("UPDATED: {}", self.snapshot.as_of)).monospace());
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::app::ViewModel;
    use crate::market::{Sector, SectorFilter, fallback_snapshot};

    fn model() -> ViewModel {
        ViewModel::new(fallback_snapshot(), true, "http://localhost:8000".to_owned())
    }

    #[test]
    fn filter_change_rebuilds_wholesale_and_drops_pins() {
        let mut model = model();
        model.rebuild_constellation();
        assert!(!model.graph_dirty);

        let graph = model.constellation.as_mut().unwrap();
        graph.nodes[0].pinned = true;

        model.set_sector_filter(SectorFilter::Only(Sector::Energy));
        assert!(model.graph_dirty);
        model.rebuild_constellation();

        let graph = model.constellation.as_ref().unwrap();
        assert!(graph.nodes.iter().all(|node| !node.pinned));
        assert!(graph.nodes.iter().all(|node| node.sector == Sector::Energy));
    }

    #[test]
    fn setting_the_same_filter_keeps_the_graph() {
        let mut model = model();
        model.rebuild_constellation();
        model.set_sector_filter(SectorFilter::All);
        assert!(!model.graph_dirty);
    }

    #[test]
    fn rebuild_clears_hover_for_tickers_outside_the_filter() {
        let mut model = model();
        model.rebuild_constellation();

        let record = model
            .snapshot
            .securities
            .iter()
            .find(|record| record.sector == Sector::Financials)
            .unwrap()
            .clone();
        model.hover.show_record(&record);
        assert!(model.hover.card().is_some());

        model.set_sector_filter(SectorFilter::Only(Sector::Energy));
        model.rebuild_constellation();
        assert!(model.hover.card().is_none());
    }

    #[test]
    fn refresh_replaces_the_snapshot_and_marks_the_graph_dirty() {
        let mut model = model();
        model.rebuild_constellation();

        let mut snapshot = fallback_snapshot();
        snapshot.as_of = "refreshed".to_owned();
        model.apply_snapshot(snapshot, false);

        assert!(model.graph_dirty);
        assert!(!model.offline);
        assert_eq!(model.snapshot.as_of, "refreshed");
    }
}
