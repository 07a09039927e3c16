use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{
    self, Align2, Color32, FontId, Rect, Sense, Stroke, StrokeKind, Ui, Vec2,
};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::super::render_utils::{
    dim_color, draw_background, sector_line_color, segment_visible, with_opacity, world_to_screen,
};
use super::super::{ConstellationGraph, NodeDrag, SearchMatchCache, ViewModel, physics};

const EMPTY_STATE_COLOR: Color32 = Color32::from_rgb(0, 255, 65);

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

fn update_screen_space(rect: Rect, pan: Vec2, zoom: f32, graph: &mut ConstellationGraph) {
    let scratch = &mut graph.view_scratch;
    scratch.screen_positions.clear();
    scratch.screen_half_sizes.clear();
    for node in &graph.nodes {
        scratch
            .screen_positions
            .push(world_to_screen(rect, pan, zoom, node.pos));
        scratch.screen_half_sizes.push(node.size * zoom * 0.5);
    }
}

impl ViewModel {
    fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.graph_revision == self.graph_revision
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let graph = self.constellation.as_ref()?;
        let matcher = SkimMatcherV2::default();
        let matches = graph
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                let hit = fuzzy_match_score(&matcher, &node.ticker, query).is_some()
                    || fuzzy_match_score(&matcher, &node.name, query).is_some();
                hit.then_some(index)
            })
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            graph_revision: self.graph_revision,
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        if rect.width() > 1.0 && rect.height() > 1.0 {
            self.viewport = rect.size();
        }
        if self.graph_dirty {
            self.rebuild_constellation();
        }

        let painter = ui.painter_at(rect);
        draw_background(&painter, rect, self.pan, self.zoom);

        self.handle_graph_zoom(ui, rect, &response);
        let search_matches = self.cached_search_matches();

        let pan = self.pan;
        let zoom = self.zoom;
        let live_lookups_enabled = !self.offline;

        let Some(graph) = self.constellation.as_mut() else {
            self.visible_node_count = 0;
            self.visible_link_count = 0;
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "NO MARKET DATA FOR THIS FILTER",
                FontId::monospace(16.0),
                EMPTY_STATE_COLOR,
            );
            if response.dragged() {
                self.pan += response.drag_delta();
            }
            return;
        };

        let mut simulating = physics::live_step(graph);

        update_screen_space(rect, pan, zoom, graph);
        Self::visible_indices_into(
            rect,
            &graph.view_scratch.screen_positions,
            &graph.view_scratch.screen_half_sizes,
            &mut graph.view_scratch.visible_indices,
        );

        // Small squares first so the heavyweights stay readable on top.
        {
            let nodes = &graph.nodes;
            graph
                .view_scratch
                .visible_indices
                .sort_by(|&a, &b| nodes[a].size.total_cmp(&nodes[b].size));
        }

        let hovered = Self::hovered_index(
            ui,
            &graph.view_scratch.visible_indices,
            &graph.view_scratch.screen_positions,
            &graph.view_scratch.screen_half_sizes,
        )
        .map(|(index, _)| index);

        if response.drag_started_by(egui::PointerButton::Primary)
            && let Some(index) = hovered
        {
            graph.nodes[index].pinned = true;
            graph.nodes[index].velocity = Vec2::ZERO;
            self.drag = Some(NodeDrag { index });
        }

        match self.drag.as_ref().map(|drag| drag.index) {
            Some(index) if index < graph.nodes.len() => {
                if response.dragged_by(egui::PointerButton::Primary) {
                    let node = &mut graph.nodes[index];
                    node.pos += response.drag_delta() / zoom;
                    graph.view_scratch.screen_positions[index] =
                        world_to_screen(rect, pan, zoom, node.pos);
                    graph.sim.reheat();
                    simulating = true;
                }
                if response.drag_stopped_by(egui::PointerButton::Primary) {
                    self.drag = None;
                }
            }
            Some(_) => self.drag = None,
            None => {
                if response.dragged() {
                    self.pan += response.drag_delta();
                }
            }
        }

        if simulating || response.dragged() {
            ui.ctx().request_repaint();
        }

        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        let hover_target = self.drag.as_ref().map(|drag| drag.index).or(hovered);
        if response.hovered() {
            match hover_target.and_then(|index| graph.nodes.get(index)) {
                Some(node) => {
                    let live_source = live_lookups_enabled.then_some(self.api_url.as_str());
                    self.hover.hover_node(node, live_source);
                }
                None => self.hover.clear(),
            }
        }

        let mut visible_link_count = 0usize;
        for link in &graph.links {
            let (Some(&start), Some(&end)) = (
                graph.view_scratch.screen_positions.get(link.source),
                graph.view_scratch.screen_positions.get(link.target),
            ) else {
                continue;
            };
            if !(start.x.is_finite() && start.y.is_finite() && end.x.is_finite() && end.y.is_finite())
            {
                continue;
            }
            if !segment_visible(rect, start, end, 2.5) {
                continue;
            }

            painter.line_segment(
                [start, end],
                Stroke::new(1.0, with_opacity(sector_line_color(link.sector), link.opacity)),
            );
            visible_link_count += 1;
        }

        let search_active = search_matches
            .as_ref()
            .is_some_and(|matches| !matches.is_empty());

        for &index in &graph.view_scratch.visible_indices {
            let node = &graph.nodes[index];
            let position = graph.view_scratch.screen_positions[index];
            let half_size = graph.view_scratch.screen_half_sizes[index];

            let is_hovered = hover_target == Some(index);
            let is_match = search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&index));
            let dimmed = search_active && !is_match && !is_hovered;

            let node_rect = Rect::from_center_size(position, Vec2::splat(half_size * 2.0));
            let fill = if dimmed {
                dim_color(node.color, 0.35)
            } else {
                node.color
            };
            painter.rect_filled(node_rect, 0.0, fill);

            let outline = if dimmed {
                Color32::from_rgba_unmultiplied(255, 255, 255, 90)
            } else {
                Color32::WHITE
            };
            let outline_width = if is_hovered { 2.0 } else { 1.0 };
            painter.rect_stroke(
                node_rect,
                0.0,
                Stroke::new(outline_width, outline),
                StrokeKind::Middle,
            );

            if node.size > 10.0 && zoom > 0.5 {
                painter.text(
                    position,
                    Align2::CENTER_CENTER,
                    &node.ticker,
                    FontId::monospace((node.size / 4.0).max(6.0) * zoom),
                    Color32::WHITE,
                );
            }
        }

        self.visible_node_count = graph.view_scratch.visible_indices.len();
        self.visible_link_count = visible_link_count;
    }
}
