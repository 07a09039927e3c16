use std::collections::{HashMap, HashSet};

use eframe::egui::{Vec2, vec2};

use crate::market::{Sector, SectorFilter, SecurityRecord};
use crate::util::stable_pair;

use super::super::render_utils::{change_color, node_size};
use super::super::{
    ConstellationGraph, ForceProfile, GraphLink, GraphNode, PhysicsScratch, SimState, ViewModel,
    ViewScratch, physics,
};

pub(in crate::app) const DENSE_NODE_THRESHOLD: usize = 100;
const DENSE_STAR_CAP: usize = 8;
const STAR_LINK_OPACITY: f32 = 0.35;
const CHAIN_LINK_OPACITY: f32 = 0.2;

fn assemble(
    nodes: Vec<GraphNode>,
    links: Vec<GraphLink>,
    index_by_ticker: HashMap<String, usize>,
    dense: bool,
) -> ConstellationGraph {
    ConstellationGraph {
        nodes,
        links,
        index_by_ticker,
        dense,
        forces: ForceProfile::for_density(dense),
        sim: SimState::new(),
        physics_scratch: PhysicsScratch {
            forces: Vec::new(),
            shifts: Vec::new(),
            grid: HashMap::new(),
        },
        view_scratch: ViewScratch {
            screen_positions: Vec::new(),
            screen_half_sizes: Vec::new(),
            visible_indices: Vec::new(),
        },
    }
}

pub(in crate::app) fn build_constellation(
    records: &[SecurityRecord],
    filter: SectorFilter,
    viewport: Vec2,
) -> ConstellationGraph {
    let mut seen = HashSet::new();
    let mut visible = Vec::new();
    for record in records {
        if !filter.matches(record.sector) {
            continue;
        }
        // Ticker is the node identity key; a duplicate would alias a node.
        if seen.insert(record.ticker.as_str()) {
            visible.push(record);
        }
    }

    if visible.is_empty() {
        return assemble(Vec::new(), Vec::new(), HashMap::new(), false);
    }

    let mut min_cap = f64::INFINITY;
    let mut max_cap = f64::NEG_INFINITY;
    for record in &visible {
        if record.market_cap > 0.0 {
            min_cap = min_cap.min(record.market_cap);
            max_cap = max_cap.max(record.market_cap);
        }
    }
    if !max_cap.is_finite() || max_cap <= 0.0 {
        return assemble(Vec::new(), Vec::new(), HashMap::new(), false);
    }

    let dense = visible.len() > DENSE_NODE_THRESHOLD;
    let spread = if dense { 0.8 } else { 0.6 };

    let mut nodes = Vec::with_capacity(visible.len());
    let mut index_by_ticker = HashMap::with_capacity(visible.len());
    for record in visible {
        let (jitter_x, jitter_y) = stable_pair(&record.ticker);
        index_by_ticker.insert(record.ticker.clone(), nodes.len());
        nodes.push(GraphNode {
            ticker: record.ticker.clone(),
            name: record.name.clone(),
            sector: record.sector,
            price: record.price,
            change_percent: record.change_percent,
            market_cap: record.market_cap,
            weight: record.weight,
            size: node_size(record.market_cap, min_cap, max_cap, dense),
            color: change_color(record.change_percent),
            pos: vec2(
                jitter_x * viewport.x * spread * 0.5,
                jitter_y * viewport.y * spread * 0.5,
            ),
            velocity: Vec2::ZERO,
            pinned: false,
        });
    }

    let links = synthesize_links(&nodes, dense);
    assemble(nodes, links, index_by_ticker, dense)
}

/// Two-tier constellation pattern per sector: a star from the largest-cap
/// hub, then a short chain along the next-largest members. Keeps total link
/// count proportional to the node count.
fn synthesize_links(nodes: &[GraphNode], dense: bool) -> Vec<GraphLink> {
    let mut members_by_sector: HashMap<Sector, Vec<usize>> = HashMap::new();
    for (index, node) in nodes.iter().enumerate() {
        members_by_sector.entry(node.sector).or_default().push(index);
    }

    let mut links = Vec::new();
    for sector in Sector::ALL {
        let Some(mut members) = members_by_sector.remove(&sector) else {
            continue;
        };
        if members.len() < 2 {
            continue;
        }

        members.sort_by(|&a, &b| {
            nodes[b]
                .market_cap
                .total_cmp(&nodes[a].market_cap)
                .then_with(|| nodes[a].ticker.cmp(&nodes[b].ticker))
        });

        let hub = members[0];
        let star_count = if dense {
            (members.len() - 1).min(DENSE_STAR_CAP)
        } else {
            members.len() - 1
        };
        for &spoke in members.iter().skip(1).take(star_count) {
            links.push(GraphLink {
                source: hub,
                target: spoke,
                sector,
                opacity: STAR_LINK_OPACITY,
            });
        }

        let chain_budget = if dense { 2 } else { 4 };
        let chain_count = chain_budget.min(members.len().saturating_sub(3));
        for pair in members[1..].windows(2).take(chain_count) {
            links.push(GraphLink {
                source: pair[0],
                target: pair[1],
                sector,
                opacity: CHAIN_LINK_OPACITY,
            });
        }
    }

    links
}

impl ViewModel {
    pub(in crate::app) fn rebuild_constellation(&mut self) {
        self.graph_revision = self.graph_revision.wrapping_add(1);
        self.search_match_cache = None;
        self.drag = None;

        let mut graph =
            build_constellation(&self.snapshot.securities, self.sector_filter, self.viewport);

        if graph.nodes.is_empty() {
            self.constellation = None;
            self.visible_node_count = 0;
            self.visible_link_count = 0;
            self.hover.clear();
            self.graph_dirty = false;
            return;
        }

        physics::run_warmup(&mut graph);

        let hover_is_stale = self
            .hover
            .hovered_ticker()
            .is_some_and(|ticker| !graph.contains_ticker(ticker));
        if hover_is_stale {
            self.hover.clear();
        }

        self.visible_node_count = graph.nodes.len();
        self.visible_link_count = graph.links.len();
        self.constellation = Some(graph);
        self.graph_dirty = false;
    }
}
