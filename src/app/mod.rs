use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Instant;

use eframe::egui::{self, Color32, Context, Pos2, Vec2};

use crate::market::{Sector, SectorFilter, Snapshot, fallback_snapshot, fetch_snapshot};

mod graph;
mod hover;
mod physics;
mod render_utils;
mod ui;

use hover::HoverController;

type SnapshotResult = Result<Snapshot, String>;

pub struct ConstellationApp {
    api_url: String,
    state: AppState,
    refresh_rx: Option<Receiver<SnapshotResult>>,
}

enum AppState {
    Loading { rx: Receiver<SnapshotResult> },
    Ready(Box<ViewModel>),
}

struct ViewModel {
    snapshot: Snapshot,
    offline: bool,
    api_url: String,
    sector_filter: SectorFilter,
    search: String,
    pan: Vec2,
    zoom: f32,
    viewport: Vec2,
    graph_dirty: bool,
    graph_revision: u64,
    constellation: Option<ConstellationGraph>,
    search_match_cache: Option<SearchMatchCache>,
    hover: HoverController,
    drag: Option<NodeDrag>,
    show_fps_bar: bool,
    fps_current: f32,
    fps_samples: VecDeque<f32>,
    visible_node_count: usize,
    visible_link_count: usize,
}

struct SearchMatchCache {
    query: String,
    graph_revision: u64,
    matches: Arc<HashSet<usize>>,
}

struct ConstellationGraph {
    nodes: Vec<GraphNode>,
    links: Vec<GraphLink>,
    index_by_ticker: HashMap<String, usize>,
    dense: bool,
    forces: ForceProfile,
    sim: SimState,
    physics_scratch: PhysicsScratch,
    view_scratch: ViewScratch,
}

impl ConstellationGraph {
    fn contains_ticker(&self, ticker: &str) -> bool {
        self.index_by_ticker.contains_key(ticker)
    }
}

struct GraphNode {
    ticker: String,
    name: String,
    sector: Sector,
    price: f64,
    change_percent: f64,
    market_cap: f64,
    weight: f64,
    size: f32,
    color: Color32,
    pos: Vec2,
    velocity: Vec2,
    pinned: bool,
}

struct GraphLink {
    source: usize,
    target: usize,
    sector: Sector,
    opacity: f32,
}

/// Force constants for one density mode. Dense mode (more than 100 visible
/// nodes) trades repulsion range for per-tick cost.
#[derive(Clone, Copy)]
struct ForceProfile {
    repulsion_strength: f32,
    repulsion_max_distance: Option<f32>,
    collision_padding: f32,
    collision_strength: f32,
    center_strength: f32,
    link_rest_length: f32,
    link_strength: f32,
    warmup_ticks: u32,
}

struct SimState {
    alpha: f32,
    cooldown_ticks: u32,
    cooldown_started: Instant,
}

struct PhysicsScratch {
    forces: Vec<Vec2>,
    shifts: Vec<Vec2>,
    grid: HashMap<(i32, i32), Vec<usize>>,
}

struct ViewScratch {
    screen_positions: Vec<Pos2>,
    screen_half_sizes: Vec<f32>,
    visible_indices: Vec<usize>,
}

struct NodeDrag {
    index: usize,
}

impl ConstellationApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, api_url: String, offline: bool) -> Self {
        let state = if offline {
            AppState::Ready(Box::new(ViewModel::new(
                fallback_snapshot(),
                true,
                api_url.clone(),
            )))
        } else {
            AppState::Loading {
                rx: Self::spawn_fetch(api_url.clone()),
            }
        };

        Self {
            api_url,
            state,
            refresh_rx: None,
        }
    }

    fn spawn_fetch(api_url: String) -> Receiver<SnapshotResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = fetch_snapshot(&api_url).map_err(|error| error.to_string());
            let _ = tx.send(result);
        });

        rx
    }

    fn model_for(result: SnapshotResult, api_url: String) -> Box<ViewModel> {
        Box::new(match result {
            Ok(snapshot) => ViewModel::new(snapshot, false, api_url),
            Err(_) => ViewModel::new(fallback_snapshot(), true, api_url),
        })
    }
}

impl eframe::App for ConstellationApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => {
                        transition =
                            Some(Self::model_for(result, self.api_url.clone()));
                    }
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Self::model_for(
                            Err("snapshot fetch worker disconnected".to_owned()),
                            self.api_url.clone(),
                        ));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("LOADING MARKET DATA...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Ready(model) => {
                let mut refresh_requested = false;
                let is_refreshing = self.refresh_rx.is_some();
                model.show(ctx, &mut refresh_requested, is_refreshing);

                if refresh_requested && self.refresh_rx.is_none() {
                    self.refresh_rx = Some(Self::spawn_fetch(self.api_url.clone()));
                }

                if let Some(rx) = self.refresh_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(snapshot)) => model.apply_snapshot(snapshot, false),
                        Ok(Err(_)) | Err(TryRecvError::Disconnected) => {
                            model.offline = true;
                        }
                        Err(TryRecvError::Empty) => {
                            self.refresh_rx = Some(rx);
                        }
                    }
                }
            }
        }

        if let Some(model) = transition {
            self.refresh_rx = None;
            self.state = AppState::Ready(model);
        }
    }
}
