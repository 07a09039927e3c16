use std::time::{Duration, Instant};

use eframe::egui::{Vec2, vec2};

use super::{ConstellationGraph, ForceProfile, GraphNode, SimState};

pub(super) const VELOCITY_DECAY: f32 = 0.4;
pub(super) const ALPHA_DECAY: f32 = 0.05;
const ALPHA_MIN: f32 = 0.001;
const DRAG_REHEAT_ALPHA: f32 = 0.3;
const COOLDOWN_TICKS: u32 = 100;
const COOLDOWN_WINDOW: Duration = Duration::from_millis(3000);
const DISTANCE_MIN_SQ: f32 = 1.0;

impl ForceProfile {
    pub(super) fn for_density(dense: bool) -> Self {
        if dense {
            Self {
                repulsion_strength: 60.0,
                repulsion_max_distance: Some(200.0),
                collision_padding: 1.0,
                collision_strength: 0.95,
                center_strength: 0.02,
                link_rest_length: 60.0,
                link_strength: 0.02,
                warmup_ticks: 150,
            }
        } else {
            Self {
                repulsion_strength: 30.0,
                repulsion_max_distance: None,
                collision_padding: 2.0,
                collision_strength: 0.95,
                center_strength: 0.015,
                link_rest_length: 80.0,
                link_strength: 0.03,
                warmup_ticks: 100,
            }
        }
    }
}

impl SimState {
    pub(super) fn new() -> Self {
        Self {
            alpha: 1.0,
            cooldown_ticks: 0,
            cooldown_started: Instant::now(),
        }
    }

    pub(super) fn reheat(&mut self) {
        self.alpha = self.alpha.max(DRAG_REHEAT_ALPHA);
        self.cooldown_ticks = 0;
        self.cooldown_started = Instant::now();
    }

    fn settled(&self) -> bool {
        self.alpha < ALPHA_MIN
    }
}

/// Synchronous settle-in pass run right after a rebuild, before the frame
/// that first paints the new graph.
pub(super) fn run_warmup(graph: &mut ConstellationGraph) {
    for _ in 0..graph.forces.warmup_ticks {
        if !step_simulation(graph) {
            break;
        }
    }
    graph.sim.cooldown_ticks = 0;
    graph.sim.cooldown_started = Instant::now();
}

/// One bounded live tick per frame. Stepping stops once the energy floor,
/// the tick budget, or the wall-clock cooldown window is reached; a drag
/// reheats all three.
pub(super) fn live_step(graph: &mut ConstellationGraph) -> bool {
    if graph.sim.settled()
        || graph.sim.cooldown_ticks >= COOLDOWN_TICKS
        || graph.sim.cooldown_started.elapsed() > COOLDOWN_WINDOW
    {
        return false;
    }

    graph.sim.cooldown_ticks += 1;
    step_simulation(graph)
}

fn grid_key(pos: Vec2, cell: f32) -> (i32, i32) {
    ((pos.x / cell).floor() as i32, (pos.y / cell).floor() as i32)
}

fn pair_direction(index: usize, other: usize, delta: Vec2, distance_sq: f32) -> Vec2 {
    if distance_sq > 0.0001 {
        delta / distance_sq.sqrt()
    } else {
        let angle =
            ((index as f32) * 0.618_034 + (other as f32) * 0.414_214) * std::f32::consts::TAU;
        vec2(angle.cos(), angle.sin())
    }
}

fn apply_pair(
    index: usize,
    other: usize,
    nodes: &[GraphNode],
    profile: ForceProfile,
    alpha: f32,
    forces: &mut [Vec2],
    shifts: &mut [Vec2],
) {
    let delta = nodes[index].pos - nodes[other].pos;
    let distance_sq = delta.length_sq();
    let distance = distance_sq.sqrt();
    let direction = pair_direction(index, other, delta, distance_sq);

    let in_range = profile
        .repulsion_max_distance
        .is_none_or(|max| distance <= max);
    if in_range {
        let clamped_sq = distance_sq.max(DISTANCE_MIN_SQ);
        let repulsion = profile.repulsion_strength * alpha / clamped_sq.sqrt();
        forces[index] += direction * repulsion;
        forces[other] -= direction * repulsion;
    }

    let min_distance =
        nodes[index].size + nodes[other].size + (2.0 * profile.collision_padding);
    if distance < min_distance {
        let overlap = (min_distance - distance) * profile.collision_strength;
        match (nodes[index].pinned, nodes[other].pinned) {
            (false, false) => {
                shifts[index] += direction * (overlap * 0.5);
                shifts[other] -= direction * (overlap * 0.5);
            }
            (false, true) => shifts[index] += direction * overlap,
            (true, false) => shifts[other] -= direction * overlap,
            (true, true) => {}
        }
    }
}

fn step_simulation(graph: &mut ConstellationGraph) -> bool {
    let node_count = graph.nodes.len();
    if node_count < 2 || graph.sim.settled() {
        return false;
    }

    let alpha = graph.sim.alpha;
    let profile = graph.forces;

    {
        let scratch = &mut graph.physics_scratch;
        let nodes = &graph.nodes;

        scratch.forces.resize(node_count, Vec2::ZERO);
        scratch.forces.fill(Vec2::ZERO);
        scratch.shifts.resize(node_count, Vec2::ZERO);
        scratch.shifts.fill(Vec2::ZERO);

        match profile.repulsion_max_distance {
            // Bucketing by cutoff-sized cells keeps the pair scan near-linear
            // for dense graphs; collision ranges are far below the cutoff, so
            // the same buckets cover both interactions.
            Some(cutoff) => {
                scratch.grid.clear();
                for (index, node) in nodes.iter().enumerate() {
                    scratch
                        .grid
                        .entry(grid_key(node.pos, cutoff))
                        .or_default()
                        .push(index);
                }

                for (index, node) in nodes.iter().enumerate() {
                    let (cell_x, cell_y) = grid_key(node.pos, cutoff);
                    for dx in -1..=1 {
                        for dy in -1..=1 {
                            let Some(bucket) = scratch.grid.get(&(cell_x + dx, cell_y + dy))
                            else {
                                continue;
                            };
                            for &other in bucket {
                                if other > index {
                                    apply_pair(
                                        index,
                                        other,
                                        nodes,
                                        profile,
                                        alpha,
                                        &mut scratch.forces,
                                        &mut scratch.shifts,
                                    );
                                }
                            }
                        }
                    }
                }
            }
            None => {
                for index in 0..node_count {
                    for other in (index + 1)..node_count {
                        apply_pair(
                            index,
                            other,
                            nodes,
                            profile,
                            alpha,
                            &mut scratch.forces,
                            &mut scratch.shifts,
                        );
                    }
                }
            }
        }

        for (index, node) in nodes.iter().enumerate() {
            scratch.forces[index] -= node.pos * (profile.center_strength * alpha);
        }

        for link in &graph.links {
            let (source, target) = (link.source, link.target);
            if source >= node_count || target >= node_count || source == target {
                continue;
            }

            let delta = nodes[source].pos - nodes[target].pos;
            let distance = delta.length();
            if distance <= 0.0001 {
                continue;
            }
            let direction = delta / distance;

            let spring = (distance - profile.link_rest_length) * profile.link_strength * alpha;
            let correction = direction * spring;
            scratch.forces[source] -= correction;
            scratch.forces[target] += correction;
        }
    }

    let damping = 1.0 - VELOCITY_DECAY;
    let mut any_motion = false;
    for index in 0..node_count {
        let force = graph.physics_scratch.forces[index];
        let shift = graph.physics_scratch.shifts[index];
        let node = &mut graph.nodes[index];

        if node.pinned {
            node.velocity = Vec2::ZERO;
            continue;
        }

        let mut velocity = (node.velocity + force) * damping;
        if velocity.length_sq() < 0.0001 && force.length_sq() < 0.0001 {
            velocity = Vec2::ZERO;
        }

        node.velocity = velocity;
        node.pos += velocity + shift;
        if velocity.length_sq() > 0.000_001 || shift.length_sq() > 0.000_001 {
            any_motion = true;
        }
    }

    graph.sim.alpha *= 1.0 - ALPHA_DECAY;
    any_motion
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use crate::app::graph::build_constellation;
    use crate::market::{Sector, SectorFilter, SecurityRecord};

    use super::*;

    fn record(ticker: &str, sector: Sector, market_cap: f64) -> SecurityRecord {
        SecurityRecord {
            ticker: ticker.to_owned(),
            name: ticker.to_owned(),
            sector,
            price: 100.0,
            change_percent: 0.5,
            market_cap,
            weight: 0.1,
        }
    }

    fn two_linked_nodes() -> ConstellationGraph {
        let records = vec![
            record("AAA", Sector::Energy, 2.0e12),
            record("BBB", Sector::Energy, 1.0e12),
        ];
        build_constellation(&records, SectorFilter::All, vec2(1200.0, 800.0))
    }

    #[test]
    fn dense_profile_tightens_range_and_raises_repulsion() {
        let dense = ForceProfile::for_density(true);
        let sparse = ForceProfile::for_density(false);

        assert_eq!(dense.repulsion_strength, 60.0);
        assert_eq!(dense.repulsion_max_distance, Some(200.0));
        assert_eq!(sparse.repulsion_strength, 30.0);
        assert_eq!(sparse.repulsion_max_distance, None);

        assert_eq!(dense.center_strength, 0.02);
        assert_eq!(sparse.center_strength, 0.015);
        assert_eq!(dense.link_rest_length, 60.0);
        assert_eq!(sparse.link_rest_length, 80.0);
        assert_eq!(dense.warmup_ticks, 150);
        assert_eq!(sparse.warmup_ticks, 100);
    }

    #[test]
    fn link_spring_pulls_linked_nodes_together() {
        let mut graph = two_linked_nodes();
        graph.nodes[0].pos = vec2(-300.0, 0.0);
        graph.nodes[1].pos = vec2(300.0, 0.0);

        for _ in 0..200 {
            step_simulation(&mut graph);
        }

        let distance = (graph.nodes[0].pos - graph.nodes[1].pos).length();
        assert!(distance < 300.0, "distance stayed at {distance}");
        assert!(distance > 20.0, "nodes collapsed to {distance}");
    }

    #[test]
    fn collision_separates_overlapping_nodes() {
        let mut graph = two_linked_nodes();
        graph.nodes[0].pos = vec2(0.0, 0.0);
        graph.nodes[1].pos = vec2(1.0, 0.0);

        for _ in 0..60 {
            step_simulation(&mut graph);
        }

        let min_distance = graph.nodes[0].size + graph.nodes[1].size + 4.0;
        let distance = (graph.nodes[0].pos - graph.nodes[1].pos).length();
        assert!(
            distance > min_distance * 0.8,
            "distance {distance} below separation target {min_distance}"
        );
    }

    #[test]
    fn pinned_node_holds_its_position() {
        let mut graph = two_linked_nodes();
        graph.nodes[0].pos = vec2(50.0, 50.0);
        graph.nodes[0].pinned = true;
        graph.nodes[1].pos = vec2(60.0, 50.0);

        for _ in 0..100 {
            step_simulation(&mut graph);
        }

        assert_eq!(graph.nodes[0].pos, vec2(50.0, 50.0));
        assert_ne!(graph.nodes[1].pos, vec2(60.0, 50.0));
    }

    #[test]
    fn cutoff_skips_repulsion_for_distant_pairs() {
        let mut graph = two_linked_nodes();
        graph.forces = ForceProfile::for_density(true);
        graph.nodes[0].pos = vec2(-400.0, 0.0);
        graph.nodes[1].pos = vec2(400.0, 0.0);

        let mut forces = vec![Vec2::ZERO; 2];
        let mut shifts = vec![Vec2::ZERO; 2];
        apply_pair(0, 1, &graph.nodes, graph.forces, 1.0, &mut forces, &mut shifts);

        assert_eq!(forces[0], Vec2::ZERO);
        assert_eq!(forces[1], Vec2::ZERO);
        assert_eq!(shifts[0], Vec2::ZERO);
    }

    #[test]
    fn dense_graph_steps_through_the_bucketed_pair_scan() {
        let records = (0..120)
            .map(|index| record(&format!("T{index:03}"), Sector::Energy, 1.0e9 * (index + 1) as f64))
            .collect::<Vec<_>>();
        let mut graph = build_constellation(&records, SectorFilter::All, vec2(1200.0, 800.0));
        assert!(graph.forces.repulsion_max_distance.is_some());

        let before = graph.nodes.iter().map(|node| node.pos).collect::<Vec<_>>();
        for _ in 0..10 {
            step_simulation(&mut graph);
        }

        let mut moved = 0usize;
        for (node, old) in graph.nodes.iter().zip(&before) {
            assert!(node.pos.x.is_finite() && node.pos.y.is_finite());
            if (node.pos - *old).length_sq() > 0.0 {
                moved += 1;
            }
        }
        assert!(moved > 0);
    }

    #[test]
    fn stepping_stops_at_the_energy_floor_and_tick_budget() {
        let mut graph = two_linked_nodes();
        graph.sim.alpha = ALPHA_MIN / 2.0;
        assert!(!live_step(&mut graph));

        let mut graph = two_linked_nodes();
        graph.sim.cooldown_ticks = COOLDOWN_TICKS;
        assert!(!live_step(&mut graph));

        graph.sim.reheat();
        assert_eq!(graph.sim.cooldown_ticks, 0);
        assert!(graph.sim.alpha >= DRAG_REHEAT_ALPHA);
    }
}
