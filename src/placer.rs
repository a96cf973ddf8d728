//! Constructive placer: given an ordered sequence of unit items and a
//! truck, places each item at the best-scoring feasible pose. Items whose
//! insertion fails are silently dropped; they reappear as unplaced in the
//! result.

use crate::candidates::{extreme_points, fallback_grid};
use crate::config::OptimizerConfig;
use crate::geometry::{intersects, supported, Aabb};
use crate::manifest::{Placement, TruckSpecs, UnitItem};

/// `z` dominates the score by six orders of magnitude so a higher
/// candidate is only ever chosen when no lower one is feasible
/// ("floor-first"); the remaining terms reward compactness.
fn score_position(x: f64, y: f64, z: f64, l: f64, w: f64, h: f64, placements: &[Placement]) -> f64 {
    let (max_x, max_y, max_z) = placements.iter().fold((0.0_f64, 0.0_f64, 0.0_f64), |acc, p| {
        (acc.0.max(p.x + p.length), acc.1.max(p.y + p.width), acc.2.max(p.top()))
    });

    let new_max_x = max_x.max(x + l);
    let new_max_y = max_y.max(y + w);
    let new_max_z = max_z.max(z + h);

    z * 1_000_000.0 + x + y + z * 10.0 + 0.5 * new_max_x + 0.5 * new_max_y + 2.0 * new_max_z
}

struct Candidate {
    x: f64,
    y: f64,
    z: f64,
    l: f64,
    w: f64,
    h: f64,
    score: f64,
}

fn feasible(
    x: f64,
    y: f64,
    z: f64,
    l: f64,
    w: f64,
    h: f64,
    truck: &TruckSpecs,
    max_height: f64,
    config: &OptimizerConfig,
    placements: &[Placement],
) -> bool {
    if x + l + config.clearance_cm > truck.length + 1e-9 {
        return false;
    }
    if y + w + config.clearance_cm > truck.width + 1e-9 {
        return false;
    }
    if z + h > max_height + 1e-9 {
        return false;
    }

    let candidate_box = Aabb::new(x, y, z, l, w, h);
    let collides = placements
        .iter()
        .any(|p| intersects(&candidate_box, &Aabb::from_placement(p), config.clearance_cm));
    if collides {
        return false;
    }

    supported(x, y, z, l, w, placements, config.min_support_ratio)
}

/// Finds the best feasible `(x, y, z, l, w, h)` for `item` given already
/// committed `placements`, trying every permitted rotation against the
/// extreme-point candidates first, then the coarse grid.
fn find_best_position(
    item: &UnitItem,
    placements: &[Placement],
    truck: &TruckSpecs,
    config: &OptimizerConfig,
    max_height: f64,
) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;

    for (l, w, h) in item.rotations(config.allow_rotation) {
        if l + config.clearance_cm > truck.length + 1e-9 || w + config.clearance_cm > truck.width + 1e-9 {
            continue;
        }
        if h > max_height + 1e-9 {
            continue;
        }

        let mut try_point = |x: f64, y: f64, z: f64, best: &mut Option<Candidate>| {
            if !feasible(x, y, z, l, w, h, truck, max_height, config, placements) {
                return;
            }
            let score = score_position(x, y, z, l, w, h, placements);
            if best.as_ref().map(|b| score < b.score).unwrap_or(true) {
                *best = Some(Candidate { x, y, z, l, w, h, score });
            }
        };

        for (x, y, z) in extreme_points(placements, config.clearance_cm) {
            try_point(x, y, z, &mut best);
        }

        for (x, y, z) in fallback_grid(truck.length, truck.width, l, w, config.grid_step_cm, placements) {
            try_point(x, y, z, &mut best);
        }
    }

    best
}

/// Runs the constructive placer over `order`, committing a placement for
/// every item that fits within the truck's bounds, collision-freedom,
/// support, and weight budget; items that don't fit anywhere are dropped.
pub fn place(order: &[UnitItem], truck: &TruckSpecs, config: &OptimizerConfig) -> Vec<Placement> {
    let mut placements: Vec<Placement> = Vec::with_capacity(order.len());
    let max_height = truck.height * config.max_height_ratio;
    let mut placed_weight = 0.0;

    for item in order {
        if placed_weight + item.weight > truck.max_weight + 1e-9 {
            continue;
        }

        let Some(best) = find_best_position(item, &placements, truck, config, max_height) else {
            continue;
        };

        placed_weight += item.weight;
        placements.push(Placement {
            item_id: item.id.clone(),
            reference: item.reference.clone(),
            x: best.x,
            y: best.y,
            z: best.z,
            length: best.l,
            width: best.w,
            height: best.h,
            weight: item.weight,
            stackable: item.stackable,
        });
    }

    placements
}
