//! Candidate generator: produces an ordered sequence of origin points worth
//! trying for the next item, plus the coarse-grid fallback used when no
//! extreme point works.

use crate::manifest::Placement;

/// Extreme points seeded with the origin, plus the right/front/top corner
/// of every existing placement, deduped and sorted lowest-and-leftmost
/// first (ascending z, then y, then x).
pub fn extreme_points(placements: &[Placement], clearance: f64) -> Vec<(f64, f64, f64)> {
    let mut points: Vec<(f64, f64, f64)> = vec![(0.0, 0.0, 0.0)];

    for p in placements {
        points.push((p.x + p.length + clearance, p.y, p.z));
        points.push((p.x, p.y + p.width + clearance, p.z));
        points.push((p.x, p.y, p.z + p.height));
    }

    dedupe_points(&mut points);
    points.sort_by(|a, b| {
        a.2.partial_cmp(&b.2)
            .unwrap()
            .then(a.1.partial_cmp(&b.1).unwrap())
            .then(a.0.partial_cmp(&b.0).unwrap())
    });
    points
}

/// The `{0} ∪ {top of every placement}` z-ladder, ascending, used to drive
/// the fallback grid's z loop.
pub fn z_ladder(placements: &[Placement]) -> Vec<f64> {
    let mut levels: Vec<f64> = vec![0.0];
    for p in placements {
        levels.push(p.top());
    }
    dedupe_scalars(&mut levels);
    levels.sort_by(|a, b| a.partial_cmp(b).unwrap());
    levels
}

/// Coarse grid candidates: x and y step by `grid_step_cm` across the
/// truck's footprint for this rotation, z drawn from [`z_ladder`].
pub fn fallback_grid(
    truck_length: f64,
    truck_width: f64,
    item_l: f64,
    item_w: f64,
    grid_step_cm: u32,
    placements: &[Placement],
) -> Vec<(f64, f64, f64)> {
    let step = grid_step_cm.max(1) as f64;
    let levels = z_ladder(placements);

    let mut out = Vec::new();
    let max_x = truck_length - item_l;
    let max_y = truck_width - item_w;
    if max_x < 0.0 || max_y < 0.0 {
        return out;
    }

    let mut x = 0.0;
    while x <= max_x + 1e-9 {
        let mut y = 0.0;
        while y <= max_y + 1e-9 {
            for &z in &levels {
                out.push((x, y, z));
            }
            y += step;
        }
        x += step;
    }
    out
}

fn dedupe_points(points: &mut Vec<(f64, f64, f64)>) {
    let mut out: Vec<(f64, f64, f64)> = Vec::with_capacity(points.len());
    for &p in points.iter() {
        if !out.iter().any(|&q| close3(p, q)) {
            out.push(p);
        }
    }
    *points = out;
}

fn dedupe_scalars(values: &mut Vec<f64>) {
    let mut out: Vec<f64> = Vec::with_capacity(values.len());
    for &v in values.iter() {
        if !out.iter().any(|&w| (v - w).abs() < 1e-6) {
            out.push(v);
        }
    }
    *values = out;
}

fn close3(a: (f64, f64, f64), b: (f64, f64, f64)) -> bool {
    (a.0 - b.0).abs() < 1e-6 && (a.1 - b.1).abs() < 1e-6 && (a.2 - b.2).abs() < 1e-6
}
