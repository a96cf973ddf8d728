//! cargospan: a 3D cargo-loading planner for flatbed/semi-trailer trucks.
//!
//! The crate exposes two pure, single-threaded entry points:
//!
//! - [`optimize`] places as many items from a manifest as it can inside one
//!   truck, respecting collision-freedom, support, and weight caps.
//! - [`suggest_fleet`] partitions a manifest across a truck catalog into
//!   scored scenarios, optionally enriching each bucket with a 3D placement.
//!
//! Everything upstream of these two calls (HTTP routing, spreadsheet
//! ingestion, chart rendering, and unit normalization) is an external
//! collaborator; this crate consumes already-normalized `Item`/`TruckSpecs`
//! values and returns plain, serializable data.

pub mod candidates;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod fleet;
pub mod ga;
pub mod geometry;
pub mod manifest;
pub mod normalize;
pub mod placer;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

pub use config::{Algorithm, OptimizerConfig};
pub use error::{PlannerError, Result};
pub use fleet::{BucketMetrics, Scenario, TruckBucket};
pub use manifest::{Item, Placement, Statistics, TruckSpecs, UnitItem};

/// The result of one [`optimize`] call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizeResult {
    pub truck_specs: TruckSpecs,
    pub items_total: usize,
    pub items_placed: usize,
    pub weight_efficiency_pct: f64,
    pub volume_efficiency_pct: f64,
    pub placements: Vec<Placement>,
    /// Set when the genetic search exhausted `config.timeout_seconds` before
    /// `config.generations` completed; always `false` for
    /// `Algorithm::Simple`, which has no wall-clock budget.
    pub timed_out: bool,
}

/// Runs the configured placement algorithm over already-expanded unit
/// items. Shared by [`optimize`] and `fleet`'s optional 3D enrichment pass
/// so both go through the same seeded, single-threaded code path.
pub(crate) fn optimize_units(units: &[manifest::UnitItem], truck: &TruckSpecs, config: &OptimizerConfig) -> (Vec<Placement>, bool) {
    match config.algorithm {
        Algorithm::Simple => {
            let mut order = units.to_vec();
            order.sort_by(|a, b| {
                b.volume_cm3()
                    .partial_cmp(&a.volume_cm3())
                    .unwrap()
                    .then_with(|| b.weight.partial_cmp(&a.weight).unwrap())
            });
            (placer::place(&order, truck, config), false)
        }
        Algorithm::Genetic => {
            let outcome = ga::optimize(units, truck, config);
            (outcome.placements, outcome.timed_out)
        }
    }
}

/// Assembles the efficiency/accounting fields of a placement result.
fn assemble_result(truck: &TruckSpecs, items_total: usize, placements: Vec<Placement>, timed_out: bool) -> OptimizeResult {
    let placed_weight: f64 = placements.iter().map(|p| p.weight).sum();
    let placed_volume: f64 = placements.iter().map(|p| p.volume_cm3()).sum();

    let weight_efficiency_pct = if truck.max_weight > 0.0 {
        (placed_weight / truck.max_weight) * 100.0
    } else {
        0.0
    };
    let volume_efficiency_pct = if truck.volume_cm3() > 0.0 {
        (placed_volume / truck.volume_cm3()) * 100.0
    } else {
        0.0
    };

    OptimizeResult {
        truck_specs: truck.clone(),
        items_total,
        items_placed: placements.len(),
        weight_efficiency_pct,
        volume_efficiency_pct,
        placements,
        timed_out,
    }
}

/// Places as many unit items as possible inside a single truck.
///
/// Rejects the call with [`PlannerError::InvalidInput`] on any non-finite or
/// non-positive item/truck dimension, or a negative weight. Everything
/// else, items that don't fit anywhere, a genetic search that ran out of
/// time, surfaces inside the successful [`OptimizeResult`] rather than as
/// an error (`items_placed < items_total`).
#[instrument(level = "info", skip(items, truck, config), fields(algorithm = ?config.algorithm))]
pub fn optimize(items: &[Item], truck: &TruckSpecs, config: &OptimizerConfig) -> Result<OptimizeResult> {
    truck.validate()?;
    for item in items {
        item.validate()?;
    }

    let config = config.clone().clamped();
    let units = manifest::expand_items(items);

    if units.is_empty() {
        return Ok(assemble_result(truck, 0, Vec::new(), false));
    }

    let (placements, timed_out) = optimize_units(&units, truck, &config);
    info!(items_total = units.len(), items_placed = placements.len(), timed_out, "optimize complete");
    Ok(assemble_result(truck, units.len(), placements, timed_out))
}

/// Partitions a manifest across a truck catalog into cost/count-scored
/// scenarios. See [`fleet::suggest_fleet`] for the allocation and
/// scoring rules. `run_3d` additionally runs the configured placement
/// algorithm over every non-exception bucket, attaching real placements.
#[instrument(level = "info", skip(items, trucks, config), fields(truck_count = trucks.len()))]
pub fn suggest_fleet(
    items: &[Item],
    trucks: &[TruckSpecs],
    distance_km: f64,
    config: &OptimizerConfig,
    run_3d: bool,
) -> Result<Vec<Scenario>> {
    for item in items {
        item.validate()?;
    }
    for truck in trucks {
        truck.validate()?;
    }

    let config = config.clone().clamped();
    Ok(fleet::suggest_fleet_parallel(items, trucks, distance_km, &config, run_3d))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn item(reference: &str, l: f64, w: f64, h: f64, weight: f64, qty: u32, stackable: bool) -> Item {
        Item {
            length: l,
            width: w,
            height: h,
            weight,
            quantity: qty,
            reference: reference.to_string(),
            description: String::new(),
            fragile: false,
            stackable,
        }
    }

    fn truck(length: f64, width: f64, height: f64, max_weight: f64) -> TruckSpecs {
        TruckSpecs {
            id: "t".into(),
            name: "t".into(),
            length,
            width,
            height,
            max_weight,
            base_cost: 0.0,
            cost_per_km: 0.0,
        }
    }

    #[test]
    fn rejects_non_positive_item_dimension() {
        let items = vec![item("A", 0.0, 10.0, 10.0, 5.0, 1, true)];
        let t = truck(100.0, 100.0, 100.0, 1000.0);
        assert!(matches!(
            optimize(&items, &t, &OptimizerConfig::default()),
            Err(PlannerError::InvalidInput { .. })
        ));
    }

    #[test]
    fn rejects_non_positive_truck_dimension() {
        let items = vec![item("A", 10.0, 10.0, 10.0, 5.0, 1, true)];
        let t = truck(0.0, 100.0, 100.0, 1000.0);
        assert!(optimize(&items, &t, &OptimizerConfig::default()).is_err());
    }

    #[test]
    fn single_layer_tiles_floor() {
        let t = truck(1000.0, 200.0, 200.0, 10000.0);
        let items = vec![item("PALLET", 100.0, 100.0, 50.0, 50.0, 10, true)];
        let mut config = OptimizerConfig::default();
        config.algorithm = Algorithm::Simple;

        let result = optimize(&items, &t, &config).unwrap();
        assert_eq!(result.items_placed, 10);
        assert!(result.placements.iter().all(|p| p.z == 0.0));
        assert!((result.volume_efficiency_pct - 12.5).abs() < 0.5);
        assert!((result.weight_efficiency_pct - 5.0).abs() < 0.5);
    }

    #[test]
    fn stacks_when_floor_is_full() {
        let t = truck(200.0, 100.0, 200.0, 1000.0);
        let items = vec![item("CRATE", 100.0, 100.0, 100.0, 100.0, 4, true)];
        let result = optimize(&items, &t, &OptimizerConfig::default()).unwrap();
        assert_eq!(result.items_placed, 4);
        assert!(result.placements.iter().any(|p| p.z == 0.0));
        assert!(result.placements.iter().any(|p| p.z > 0.0));
        assert!(result.placements.iter().all(|p| p.z + p.height <= 200.0 + 1e-6));
    }

    #[test]
    fn non_stackable_base_forces_side_placement() {
        let t = truck(200.0, 100.0, 200.0, 10000.0);
        let items = vec![
            item("BASE", 100.0, 100.0, 50.0, 50.0, 1, false),
            item("TOP", 100.0, 100.0, 50.0, 50.0, 1, true),
        ];
        let mut config = OptimizerConfig::default();
        config.algorithm = Algorithm::Simple;
        let result = optimize(&items, &t, &config).unwrap();
        assert_eq!(result.items_placed, 2);

        let base = result.placements.iter().find(|p| p.reference == "BASE").unwrap();
        let top = result.placements.iter().find(|p| p.reference == "TOP").unwrap();
        assert_eq!(base.z, 0.0);
        assert_eq!(top.z, 0.0, "second item must land beside the non-stackable base, not on top of it");
    }

    #[test]
    fn rotation_enables_otherwise_unplaceable_item() {
        let t = truck(1200.0, 250.0, 260.0, 1_000_000.0);
        let items = vec![item("BEAM", 240.0, 1100.0, 100.0, 500.0, 1, true)];

        let mut no_rotation = OptimizerConfig::default();
        no_rotation.allow_rotation = false;
        let without = optimize(&items, &t, &no_rotation).unwrap();
        assert_eq!(without.items_placed, 0);

        let mut with_rotation = OptimizerConfig::default();
        with_rotation.allow_rotation = true;
        let with = optimize(&items, &t, &with_rotation).unwrap();
        assert_eq!(with.items_placed, 1);
        assert_eq!(with.placements[0].length, 1100.0);
        assert_eq!(with.placements[0].width, 240.0);
    }

    #[test]
    fn weight_cap_limits_items_placed_below_volume_capacity() {
        let t = truck(1360.0, 248.0, 270.0, 19000.0);
        let items = vec![item("BOX", 100.0, 100.0, 100.0, 1000.0, 25, true)];
        let mut config = OptimizerConfig::default();
        config.algorithm = Algorithm::Simple;
        let result = optimize(&items, &t, &config).unwrap();
        assert_eq!(result.items_placed, 19);
    }

    #[test]
    fn fleet_split_prefers_fewer_larger_trucks() {
        let items = vec![item("CARGO", 100.0, 100.0, 100.0, 416.6667, 60, true)];
        let trucks = vec![
            TruckSpecs { id: "A".into(), name: "A".into(), length: 700.0, width: 248.0, height: 200.0, max_weight: 15000.0, base_cost: 10.0, cost_per_km: 0.5 },
            TruckSpecs { id: "B".into(), name: "B".into(), length: 1360.0, width: 248.0, height: 270.0, max_weight: 26000.0, base_cost: 1000.0, cost_per_km: 0.5 },
        ];
        let scenarios = suggest_fleet(&items, &trucks, 0.0, &OptimizerConfig::default(), false).unwrap();
        let min_trucks = scenarios.iter().find(|s| s.id == "min_trucks").unwrap();
        assert!(min_trucks.buckets.iter().filter(|b| b.truck_specs.id != "exception").count() <= 2);
    }

    #[test]
    fn property_no_two_placements_overlap_on_random_manifest() {
        let items = fixtures::random_manifest(99, 40);
        let t = fixtures::truck_catalog().into_iter().find(|t| t.id == "truck_26t").unwrap();
        let mut config = OptimizerConfig::default();
        config.generations = 5;
        config.population_size = 10;
        config.rng_seed = 99;

        let result = optimize(&items, &t, &config).unwrap();
        for i in 0..result.placements.len() {
            for j in (i + 1)..result.placements.len() {
                let a = geometry::Aabb::from_placement(&result.placements[i]);
                let b = geometry::Aabb::from_placement(&result.placements[j]);
                assert!(!geometry::intersects(&a, &b, config.clearance_cm));
            }
        }
    }

    #[test]
    fn property_unique_identifiers_and_weight_cap_respected() {
        let items = fixtures::random_manifest(5, 30);
        let t = fixtures::truck_catalog().into_iter().find(|t| t.id == "truck_19t").unwrap();
        let result = optimize(&items, &t, &OptimizerConfig::default()).unwrap();

        let mut ids = std::collections::HashSet::new();
        for p in &result.placements {
            assert!(ids.insert(p.item_id.clone()), "duplicate placement id {}", p.item_id);
        }
        let total_weight: f64 = result.placements.iter().map(|p| p.weight).sum();
        assert!(total_weight <= t.max_weight + 1e-6);
    }

    #[test]
    fn determinism_across_repeated_calls() {
        let items = fixtures::random_manifest(17, 25);
        let t = fixtures::flatbed_1000x200x200();
        let mut config = OptimizerConfig::default();
        config.generations = 8;
        config.rng_seed = 17;

        let first = optimize(&items, &t, &config).unwrap();
        let second = optimize(&items, &t, &config).unwrap();
        assert_eq!(first.items_placed, second.items_placed);
        for (a, b) in first.placements.iter().zip(second.placements.iter()) {
            assert_eq!(a.item_id, b.item_id);
            assert_eq!((a.x, a.y, a.z), (b.x, b.y, b.z));
        }
    }

    #[test]
    fn simple_algorithm_never_reports_timed_out() {
        let t = truck(1000.0, 200.0, 200.0, 10000.0);
        let items = vec![item("PALLET", 100.0, 100.0, 50.0, 50.0, 10, true)];
        let mut config = OptimizerConfig::default();
        config.algorithm = Algorithm::Simple;
        let result = optimize(&items, &t, &config).unwrap();
        assert!(!result.timed_out);
    }

    #[test]
    fn optimize_result_round_trips_through_json() {
        let t = truck(1000.0, 200.0, 200.0, 10000.0);
        let items = vec![item("PALLET", 100.0, 100.0, 50.0, 50.0, 5, true)];
        let mut config = OptimizerConfig::default();
        config.algorithm = Algorithm::Simple;
        let result = optimize(&items, &t, &config).unwrap();

        let json = serde_json::to_string(&result).unwrap();
        let round_tripped: OptimizeResult = serde_json::from_str(&json).unwrap();
        assert_eq!(round_tripped.items_placed, result.items_placed);
        assert_eq!(round_tripped.placements.len(), result.placements.len());
    }

    #[test]
    fn genetic_algorithm_surfaces_timeout_in_result_not_as_an_error() {
        let t = truck(1000.0, 200.0, 200.0, 10000.0);
        let items = vec![item("PALLET", 100.0, 100.0, 50.0, 50.0, 10, true)];
        let mut config = OptimizerConfig::default();
        config.algorithm = Algorithm::Genetic;
        config.timeout_seconds = 0;
        let result = optimize(&items, &t, &config).unwrap();
        assert!(result.timed_out);
        assert!(result.items_placed > 0, "a timed-out GA still returns the best placements found so far");
    }
}
