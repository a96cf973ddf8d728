//! Fleet partitioner: classifies which catalog trucks can carry the
//! manifest at all, then allocates unit items into per-truck buckets under
//! soft volume/weight/floor-area caps. Three scenarios are generated from
//! three truck-priority orderings; each is scored by summed trip cost.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::OptimizerConfig;
use crate::manifest::{calculate_statistics, expand_items, Item, Placement, Statistics, TruckSpecs, UnitItem};

const VOLUME_SOFT_CAP: f64 = 0.88;
const WEIGHT_SOFT_CAP: f64 = 0.95;
const FLOOR_SOFT_CAP: f64 = 0.90;

const EXCEPTION_TRUCK_ID: &str = "exception";

/// Per-bucket utilization, each fraction taken against that truck's soft
/// cap: three discrete fill percentages, not a single blended one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BucketMetrics {
    pub weight_kg: f64,
    pub volume_m3: f64,
    pub floor_area_m2: f64,
    pub fill_weight_pct: f64,
    pub fill_volume_pct: f64,
    pub fill_floor_pct: f64,
}

/// One truck's share of a [`Scenario`]. An exception bucket (truck id
/// `"exception"`, zeroed envelope) carries the exact stranded remainder
/// rather than just a count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TruckBucket {
    pub truck_specs: TruckSpecs,
    pub items: Vec<UnitItem>,
    pub metrics: BucketMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placements: Option<Vec<Placement>>,
    /// Whether the optional 3D enrichment pass (`run_3d`) ran out of its
    /// wall-clock budget for this bucket; always `false` when `placements`
    /// is `None`.
    #[serde(default)]
    pub timed_out: bool,
}

impl TruckBucket {
    fn is_exception(&self) -> bool {
        self.truck_specs.id == EXCEPTION_TRUCK_ID
    }
}

/// One complete partitioning of the manifest across buckets, with cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub name: String,
    pub statistics: Statistics,
    pub buckets: Vec<TruckBucket>,
    pub total_cost: Option<f64>,
    pub recommended: bool,
}

fn exception_truck() -> TruckSpecs {
    TruckSpecs {
        id: EXCEPTION_TRUCK_ID.to_string(),
        name: "exceptional convoy / manual review required".to_string(),
        length: 0.0,
        width: 0.0,
        height: 0.0,
        max_weight: 0.0,
        base_cost: 0.0,
        cost_per_km: 0.0,
    }
}

/// Rotation-tolerant, height/weight-strict fit test for one unit against one
/// truck envelope.
fn can_fit(unit: &UnitItem, truck: &TruckSpecs) -> bool {
    let dim_ok = (unit.length <= truck.length && unit.width <= truck.width)
        || (unit.width <= truck.length && unit.length <= truck.width);
    dim_ok && unit.height <= truck.height && unit.weight <= truck.max_weight
}

/// A truck is compatible with the whole manifest iff its envelope admits the
/// single largest unit (rotation-tolerant in L/W, not in H) and its payload
/// admits the single heaviest unit.
pub fn filter_compatible_trucks(units: &[UnitItem], trucks: &[TruckSpecs]) -> Vec<TruckSpecs> {
    if units.is_empty() {
        return Vec::new();
    }
    let max_l = units.iter().map(|u| u.length).fold(0.0, f64::max);
    let max_w = units.iter().map(|u| u.width).fold(0.0, f64::max);
    let max_h = units.iter().map(|u| u.height).fold(0.0, f64::max);
    let max_weight = units.iter().map(|u| u.weight).fold(0.0, f64::max);

    trucks
        .iter()
        .filter(|t| {
            let dim_ok = (max_l <= t.length && max_w <= t.width) || (max_w <= t.length && max_l <= t.width);
            dim_ok && max_h <= t.height && max_weight <= t.max_weight
        })
        .cloned()
        .collect()
}

/// Allocates `units` into buckets using `truck_priority` to decide which
/// truck type to open next. Items are consumed greedily against the
/// current bucket's soft caps; a pass that makes no progress emits one final
/// exception bucket with the exact stranded remainder.
pub fn allocate(units: &[UnitItem], truck_priority: &[TruckSpecs]) -> Vec<TruckBucket> {
    let mut remaining: Vec<UnitItem> = units.to_vec();
    remaining.sort_by(|a, b| {
        b.volume_cm3()
            .partial_cmp(&a.volume_cm3())
            .unwrap()
            .then_with(|| b.weight.partial_cmp(&a.weight).unwrap())
    });

    let mut buckets = Vec::new();

    while !remaining.is_empty() {
        let mut placed_any = false;

        for spec in truck_priority {
            if !can_fit(&remaining[0], spec) {
                continue;
            }

            let vol_cap = spec.volume_m3() * VOLUME_SOFT_CAP;
            let weight_cap = spec.max_weight * WEIGHT_SOFT_CAP;
            let floor_cap = spec.floor_area_m2() * FLOOR_SOFT_CAP;

            let mut bucket_items = Vec::new();
            let mut vol_used = 0.0;
            let mut weight_used = 0.0;
            let mut floor_used = 0.0;
            let mut new_remaining = Vec::new();

            for unit in &remaining {
                if !can_fit(unit, spec) {
                    new_remaining.push(unit.clone());
                    continue;
                }

                let unit_vol = unit.volume_m3();
                let unit_floor = unit.floor_area_m2();

                if vol_used + unit_vol <= vol_cap
                    && weight_used + unit.weight <= weight_cap
                    && floor_used + unit_floor <= floor_cap
                {
                    bucket_items.push(unit.clone());
                    vol_used += unit_vol;
                    weight_used += unit.weight;
                    floor_used += unit_floor;
                    placed_any = true;
                } else {
                    new_remaining.push(unit.clone());
                }
            }

            if !bucket_items.is_empty() {
                let metrics = BucketMetrics {
                    weight_kg: weight_used,
                    volume_m3: vol_used,
                    floor_area_m2: floor_used,
                    fill_weight_pct: pct(weight_used, spec.max_weight),
                    fill_volume_pct: pct(vol_used, spec.volume_m3()),
                    fill_floor_pct: pct(floor_used, spec.floor_area_m2()),
                };
                buckets.push(TruckBucket {
                    truck_specs: spec.clone(),
                    items: bucket_items,
                    metrics,
                    placements: None,
                    timed_out: false,
                });
                remaining = new_remaining;
                break;
            }
        }

        if !placed_any {
            warn!(stranded = remaining.len(), "allocation pass made no progress, emitting exception bucket");
            buckets.push(TruckBucket {
                truck_specs: exception_truck(),
                items: std::mem::take(&mut remaining),
                metrics: BucketMetrics::default(),
                placements: None,
                timed_out: false,
            });
            break;
        }
    }

    buckets
}

fn pct(used: f64, capacity: f64) -> f64 {
    if capacity > 0.0 {
        (used / capacity) * 100.0
    } else {
        0.0
    }
}

fn scenario_cost(buckets: &[TruckBucket], distance_km: f64) -> Option<f64> {
    if buckets.iter().any(TruckBucket::is_exception) {
        return None;
    }
    Some(buckets.iter().map(|b| b.truck_specs.trip_cost(distance_km)).sum())
}

fn cost_per_volume(truck: &TruckSpecs, distance_km: f64) -> f64 {
    let cap = truck.volume_m3().max(1e-9);
    truck.trip_cost(distance_km) / cap
}

/// `"26" -> 1, "19" -> 2, "40" -> 3, "low"/"45" -> 4, "van" -> 5, else 9`:
/// a fixed class-rank heuristic over the truck id/name, used to build the
/// "balanced" scenario's truck-priority ordering.
fn class_rank(truck: &TruckSpecs) -> i32 {
    let haystack = format!("{} {}", truck.id, truck.name).to_lowercase();
    if haystack.contains("26") {
        1
    } else if haystack.contains("19") {
        2
    } else if haystack.contains("40") {
        3
    } else if haystack.contains("low") || haystack.contains("45") {
        4
    } else if haystack.contains("van") {
        5
    } else {
        9
    }
}

/// The three truck-priority orderings scenarios are built against: cheapest
/// cost-per-volume first, largest capacity first, and class-rank first.
/// Shared by both the sequential and `rayon`-parallel builders so the
/// orderings themselves never drift between the two call paths.
fn truck_priority_orderings(compatible: &[TruckSpecs], distance_km: f64) -> (Vec<TruckSpecs>, Vec<TruckSpecs>, Vec<TruckSpecs>) {
    let cost_sorted = compatible
        .iter()
        .cloned()
        .sorted_by(|a, b| cost_per_volume(a, distance_km).partial_cmp(&cost_per_volume(b, distance_km)).unwrap())
        .collect();

    let cap_sorted = compatible
        .iter()
        .cloned()
        .sorted_by(|a, b| {
            b.volume_m3()
                .partial_cmp(&a.volume_m3())
                .unwrap()
                .then_with(|| b.max_weight.partial_cmp(&a.max_weight).unwrap())
        })
        .collect();

    let balanced_sorted = compatible
        .iter()
        .cloned()
        .sorted_by(|a, b| {
            class_rank(a)
                .cmp(&class_rank(b))
                .then_with(|| b.volume_m3().partial_cmp(&a.volume_m3()).unwrap())
        })
        .collect();

    (cost_sorted, cap_sorted, balanced_sorted)
}

/// Marks the cheapest scenario with a defined cost as recommended; a no-cost
/// catalog (every scenario stranded into an exception bucket) leaves none
/// marked.
fn mark_recommended(scenarios: &mut [Scenario]) {
    if let Some(best_idx) = scenarios
        .iter()
        .position_min_by(|a, b| {
            a.total_cost
                .map_or(f64::INFINITY, |c| c)
                .partial_cmp(&b.total_cost.map_or(f64::INFINITY, |c| c))
                .unwrap()
        })
        .filter(|&i| scenarios[i].total_cost.is_some())
    {
        scenarios[best_idx].recommended = true;
    }
}

fn build_scenario(
    id: &str,
    name: &str,
    units: &[UnitItem],
    truck_priority: &[TruckSpecs],
    distance_km: f64,
    stats: &Statistics,
) -> Scenario {
    let buckets = allocate(units, truck_priority);
    let total_cost = scenario_cost(&buckets, distance_km);
    Scenario {
        id: id.to_string(),
        name: name.to_string(),
        statistics: stats.clone(),
        buckets,
        total_cost,
        recommended: false,
    }
}

/// Generates the cost-optimal, min-trucks, and balanced scenarios and marks
/// the cheapest (among those with a defined cost) as recommended.
/// When the catalog has no compatible truck at all, returns a single
/// exception scenario listing the full unserved manifest.
pub fn suggest_fleet(
    items: &[Item],
    trucks: &[TruckSpecs],
    distance_km: f64,
    config: &OptimizerConfig,
    run_3d: bool,
) -> Vec<Scenario> {
    let units = expand_items(items);
    let stats = calculate_statistics(&units);

    let compatible = filter_compatible_trucks(&units, trucks);
    if compatible.is_empty() {
        warn!("no truck in catalog is compatible with this manifest");
        let exception_bucket = TruckBucket {
            truck_specs: exception_truck(),
            items: units,
            metrics: BucketMetrics::default(),
            placements: None,
            timed_out: false,
        };
        return vec![Scenario {
            id: "no_solution".to_string(),
            name: "no compatible truck".to_string(),
            statistics: stats,
            buckets: vec![exception_bucket],
            total_cost: None,
            recommended: false,
        }];
    }

    let (cost_sorted, cap_sorted, balanced_sorted) = truck_priority_orderings(&compatible, distance_km);

    let mut scenarios = vec![
        build_scenario("cost_opt", "cost optimization", &units, &cost_sorted, distance_km, &stats),
        build_scenario("min_trucks", "minimum truck count", &units, &cap_sorted, distance_km, &stats),
        build_scenario("balanced", "balanced", &units, &balanced_sorted, distance_km, &stats),
    ];
    mark_recommended(&mut scenarios);

    if run_3d {
        for scenario in &mut scenarios {
            for bucket in &mut scenario.buckets {
                if bucket.is_exception() {
                    continue;
                }
                let (placements, timed_out) = crate::optimize_units(&bucket.items, &bucket.truck_specs, config);
                bucket.placements = Some(placements);
                bucket.timed_out = timed_out;
            }
        }
    }

    info!(scenario_count = scenarios.len(), "fleet scenarios generated");
    scenarios
}

/// Runs the three scenario builders concurrently since they are independent
/// pure computations over the same read-only inputs.
pub fn suggest_fleet_parallel(
    items: &[Item],
    trucks: &[TruckSpecs],
    distance_km: f64,
    config: &OptimizerConfig,
    run_3d: bool,
) -> Vec<Scenario> {
    let units = expand_items(items);
    let stats = calculate_statistics(&units);

    let compatible = filter_compatible_trucks(&units, trucks);
    if compatible.is_empty() {
        return suggest_fleet(items, trucks, distance_km, config, run_3d);
    }

    let (cost_sorted, cap_sorted, balanced_sorted) = truck_priority_orderings(&compatible, distance_km);

    let (s1, (s2, s3)) = rayon::join(
        || build_scenario("cost_opt", "cost optimization", &units, &cost_sorted, distance_km, &stats),
        || {
            rayon::join(
                || build_scenario("min_trucks", "minimum truck count", &units, &cap_sorted, distance_km, &stats),
                || build_scenario("balanced", "balanced", &units, &balanced_sorted, distance_km, &stats),
            )
        },
    );

    let mut scenarios = vec![s1, s2, s3];
    mark_recommended(&mut scenarios);

    if run_3d {
        for scenario in &mut scenarios {
            for bucket in &mut scenario.buckets {
                if bucket.is_exception() {
                    continue;
                }
                let (placements, timed_out) = crate::optimize_units(&bucket.items, &bucket.truck_specs, config);
                bucket.placements = Some(placements);
                bucket.timed_out = timed_out;
            }
        }
    }

    scenarios
}

#[cfg(test)]
mod tests {
    use super::*;

    fn truck(id: &str, length: f64, width: f64, height: f64, max_weight: f64, base: f64, per_km: f64) -> TruckSpecs {
        TruckSpecs {
            id: id.to_string(),
            name: id.to_string(),
            length,
            width,
            height,
            max_weight,
            base_cost: base,
            cost_per_km: per_km,
        }
    }

    fn item(reference: &str, l: f64, w: f64, h: f64, weight: f64, qty: u32) -> Item {
        Item {
            length: l,
            width: w,
            height: h,
            weight,
            quantity: qty,
            reference: reference.to_string(),
            description: String::new(),
            fragile: false,
            stackable: true,
        }
    }

    #[test]
    fn no_compatible_truck_yields_single_exception_scenario() {
        let items = vec![item("OVERSIZE", 5000.0, 5000.0, 5000.0, 1.0, 1)];
        let trucks = vec![truck("t", 1000.0, 200.0, 200.0, 10000.0, 0.0, 0.0)];
        let scenarios = suggest_fleet(&items, &trucks, 0.0, &OptimizerConfig::default(), false);
        assert_eq!(scenarios.len(), 1);
        assert_eq!(scenarios[0].id, "no_solution");
        assert_eq!(scenarios[0].buckets[0].items.len(), 1);
    }

    #[test]
    fn min_trucks_prefers_single_larger_truck() {
        // 60 units of 1m3/416.67kg each: 60m3 / 25000kg total.
        // Catalog A: 35m3/15000kg soft cap, B: 90m3/26000kg soft cap.
        let items = vec![item("CARGO", 100.0, 100.0, 100.0, 416.6667, 60)];
        let trucks = vec![
            truck("A", 700.0, 248.0, 200.0, 15000.0, 100.0, 1.0),
            truck("B", 1360.0, 248.0, 270.0, 26000.0, 500.0, 1.0),
        ];
        let scenarios = suggest_fleet(&items, &trucks, 0.0, &OptimizerConfig::default(), false);
        let min_trucks = scenarios.iter().find(|s| s.id == "min_trucks").unwrap();
        let truck_count = min_trucks.buckets.iter().filter(|b| !b.is_exception()).count();
        assert!(truck_count <= 2);
    }

    #[test]
    fn recommended_scenario_has_lowest_defined_cost() {
        let items = vec![item("CARGO", 100.0, 100.0, 100.0, 50.0, 20)];
        let trucks = vec![
            truck("A", 1000.0, 248.0, 200.0, 15000.0, 100.0, 1.0),
            truck("B", 1360.0, 248.0, 270.0, 26000.0, 500.0, 1.0),
        ];
        let scenarios = suggest_fleet(&items, &trucks, 10.0, &OptimizerConfig::default(), false);
        let recommended = scenarios.iter().find(|s| s.recommended).unwrap();
        let min_cost = scenarios.iter().filter_map(|s| s.total_cost).fold(f64::MAX, f64::min);
        assert_eq!(recommended.total_cost.unwrap(), min_cost);
    }

    #[test]
    fn class_rank_orders_26_before_19_before_40() {
        assert!(class_rank(&truck("truck_26t", 1.0, 1.0, 1.0, 1.0, 0.0, 0.0)) < class_rank(&truck("truck_19t", 1.0, 1.0, 1.0, 1.0, 0.0, 0.0)));
        assert!(class_rank(&truck("truck_19t", 1.0, 1.0, 1.0, 1.0, 0.0, 0.0)) < class_rank(&truck("truck_40t", 1.0, 1.0, 1.0, 1.0, 0.0, 0.0)));
    }
}
