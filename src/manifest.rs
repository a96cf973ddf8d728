//! The item, truck, and placement value types, plus the manifest-wide
//! [`Statistics`] summary the fleet partitioner and result assembler both
//! read.

use serde::{Deserialize, Serialize};

use crate::error::PlannerError;

/// A threshold used only to flag "oversized" units in [`Statistics`]: the
/// flatbed envelope (length x width x height, cm) the tariff data was built
/// around. Not a hard limit, purely informational.
const OVERSIZE_LENGTH_CM: f64 = 1200.0;
const OVERSIZE_WIDTH_CM: f64 = 248.0;
const OVERSIZE_HEIGHT_CM: f64 = 260.0;

/// Floor area discount applied to stackable units when the fleet
/// partitioner totals up floor-area consumption. Stackable cargo competes
/// less for floor space than cargo that must stay on its own footprint;
/// this factor is a tuned heuristic, not a derived constant.
pub const STACKABLE_FLOOR_DISCOUNT: f64 = 0.35;

/// One line of the input manifest, possibly representing more than one
/// physical unit (`quantity > 1`). Dimensions are centimeters, weight is
/// kilograms; both must already be normalized by the caller, see
/// [`crate::normalize`] for the heuristic an upstream ingestion layer would
/// use to get there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fragile: bool,
    #[serde(default = "default_stackable")]
    pub stackable: bool,
}

fn default_quantity() -> u32 {
    1
}

fn default_stackable() -> bool {
    true
}

impl Item {
    /// Rejects items with non-finite or non-positive dimensions, or
    /// negative weight.
    pub fn validate(&self) -> Result<(), PlannerError> {
        let dims = [
            ("length", self.length),
            ("width", self.width),
            ("height", self.height),
        ];
        for (name, v) in dims {
            if !v.is_finite() || v <= 0.0 {
                return Err(PlannerError::InvalidInput {
                    reason: format!("item {:?}: {name} must be a positive finite number, got {v}", self.reference),
                });
            }
        }
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(PlannerError::InvalidInput {
                reason: format!("item {:?}: weight must be a non-negative finite number, got {}", self.reference, self.weight),
            });
        }
        Ok(())
    }

    pub fn volume_cm3(&self) -> f64 {
        self.length * self.width * self.height
    }

    pub fn volume_m3(&self) -> f64 {
        self.volume_cm3() / 1_000_000.0
    }

    pub fn footprint_cm2(&self) -> f64 {
        self.length * self.width
    }

    pub fn footprint_m2(&self) -> f64 {
        self.footprint_cm2() / 10_000.0
    }

    /// The floor area this unit consumes in the fleet partitioner's soft
    /// floor-area cap: full footprint for items that can't be stacked on,
    /// a discounted footprint for items that can.
    pub fn floor_area_m2(&self) -> f64 {
        if self.stackable {
            self.footprint_m2() * STACKABLE_FLOOR_DISCOUNT
        } else {
            self.footprint_m2()
        }
    }

    /// `(L, W, H)` orientations permitted on the horizontal plane. Height
    /// never rotates into the base: flatbed cargo is never tipped onto an
    /// end or side. Collapses to a single orientation when `L == W` (within
    /// 1e-9) so the placer never tries two rotations that are geometrically
    /// identical.
    pub fn rotations(&self, allow_rotation: bool) -> Vec<(f64, f64, f64)> {
        let (l, w, h) = (self.length, self.width, self.height);
        if !allow_rotation || (l - w).abs() < 1e-9 {
            vec![(l, w, h)]
        } else {
            vec![(l, w, h), (w, l, h)]
        }
    }
}

/// A single physical unit produced by expanding an [`Item`]'s `quantity`.
/// Carries a stable, deterministic identifier derived from the item's
/// reference (Design Note: `"<reference>__<k>"`, dedupe-on-conflict).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitItem {
    pub id: String,
    pub reference: String,
    pub description: String,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
    pub fragile: bool,
    pub stackable: bool,
}

impl UnitItem {
    pub fn volume_cm3(&self) -> f64 {
        self.length * self.width * self.height
    }

    pub fn volume_m3(&self) -> f64 {
        self.volume_cm3() / 1_000_000.0
    }

    pub fn footprint_cm2(&self) -> f64 {
        self.length * self.width
    }

    pub fn footprint_m2(&self) -> f64 {
        self.footprint_cm2() / 10_000.0
    }

    pub fn floor_area_m2(&self) -> f64 {
        if self.stackable {
            self.footprint_m2() * STACKABLE_FLOOR_DISCOUNT
        } else {
            self.footprint_m2()
        }
    }

    pub fn rotations(&self, allow_rotation: bool) -> Vec<(f64, f64, f64)> {
        let (l, w, h) = (self.length, self.width, self.height);
        if !allow_rotation || (l - w).abs() < 1e-9 {
            vec![(l, w, h)]
        } else {
            vec![(l, w, h), (w, l, h)]
        }
    }
}

/// Expands a manifest into unit items, assigning each a stable id of the
/// form `"<reference>__<k>"`. Falls back to `"ITEM"` when a line carries no
/// reference, and breaks ties with a numeric suffix if two lines happen to
/// collide on the same generated id (Design Note: quantity expansion).
pub fn expand_items(items: &[Item]) -> Vec<UnitItem> {
    let mut units = Vec::new();
    let mut seen_ids = std::collections::HashSet::new();

    for item in items {
        let reference = if item.reference.is_empty() {
            "ITEM".to_string()
        } else {
            item.reference.clone()
        };
        let qty = item.quantity.max(1);

        for k in 0..qty {
            let mut uid = format!("{reference}__{}", k + 1);
            while seen_ids.contains(&uid) {
                uid = format!("{reference}__{}_{}", k + 1, seen_ids.len());
            }
            seen_ids.insert(uid.clone());

            units.push(UnitItem {
                id: uid,
                reference: reference.clone(),
                description: item.description.clone(),
                length: item.length,
                width: item.width,
                height: item.height,
                weight: item.weight,
                fragile: item.fragile,
                stackable: item.stackable,
            });
        }
    }

    units
}

/// A truck's interior envelope, payload cap, and optional per-trip cost
/// model. Lengths in cm, weight in kg, costs in a caller-specified scalar
/// currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TruckSpecs {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub max_weight: f64,
    #[serde(default)]
    pub base_cost: f64,
    #[serde(default)]
    pub cost_per_km: f64,
}

impl TruckSpecs {
    pub fn validate(&self) -> Result<(), PlannerError> {
        let dims = [
            ("length", self.length),
            ("width", self.width),
            ("height", self.height),
        ];
        for (name, v) in dims {
            if !v.is_finite() || v <= 0.0 {
                return Err(PlannerError::InvalidInput {
                    reason: format!("truck {:?}: {name} must be a positive finite number, got {v}", self.id),
                });
            }
        }
        if !self.max_weight.is_finite() || self.max_weight < 0.0 {
            return Err(PlannerError::InvalidInput {
                reason: format!("truck {:?}: max_weight must be non-negative and finite", self.id),
            });
        }
        Ok(())
    }

    pub fn volume_cm3(&self) -> f64 {
        self.length * self.width * self.height
    }

    pub fn volume_m3(&self) -> f64 {
        self.volume_cm3() / 1_000_000.0
    }

    pub fn floor_area_m2(&self) -> f64 {
        (self.length * self.width) / 10_000.0
    }

    pub fn trip_cost(&self, distance_km: f64) -> f64 {
        self.base_cost + self.cost_per_km * distance_km
    }
}

/// Where a single unit item ended up inside a truck. Origin `(x, y, z)` and
/// post-rotation extent `(length, width, height)` are all in centimeters;
/// `x` runs along truck length, `y` along width, `z` upward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Placement {
    pub item_id: String,
    pub reference: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
    pub stackable: bool,
}

impl Placement {
    pub fn volume_cm3(&self) -> f64 {
        self.length * self.width * self.height
    }

    pub fn top(&self) -> f64 {
        self.z + self.height
    }
}

/// Manifest-wide summary computed once per `suggest_fleet` call and
/// attached to every scenario.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Statistics {
    pub total_items: usize,
    pub total_weight: f64,
    pub total_volume_m3: f64,
    pub total_floor_area_m2: f64,
    pub max_length_cm: f64,
    pub max_width_cm: f64,
    pub max_height_cm: f64,
    pub max_weight_item: f64,
    pub non_stackable_items: usize,
    pub oversized_items: usize,
}

pub fn calculate_statistics(units: &[UnitItem]) -> Statistics {
    if units.is_empty() {
        return Statistics::default();
    }

    let total_weight = units.iter().map(|u| u.weight).sum();
    let total_volume_m3 = units.iter().map(|u| u.volume_m3()).sum();
    let total_floor_area_m2 = units.iter().map(|u| u.floor_area_m2()).sum();

    let max_length_cm = units.iter().map(|u| u.length).fold(0.0, f64::max);
    let max_width_cm = units.iter().map(|u| u.width).fold(0.0, f64::max);
    let max_height_cm = units.iter().map(|u| u.height).fold(0.0, f64::max);
    let max_weight_item = units.iter().map(|u| u.weight).fold(0.0, f64::max);

    let non_stackable_items = units.iter().filter(|u| !u.stackable).count();
    let oversized_items = units
        .iter()
        .filter(|u| {
            u.length > OVERSIZE_LENGTH_CM || u.width > OVERSIZE_WIDTH_CM || u.height > OVERSIZE_HEIGHT_CM
        })
        .count();

    Statistics {
        total_items: units.len(),
        total_weight,
        total_volume_m3,
        total_floor_area_m2,
        max_length_cm,
        max_width_cm,
        max_height_cm,
        max_weight_item,
        non_stackable_items,
        oversized_items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(reference: &str, qty: u32) -> Item {
        Item {
            length: 100.0,
            width: 80.0,
            height: 50.0,
            weight: 40.0,
            quantity: qty,
            reference: reference.to_string(),
            description: String::new(),
            fragile: false,
            stackable: true,
        }
    }

    #[test]
    fn expand_items_assigns_deterministic_ids() {
        let units = expand_items(&[item("PALLET-A", 3)]);
        let ids: Vec<_> = units.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["PALLET-A__1", "PALLET-A__2", "PALLET-A__3"]);
    }

    #[test]
    fn expand_items_dedupes_colliding_references() {
        let units = expand_items(&[item("X", 1), item("X", 1)]);
        assert_eq!(units.len(), 2);
        assert_ne!(units[0].id, units[1].id);
    }

    #[test]
    fn validate_rejects_non_positive_dimension() {
        let mut it = item("A", 1);
        it.length = 0.0;
        assert!(it.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_finite_weight() {
        let mut it = item("A", 1);
        it.weight = f64::NAN;
        assert!(it.validate().is_err());
    }

    #[test]
    fn rotations_collapse_when_square_footprint() {
        let mut it = item("A", 1);
        it.length = 100.0;
        it.width = 100.0;
        assert_eq!(it.rotations(true).len(), 1);
    }

    #[test]
    fn statistics_discount_stackable_floor_area() {
        let mut a = item("A", 1);
        a.stackable = true;
        let mut b = item("B", 1);
        b.stackable = false;
        let units = expand_items(&[a, b]);
        let stats = calculate_statistics(&units);
        let full_floor = units[0].footprint_m2() + units[1].footprint_m2();
        assert!(stats.total_floor_area_m2 < full_floor);
    }
}
