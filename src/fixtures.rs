//! Deterministic manifest/catalog generators for tests and demos.
//!
//! Not part of the core's public contract: lives alongside it so property
//! tests and the demo binary (`src/bin/cargospan.rs`) can build varied,
//! reproducible inputs without hand-writing dozens of literal `Item`s.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::manifest::{Item, TruckSpecs};

/// A small, representative truck catalog: dimensions in cm, weight in kg,
/// cost in a caller-specified scalar currency.
pub fn truck_catalog() -> Vec<TruckSpecs> {
    vec![
        TruckSpecs {
            id: "van_3t".into(),
            name: "box van, 3T".into(),
            length: 300.0,
            width: 180.0,
            height: 180.0,
            max_weight: 3000.0,
            base_cost: 450.0,
            cost_per_km: 3.5,
        },
        TruckSpecs {
            id: "truck_19t".into(),
            name: "rigid flatbed, 19T, 12m".into(),
            length: 1200.0,
            width: 248.0,
            height: 260.0,
            max_weight: 19000.0,
            base_cost: 1500.0,
            cost_per_km: 6.5,
        },
        TruckSpecs {
            id: "truck_26t".into(),
            name: "semi flatbed, 26T, 13.6m".into(),
            length: 1360.0,
            width: 248.0,
            height: 260.0,
            max_weight: 26000.0,
            base_cost: 2200.0,
            cost_per_km: 8.0,
        },
        TruckSpecs {
            id: "truck_40t".into(),
            name: "semi flatbed, 40T, 13.6m".into(),
            length: 1360.0,
            width: 248.0,
            height: 260.0,
            max_weight: 40000.0,
            base_cost: 3000.0,
            cost_per_km: 9.5,
        },
        TruckSpecs {
            id: "lowbed_45t".into(),
            name: "lowbed, 45T".into(),
            length: 1100.0,
            width: 300.0,
            height: 350.0,
            max_weight: 45000.0,
            base_cost: 3500.0,
            cost_per_km: 12.0,
        },
    ]
}

/// A single flatbed truck, 1000x200x200cm with a 10000kg payload cap.
pub fn flatbed_1000x200x200() -> TruckSpecs {
    TruckSpecs {
        id: "s1".into(),
        name: "test flatbed".into(),
        length: 1000.0,
        width: 200.0,
        height: 200.0,
        max_weight: 10000.0,
        base_cost: 0.0,
        cost_per_km: 0.0,
    }
}

/// Generates `count` random cargo items with a seeded RNG so a given
/// `(seed, count)` pair always produces byte-identical output. Dimensions
/// and weights are drawn from ranges representative of palletized project
/// cargo; roughly 10% of items are marked non-stackable.
pub fn random_manifest(seed: u64, count: usize) -> Vec<Item> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut items = Vec::with_capacity(count);

    for i in 0..count {
        let length = rng.gen_range(40.0..220.0_f64);
        let width = rng.gen_range(40.0..160.0_f64);
        let height = rng.gen_range(30.0..180.0_f64);
        let weight = rng.gen_range(20.0..900.0_f64);
        let quantity = rng.gen_range(1..=6_u32);
        let stackable = rng.gen_range(0..10) != 0;
        let fragile = rng.gen_range(0..10) == 0;

        items.push(Item {
            length,
            width,
            height,
            weight,
            quantity,
            reference: format!("ITEM-{i:03}"),
            description: String::new(),
            fragile,
            stackable,
        });
    }

    items
}
