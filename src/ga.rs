//! Genetic search over item orderings. The search variable is the order
//! items are fed to [`crate::placer::place`]; geometry is fully determined
//! by an order, so the GA never touches geometry directly. RNG is seeded
//! from `config.rng_seed` so repeated calls over identical inputs are
//! byte-identical.

use std::time::Instant;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};

use crate::config::OptimizerConfig;
use crate::manifest::{Placement, TruckSpecs, UnitItem};
use crate::placer::place;

/// Probability an item placed by parent 1 is pulled into the child's head.
const HEAD_FROM_PARENT1: f64 = 0.6;
/// Probability an item placed (only) by parent 2 is pulled into the head.
const HEAD_FROM_PARENT2: f64 = 0.3;
const TOURNAMENT_SIZE: usize = 3;

/// `placed_count` dominates by nine orders of magnitude, then weight, then
/// raw volume: lexicographic weighting so more-placed always beats
/// more-compact.
fn fitness(placements: &[Placement]) -> f64 {
    let placed = placements.len() as f64;
    let weight: f64 = placements.iter().map(|p| p.weight).sum();
    let volume: f64 = placements.iter().map(|p| p.volume_cm3()).sum();
    placed * 1e9 + weight * 1e3 + volume
}

fn seed_order(units: &[UnitItem]) -> Vec<UnitItem> {
    let mut order = units.to_vec();
    order.sort_by(|a, b| {
        b.volume_cm3()
            .partial_cmp(&a.volume_cm3())
            .unwrap()
            .then_with(|| b.weight.partial_cmp(&a.weight).unwrap())
    });
    order
}

fn tournament<'a>(
    population: &'a [(Vec<UnitItem>, Vec<Placement>)],
    rng: &mut ChaCha8Rng,
) -> &'a (Vec<UnitItem>, Vec<Placement>) {
    let k = TOURNAMENT_SIZE.min(population.len());
    let mut best: Option<&(Vec<UnitItem>, Vec<Placement>)> = None;
    for _ in 0..k {
        let idx = rng.gen_range(0..population.len());
        let candidate = &population[idx];
        if best.map(|b| fitness(&candidate.1) > fitness(&b.1)).unwrap_or(true) {
            best = Some(candidate);
        }
    }
    best.unwrap()
}

/// Order crossover: each item placed by parent 1 joins the child's
/// "head" with probability [`HEAD_FROM_PARENT1`]; failing that, each item
/// placed by parent 2 joins with probability [`HEAD_FROM_PARENT2`]. The
/// child order is `[head, in original order] ++ [remainder, in original
/// order]`.
fn crossover(
    original_order: &[UnitItem],
    parent1: &[Placement],
    parent2: &[Placement],
    rng: &mut ChaCha8Rng,
) -> Vec<UnitItem> {
    let placed1: std::collections::HashSet<&str> = parent1.iter().map(|p| p.item_id.as_str()).collect();
    let placed2: std::collections::HashSet<&str> = parent2.iter().map(|p| p.item_id.as_str()).collect();

    let mut head: Vec<UnitItem> = Vec::new();
    let mut tail: Vec<UnitItem> = Vec::new();

    for unit in original_order {
        let take = if placed1.contains(unit.id.as_str()) {
            rng.gen::<f64>() < HEAD_FROM_PARENT1
        } else if placed2.contains(unit.id.as_str()) {
            rng.gen::<f64>() < HEAD_FROM_PARENT2
        } else {
            false
        };
        if take {
            head.push(unit.clone());
        } else {
            tail.push(unit.clone());
        }
    }

    head.extend(tail);
    head
}

/// The best placement set found across all generations, plus whether the
/// wall-clock budget was exhausted before `config.generations` completed.
/// A timeout is surfaced here, in-result, never as an error.
pub struct GaOutcome {
    pub placements: Vec<Placement>,
    pub timed_out: bool,
}

/// Runs the seeded genetic search over unit item orderings and returns the
/// best placement set found across all generations. Generations stop early
/// once `config.timeout_seconds` of wall-clock elapses; the check only
/// happens between generations, never mid-[`place`] call.
pub fn optimize(units: &[UnitItem], truck: &TruckSpecs, config: &OptimizerConfig) -> GaOutcome {
    let start = Instant::now();
    let timeout = std::time::Duration::from_secs(config.timeout_seconds);
    let mut rng = ChaCha8Rng::seed_from_u64(config.rng_seed);

    let pop_size = config.population_size.max(1) as usize;

    let seed = seed_order(units);
    let seed_placements = place(&seed, truck, config);

    let mut population: Vec<(Vec<UnitItem>, Vec<Placement>)> = Vec::with_capacity(pop_size);
    population.push((seed, seed_placements));

    for _ in 1..pop_size {
        let mut order = units.to_vec();
        order.shuffle(&mut rng);
        let placements = place(&order, truck, config);
        population.push((order, placements));
    }

    let mut best = population
        .iter()
        .max_by(|a, b| fitness(&a.1).partial_cmp(&fitness(&b.1)).unwrap())
        .cloned()
        .expect("population is non-empty");

    info!(
        generations = config.generations,
        population_size = pop_size,
        seed_fitness = fitness(&best.1),
        "genetic search starting"
    );

    let mut timed_out = false;
    for generation in 0..config.generations {
        if start.elapsed() > timeout {
            debug!(generation, "genetic search timed out, returning best so far");
            timed_out = true;
            break;
        }

        population.sort_by(|a, b| fitness(&b.1).partial_cmp(&fitness(&a.1)).unwrap());

        let elite_count = ((config.elitism_rate * population.len() as f64).ceil() as usize)
            .max(1)
            .min(population.len());
        let mut next_population: Vec<(Vec<UnitItem>, Vec<Placement>)> =
            population[..elite_count].to_vec();

        while next_population.len() < pop_size {
            let parent1 = tournament(&population, &mut rng);
            let parent2 = tournament(&population, &mut rng);
            let mut child_order = crossover(units, &parent1.1, &parent2.1, &mut rng);

            if rng.gen::<f64>() < config.mutation_rate {
                child_order.shuffle(&mut rng);
            }

            let child_placements = place(&child_order, truck, config);
            next_population.push((child_order, child_placements));
        }

        population = next_population;

        let generation_best = population
            .iter()
            .max_by(|a, b| fitness(&a.1).partial_cmp(&fitness(&b.1)).unwrap())
            .unwrap();
        trace!(generation, fitness = fitness(&generation_best.1), "generation complete");
        if fitness(&generation_best.1) > fitness(&best.1) {
            best = generation_best.clone();
        }
    }

    info!(best_fitness = fitness(&best.1), placed = best.1.len(), timed_out, "genetic search complete");
    GaOutcome { placements: best.1, timed_out }
}
