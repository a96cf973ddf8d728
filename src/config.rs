//! Explicit, serializable configuration for the placer and the genetic
//! search. Nothing here is global state: these are values passed into
//! `optimize`/`suggest_fleet` by the caller, with sensible defaults.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// `"simple"` runs the constructive placer once over the volume-sorted
/// manifest; `"genetic"` wraps it in the seeded genetic search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Simple,
    Genetic,
}

impl Algorithm {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "simple" => Some(Algorithm::Simple),
            "genetic" => Some(Algorithm::Genetic),
            _ => None,
        }
    }

    /// Same as [`Self::parse`] but rejects with [`crate::error::PlannerError::UnknownAlgorithm`]
    /// instead of returning `None`. Use this at an ingestion boundary that
    /// only has a raw `algorithm` string and needs an unrecognized value to
    /// be a hard failure rather than a silent fallback.
    pub fn parse_or_reject(s: &str) -> crate::error::Result<Self> {
        Self::parse(s).ok_or_else(|| crate::error::PlannerError::UnknownAlgorithm(s.to_string()))
    }
}

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::Genetic
    }
}

const POPULATION_SIZE_RANGE: (u32, u32) = (10, 100);
const GENERATIONS_RANGE: (u32, u32) = (10, 200);
const MUTATION_RATE_RANGE: (f64, f64) = (0.01, 0.5);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub algorithm: Algorithm,

    pub population_size: u32,
    pub generations: u32,
    pub mutation_rate: f64,
    pub crossover_rate: f64,
    pub elitism_rate: f64,
    pub timeout_seconds: u64,

    pub grid_step_cm: u32,
    pub allow_rotation: bool,
    pub min_support_ratio: f64,
    pub clearance_cm: f64,
    pub max_height_ratio: f64,

    /// Seeds the genetic search's RNG so repeated calls with identical
    /// inputs are byte-identical.
    pub rng_seed: u64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Genetic,
            population_size: 30,
            generations: 50,
            mutation_rate: 0.1,
            crossover_rate: 0.8,
            elitism_rate: 0.1,
            timeout_seconds: 300,
            grid_step_cm: 5,
            allow_rotation: true,
            min_support_ratio: 0.7,
            clearance_cm: 0.0,
            max_height_ratio: 1.0,
            rng_seed: 0,
        }
    }
}

impl OptimizerConfig {
    /// Clamps out-of-bound numeric settings to their nearest valid bound,
    /// logging each clamp. Config misuse is soft, so this is the
    /// caller-visible record of what got adjusted.
    pub fn clamped(mut self) -> Self {
        self.population_size = clamp_u32_logged(
            "population_size",
            self.population_size,
            POPULATION_SIZE_RANGE.0,
            POPULATION_SIZE_RANGE.1,
        );
        self.generations = clamp_u32_logged(
            "generations",
            self.generations,
            GENERATIONS_RANGE.0,
            GENERATIONS_RANGE.1,
        );
        self.mutation_rate = clamp_f64_logged(
            "mutation_rate",
            self.mutation_rate,
            MUTATION_RATE_RANGE.0,
            MUTATION_RATE_RANGE.1,
        );
        self
    }
}

fn clamp_u32_logged(name: &str, value: u32, lo: u32, hi: u32) -> u32 {
    let clamped = value.clamp(lo, hi);
    if clamped != value {
        warn!("{name}={value} out of range [{lo}, {hi}], clamped to {clamped}");
    }
    clamped
}

fn clamp_f64_logged(name: &str, value: f64, lo: f64, hi: f64) -> f64 {
    let clamped = value.clamp(lo, hi);
    if clamped != value {
        warn!("{name}={value} out of range [{lo}, {hi}], clamped to {clamped}");
    }
    clamped
}
