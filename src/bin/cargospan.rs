//! Demo CLI: exercises `optimize`/`suggest_fleet` against a synthetic
//! manifest and prints a colorized summary. Ambient plumbing around the
//! core, not part of it.

use std::error::Error;

use cargospan::{fixtures, optimize, suggest_fleet, Algorithm, OptimizerConfig};
use colored::*;
use csv::Writer;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().compact())
        .init();

    let algorithm = match std::env::args().nth(1) {
        Some(raw) => Algorithm::parse_or_reject(&raw)?,
        None => Algorithm::default(),
    };

    let manifest = fixtures::random_manifest(2024, 80);
    let truck = fixtures::truck_catalog().into_iter().find(|t| t.id == "truck_26t").unwrap();

    info!("Running single-truck optimize against {} manifest lines", manifest.len());
    let mut config = OptimizerConfig::default();
    config.algorithm = algorithm;
    config.rng_seed = 2024;
    config.generations = 40;

    let result = optimize(&manifest, &truck, &config)?;

    println!(
        "{}",
        format!(
            "{}: {}/{} items placed",
            truck.name, result.items_placed, result.items_total
        )
        .bold()
    );

    if result.items_placed < result.items_total {
        println!(
            "{}",
            format!("{} items could not be placed", result.items_total - result.items_placed).yellow()
        );
    } else {
        println!("{}", "every item placed".green());
    }

    println!(
        "weight efficiency: {:.2}%  volume efficiency: {:.2}%",
        result.weight_efficiency_pct, result.volume_efficiency_pct
    );

    write_placements_csv(&result.placements, "placements.csv")?;
    println!("wrote placements.csv");

    write_result_json(&result, "result.json")?;
    println!("wrote result.json");

    println!();
    println!("{}", "Fleet scenarios:".bold());
    let catalog = fixtures::truck_catalog();
    let mut fleet_config = OptimizerConfig::default();
    fleet_config.algorithm = Algorithm::Simple;
    let scenarios = suggest_fleet(&manifest, &catalog, 350.0, &fleet_config, false)?;

    for scenario in &scenarios {
        let cost = scenario
            .total_cost
            .map(|c| format!("{c:.2}"))
            .unwrap_or_else(|| "n/a".to_string());
        let marker = if scenario.recommended { " (recommended)".green() } else { "".normal() };
        println!(
            "  {} — {} buckets, cost {}{}",
            scenario.name.cyan(),
            scenario.buckets.len(),
            cost,
            marker
        );
        for bucket in &scenario.buckets {
            println!(
                "    {}: {} items, fill weight {:.1}% volume {:.1}% floor {:.1}%",
                bucket.truck_specs.name,
                bucket.items.len(),
                bucket.metrics.fill_weight_pct,
                bucket.metrics.fill_volume_pct,
                bucket.metrics.fill_floor_pct
            );
        }
    }

    write_scenarios_json(&scenarios, "scenarios.json")?;
    println!("wrote scenarios.json");

    Ok(())
}

fn write_result_json(result: &cargospan::OptimizeResult, path: &str) -> Result<(), Box<dyn Error>> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, result)?;
    Ok(())
}

fn write_scenarios_json(scenarios: &[cargospan::Scenario], path: &str) -> Result<(), Box<dyn Error>> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, scenarios)?;
    Ok(())
}

fn write_placements_csv(placements: &[cargospan::Placement], path: &str) -> Result<(), Box<dyn Error>> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record(["item_id", "x", "y", "z", "length", "width", "height", "weight"])?;
    for p in placements {
        writer.write_record([
            p.item_id.clone(),
            p.x.to_string(),
            p.y.to_string(),
            p.z.to_string(),
            p.length.to_string(),
            p.width.to_string(),
            p.height.to_string(),
            p.weight.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
