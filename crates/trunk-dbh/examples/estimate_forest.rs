use std::{env, path::PathBuf, time::Instant};

use trunk_dbh::{estimate_forest, ForestConfig, ForestInput};

#[cfg(not(feature = "tracing"))]
use trunk_dbh::core::init_with_level;
#[cfg(feature = "tracing")]
use trunk_dbh::core::init_tracing;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing")]
    init_tracing(false);
    #[cfg(not(feature = "tracing"))]
    init_with_level(log::LevelFilter::Info)?;

    let config_path = parse_config_path();
    let cfg = ForestConfig::load_json(&config_path)?;
    let t_total = Instant::now();

    let input = ForestInput::load_json(&cfg.input_path)?;
    let trees = input.trees();
    println!(
        "loaded {} points in {} trees from {}",
        input.points.len(),
        trees.len(),
        cfg.input_path
    );

    let report = estimate_forest(&trees, &cfg.build_params(), None)?;
    for row in &report.rows {
        println!(
            "tree {:>5}  x={:.2} y={:.2}  dbh={:.3}  ba={:.4}",
            row.tree_id, row.x, row.y, row.dbh, row.basal_area
        );
    }

    let output_path = cfg.output_path();
    report.write_json(&output_path)?;
    println!(
        "wrote report JSON to {} ({} ms)",
        output_path.display(),
        t_total.elapsed().as_millis()
    );

    Ok(())
}

fn parse_config_path() -> PathBuf {
    env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("testdata/forest_config.json"))
}
