//! Offline model training.
//!
//! Trains on a CSV dataset, or on generated listings with `--synthetic`, and
//! writes the model artifact.

use anyhow::{bail, Context};
use api::init_logging;
use clap::Parser;
use dataset::{load_csv, write_csv, CarFeatures, SyntheticGenerator};
use inference_engine::{ForestConfig, PredictorConfig, PricePredictor};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "train-model", version, about = "Train the car price model")]
struct Args {
    /// Training CSV (brand,model,year,mileage,fuel_type,transmission,engine_size,horsepower,price)
    #[arg(short, long, default_value = "car_data.csv")]
    data: PathBuf,

    /// Generate this many synthetic listings instead of reading --data
    #[arg(long)]
    synthetic: Option<usize>,

    /// Also write the generated listings to --data
    #[arg(long, requires = "synthetic")]
    write_data: bool,

    /// Model artifact output path
    #[arg(short, long, default_value = "car_price_model.bin")]
    output: PathBuf,

    /// Number of trees
    #[arg(long, default_value_t = 100)]
    n_trees: usize,

    /// Maximum tree depth
    #[arg(long, default_value_t = 15)]
    max_depth: usize,

    /// Seed for data generation, split and bootstrap
    #[arg(long, default_value_t = 42)]
    seed: u64,

    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let records = match args.synthetic {
        Some(count) => {
            let records = SyntheticGenerator::new(args.seed).generate(count);
            info!("Generated {} synthetic listings", records.len());
            if args.write_data {
                write_csv(&args.data, &records)
                    .with_context(|| format!("writing {}", args.data.display()))?;
                info!("Wrote {}", args.data.display());
            }
            records
        }
        None => load_csv(&args.data).with_context(|| format!("reading {}", args.data.display()))?,
    };
    if records.len() < 2 {
        bail!("need at least 2 listings to train, got {}", records.len());
    }

    let mut predictor = PricePredictor::new(PredictorConfig {
        forest: ForestConfig {
            n_trees: args.n_trees,
            max_depth: args.max_depth,
            seed: args.seed,
            ..Default::default()
        },
        split_seed: args.seed,
        ..Default::default()
    });

    let report = predictor.train(&records)?;
    info!("MAE: {:.0}", report.mae);
    info!("R² Score: {:.4} ({:.2}%)", report.r_squared, report.accuracy_percent);
    for (name, importance) in predictor.importance_ranking() {
        info!("  {:<14} {:.4}", name, importance);
    }

    predictor
        .save(&args.output)
        .with_context(|| format!("saving {}", args.output.display()))?;
    info!("Model saved to {}", args.output.display());

    let sample = CarFeatures {
        brand: "Toyota".to_string(),
        model: "Camry".to_string(),
        year: 2022,
        mileage: 35_000,
        fuel_type: "Petrol".to_string(),
        transmission: "Automatic".to_string(),
        engine_size: 2.5,
        horsepower: 203,
    };
    let price = predictor.predict(&sample)?;
    info!("Sample estimate, 2022 Toyota Camry: {:.0}", price);

    Ok(())
}
