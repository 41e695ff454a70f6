use std::process::ExitCode;
use std::time::Instant;

use cnn_forward::config::RunConfig;
use cnn_forward::helpers::evaluate;
use cnn_forward::idx_data::{load_batch, load_model};
use cnn_forward::pipeline::ForwardPipeline;
use cnn_forward::telemetry;
use tracing::{error, info};

fn main() -> ExitCode {
    if let Err(e) = telemetry::init_tracing() {
        eprintln!("{}", e);
    }

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> cnn_forward::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => RunConfig::from_json_file(path)?,
        None => RunConfig::default(),
    };
    let config = config.with_env_overrides()?;

    let batch = load_batch(
        config.images_path(),
        config.labels_path(),
        config.batch_size,
        config.network.num_classes,
    )?;
    let model = load_model(&config.model_dir, &config.network)?;

    let network = config.network.clone().with_batch_size(batch.len());
    let pipeline = ForwardPipeline::new(network, config.mode)?;

    let start = Instant::now();
    let predictions = pipeline.run(&batch, &model)?;
    let elapsed = start.elapsed();

    let report = evaluate(&predictions, &batch.labels)?;
    info!(correct = report.correct, total = report.total, mode = %config.mode, ?elapsed, "forward pass finished");
    println!("Done. Correctness: {:.6}", report.accuracy);
    println!("Elapsed: {:.2?}", elapsed);
    Ok(())
}
