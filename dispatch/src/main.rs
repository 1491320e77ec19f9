use std::env;

use futures::StreamExt;
use schema::{FleetConfig, Speed};

use dispatch::CsvRunner;

#[tokio::main]
pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    env_logger::init();

    let hospitals_path = env::var("HOSPITALS_CSV")
        .unwrap_or_else(|_| schema::SAMPLE_HOSPITALS_CSV_PATH.to_string());
    let orders_path =
        env::var("ORDERS_CSV").unwrap_or_else(|_| schema::SAMPLE_ORDERS_CSV_PATH.to_string());
    // run demo in fast-forward unless told otherwise
    let speed = match env::var("RUN_SPEED") {
        Ok(speed) => Speed::parse(&speed).ok_or_else(|| format!("invalid RUN_SPEED `{}`", speed))?,
        Err(_) => Speed::fast_forward(200).unwrap_or_default(),
    };
    let config = FleetConfig::from_env()?;

    let mut runner = CsvRunner::from_csv_paths(&hospitals_path, &orders_path)?
        .with_speed(speed)
        .with_config(config);
    let updates = runner.stream_updates().ok_or("update stream")?;

    let log_updates = updates.for_each(|update| {
        log::debug!(
            "t={}: {} zips in the air, {} orders waiting",
            update.time,
            update.flights.len(),
            update.pending_orders
        );
        futures::future::ready(())
    });

    log::info!("running {:?} with {:?}", speed, config);

    // The update stream ends once both the runner and its run have let go of their senders
    let run = runner.run_with_defaults();
    drop(runner);
    let (summary, ()) = futures::join!(run, log_updates);
    let summary = summary?;

    println!(
        "{} flights launched, {} orders rejected, {} orders unfulfilled",
        summary.launched_flights, summary.rejected_orders, summary.unfulfilled_orders
    );

    Ok(())
}
