use std::{future::Future, path::Path, pin::Pin, time::Duration};

use futures::{channel::mpsc, Stream};
use schema::{
    FleetConfig, Hospital, LoadError, OrderRequest, Runner, Scheduler, Speed, StatusUpdate,
};
use thiserror::Error;

use crate::ZipScheduler;

type Success = <CsvRunner as Runner<ZipScheduler>>::Success;
type Response = Pin<Box<dyn Future<Output = Result<Success, RunnerError>>>>;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("no orders to run")]
    NoOrders,
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Tally of a completed run
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub launched_flights: usize,
    pub rejected_orders: usize,
    /// Orders still waiting for a zip when the run stopped
    pub unfulfilled_orders: usize,
}

/// Simulation runner which exercises a `Scheduler` using data provided by a CSV
pub struct CsvRunner {
    speed: Speed,
    config: FleetConfig,
    hospitals: Vec<Hospital>,
    orders: Vec<OrderRequest>,
    status_updates_sender: mpsc::UnboundedSender<StatusUpdate>,
    status_updates_receiver: Option<mpsc::UnboundedReceiver<StatusUpdate>>,
}

impl CsvRunner {
    const SECONDS_PER_DAY: u64 = 24 * 60 * 60;
    /// Seconds between two calls to the scheduler
    const TICK_SECONDS: u64 = 60;

    pub fn new(hospitals: Vec<Hospital>, orders: Vec<OrderRequest>) -> Self {
        let (tx, rx) = mpsc::unbounded();

        Self {
            speed: Default::default(),
            config: Default::default(),
            hospitals,
            orders,
            status_updates_sender: tx,
            status_updates_receiver: Some(rx),
        }
    }

    pub fn from_csv_paths(
        hospitals_csv_path: impl AsRef<Path>,
        orders_csv_path: impl AsRef<Path>,
    ) -> Result<Self, RunnerError> {
        let hospitals = Hospital::from_csv(hospitals_csv_path)?;
        let orders = OrderRequest::from_csv(orders_csv_path)?;
        log::info!(
            "loaded {} hospitals and {} orders",
            hospitals.len(),
            orders.len()
        );

        Ok(Self::new(hospitals, orders))
    }

    /// Run with the provided `Speed`
    pub fn with_speed(mut self, speed: Speed) -> Self {
        self.speed = speed;
        self
    }

    /// Run with the provided fleet limits
    pub fn with_config(mut self, config: FleetConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns a stream of status updates, one per tick.
    /// The stream ends once the run has finished and the runner has been dropped.
    pub fn stream_updates(&mut self) -> Option<impl Stream<Item = StatusUpdate>> {
        self.status_updates_receiver.take()
    }

    /// Run a `ZipScheduler` built from the loaded hospitals and the configured fleet
    pub fn run_with_defaults(&self) -> Response {
        let scheduler = ZipScheduler::new(self.config, self.hospitals.clone());
        self.run(scheduler)
    }

    async fn run_inner(
        speed: Speed,
        updates: mpsc::UnboundedSender<StatusUpdate>,
        mut orders: Vec<OrderRequest>,
        mut scheduler: ZipScheduler,
    ) -> Result<Success, RunnerError> {
        orders.sort_by_key(|order| order.received_time);
        let (Some(first), Some(last)) = (orders.first(), orders.last()) else {
            return Err(RunnerError::NoOrders);
        };
        let first_tick = first.received_time;
        let last_tick = last.received_time.max(Self::SECONDS_PER_DAY);

        let mut orders_iter = orders.into_iter().peekable();
        let mut summary = RunSummary::default();
        let tick_duration = speed.adjust_duration(Duration::from_secs(Self::TICK_SECONDS));

        for current_time in (first_tick..=last_tick).step_by(Self::TICK_SECONDS as usize) {
            // Queue any orders received since the previous tick
            while let Some(order) = orders_iter.next_if(|o| o.received_time <= current_time) {
                if scheduler.queue_order(order).is_err() {
                    summary.rejected_orders += 1;
                }
            }

            summary.launched_flights += scheduler.launch_flights(current_time).count();
            let pending_orders = scheduler.unfulfilled_orders().count();

            let _ = updates.unbounded_send(StatusUpdate {
                time: current_time,
                flights: scheduler.active_flights(current_time).cloned().collect(),
                pending_orders,
                speed,
            });

            if pending_orders == 0 && orders_iter.peek().is_none() {
                break;
            }

            tokio::time::sleep(tick_duration).await;
        }

        summary.unfulfilled_orders = scheduler.unfulfilled_orders().count();
        log::info!(
            "run finished: {} flights, {} rejected orders, {} unfulfilled orders",
            summary.launched_flights,
            summary.rejected_orders,
            summary.unfulfilled_orders
        );

        Ok(summary)
    }
}

impl Runner<ZipScheduler> for CsvRunner {
    type Response = Response;
    type Success = RunSummary;
    type Error = RunnerError;

    fn run(&self, scheduler: ZipScheduler) -> Self::Response {
        let orders = self.orders.clone();
        let speed = self.speed;
        let updates = self.status_updates_sender.clone();
        Box::pin(async move { Self::run_inner(speed, updates, orders, scheduler).await })
    }
}

#[cfg(test)]
mod test {
    use futures::StreamExt;

    use super::*;

    const HOSPITALS_PATH: &'static str = "../test_data/hospitals.csv";
    const ORDERS_PATH: &'static str = "../test_data/orders.csv";

    #[tokio::test(start_paused = true)]
    async fn test_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let runner = CsvRunner::from_csv_paths(HOSPITALS_PATH, ORDERS_PATH)?;
        let summary = runner.run_with_defaults().await?;

        assert_eq!(summary.unfulfilled_orders, 0);
        // One order for an unknown hospital, one with a bad priority
        assert_eq!(summary.rejected_orders, 2);
        assert!(summary.launched_flights > 0);

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_updates() -> Result<(), Box<dyn std::error::Error>> {
        let mut runner = CsvRunner::from_csv_paths(HOSPITALS_PATH, ORDERS_PATH)?
            .with_speed(Speed::fast_forward(100).expect("speed"));
        let updates = runner.stream_updates().expect("update stream");
        assert!(runner.stream_updates().is_none());

        let run = runner.run_with_defaults();
        drop(runner);
        let (summary, updates) = futures::join!(run, updates.collect::<Vec<_>>());
        summary?;

        assert!(!updates.is_empty());
        assert!(updates.windows(2).all(|w| w[1].time == w[0].time + 60));
        assert!(updates.iter().any(|update| !update.flights.is_empty()));
        assert_eq!(updates.last().map(|update| update.pending_orders), Some(0));

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_stuck_order_is_reported() -> Result<(), RunnerError> {
        let runner = CsvRunner::new(
            vec![
                Hospital::new("Reachable", 0, 70_000),
                Hospital::new("Unreachable", 90_000, 0),
            ],
            vec![
                OrderRequest::new(3600, "Unreachable", "Resupply"),
                OrderRequest::new(3660, "Reachable", "Resupply"),
            ],
        );
        let summary = runner.run_with_defaults().await?;

        // The unreachable order anchors every batch, so nothing behind it flies either
        assert_eq!(summary.unfulfilled_orders, 2);
        assert_eq!(summary.launched_flights, 0);

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_orders() {
        let runner = CsvRunner::new(vec![Hospital::new("A", 0, 1000)], vec![]);
        assert!(matches!(
            runner.run_with_defaults().await,
            Err(RunnerError::NoOrders)
        ));
    }
}
