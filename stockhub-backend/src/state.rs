use std::sync::Arc;

use stockhub_counter_store::CounterStore;
use stockhub_inventory::{Catalog, SeatLedger, StockLedger};
use stockhub_job_queue::JobQueueClient;
use stockhub_reservations::{ProductReservations, SeatReservations};

use crate::error::StartupError;

/// Shared application state passed to every route handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub seats: SeatReservations,
    pub products: ProductReservations,
    pub job_queue: JobQueueClient,
}

/// Settings applied once by [`AppState::bootstrap`].
#[derive(Debug, Clone)]
pub struct BootstrapOptions {
    pub initial_seats: i64,
    pub seat_concurrency: usize,
    pub product_concurrency: usize,
    /// Empty means the default blacklist.
    pub notification_blacklist: Vec<String>,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            initial_seats: 50,
            seat_concurrency: 1,
            product_concurrency: 1,
            notification_blacklist: Vec::new(),
        }
    }
}

impl BootstrapOptions {
    pub fn from_config(cfg: &stockhub_config::Config) -> Self {
        Self {
            initial_seats: cfg.seats.initial,
            seat_concurrency: cfg.queue.seat_concurrency,
            product_concurrency: cfg.queue.product_concurrency,
            notification_blacklist: cfg.notifications.blacklist.clone(),
        }
    }
}

impl AppState {
    /// Build the state container. Both ledgers share `store`.
    pub fn new(store: Arc<dyn CounterStore>, catalog: Catalog, job_queue: JobQueueClient) -> Self {
        let seats = SeatReservations::new(SeatLedger::new(Arc::clone(&store)), job_queue.clone());
        let products = ProductReservations::new(catalog, StockLedger::new(store), job_queue.clone());
        Self {
            seats,
            products,
            job_queue,
        }
    }

    /// Seed the ledgers and register every job processor.
    ///
    /// Product and notification jobs are consumed right away. Seat jobs wait
    /// for `GET /process`.
    pub async fn bootstrap(&self, options: &BootstrapOptions) -> Result<(), StartupError> {
        self.seats.initialize(options.initial_seats).await?;
        self.products.reset_stock().await?;

        self.seats.install(options.seat_concurrency).await?;
        self.products.install(options.product_concurrency).await?;
        self.products.start_processing().await?;
        stockhub_jobs::register_all_processors(
            &self.job_queue,
            options.notification_blacklist.clone(),
        )
        .await?;

        tracing::info!(
            initial_seats = options.initial_seats,
            products = self.products.list_products().len(),
            "application state initialized"
        );
        Ok(())
    }
}
