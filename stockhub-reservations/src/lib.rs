//! Reservation orchestration.
//!
//! Requests are turned into queued jobs; the job processors commit stock
//! through the inventory ledgers and close the [`ReservationGate`] once the
//! resource is exhausted. After that, requests are rejected without touching
//! the queue.
//!
//! - [`SeatReservations`] - the single seat pool
//! - [`ProductReservations`] - catalog products, one gate per item

mod error;
mod gate;
mod job;
mod products;
mod seats;
mod status;

pub use error::ReservationError;
pub use gate::ReservationGate;
pub use job::{job_types, ReservationJob};
pub use products::{ProductReservations, ReserveProductProcessor};
pub use seats::{ReserveSeatProcessor, SeatReservations};
pub use status::ReservationStatus;
