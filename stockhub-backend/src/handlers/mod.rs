pub mod jobs;
pub mod notifications;
pub mod products;
pub mod seats;

pub mod utils;
