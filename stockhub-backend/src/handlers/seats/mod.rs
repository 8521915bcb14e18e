pub mod available;
pub mod process;
pub mod reserve;
