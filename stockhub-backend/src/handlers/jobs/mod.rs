pub mod clear;
pub mod get;
pub mod list;
