// ABOUTME: Configuration constants shared across OTR packages
// ABOUTME: Environment variable names and their default values

pub mod constants;

pub use constants::*;
