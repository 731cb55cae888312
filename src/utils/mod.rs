//! The `utils` module provides shared definitions used across the broker:
//! the error taxonomy and the logging bootstrap.

pub mod error;
pub mod logging;

#[cfg(test)]
mod tests;
