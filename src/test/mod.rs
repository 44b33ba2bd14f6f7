//! Shared functionality for the unit tests.
//!
//! - [`factories`] - crafted heaps, stream images and pre-populated headers

pub mod factories;
