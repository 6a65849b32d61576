//! Model handles wrapping the scoring backends.

pub mod classification;

pub use classification::*;
