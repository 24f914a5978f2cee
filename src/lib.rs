//! County-level electric-vehicle adoption forecaster.
//!
//! A pre-trained regression model is driven autoregressively over each
//! county's monthly registration history, and the result is merged into a
//! cumulative adoption timeline.

pub mod cli;
pub mod config;
pub mod context;
pub mod dataset;
pub mod error;
/// Lag, rolling, and slope features for one forecast step.
pub mod features;
pub mod forecast;
pub mod io;
pub mod model;
pub mod report;
pub mod trend;

#[cfg(feature = "api")]
pub mod api;
#[cfg(feature = "tui")]
pub mod tui;
