//! Renders PPI maps of the NEXRAD Level II volume nearest a target time.
//!
//! The binary wires configuration, logging and the archive client around
//! [`pipeline::run`].

pub mod config;
pub mod pipeline;
pub mod plots;

pub use config::PlotConfig;
pub use pipeline::{fetch_volume, render_volume, run};
pub use plots::{PlotDefinition, PLOTS};
