//! Joymap Dashboard
//!
//! Three sliders (Health, Freedom, Economy) drive a "Top 5 Countries" list
//! and a choropleth map of world happiness.
//!
//! # Architecture
//!
//! - **Controls**: slider positions, clamped to 0..=10, default 5
//! - **Bindings**: declared `{inputs, outputs, handler}` table
//! - **Dashboard**: session object that dispatches events serially
//! - **Map**: Vega-Lite choropleth embedded as a standalone HTML document
//! - **Server**: dashboard page, REST API and WebSocket
//!
//! # Usage
//!
//! ```no_run
//! use joymap_dash::{DashConfig, DashServer, Dashboard};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DashConfig::from_env()?;
//!     let dashboard = Dashboard::from_config(&config)?;
//!     DashServer::new(dashboard).serve(config.addr).await?;
//!     Ok(())
//! }
//! ```

pub mod binding;
pub mod config;
pub mod controls;
pub mod dashboard;
pub mod error;
pub mod geometry;
pub mod map;
pub mod server;

pub use binding::{Binding, BindingTable, Context, Input, Output, Snapshot, Value};
pub use config::DashConfig;
pub use controls::{ControlState, InvalidControlValue, Weight, DEFAULT_WEIGHT, MAX_WEIGHT, MIN_WEIGHT};
pub use dashboard::{default_bindings, Dashboard, Event, Render};
pub use error::{Error, Result};
pub use geometry::{GeometryIndex, JoinMismatch};
pub use map::{MapLayer, MapOptions};
pub use server::DashServer;
