//! Conway's Game of Life on a torus, with the pan/zoom viewport and the
//! run-length pattern format used by the desktop app in `main.rs`.

pub mod config;
pub mod error;
pub mod grid;
pub mod pattern;
pub mod playback;
pub mod rules;
pub mod schedule;
pub mod session;
pub mod viewport;

pub use config::LifeConfig;
pub use error::{LifeError, Result};
pub use grid::Grid;
pub use rules::patterns::Pattern;
pub use session::{Redraw, Session};
pub use viewport::Viewport;
