use crate::error::{LifeError, Result};
use std::str::FromStr;
use std::time::Duration;

/// Tunables for a simulator session.
#[derive(Debug, Clone, PartialEq)]
pub struct LifeConfig {
    /// Grid size in cells
    pub grid_width: u32,
    pub grid_height: u32,
    /// Edge length of one cell in world pixels at zoom 1
    pub cell_size: f64,
    /// Generations per second while running
    pub rate: u32,
    /// Exponent scale applied to wheel deltas before `1.1^(-delta * k)`
    pub zoom_sensitivity: f64,
    /// How long a press must stay still before it counts as a click
    pub click_delay: Duration,
    /// Pointer travel (screen px) that turns a press into a pan
    pub drag_threshold: f64,
    /// Quiet time after the last wheel event before the settled redraw
    pub wheel_debounce: Duration,
    pub show_grid_lines: bool,
}

impl Default for LifeConfig {
    fn default() -> Self {
        Self {
            grid_width: 200,
            grid_height: 150,
            cell_size: 10.0,
            rate: 10,
            zoom_sensitivity: 0.01,
            click_delay: Duration::from_millis(200),
            drag_threshold: 0.0,
            wheel_debounce: Duration::from_millis(50),
            show_grid_lines: true,
        }
    }
}

fn env_value<T: FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| LifeError::InvalidConfig(format!("{name}={raw:?} is not a valid value"))),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => {
            Err(LifeError::InvalidConfig(format!("{name} is not valid unicode")))
        }
    }
}

impl LifeConfig {
    /// Defaults overridden by `LIFE_GRID_WIDTH`, `LIFE_GRID_HEIGHT`,
    /// `LIFE_CELL_SIZE`, `LIFE_RATE`, `LIFE_ZOOM_SENSITIVITY`,
    /// `LIFE_CLICK_DELAY_MS` and `LIFE_GRID_LINES`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(v) = env_value("LIFE_GRID_WIDTH")? {
            config.grid_width = v;
        }
        if let Some(v) = env_value("LIFE_GRID_HEIGHT")? {
            config.grid_height = v;
        }
        if let Some(v) = env_value("LIFE_CELL_SIZE")? {
            config.cell_size = v;
        }
        if let Some(v) = env_value("LIFE_RATE")? {
            config.rate = v;
        }
        if let Some(v) = env_value("LIFE_ZOOM_SENSITIVITY")? {
            config.zoom_sensitivity = v;
        }
        if let Some(v) = env_value::<u64>("LIFE_CLICK_DELAY_MS")? {
            config.click_delay = Duration::from_millis(v);
        }
        if let Some(v) = env_value("LIFE_GRID_LINES")? {
            config.show_grid_lines = v;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(LifeError::InvalidDimension {
                width: self.grid_width,
                height: self.grid_height,
            });
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(LifeError::InvalidConfig(format!(
                "cell size must be positive, got {}",
                self.cell_size
            )));
        }
        if self.rate == 0 {
            return Err(LifeError::InvalidRate(0));
        }
        if !(self.zoom_sensitivity.is_finite() && self.zoom_sensitivity > 0.0) {
            return Err(LifeError::InvalidConfig(format!(
                "zoom sensitivity must be positive, got {}",
                self.zoom_sensitivity
            )));
        }
        if !(self.drag_threshold.is_finite() && self.drag_threshold >= 0.0) {
            return Err(LifeError::InvalidConfig(format!(
                "drag threshold must be non-negative, got {}",
                self.drag_threshold
            )));
        }
        Ok(())
    }
}
