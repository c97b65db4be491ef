use crate::color::{self, Rgb};
use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

pub const MAX_PARTICLES: usize = 300;
pub const MAX_RADIUS_LIMIT: f32 = 30.0;
pub const MAX_SPEED_LIMIT: f32 = 30.0;
pub const MAX_BIND_DISTANCE: f32 = 400.0;

/// How the surface is cleared at the start of each frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ClearMode {
    /// Wipe the whole surface
    #[default]
    Full,
    /// Each particle wipes only its own square, so link lines linger
    Trails,
}

impl ClearMode {
    pub fn name(&self) -> &str {
        match self {
            ClearMode::Full => "Full",
            ClearMode::Trails => "Trails",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ClearMode::Full => ClearMode::Trails,
            ClearMode::Trails => ClearMode::Full,
        }
    }
}

/// Values the fill routine reads when (re)populating the collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Smallest particle radius in dots
    pub min_radius: f32,
    /// Largest particle radius in dots; also the spawn inset
    pub max_radius: f32,
    /// Initial speed of every particle (dots per frame)
    pub speed: f32,
    /// Upper bound of the per-particle acceleration draw (lower bound is 0.5)
    pub max_acceleration: f32,
    /// Upper bound of the per-particle max speed draw
    pub max_speed: f32,
    /// Glow width around each particle
    pub shadow_blur: f32,
    /// Colors particles are drawn with, picked uniformly
    pub colors: Vec<String>,
    /// Rainbow palette active (disables the single color input)
    pub rainbow: bool,
    /// Width of the link lines
    pub line_width: f32,
    pub line_color: String,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            min_radius: 3.5,
            max_radius: 7.0,
            speed: 3.0,
            max_acceleration: 1.5,
            max_speed: 7.0,
            shadow_blur: 7.0,
            colors: vec![color::WHITE.to_string()],
            rainbow: false,
            line_width: 0.1,
            line_color: color::WHITE.to_string(),
        }
    }
}

impl ParticleConfig {
    /// Adjust max radius within bounds
    pub fn adjust_max_radius(&mut self, delta: f32) {
        self.max_radius = (self.max_radius + delta).clamp(self.min_radius, MAX_RADIUS_LIMIT);
    }

    /// Adjust max speed within bounds
    pub fn adjust_max_speed(&mut self, delta: f32) {
        self.max_speed = (self.max_speed + delta).clamp(self.speed, MAX_SPEED_LIMIT);
    }

    /// Adjust line width within bounds
    pub fn adjust_line_width(&mut self, delta: f32) {
        let width = (self.line_width + delta).clamp(0.1, 3.0);
        // Keep one decimal so repeated steps don't drift
        self.line_width = (width * 10.0).round() / 10.0;
    }

    /// The single user-chosen color (first entry of the palette)
    pub fn primary_color(&self) -> &str {
        self.colors.first().map(String::as_str).unwrap_or(color::WHITE)
    }

    /// Replace the single color; ignored while rainbow is on
    pub fn set_primary_color(&mut self, hex: &str) {
        if !self.rainbow {
            self.colors = vec![hex.to_string()];
        }
    }

    /// Switch between the rainbow palette and plain white
    pub fn set_rainbow(&mut self, on: bool) {
        self.rainbow = on;
        self.colors = if on {
            color::RAINBOW.iter().map(|c| c.to_string()).collect()
        } else {
            vec![color::WHITE.to_string()]
        };
    }

    pub fn line_rgb(&self) -> Rgb {
        Rgb::parse_hex(&self.line_color).unwrap_or(Rgb::new(255, 255, 255))
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.min_radius.is_finite() && self.min_radius >= 0.0,
            "min_radius must be a non-negative number"
        );
        ensure!(
            self.max_radius.is_finite() && self.max_radius >= self.min_radius,
            "max_radius must be at least min_radius"
        );
        ensure!(
            self.max_radius <= MAX_RADIUS_LIMIT,
            "max_radius must be at most {}",
            MAX_RADIUS_LIMIT
        );
        ensure!(self.speed.is_finite() && self.speed >= 0.0, "speed must be a non-negative number");
        ensure!(
            self.max_speed.is_finite() && self.max_speed >= self.speed,
            "max_speed must be at least speed"
        );
        ensure!(
            self.max_speed <= MAX_SPEED_LIMIT,
            "max_speed must be at most {}",
            MAX_SPEED_LIMIT
        );
        ensure!(
            self.max_acceleration.is_finite() && self.max_acceleration >= 0.0,
            "max_acceleration must be a non-negative number"
        );
        ensure!(
            self.shadow_blur.is_finite() && self.shadow_blur >= 0.0,
            "shadow_blur must be a non-negative number"
        );
        ensure!(
            self.line_width.is_finite() && self.line_width > 0.0,
            "line_width must be positive"
        );
        ensure!(!self.colors.is_empty(), "colors must not be empty");
        for c in &self.colors {
            Rgb::parse_hex(c).context("bad entry in colors")?;
        }
        Rgb::parse_hex(&self.line_color).context("bad line_color")?;
        Ok(())
    }
}

/// Mouse cursor as a link target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorSettings {
    /// Draw lines from particles to the cursor
    pub enabled: bool,
    /// Link threshold between a particle and the cursor
    pub bind_distance: f32,
    pub radius: f32,
    pub shadow_blur: f32,
    pub color: String,
}

impl Default for CursorSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_distance: 80.0,
            radius: 3.0,
            shadow_blur: 4.0,
            color: color::WHITE.to_string(),
        }
    }
}

impl CursorSettings {
    pub fn adjust_bind_distance(&mut self, delta: f32) {
        self.bind_distance = (self.bind_distance + delta).clamp(0.0, MAX_BIND_DISTANCE);
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.bind_distance.is_finite() && self.bind_distance >= 0.0,
            "cursor bind_distance must be a non-negative number"
        );
        ensure!(
            self.radius.is_finite() && self.radius >= 0.0,
            "cursor radius must be a non-negative number"
        );
        ensure!(
            self.shadow_blur.is_finite() && self.shadow_blur >= 0.0,
            "cursor shadow_blur must be a non-negative number"
        );
        Rgb::parse_hex(&self.color).context("bad cursor color")?;
        Ok(())
    }
}
