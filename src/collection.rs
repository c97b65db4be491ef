use crate::color::Rgb;
use crate::particle::{Cursor, Particle, ParticleSpec};
use crate::settings::{ClearMode, CursorSettings, ParticleConfig};
use crate::surface::Surface;
use anyhow::{ensure, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Lower bound of the per-particle acceleration draw
const MIN_ACCELERATION: f32 = 0.5;

/// Bind distance used when none is configured: grows with the count
pub fn default_bind_distance(count: usize) -> f32 {
    (count as f32 * 3.5).max(100.0)
}

/// Uniform draw in [lo, hi); collapses to `lo` for an empty range
fn sample(rng: &mut StdRng, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

/// Fixed-size set of particles plus the per-frame loop that moves and links them
pub struct ParticleCollection {
    pub particles: Vec<Particle>,
    /// Number of particles a reset produces
    pub count: usize,
    /// Two particles closer than this are joined by a line
    pub bind_distance: f32,
    pub config: ParticleConfig,
    pub cursor: Cursor,
    pub cursor_settings: CursorSettings,
    pub clear_mode: ClearMode,
    pub paused: bool,
    /// Frames run since the last reset
    pub frames: u64,
    width: f32,
    height: f32,
    rng: StdRng,
}

impl ParticleCollection {
    pub fn new(
        width: usize,
        height: usize,
        count: usize,
        config: ParticleConfig,
        cursor_settings: CursorSettings,
        seed: Option<u64>,
    ) -> Result<Self> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let cursor_color = Rgb::parse_hex(&cursor_settings.color)?;
        let mut collection = Self {
            particles: Vec::with_capacity(count),
            count,
            bind_distance: default_bind_distance(count),
            config,
            cursor: Cursor::new(cursor_settings.radius, cursor_settings.shadow_blur, cursor_color),
            cursor_settings,
            clear_mode: ClearMode::default(),
            paused: false,
            frames: 0,
            width: width as f32,
            height: height as f32,
            rng,
        };
        collection.fill_storage()?;
        Ok(collection)
    }

    /// Generate `count` particles at random positions inside the area.
    ///
    /// Storage is only replaced when every particle was built successfully.
    pub fn fill_storage(&mut self) -> Result<()> {
        let palette = self.config.colors.clone();
        ensure!(!palette.is_empty(), "particle palette is empty");

        let max_r = self.config.max_radius;
        let mut storage = Vec::with_capacity(self.count);

        for _ in 0..self.count {
            let x = sample(&mut self.rng, max_r, self.width - max_r);
            let y = sample(&mut self.rng, max_r, self.height - max_r);
            let color = &palette[self.rng.gen_range(0..palette.len())];
            let max_speed = sample(&mut self.rng, self.config.speed, self.config.max_speed).ceil();
            let acceleration = sample(&mut self.rng, MIN_ACCELERATION, self.config.max_acceleration);
            let radius = sample(&mut self.rng, self.config.min_radius, max_r);

            let particle = Particle::new(
                ParticleSpec {
                    x,
                    y,
                    radius,
                    color,
                    shadow_color: color,
                    shadow_blur: self.config.shadow_blur,
                    speed: self.config.speed,
                    max_speed,
                    acceleration,
                },
                &mut self.rng,
            )?;
            storage.push(particle);
        }

        self.particles = storage;
        Ok(())
    }

    /// Discard all particles and regenerate them from the current config
    pub fn reset(&mut self) -> Result<()> {
        self.frames = 0;
        self.fill_storage()
    }

    /// Change the particle count and regenerate; the old count stays on failure
    pub fn set_count(&mut self, count: usize) -> Result<()> {
        let previous = std::mem::replace(&mut self.count, count);
        let result = self.reset();
        if result.is_err() {
            self.count = previous;
        }
        result
    }

    /// Track a new area size; particles outside bounce back on their next update
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width as f32;
        self.height = height as f32;
    }

    pub fn clear_particles(&mut self, surface: &mut Surface) {
        match self.clear_mode {
            ClearMode::Full => surface.clear_completely(),
            ClearMode::Trails => {
                for particle in &self.particles {
                    particle.clear(surface);
                }
                self.cursor.clear(surface);
            }
        }
    }

    pub fn update_particles(&mut self) {
        let (width, height) = (self.width, self.height);
        for particle in &mut self.particles {
            particle.update(width, height);
        }
    }

    pub fn draw_particles(&self, surface: &mut Surface) {
        for particle in &self.particles {
            particle.draw(surface);
        }
    }

    /// Index pairs (i < j) whose centres are within the bind distance
    pub fn links(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for (i, a) in self.particles.iter().enumerate() {
            for (j, b) in self.particles.iter().enumerate().skip(i + 1) {
                if a.distance_to(b.x, b.y) <= self.bind_distance {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }

    /// Draw a line for every linked pair; returns how many were drawn
    pub fn bind_particles(&self, surface: &mut Surface) -> usize {
        let links = self.links();
        let color = self.config.line_rgb();
        for &(i, j) in &links {
            let (a, b) = (&self.particles[i], &self.particles[j]);
            surface.line_from_to((a.x, a.y), (b.x, b.y), self.config.line_width, color);
        }
        links.len()
    }

    /// Particles within the cursor bind distance; empty while the cursor is hidden
    pub fn cursor_targets(&self) -> Vec<usize> {
        if !self.cursor.visible {
            return Vec::new();
        }
        self.particles
            .iter()
            .enumerate()
            .filter(|(_, p)| p.distance_to(self.cursor.x, self.cursor.y) <= self.cursor_settings.bind_distance)
            .map(|(i, _)| i)
            .collect()
    }

    /// Link particles to the cursor and paint the cursor
    pub fn bind_cursor(&mut self, surface: &mut Surface) -> usize {
        let targets = self.cursor_targets();
        let color = self.config.line_rgb();
        for &i in &targets {
            let p = &self.particles[i];
            surface.line_from_to((p.x, p.y), (self.cursor.x, self.cursor.y), self.config.line_width, color);
        }
        self.cursor.draw(surface);
        targets.len()
    }

    /// One animation frame: clear, update, draw, link.
    /// Returns the number of lines drawn, or None while frozen.
    pub fn frame(&mut self, surface: &mut Surface) -> Option<usize> {
        if self.paused {
            return None;
        }

        self.clear_particles(surface);
        self.update_particles();
        self.draw_particles(surface);
        let mut lines = self.bind_particles(surface);
        if self.cursor_settings.enabled {
            lines += self.bind_cursor(surface);
        }

        self.frames += 1;
        Some(lines)
    }

    /// Stop the frame loop
    pub fn freeze(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }
}
