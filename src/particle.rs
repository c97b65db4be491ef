use crate::color::Rgb;
use crate::surface::Surface;
use anyhow::{ensure, Context, Result};
use rand::Rng;

/// Construction parameters for a [`Particle`].
///
/// Colors are `#RRGGBB` strings as they come from the configuration.
#[derive(Debug, Clone)]
pub struct ParticleSpec<'a> {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: &'a str,
    pub shadow_color: &'a str,
    pub shadow_blur: f32,
    pub speed: f32,
    pub max_speed: f32,
    pub acceleration: f32,
}

/// A moving colored disc that bounces inside the surface
#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: Rgb,
    pub shadow_color: Rgb,
    pub shadow_blur: f32,
    /// Speed restored once `max_speed` is reached
    pub initial_speed: f32,
    pub speed: f32,
    pub max_speed: f32,
    /// Added to speed on every wall hit
    pub acceleration: f32,
    /// Horizontal direction, +1 or -1
    pub x_dir: f32,
    /// Vertical direction, +1 or -1
    pub y_dir: f32,
}

impl Particle {
    /// Validate the inputs and build a particle heading in a random diagonal direction
    pub fn new<R: Rng + ?Sized>(spec: ParticleSpec<'_>, rng: &mut R) -> Result<Self> {
        ensure!(
            spec.x.is_finite() && spec.y.is_finite(),
            "particle position must be numeric, got ({}, {})",
            spec.x,
            spec.y
        );
        ensure!(
            spec.radius.is_finite() && spec.radius >= 0.0,
            "particle radius must be a non-negative number, got {}",
            spec.radius
        );
        ensure!(
            spec.shadow_blur.is_finite() && spec.shadow_blur >= 0.0,
            "particle shadow blur must be a non-negative number, got {}",
            spec.shadow_blur
        );
        ensure!(
            spec.speed.is_finite() && spec.max_speed.is_finite() && spec.speed >= 0.0,
            "particle speed must be a non-negative number, got {} (max {})",
            spec.speed,
            spec.max_speed
        );
        ensure!(
            spec.acceleration.is_finite() && spec.acceleration >= 0.0,
            "particle acceleration must be a non-negative number, got {}",
            spec.acceleration
        );
        let color = Rgb::parse_hex(spec.color).context("particle color")?;
        let shadow_color = Rgb::parse_hex(spec.shadow_color).context("particle shadow color")?;

        let initial_speed = spec.speed.min(spec.max_speed);

        Ok(Self {
            x: spec.x,
            y: spec.y,
            radius: spec.radius,
            color,
            shadow_color,
            shadow_blur: spec.shadow_blur,
            initial_speed,
            speed: initial_speed,
            max_speed: spec.max_speed,
            acceleration: spec.acceleration,
            x_dir: if rng.gen_bool(0.5) { -1.0 } else { 1.0 },
            y_dir: if rng.gen_bool(0.5) { -1.0 } else { 1.0 },
        })
    }

    /// Distance from an edge at which the particle turns around
    pub fn inset(&self) -> f32 {
        self.radius + self.shadow_blur
    }

    /// Advance one frame inside a `width` x `height` area.
    ///
    /// Every wall hit flips the direction on that axis and adds the
    /// acceleration; speed snaps back to its initial value once it reaches
    /// the max.
    pub fn update(&mut self, width: f32, height: f32) {
        self.x += self.speed * self.x_dir;
        self.y += self.speed * self.y_dir;

        let inset = self.inset();
        if bounce(&mut self.x, &mut self.x_dir, inset, width - inset) {
            self.speed += self.acceleration;
        }
        if bounce(&mut self.y, &mut self.y_dir, inset, height - inset) {
            self.speed += self.acceleration;
        }

        if self.speed >= self.max_speed {
            self.speed = self.initial_speed;
        }
    }

    pub fn draw(&self, surface: &mut Surface) {
        surface.fill_circle(self.x, self.y, self.radius, self.color, self.shadow_blur, self.shadow_color);
    }

    /// Wipe the square covering the disc and its glow
    pub fn clear(&self, surface: &mut Surface) {
        let inset = self.inset();
        surface.clear_rect(self.x - inset, self.y - inset, inset * 2.0, inset * 2.0);
    }

    pub fn distance_to(&self, x: f32, y: f32) -> f32 {
        (self.x - x).hypot(self.y - y)
    }
}

/// Keep `pos` within [lo, hi], flipping `dir` on a crossing.
/// Returns true when a wall was hit. An axis too small to fit the particle
/// pins it to the middle.
fn bounce(pos: &mut f32, dir: &mut f32, lo: f32, hi: f32) -> bool {
    if lo > hi {
        *pos = (lo + hi) / 2.0;
        return false;
    }
    if *pos < lo {
        *pos = lo;
        *dir = 1.0;
        true
    } else if *pos > hi {
        *pos = hi;
        *dir = -1.0;
        true
    } else {
        false
    }
}

/// Particle-like marker following the mouse; a link target for the collection
#[derive(Debug, Clone)]
pub struct Cursor {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub shadow_blur: f32,
    pub color: Rgb,
    pub visible: bool,
    /// Where the cursor was last painted, for per-region clearing
    drawn_at: Option<(f32, f32)>,
}

impl Cursor {
    pub fn new(radius: f32, shadow_blur: f32, color: Rgb) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            radius,
            shadow_blur,
            color,
            visible: false,
            drawn_at: None,
        }
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn draw(&mut self, surface: &mut Surface) {
        if self.visible {
            surface.fill_circle(self.x, self.y, self.radius, self.color, self.shadow_blur, self.color);
            self.drawn_at = Some((self.x, self.y));
        }
    }

    /// Wipe the square around the last painted position
    pub fn clear(&mut self, surface: &mut Surface) {
        if let Some((x, y)) = self.drawn_at.take() {
            let inset = self.radius + self.shadow_blur;
            surface.clear_rect(x - inset, y - inset, inset * 2.0, inset * 2.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn spec(x: f32, y: f32) -> ParticleSpec<'static> {
        ParticleSpec {
            x,
            y,
            radius: 5.0,
            color: "#FFFFFF",
            shadow_color: "#FFFFFF",
            shadow_blur: 7.0,
            speed: 3.0,
            max_speed: 7.0,
            acceleration: 1.0,
        }
    }

    fn particle(x: f32, y: f32) -> Particle {
        Particle::new(spec(x, y), &mut StdRng::seed_from_u64(1)).unwrap()
    }

    #[test]
    fn test_rejects_non_numeric_input() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(Particle::new(ParticleSpec { x: f32::NAN, ..spec(0.0, 0.0) }, &mut rng).is_err());
        assert!(Particle::new(ParticleSpec { y: f32::INFINITY, ..spec(0.0, 0.0) }, &mut rng).is_err());
        assert!(Particle::new(ParticleSpec { radius: f32::NAN, ..spec(0.0, 0.0) }, &mut rng).is_err());
        assert!(Particle::new(ParticleSpec { shadow_blur: -1.0, ..spec(0.0, 0.0) }, &mut rng).is_err());
    }

    #[test]
    fn test_rejects_bad_colors() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(Particle::new(ParticleSpec { color: "white", ..spec(0.0, 0.0) }, &mut rng).is_err());
        assert!(Particle::new(ParticleSpec { shadow_color: "#12", ..spec(0.0, 0.0) }, &mut rng).is_err());
    }

    #[test]
    fn test_initial_speed_capped_by_max() {
        let p = Particle::new(
            ParticleSpec { speed: 10.0, max_speed: 4.0, ..spec(50.0, 50.0) },
            &mut StdRng::seed_from_u64(0),
        )
        .unwrap();
        assert_eq!(p.initial_speed, 4.0);
        assert_eq!(p.speed, 4.0);
    }

    #[test]
    fn test_moves_along_direction() {
        let mut p = particle(50.0, 50.0);
        p.x_dir = 1.0;
        p.y_dir = -1.0;
        p.update(200.0, 200.0);
        assert_eq!(p.x, 53.0);
        assert_eq!(p.y, 47.0);
        assert_eq!(p.speed, 3.0);
    }

    #[test]
    fn test_bounces_off_left_wall() {
        let mut p = particle(13.0, 50.0);
        p.x_dir = -1.0;
        p.y_dir = 1.0;
        p.update(200.0, 200.0);
        assert_eq!(p.x_dir, 1.0);
        assert_eq!(p.x, p.inset());
        assert_eq!(p.speed, 4.0);
    }

    #[test]
    fn test_bounces_off_bottom_right_corner() {
        let mut p = particle(187.0, 187.0);
        p.x_dir = 1.0;
        p.y_dir = 1.0;
        p.update(200.0, 200.0);
        assert_eq!(p.x_dir, -1.0);
        assert_eq!(p.y_dir, -1.0);
        // both walls accelerate: 3 + 1 + 1
        assert_eq!(p.speed, 5.0);
    }

    #[test]
    fn test_speed_resets_at_max() {
        let mut p = particle(13.0, 50.0);
        p.speed = 6.5;
        p.x_dir = -1.0;
        p.update(200.0, 200.0);
        // 6.5 + 1 >= 7 snaps back
        assert_eq!(p.speed, p.initial_speed);
    }

    #[test]
    fn test_stays_inside_and_under_max_speed() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut p = Particle::new(
            ParticleSpec { acceleration: 1.4, max_speed: 9.0, ..spec(100.0, 60.0) },
            &mut rng,
        )
        .unwrap();
        let (w, h) = (240.0, 120.0);
        for _ in 0..5_000 {
            p.update(w, h);
            let inset = p.inset();
            assert!(p.x >= inset && p.x <= w - inset, "x out of bounds: {}", p.x);
            assert!(p.y >= inset && p.y <= h - inset, "y out of bounds: {}", p.y);
            assert!(p.speed < p.max_speed || p.speed == p.initial_speed);
        }
    }

    #[test]
    fn test_tiny_surface_pins_to_center() {
        let mut p = particle(3.0, 3.0);
        p.update(10.0, 10.0);
        assert_eq!(p.x, 5.0);
        assert_eq!(p.y, 5.0);
    }

    #[test]
    fn test_draw_and_clear() {
        let mut surface = Surface::new(100, 100, Rgb::new(0, 0, 0));
        let p = particle(50.0, 50.0);
        p.draw(&mut surface);
        assert!(surface.get(50, 50).is_some());
        p.clear(&mut surface);
        assert_eq!(surface.painted(), 0);
    }

    #[test]
    fn test_cursor_hidden_until_moved() {
        let mut surface = Surface::new(50, 50, Rgb::new(0, 0, 0));
        let mut cursor = Cursor::new(2.0, 1.0, Rgb::new(255, 255, 255));
        cursor.draw(&mut surface);
        assert_eq!(surface.painted(), 0);

        cursor.move_to(20.0, 20.0);
        cursor.draw(&mut surface);
        assert!(surface.get(20, 20).is_some());

        cursor.clear(&mut surface);
        assert_eq!(surface.painted(), 0);
    }
}
