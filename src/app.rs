use crate::braille;
use crate::collection::{default_bind_distance, ParticleCollection};
use crate::color::{self, Rgb};
use crate::config::AppConfig;
use crate::settings::{MAX_BIND_DISTANCE, MAX_PARTICLES};
use crate::surface::Surface;
use anyhow::Result;
use ratatui::layout::Rect;
use tracing::{debug, error, info, warn};

/// Focus state for parameter editing in the sidebar, in panel order
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Focus {
    #[default]
    None,
    Particles,
    Color,
    Rainbow,
    Radius,
    Distance,
    Speed,
    LineWidth,
    LineColor,
    CursorLink,
    CursorDistance,
    ClearMode,
    // Controls box (not a param)
    Controls,
}

impl Focus {
    /// Tab cycles through parameters in panel order
    pub fn next(&self) -> Focus {
        match self {
            Focus::None | Focus::Controls => Focus::Particles,
            Focus::Particles => Focus::Color,
            Focus::Color => Focus::Rainbow,
            Focus::Rainbow => Focus::Radius,
            Focus::Radius => Focus::Distance,
            Focus::Distance => Focus::Speed,
            Focus::Speed => Focus::LineWidth,
            Focus::LineWidth => Focus::LineColor,
            Focus::LineColor => Focus::CursorLink,
            Focus::CursorLink => Focus::CursorDistance,
            Focus::CursorDistance => Focus::ClearMode,
            Focus::ClearMode => Focus::Particles, // Loop back
        }
    }

    /// Shift+Tab cycles backwards
    pub fn prev(&self) -> Focus {
        match self {
            Focus::None | Focus::Controls => Focus::ClearMode,
            Focus::Particles => Focus::ClearMode, // Loop back
            Focus::Color => Focus::Particles,
            Focus::Rainbow => Focus::Color,
            Focus::Radius => Focus::Rainbow,
            Focus::Distance => Focus::Radius,
            Focus::Speed => Focus::Distance,
            Focus::LineWidth => Focus::Speed,
            Focus::LineColor => Focus::LineWidth,
            Focus::CursorLink => Focus::LineColor,
            Focus::CursorDistance => Focus::CursorLink,
            Focus::ClearMode => Focus::CursorDistance,
        }
    }

    /// Line index of this parameter in the parameters box
    pub fn line_index(&self) -> u16 {
        match self {
            Focus::None | Focus::Controls => 0,
            Focus::Particles => 0,
            Focus::Color => 1,
            Focus::Rainbow => 2,
            Focus::Radius => 3,
            Focus::Distance => 4,
            Focus::Speed => 5,
            Focus::LineWidth => 6,
            Focus::LineColor => 7,
            Focus::CursorLink => 8,
            Focus::CursorDistance => 9,
            Focus::ClearMode => 10,
        }
    }

    /// Check if focus is on a parameter (not Controls or None)
    pub fn is_param(&self) -> bool {
        !matches!(self, Focus::None | Focus::Controls)
    }

    /// Parameters that accept a typed `#RRGGBB` value
    pub fn takes_hex(&self) -> bool {
        matches!(self, Focus::Color | Focus::LineColor)
    }
}

/// Typed hex color entry for the Color / Line color parameters
#[derive(Debug, Clone, PartialEq)]
pub struct HexInput {
    pub target: Focus,
    pub buffer: String,
}

/// Main application state
pub struct App {
    pub surface: Surface,
    pub collection: ParticleCollection,
    pub focus: Focus,
    pub fullscreen_mode: bool,
    pub show_help: bool,
    pub help_scroll: u16,
    pub controls_scroll: u16,
    pub hex_input: Option<HexInput>,
    /// Lines drawn in the last frame
    pub last_links: usize,
    canvas_width: u16,
    canvas_height: u16,
}

impl App {
    pub fn new(canvas_width: u16, canvas_height: u16, config: &AppConfig, seed: Option<u64>) -> Result<Self> {
        let (width, height) = braille::calculate_surface_size(canvas_width, canvas_height);
        let background = Rgb::parse_hex(&config.background)?;
        let count = config.particle_count(width);

        let mut collection = ParticleCollection::new(
            width,
            height,
            count,
            config.particle.clone(),
            config.cursor.clone(),
            seed,
        )?;
        collection.clear_mode = config.clear_mode;
        if let Some(distance) = config.bind_distance {
            collection.bind_distance = distance;
        }

        info!(
            width,
            height,
            count,
            bind_distance = collection.bind_distance,
            "particle field created"
        );

        Ok(Self {
            surface: Surface::new(width, height, background),
            collection,
            focus: Focus::Controls,
            fullscreen_mode: false,
            show_help: false,
            help_scroll: 0,
            controls_scroll: 0,
            hex_input: None,
            last_links: 0,
            canvas_width,
            canvas_height,
        })
    }

    /// Run one animation frame
    pub fn tick(&mut self) {
        if let Some(lines) = self.collection.frame(&mut self.surface) {
            self.last_links = lines;
        }
    }

    /// Regenerate particles after a config change
    fn regenerate(&mut self) {
        match self.collection.reset() {
            Ok(()) => debug!(count = self.collection.count, "particles regenerated"),
            Err(err) => error!("failed to regenerate particles: {:#}", err),
        }
        self.surface.clear_completely();
    }

    /// Handle adjusting the currently focused parameter
    pub fn adjust_focused_up(&mut self) {
        match self.focus {
            Focus::None | Focus::Controls => {}
            Focus::Particles => self.adjust_particles(1),
            Focus::Color => self.cycle_color(true),
            Focus::Rainbow => self.toggle_rainbow(),
            Focus::Radius => self.adjust_radius(0.5),
            Focus::Distance => self.adjust_distance(5.0),
            Focus::Speed => self.adjust_speed(1.0),
            Focus::LineWidth => self.adjust_line_width(0.1),
            Focus::LineColor => self.cycle_line_color(true),
            Focus::CursorLink => self.toggle_cursor_links(),
            Focus::CursorDistance => self.adjust_cursor_distance(5.0),
            Focus::ClearMode => self.cycle_clear_mode(),
        }
    }

    /// Handle adjusting the currently focused parameter
    pub fn adjust_focused_down(&mut self) {
        match self.focus {
            Focus::None | Focus::Controls => {}
            Focus::Particles => self.adjust_particles(-1),
            Focus::Color => self.cycle_color(false),
            Focus::Rainbow => self.toggle_rainbow(),
            Focus::Radius => self.adjust_radius(-0.5),
            Focus::Distance => self.adjust_distance(-5.0),
            Focus::Speed => self.adjust_speed(-1.0),
            Focus::LineWidth => self.adjust_line_width(-0.1),
            Focus::LineColor => self.cycle_line_color(false),
            Focus::CursorLink => self.toggle_cursor_links(),
            Focus::CursorDistance => self.adjust_cursor_distance(-5.0),
            Focus::ClearMode => self.cycle_clear_mode(),
        }
    }

    /// Cycle to next focus
    pub fn next_focus(&mut self) {
        self.focus = self.focus.next();
    }

    /// Navigate to previous parameter (Shift+Tab)
    pub fn prev_focus(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Toggle pause state
    pub fn toggle_pause(&mut self) {
        if self.collection.paused {
            self.collection.resume();
        } else {
            self.collection.freeze();
        }
    }

    /// Regenerate particles with the current settings
    pub fn reset(&mut self) {
        self.regenerate();
    }

    /// Change the particle count (clamped to 1..=MAX_PARTICLES)
    pub fn adjust_particles(&mut self, delta: i32) {
        let count = (self.collection.count as i32 + delta).clamp(1, MAX_PARTICLES as i32) as usize;
        if count != self.collection.count {
            match self.collection.set_count(count) {
                Ok(()) => debug!(count, "particles regenerated"),
                Err(err) => error!("failed to regenerate particles: {:#}", err),
            }
            self.surface.clear_completely();
        }
    }

    /// Step the particle color through the swatches; disabled in rainbow mode
    pub fn cycle_color(&mut self, forward: bool) {
        if self.collection.config.rainbow {
            return;
        }
        let current = self.collection.config.primary_color().to_string();
        let next = if forward {
            color::next_swatch(&current)
        } else {
            color::prev_swatch(&current)
        };
        self.collection.config.set_primary_color(next);
        self.regenerate();
    }

    pub fn toggle_rainbow(&mut self) {
        let on = !self.collection.config.rainbow;
        self.collection.config.set_rainbow(on);
        self.regenerate();
    }

    pub fn adjust_radius(&mut self, delta: f32) {
        self.collection.config.adjust_max_radius(delta);
        self.regenerate();
    }

    /// Bind distance applies on the next frame; no regeneration
    pub fn adjust_distance(&mut self, delta: f32) {
        self.collection.bind_distance = (self.collection.bind_distance + delta).clamp(0.0, MAX_BIND_DISTANCE);
    }

    pub fn adjust_speed(&mut self, delta: f32) {
        self.collection.config.adjust_max_speed(delta);
        self.regenerate();
    }

    pub fn adjust_line_width(&mut self, delta: f32) {
        self.collection.config.adjust_line_width(delta);
    }

    pub fn cycle_line_color(&mut self, forward: bool) {
        let current = &self.collection.config.line_color;
        let next = if forward {
            color::next_swatch(current)
        } else {
            color::prev_swatch(current)
        };
        self.collection.config.line_color = next.to_string();
    }

    pub fn toggle_cursor_links(&mut self) {
        self.collection.cursor_settings.enabled = !self.collection.cursor_settings.enabled;
        if !self.collection.cursor_settings.enabled {
            self.collection.cursor.clear(&mut self.surface);
        }
    }

    pub fn adjust_cursor_distance(&mut self, delta: f32) {
        self.collection.cursor_settings.adjust_bind_distance(delta);
    }

    pub fn cycle_clear_mode(&mut self) {
        self.collection.clear_mode = self.collection.clear_mode.next();
        self.surface.clear_completely();
    }

    /// Toggle the sidebar
    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen_mode = !self.fullscreen_mode;
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        if self.show_help {
            self.help_scroll = 0; // Reset scroll when opening
        }
    }

    /// Scroll help content up
    pub fn scroll_help_up(&mut self) {
        self.help_scroll = self.help_scroll.saturating_sub(1);
    }

    /// Scroll help content down
    pub fn scroll_help_down(&mut self, max_scroll: u16) {
        self.help_scroll = (self.help_scroll + 1).min(max_scroll);
    }

    /// Scroll controls box up
    pub fn scroll_controls_up(&mut self) {
        self.controls_scroll = self.controls_scroll.saturating_sub(1);
    }

    /// Scroll controls box down
    pub fn scroll_controls_down(&mut self, max_scroll: u16) {
        self.controls_scroll = (self.controls_scroll + 1).min(max_scroll);
    }

    /// Resize the surface to a new canvas size; particles are kept
    pub fn resize(&mut self, canvas_width: u16, canvas_height: u16) {
        self.canvas_width = canvas_width;
        self.canvas_height = canvas_height;
        let (width, height) = braille::calculate_surface_size(canvas_width, canvas_height);
        self.surface.resize(width, height);
        self.collection.resize(width, height);
        debug!(width, height, "surface resized");
    }

    /// Mouse moved to terminal cell (column, row); `canvas` is the inner canvas rect
    pub fn mouse_moved(&mut self, column: u16, row: u16, canvas: Rect) {
        let inside = column >= canvas.x
            && column < canvas.x + canvas.width
            && row >= canvas.y
            && row < canvas.y + canvas.height;

        if inside {
            let (x, y) = braille::cell_to_surface(
                column - canvas.x,
                row - canvas.y,
                self.canvas_width,
                self.canvas_height,
                &self.surface,
            );
            self.collection.cursor.move_to(x, y);
        } else {
            self.collection.cursor.hide();
        }
    }

    // === Hex color entry ===

    /// Start typing a hex color for the focused parameter
    pub fn open_hex_input(&mut self) {
        if !self.focus.takes_hex() || (self.focus == Focus::Color && self.collection.config.rainbow) {
            return;
        }
        self.hex_input = Some(HexInput {
            target: self.focus,
            buffer: String::from("#"),
        });
    }

    pub fn hex_input_push(&mut self, c: char) {
        if let Some(input) = &mut self.hex_input {
            if c.is_ascii_hexdigit() && input.buffer.len() < 7 {
                input.buffer.push(c.to_ascii_uppercase());
            }
        }
    }

    pub fn hex_input_backspace(&mut self) {
        if let Some(input) = &mut self.hex_input {
            if input.buffer.len() > 1 {
                input.buffer.pop();
            }
        }
    }

    pub fn cancel_hex_input(&mut self) {
        self.hex_input = None;
    }

    /// Apply the typed color if it is a full `#RRGGBB`; otherwise keep the old one
    pub fn confirm_hex_input(&mut self) {
        let Some(input) = self.hex_input.take() else {
            return;
        };
        if !color::is_hex_color(&input.buffer) {
            warn!(value = %input.buffer, "ignoring invalid hex color");
            return;
        }
        match input.target {
            Focus::Color => {
                self.collection.config.set_primary_color(&input.buffer);
                self.regenerate();
            }
            Focus::LineColor => self.collection.config.line_color = input.buffer,
            _ => {}
        }
    }

    /// Bind distance the collection would pick for its current count
    pub fn default_bind_distance(&self) -> f32 {
        default_bind_distance(self.collection.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ClearMode;

    fn app() -> App {
        App::new(100, 30, &AppConfig::default(), Some(3)).unwrap()
    }

    #[test]
    fn test_new_sizes_surface_and_count() {
        let app = app();
        assert_eq!(app.surface.width(), 200);
        assert_eq!(app.surface.height(), 120);
        assert_eq!(app.collection.particles.len(), 15);
        assert_eq!(app.collection.bind_distance, 100.0);
    }

    #[test]
    fn test_config_overrides_apply() {
        let config = AppConfig {
            particles: Some(5),
            bind_distance: Some(42.0),
            clear_mode: ClearMode::Trails,
            ..Default::default()
        };
        let app = App::new(100, 30, &config, Some(1)).unwrap();
        assert_eq!(app.collection.particles.len(), 5);
        assert_eq!(app.collection.bind_distance, 42.0);
        assert_eq!(app.collection.clear_mode, ClearMode::Trails);
    }

    #[test]
    fn test_focus_cycle_round_trip() {
        let mut focus = Focus::Particles;
        for _ in 0..11 {
            focus = focus.next();
        }
        assert_eq!(focus, Focus::Particles);
        assert_eq!(Focus::Particles.prev(), Focus::ClearMode);
        assert_eq!(Focus::Controls.next(), Focus::Particles);
        for focus in [Focus::Color, Focus::Speed, Focus::ClearMode] {
            assert_eq!(focus.next().prev(), focus);
        }
    }

    #[test]
    fn test_adjust_particles_regenerates() {
        let mut app = app();
        app.focus = Focus::Particles;
        app.adjust_focused_up();
        assert_eq!(app.collection.particles.len(), 16);
        app.adjust_particles(-1000);
        assert_eq!(app.collection.particles.len(), 1);
        app.adjust_particles(10_000);
        assert_eq!(app.collection.particles.len(), MAX_PARTICLES);
    }

    #[test]
    fn test_failed_count_change_keeps_count_in_sync() {
        let mut app = app();
        app.collection.config.colors = vec!["bogus".into()];
        app.adjust_particles(5);
        assert_eq!(app.collection.count, 15);
        assert_eq!(app.collection.particles.len(), 15);
    }

    #[test]
    fn test_distance_does_not_regenerate() {
        let mut app = app();
        let before: Vec<f32> = app.collection.particles.iter().map(|p| p.x).collect();
        app.focus = Focus::Distance;
        app.adjust_focused_up();
        assert_eq!(app.collection.bind_distance, 105.0);
        let after: Vec<f32> = app.collection.particles.iter().map(|p| p.x).collect();
        assert_eq!(before, after);

        app.adjust_distance(-10_000.0);
        assert_eq!(app.collection.bind_distance, 0.0);
    }

    #[test]
    fn test_color_disabled_in_rainbow_mode() {
        let mut app = app();
        app.focus = Focus::Color;
        app.adjust_focused_up();
        assert_eq!(app.collection.config.primary_color(), color::SWATCHES[1]);

        app.toggle_rainbow();
        let palette = app.collection.config.colors.clone();
        app.cycle_color(true);
        assert_eq!(app.collection.config.colors, palette);

        app.open_hex_input();
        assert!(app.hex_input.is_none());

        app.toggle_rainbow();
        assert_eq!(app.collection.config.primary_color(), color::WHITE);
    }

    #[test]
    fn test_hex_input_applies_valid_color() {
        let mut app = app();
        app.focus = Focus::LineColor;
        app.open_hex_input();
        for c in "ff00zz80".chars() {
            app.hex_input_push(c);
        }
        // 'z' is dropped, the rest fills the six digits
        assert_eq!(app.hex_input.as_ref().unwrap().buffer, "#FF0080");
        app.confirm_hex_input();
        assert_eq!(app.collection.config.line_color, "#FF0080");
        assert!(app.hex_input.is_none());
    }

    #[test]
    fn test_hex_input_rejects_partial_color() {
        let mut app = app();
        app.focus = Focus::Color;
        app.open_hex_input();
        app.hex_input_push('A');
        app.hex_input_push('B');
        app.hex_input_backspace();
        app.confirm_hex_input();
        assert_eq!(app.collection.config.primary_color(), color::WHITE);
    }

    #[test]
    fn test_hex_input_only_for_color_params() {
        let mut app = app();
        app.focus = Focus::Speed;
        app.open_hex_input();
        assert!(app.hex_input.is_none());
    }

    #[test]
    fn test_mouse_moves_and_hides_cursor() {
        let mut app = app();
        let canvas = Rect { x: 10, y: 1, width: 100, height: 30 };
        app.mouse_moved(20, 6, canvas);
        assert!(app.collection.cursor.visible);
        assert_eq!((app.collection.cursor.x, app.collection.cursor.y), (21.0, 22.0));

        app.mouse_moved(2, 6, canvas);
        assert!(!app.collection.cursor.visible);
    }

    #[test]
    fn test_resize_keeps_particles() {
        let mut app = app();
        app.resize(40, 10);
        assert_eq!(app.surface.width(), 80);
        assert_eq!(app.surface.height(), 40);
        assert_eq!(app.collection.particles.len(), 15);
        app.tick();
        for p in &app.collection.particles {
            assert!(p.x <= 80.0 - p.inset());
            assert!(p.y <= 40.0 - p.inset());
        }
    }

    #[test]
    fn test_pause_stops_ticks() {
        let mut app = app();
        app.toggle_pause();
        app.tick();
        assert_eq!(app.collection.frames, 0);
        app.toggle_pause();
        app.tick();
        assert_eq!(app.collection.frames, 1);
    }
}
