use crate::surface::{Dot, Surface};
use ratatui::style::Color;

/// Braille character rendering for high-resolution terminal graphics.
/// Each Braille character represents a 2x4 grid of dots (8 dots total).
///
/// Dot positions and their bit values:
/// ```text
/// (0,0)=0x01  (1,0)=0x08
/// (0,1)=0x02  (1,1)=0x10
/// (0,2)=0x04  (1,2)=0x20
/// (0,3)=0x40  (1,3)=0x80
/// ```
///
/// Unicode Braille patterns: U+2800 to U+28FF (256 patterns)
const BRAILLE_BASE: u32 = 0x2800;

/// Dot position to bit mapping for Braille characters
const BRAILLE_DOTS: [[u8; 4]; 2] = [
    [0x01, 0x02, 0x04, 0x40], // Left column (x=0): rows 0,1,2,3
    [0x08, 0x10, 0x20, 0x80], // Right column (x=1): rows 0,1,2,3
];

/// Smallest surface the collection runs on, in dots
const MIN_SURFACE_DOTS: usize = 16;

/// A single rendered Braille cell with position and color
#[derive(Clone, Copy)]
pub struct BrailleCell {
    pub x: u16,
    pub y: u16,
    pub char: char,
    pub color: Color,
}

/// Render the surface into Braille characters for a canvas of the given cell size.
///
/// A cell takes the color of its highest-layer dot, so particle bodies win
/// over lines and lines win over glow.
pub fn render_to_braille(surface: &Surface, canvas_width: u16, canvas_height: u16) -> Vec<BrailleCell> {
    let braille_width = canvas_width as usize * 2;
    let braille_height = canvas_height as usize * 4;
    if braille_width == 0 || braille_height == 0 {
        return Vec::new();
    }

    let scale_x = surface.width() as f32 / braille_width as f32;
    let scale_y = surface.height() as f32 / braille_height as f32;

    let mut cells = Vec::with_capacity(canvas_width as usize * canvas_height as usize);

    for cy in 0..canvas_height {
        for cx in 0..canvas_width {
            let mut pattern: u8 = 0;
            let mut top: Option<Dot> = None;

            let base_bx = cx as usize * 2;
            let base_by = cy as usize * 4;

            for dx in 0..2 {
                for dy in 0..4 {
                    let sx = ((base_bx + dx) as f32 * scale_x) as usize;
                    let sy = ((base_by + dy) as f32 * scale_y) as usize;

                    if let Some(dot) = surface.get(sx, sy) {
                        pattern |= BRAILLE_DOTS[dx][dy];
                        if top.map_or(true, |t| dot.layer > t.layer) {
                            top = Some(dot);
                        }
                    }
                }
            }

            if let Some(dot) = top {
                let braille_char = char::from_u32(BRAILLE_BASE + pattern as u32).unwrap_or(' ');
                cells.push(BrailleCell {
                    x: cx,
                    y: cy,
                    char: braille_char,
                    color: dot.color.to_color(),
                });
            }
        }
    }

    cells
}

/// Surface size in dots for a canvas of the given cell size
pub fn calculate_surface_size(canvas_width: u16, canvas_height: u16) -> (usize, usize) {
    let width = (canvas_width as usize * 2).max(MIN_SURFACE_DOTS);
    let height = (canvas_height as usize * 4).max(MIN_SURFACE_DOTS);
    (width, height)
}

/// Map a cell inside the canvas to the surface dot at its centre
pub fn cell_to_surface(col: u16, row: u16, canvas_width: u16, canvas_height: u16, surface: &Surface) -> (f32, f32) {
    let braille_width = (canvas_width as f32 * 2.0).max(1.0);
    let braille_height = (canvas_height as f32 * 4.0).max(1.0);
    let scale_x = surface.width() as f32 / braille_width;
    let scale_y = surface.height() as f32 / braille_height;
    (
        (col as f32 * 2.0 + 1.0) * scale_x,
        (row as f32 * 4.0 + 2.0) * scale_y,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    #[test]
    fn test_braille_pattern() {
        assert_eq!(BRAILLE_DOTS[0][0], 0x01);
        assert_eq!(BRAILLE_DOTS[1][0], 0x08);
        assert_eq!(BRAILLE_DOTS[0][3], 0x40);
        assert_eq!(BRAILLE_DOTS[1][3], 0x80);

        // All dots should give 0xFF
        let all_dots: u8 = BRAILLE_DOTS[0].iter().sum::<u8>() + BRAILLE_DOTS[1].iter().sum::<u8>();
        assert_eq!(all_dots, 0xFF);
    }

    #[test]
    fn test_empty_surface_renders_nothing() {
        let surface = Surface::new(20, 40, Rgb::new(0, 0, 0));
        assert!(render_to_braille(&surface, 10, 10).is_empty());
    }

    #[test]
    fn test_full_cell_and_top_layer_color() {
        let bg = Rgb::new(0, 0, 0);
        let red = Rgb::new(255, 0, 0);
        let white = Rgb::new(255, 255, 255);
        let mut surface = Surface::new(4, 8, bg);
        // a line across the first cell, then a body dot on top of one corner
        for y in 0..4 {
            surface.line_from_to((0.0, y as f32), (1.0, y as f32), 1.0, red);
        }
        surface.fill_circle(0.5, 0.5, 0.5, white, 0.0, white);

        let cells = render_to_braille(&surface, 2, 2);
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].char, '\u{28FF}');
        assert_eq!(cells[0].color, Color::Rgb(255, 255, 255));
        assert_eq!((cells[0].x, cells[0].y), (0, 0));
    }

    #[test]
    fn test_surface_size_has_minimum() {
        assert_eq!(calculate_surface_size(100, 30), (200, 120));
        assert_eq!(calculate_surface_size(0, 0), (MIN_SURFACE_DOTS, MIN_SURFACE_DOTS));
    }

    #[test]
    fn test_cell_to_surface_centre() {
        let surface = Surface::new(200, 120, Rgb::new(0, 0, 0));
        assert_eq!(cell_to_surface(0, 0, 100, 30, &surface), (1.0, 2.0));
        assert_eq!(cell_to_surface(10, 5, 100, 30, &surface), (21.0, 22.0));
    }
}
