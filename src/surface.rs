use crate::color::Rgb;

/// Lines fainter than this still show up
const MIN_LINE_INTENSITY: f32 = 0.35;

/// Peak glow intensity right at the rim of a disc
const GLOW_INTENSITY: f32 = 0.6;

/// Paint order of a dot; a dot is only overwritten by an equal or higher layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Glow,
    Line,
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dot {
    pub color: Rgb,
    pub layer: Layer,
}

/// Dot buffer the particles are painted on.
///
/// One dot is one Braille sub-cell, so a terminal cell holds 2x4 dots.
/// Coordinates are in dots; dot (i, j) covers the square [i, i+1) x [j, j+1).
pub struct Surface {
    width: usize,
    height: usize,
    dots: Vec<Option<Dot>>,
    pub background: Rgb,
}

impl Surface {
    pub fn new(width: usize, height: usize, background: Rgb) -> Self {
        Self {
            width,
            height,
            dots: vec![None; width * height],
            background,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Resize the buffer; contents are discarded
    pub fn resize(&mut self, width: usize, height: usize) {
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.dots = vec![None; width * height];
        } else {
            self.clear_completely();
        }
    }

    pub fn clear_completely(&mut self) {
        self.dots.fill(None);
    }

    /// Clear the rectangle with top-left (x, y) and the given size
    pub fn clear_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let x0 = x.floor().max(0.0) as usize;
        let y0 = y.floor().max(0.0) as usize;
        let x1 = ((x + w).ceil().max(0.0) as usize).min(self.width);
        let y1 = ((y + h).ceil().max(0.0) as usize).min(self.height);

        for row in y0..y1 {
            let start = row * self.width;
            for col in x0..x1 {
                self.dots[start + col] = None;
            }
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Dot> {
        if x < self.width && y < self.height {
            self.dots[y * self.width + x]
        } else {
            None
        }
    }

    fn plot(&mut self, x: i64, y: i64, dot: Dot) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        match self.dots[idx] {
            Some(existing) if existing.layer > dot.layer => {}
            _ => self.dots[idx] = Some(dot),
        }
    }

    /// Filled disc with a glow halo `blur` dots wide around it
    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgb, blur: f32, shadow_color: Rgb) {
        let outer = radius + blur.max(0.0);
        let x0 = (cx - outer).floor() as i64;
        let x1 = (cx + outer).ceil() as i64;
        let y0 = (cy - outer).floor() as i64;
        let y1 = (cy + outer).ceil() as i64;

        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let dist = (dx * dx + dy * dy).sqrt();

                if dist <= radius {
                    self.plot(x, y, Dot { color, layer: Layer::Body });
                } else if blur > 0.0 && dist <= outer {
                    let falloff = 1.0 - (dist - radius) / blur;
                    let glow = self.background.lerp(shadow_color, GLOW_INTENSITY * falloff);
                    self.plot(x, y, Dot { color: glow, layer: Layer::Glow });
                }
            }
        }
    }

    /// Straight line between two points.
    ///
    /// Widths below one dot are drawn one dot thick but fainter; wider lines
    /// use a square brush.
    pub fn line_from_to(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgb) {
        let intensity = MIN_LINE_INTENSITY + (1.0 - MIN_LINE_INTENSITY) * width.clamp(0.0, 1.0);
        let dot = Dot {
            color: self.background.lerp(color, intensity),
            layer: Layer::Line,
        };
        let brush = ((width.round().max(1.0) as i64) - 1) / 2;

        // Bresenham
        let (mut x, mut y) = (from.0.floor() as i64, from.1.floor() as i64);
        let (x1, y1) = (to.0.floor() as i64, to.1.floor() as i64);
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            for by in -brush..=brush {
                for bx in -brush..=brush {
                    self.plot(x + bx, y + by, dot);
                }
            }
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    #[cfg(test)]
    pub fn painted(&self) -> usize {
        self.dots.iter().filter(|d| d.is_some()).count()
    }
}
