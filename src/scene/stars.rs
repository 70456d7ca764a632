use super::{Cell, FrameBuffer, Layer};

const BRIGHT_MARKER: char = '*';
const DIM_MARKER: char = '.';

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub x: f32,
    pub y: f32,
    pub speed: f32,
    pub brightness: f32,
}

impl Star {
    pub fn marker(&self) -> char {
        if self.brightness * 5.0 > 2.0 {
            BRIGHT_MARKER
        } else {
            DIM_MARKER
        }
    }
}

/// Background stars drifting right to left. Stars are never removed; one that
/// leaves the left edge comes back on the right at a new row.
pub struct StarField {
    width: usize,
    height: usize,
    stars: Vec<Star>,
    rng: fastrand::Rng,
}

impl StarField {
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_rng(width, height, fastrand::Rng::new())
    }

    pub fn with_rng(width: usize, height: usize, rng: fastrand::Rng) -> Self {
        Self {
            width,
            height,
            stars: Vec::new(),
            rng,
        }
    }

    pub fn initialize(&mut self, count: usize) {
        let (width, height) = (self.width as f32, self.height as f32);
        let rng = &mut self.rng;
        self.stars = (0..count)
            .map(|_| Star {
                x: rng.f32() * width,
                y: rng.f32() * height,
                speed: 0.1 + rng.f32() * 0.4,
                brightness: 0.3 + rng.f32() * 0.7,
            })
            .collect();
    }

    pub fn advance(&mut self) {
        for star in &mut self.stars {
            star.x -= star.speed;
            if star.x < 0.0 {
                star.x = self.width as f32;
                star.y = self.rng.usize(0..self.height.max(1)) as f32;
            }
        }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    /// Replaces the star set as-is.
    pub fn set_stars(&mut self, stars: Vec<Star>) {
        self.stars = stars;
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }
}

impl Layer for StarField {
    fn update(&mut self) {
        self.advance();
    }

    fn draw(&self, frame: &mut FrameBuffer) {
        for star in &self.stars {
            frame.put(star.x, star.y, Cell::Plain(star.marker()));
        }
    }
}
