use super::{Cell, FrameBuffer, Layer, Tone};
use std::f32::consts::PI;

/// Life lost per tick.
pub const DECAY: f32 = 0.05;
/// Added to `vy` per tick, after the position step.
pub const GRAVITY: f32 = 0.1;
pub const DEFAULT_BURST: usize = 20;

const PALETTE: [Tone; 6] = [
    Tone::BrightRed,
    Tone::BrightYellow,
    Tone::BrightGreen,
    Tone::BrightCyan,
    Tone::BrightMagenta,
    Tone::BrightWhite,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Star,
    Heart,
    Note,
    Sparkle,
    Diamond,
}

impl Glyph {
    pub const ALL: [Glyph; 5] = [
        Glyph::Star,
        Glyph::Heart,
        Glyph::Note,
        Glyph::Sparkle,
        Glyph::Diamond,
    ];

    pub fn symbol(self) -> char {
        match self {
            Glyph::Star => '★',
            Glyph::Heart => '♥',
            Glyph::Note => '♪',
            Glyph::Sparkle => '✦',
            Glyph::Diamond => '◆',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub life: f32,
    /// Only used for [`Particle::intensity`]; never decremented.
    pub max_life: f32,
    pub glyph: Glyph,
    pub tone: Tone,
}

impl Particle {
    pub fn intensity(&self) -> f32 {
        if self.max_life > 0.0 {
            self.life / self.max_life
        } else {
            0.0
        }
    }
}

/// Burst particles with simple ballistic motion.
pub struct ParticleSystem {
    width: usize,
    height: usize,
    particles: Vec<Particle>,
    rng: fastrand::Rng,
}

impl ParticleSystem {
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_rng(width, height, fastrand::Rng::new())
    }

    pub fn with_rng(width: usize, height: usize, rng: fastrand::Rng) -> Self {
        Self {
            width,
            height,
            particles: Vec::new(),
            rng,
        }
    }

    /// Appends `count` particles flying out of (x, y) in random directions.
    /// There is no cap on the total; callers control growth.
    pub fn explode(&mut self, x: f32, y: f32, count: usize) {
        self.particles.reserve(count);
        for _ in 0..count {
            let angle = self.rng.f32() * PI * 2.0;
            let speed = 0.5 + self.rng.f32() * 1.5;
            // life and max_life are drawn separately on purpose, so a
            // particle may start above or below full intensity.
            let life = 1.0 + self.rng.f32() * 2.0;
            let max_life = 1.0 + self.rng.f32() * 2.0;

            self.particles.push(Particle {
                x,
                y,
                vx: speed * angle.cos(),
                vy: speed * angle.sin(),
                life,
                max_life,
                glyph: Glyph::ALL[self.rng.usize(0..Glyph::ALL.len())],
                tone: PALETTE[self.rng.usize(0..PALETTE.len())],
            });
        }
    }

    /// One physics step. The position moves with the current velocity before
    /// gravity is applied, so gravity shows up in the next tick's motion.
    /// Survivors replace the old set wholesale.
    pub fn advance(&mut self) {
        let (width, height) = (self.width as f32, self.height as f32);
        self.particles = std::mem::take(&mut self.particles)
            .into_iter()
            .filter_map(|mut p| {
                p.x += p.vx;
                p.y += p.vy;
                p.life -= DECAY;
                p.vy += GRAVITY;

                let alive = p.life > 0.0;
                let visible = (0.0..width).contains(&p.x) && (0.0..height).contains(&p.y);
                (alive && visible).then_some(p)
            })
            .collect();
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn push(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

impl Layer for ParticleSystem {
    fn update(&mut self) {
        self.advance();
    }

    fn draw(&self, frame: &mut FrameBuffer) {
        for p in &self.particles {
            frame.put(p.x, p.y, Cell::Styled(p.glyph.symbol(), p.tone));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system() -> ParticleSystem {
        ParticleSystem::with_rng(80, 24, fastrand::Rng::with_seed(42))
    }

    fn particle(x: f32, y: f32, vx: f32, vy: f32, life: f32) -> Particle {
        Particle {
            x,
            y,
            vx,
            vy,
            life,
            max_life: 2.0,
            glyph: Glyph::Heart,
            tone: Tone::BrightRed,
        }
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn explode_adds_exactly_count_particles() {
        let mut system = system();
        assert!(system.is_empty());

        system.explode(10.0, 10.0, 5);

        assert_eq!(system.len(), 5);
        for p in system.particles() {
            assert_eq!((p.x, p.y), (10.0, 10.0));
            let speed = (p.vx * p.vx + p.vy * p.vy).sqrt();
            assert!((0.5 - 1e-4..=2.0 + 1e-4).contains(&speed));
            assert!((1.0..=3.0).contains(&p.life));
            assert!((1.0..=3.0).contains(&p.max_life));
        }
    }

    #[test]
    fn explode_appends_to_existing_set() {
        let mut system = system();
        system.explode(10.0, 10.0, DEFAULT_BURST);
        system.explode(20.0, 5.0, 3);
        assert_eq!(system.len(), DEFAULT_BURST + 3);
    }

    #[test]
    fn life_and_max_life_are_drawn_independently() {
        let mut system = system();
        system.explode(40.0, 12.0, 50);
        assert!(system.particles().iter().any(|p| p.life != p.max_life));
    }

    #[test]
    fn advance_moves_before_applying_gravity() {
        let mut system = system();
        system.push(particle(10.0, 10.0, 1.0, 0.5, 2.0));

        system.advance();
        let p = system.particles()[0];
        assert!(close(p.x, 11.0));
        assert!(close(p.y, 10.5));
        assert!(close(p.life, 1.95));
        assert!(close(p.vy, 0.6));

        system.advance();
        let p = system.particles()[0];
        assert!(close(p.x, 12.0));
        assert!(close(p.y, 11.1));
        assert!(close(p.vy, 0.7));
    }

    #[test]
    fn particle_reaching_zero_life_is_pruned() {
        let mut system = system();
        system.push(particle(10.0, 10.0, 0.0, 0.0, DECAY));
        system.push(particle(10.0, 10.0, 0.0, 0.0, DECAY * 2.0));

        system.advance();

        assert_eq!(system.len(), 1);
    }

    #[test]
    fn particle_leaving_the_grid_is_pruned() {
        let mut system = system();
        system.push(particle(0.2, 10.0, -1.0, 0.0, 2.0));
        system.push(particle(79.5, 10.0, 1.0, 0.0, 2.0));
        system.push(particle(10.0, 0.1, 0.0, -0.5, 2.0));
        system.push(particle(10.0, 23.5, 0.0, 1.0, 2.0));
        system.push(particle(10.0, 10.0, 0.0, 0.0, 2.0));

        system.advance();

        assert_eq!(system.len(), 1);
        assert!(close(system.particles()[0].x, 10.0));
    }

    #[test]
    fn particles_draw_over_stars() {
        use crate::scene::{Star, StarField};

        let mut stars = StarField::with_rng(80, 24, fastrand::Rng::with_seed(3));
        stars.set_stars(vec![Star {
            x: 5.0,
            y: 5.0,
            speed: 0.1,
            brightness: 1.0,
        }]);
        let mut system = system();
        system.push(particle(5.4, 5.9, 0.0, 0.0, 1.0));

        let mut frame = FrameBuffer::new(80, 24);
        stars.draw(&mut frame);
        system.draw(&mut frame);

        assert_eq!(frame.get(5, 5), Some(Cell::Styled('♥', Tone::BrightRed)));
    }

    #[test]
    fn intensity_is_life_over_max_life() {
        let p = particle(0.0, 0.0, 0.0, 0.0, 1.0);
        assert!(close(p.intensity(), 0.5));
    }
}
