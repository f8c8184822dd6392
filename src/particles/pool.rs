use std::collections::VecDeque;
use std::f32::consts::TAU;

use bevy::math::Vec2;
use rand::Rng;
use serde::Deserialize;

/// Tunables for the scan particle pool. Units are pixels and ticks.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Hard cap on live particles; the oldest is evicted past this
    pub capacity: usize,
    /// Downward acceleration per tick (+y is down)
    pub gravity: f32,
    /// Velocity multiplier per tick
    pub drag: f32,
    pub speed: (f32, f32),
    /// Upper bound of the random upward kick added at birth
    pub max_lift: f32,
    pub size: (f32, f32),
    /// Ticks to live, half-open range
    pub life: (i32, i32),
    /// Fade denominator, half-open range
    pub ttl: (i32, i32),
    /// Hue band in degrees (cyan to blue)
    pub hue: (f32, f32),
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            capacity: 2500,
            gravity: 0.03,
            drag: 0.994,
            speed: (1.0, 4.0),
            max_lift: 1.2,
            size: (0.1, 1.1),
            life: (40, 50),
            ttl: (40, 90),
            hue: (180.0, 260.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: f32,
    pub remaining_life: i32,
    pub total_ttl: i32,
    pub hue: f32,
}

impl Particle {
    /// Linear fade, clamped to [0, 1]
    pub fn opacity(&self) -> f32 {
        if self.total_ttl <= 0 {
            return 0.0;
        }
        (self.remaining_life as f32 / self.total_ttl as f32).clamp(0.0, 1.0)
    }

    /// Advance one tick. Returns false once the particle has expired.
    fn step(&mut self, gravity: f32, drag: f32) -> bool {
        self.velocity.y += gravity;
        self.velocity *= drag;
        self.position += self.velocity;
        self.remaining_life -= 1;
        self.remaining_life > 0
    }
}

/// Bounded FIFO of live particles. Newest particles live at the back.
#[derive(Debug, Clone)]
pub struct ParticlePool {
    particles: VecDeque<Particle>,
    config: ParticleConfig,
}

impl ParticlePool {
    pub fn new(config: ParticleConfig) -> Self {
        Self {
            particles: VecDeque::with_capacity(config.capacity),
            config,
        }
    }

    #[cfg(test)]
    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }

    /// Spawn `count` particles at `origin` with randomized motion and look
    pub fn emit(&mut self, origin: Vec2, count: usize, rng: &mut impl Rng) {
        if !origin.is_finite() {
            log::warn!("Dropping emission at non-finite origin {origin}");
            return;
        }

        for _ in 0..count {
            let angle = rng.random_range(0.0..TAU);
            let speed = sample(rng, self.config.speed);
            let lift = if self.config.max_lift > 0.0 {
                rng.random_range(0.0..self.config.max_lift)
            } else {
                0.0
            };

            let velocity = Vec2::new(angle.cos() * speed, angle.sin() * speed - lift);

            self.push(Particle {
                position: origin,
                velocity,
                size: sample(rng, self.config.size),
                remaining_life: sample_ticks(rng, self.config.life),
                total_ttl: sample_ticks(rng, self.config.ttl),
                hue: sample(rng, self.config.hue),
            });
        }
    }

    /// Append a particle, evicting the oldest ones when over capacity
    pub fn push(&mut self, particle: Particle) {
        if self.config.capacity == 0 {
            return;
        }
        self.particles.push_back(particle);
        while self.particles.len() > self.config.capacity {
            self.particles.pop_front();
        }
    }

    /// Physics pass: gravity, drag, integrate, age, cull
    pub fn step(&mut self) {
        let gravity = self.config.gravity;
        let drag = self.config.drag;
        self.particles.retain_mut(|p| p.step(gravity, drag));
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Oldest first
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Particle> + DoubleEndedIterator {
        self.particles.iter()
    }

    /// The `limit` most recently created particles, oldest of them first
    pub fn newest(&self, limit: usize) -> impl ExactSizeIterator<Item = &Particle> {
        let skip = self.particles.len().saturating_sub(limit);
        self.particles.range(skip..)
    }
}

fn sample(rng: &mut impl Rng, (min, max): (f32, f32)) -> f32 {
    if min < max {
        rng.random_range(min..max)
    } else {
        min
    }
}

fn sample_ticks(rng: &mut impl Rng, (min, max): (i32, i32)) -> i32 {
    if min < max {
        rng.random_range(min..max)
    } else {
        min
    }
}
