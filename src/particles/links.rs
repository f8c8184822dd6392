use bevy::math::Vec2;
use serde::Deserialize;

use super::pool::{Particle, ParticlePool};

/// Brightest a link is ever drawn
const MAX_LINK_ALPHA: f32 = 0.9;
/// Line width of a link between coincident particles
const MAX_LINK_WIDTH: f32 = 0.8;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Pixels; pairs further apart than this are not linked
    pub link_distance: f32,
    /// Only the newest this-many particles are considered for links
    pub sample_limit: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            link_distance: 100.0,
            sample_limit: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkWeight {
    /// 1 at zero distance, 0 at the link distance
    pub closeness: f32,
    pub alpha: f32,
    pub width: f32,
    /// Degrees, midpoint of both endpoint hues
    pub hue: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityLink {
    pub from: Vec2,
    pub to: Vec2,
    pub weight: LinkWeight,
}

/// Closeness `1 - d / max_distance` when `d² <= max_distance²`
pub fn falloff(distance_sq: f32, max_distance: f32) -> Option<f32> {
    if max_distance <= 0.0 || distance_sq > max_distance * max_distance {
        return None;
    }
    Some(1.0 - distance_sq.sqrt() / max_distance)
}

/// Link weight between two particles. Symmetric in `a` and `b`.
pub fn link_between(a: &Particle, b: &Particle, max_distance: f32) -> Option<LinkWeight> {
    let closeness = falloff(a.position.distance_squared(b.position), max_distance)?;
    let fade = a.opacity().min(b.opacity());

    Some(LinkWeight {
        closeness,
        alpha: (closeness * MAX_LINK_ALPHA * fade).min(MAX_LINK_ALPHA),
        width: MAX_LINK_WIDTH * closeness,
        hue: ((a.hue + b.hue) / 2.0).round(),
    })
}

/// All links among the sampled particles. O(min(n, sample_limit)²), read-only.
pub fn proximity_links(pool: &ParticlePool, config: &LinkConfig) -> Vec<ProximityLink> {
    let sample: Vec<&Particle> = pool.newest(config.sample_limit).collect();
    let mut links = Vec::new();

    for (i, a) in sample.iter().enumerate() {
        for b in &sample[i + 1..] {
            if let Some(weight) = link_between(a, b, config.link_distance) {
                links.push(ProximityLink {
                    from: a.position,
                    to: b.position,
                    weight,
                });
            }
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particles::pool::ParticleConfig;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn particle_at(x: f32, y: f32, life: i32, hue: f32) -> Particle {
        Particle {
            position: Vec2::new(x, y),
            velocity: Vec2::ZERO,
            size: 1.0,
            remaining_life: life,
            total_ttl: 60,
            hue,
        }
    }

    #[test]
    fn test_link_is_symmetric() {
        let mut rng = StdRng::seed_from_u64(99);

        for _ in 0..500 {
            let a = particle_at(
                rng.random_range(0.0..300.0),
                rng.random_range(0.0..300.0),
                rng.random_range(1..60),
                rng.random_range(180.0..260.0),
            );
            let b = particle_at(
                rng.random_range(0.0..300.0),
                rng.random_range(0.0..300.0),
                rng.random_range(1..60),
                rng.random_range(180.0..260.0),
            );

            assert_eq!(link_between(&a, &b, 100.0), link_between(&b, &a, 100.0));
        }
    }

    #[test]
    fn test_edge_exists_iff_within_threshold() {
        let a = particle_at(0.0, 0.0, 30, 200.0);

        // exactly on the threshold counts
        assert!(link_between(&a, &particle_at(60.0, 80.0, 30, 200.0), 100.0).is_some());
        assert!(link_between(&a, &particle_at(60.0, 80.1, 30, 200.0), 100.0).is_none());
        assert!(link_between(&a, &particle_at(10.0, 10.0, 30, 200.0), 100.0).is_some());
    }

    #[test]
    fn test_weight_uses_weaker_endpoint() {
        let a = particle_at(0.0, 0.0, 60, 180.0);
        let b = particle_at(50.0, 0.0, 15, 261.0);

        let weight = link_between(&a, &b, 100.0).unwrap();

        assert!((weight.closeness - 0.5).abs() < 1e-6);
        // 0.5 closeness * 0.9 * min(1.0, 0.25)
        assert!((weight.alpha - 0.1125).abs() < 1e-6);
        assert!((weight.width - 0.4).abs() < 1e-6);
        assert_eq!(weight.hue, 221.0);
    }

    #[test]
    fn test_sampling_only_links_newest_particles() {
        let config = LinkConfig {
            link_distance: 100.0,
            sample_limit: 3,
        };
        let mut pool = ParticlePool::new(ParticleConfig::default());
        // two old particles far from the rest, then three close new ones
        pool.push(particle_at(1000.0, 1000.0, 30, 200.0));
        pool.push(particle_at(1001.0, 1000.0, 30, 200.0));
        for i in 0..3 {
            pool.push(particle_at(i as f32, 0.0, 30, 200.0));
        }

        let links = proximity_links(&pool, &config);

        assert_eq!(links.len(), 3);
        assert!(links.iter().all(|l| l.from.x < 10.0 && l.to.x < 10.0));
    }

    #[test]
    fn test_links_leave_pool_untouched() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut pool = ParticlePool::new(ParticleConfig::default());
        pool.emit(Vec2::new(10.0, 10.0), 50, &mut rng);
        let before: Vec<Particle> = pool.iter().cloned().collect();

        let links = proximity_links(&pool, &LinkConfig::default());

        // every pair of co-located particles links
        assert_eq!(links.len(), 50 * 49 / 2);
        assert_eq!(pool.iter().cloned().collect::<Vec<_>>(), before);
    }
}
