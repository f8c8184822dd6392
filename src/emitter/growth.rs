use super::factory::{EmitterParam, EmitterParams};
use crate::visual::utils::{ease_out_cubic, lerp};

/// Cold -> warm parameter ramp over a fixed duration, polled once per tick.
/// Cancelling is dropping it.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthAnimation {
    from: EmitterParams,
    to: EmitterParams,
    duration: f32,
    elapsed: f32,
}

impl GrowthAnimation {
    pub fn new(from: EmitterParams, to: EmitterParams, duration: f32) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: 0.0,
        }
    }

    /// Eased progress: `1 - (1 - t)^3` with `t = clamp(elapsed / duration, 0, 1)`
    pub fn eased(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ease_out_cubic((self.elapsed / self.duration).clamp(0.0, 1.0))
    }

    pub fn current(&self) -> EmitterParams {
        let eased = self.eased();
        let mut params = self.from;
        for param in EmitterParam::ALL {
            params.set(param, lerp(self.from.get(param), self.to.get(param), eased));
        }
        params
    }

    /// Advance by `dt` seconds and return the new values
    pub fn poll(&mut self, dt: f32) -> EmitterParams {
        self.elapsed += dt.max(0.0);
        self.current()
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Opacity ramp to zero ahead of removal
#[derive(Debug, Clone, PartialEq)]
pub struct FadeOut {
    from_opacity: f32,
    duration: f32,
    elapsed: f32,
}

impl FadeOut {
    pub fn new(from_opacity: f32, duration: f32) -> Self {
        Self {
            from_opacity,
            duration,
            elapsed: 0.0,
        }
    }

    /// Advance by `dt` seconds and return the opacity to show
    pub fn poll(&mut self, dt: f32) -> f32 {
        self.elapsed += dt.max(0.0);
        if self.duration <= 0.0 {
            return 0.0;
        }
        let t = (self.elapsed / self.duration).clamp(0.0, 1.0);
        self.from_opacity * (1.0 - t)
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLD: EmitterParams = EmitterParams {
        speed: 0.0,
        link_distance: 10.0,
        opacity: 0.0,
    };
    const WARM: EmitterParams = EmitterParams {
        speed: 2.0,
        link_distance: 80.0,
        opacity: 0.8,
    };

    #[test]
    fn test_starts_cold_and_ends_warm() {
        let mut growth = GrowthAnimation::new(COLD, WARM, 1.4);
        assert_eq!(growth.current(), COLD);

        for _ in 0..90 {
            growth.poll(1.0 / 60.0);
        }

        assert!(growth.is_finished());
        let end = growth.current();
        assert!((end.speed - WARM.speed).abs() < 1e-5);
        assert!((end.link_distance - WARM.link_distance).abs() < 1e-4);
        assert!((end.opacity - WARM.opacity).abs() < 1e-5);
    }

    #[test]
    fn test_follows_ease_out_cubic() {
        let mut growth = GrowthAnimation::new(COLD, WARM, 1.0);

        let half = growth.poll(0.5);

        // 1 - 0.5^3
        assert!((growth.eased() - 0.875).abs() < 1e-6);
        assert!((half.speed - 1.75).abs() < 1e-6);
    }

    #[test]
    fn test_overshoot_is_clamped() {
        let mut growth = GrowthAnimation::new(COLD, WARM, 1.0);
        let params = growth.poll(10.0);
        assert_eq!(params.opacity, WARM.opacity);
    }

    #[test]
    fn test_zero_duration_jumps_to_warm() {
        let growth = GrowthAnimation::new(COLD, WARM, 0.0);
        assert_eq!(growth.current(), WARM);
        assert!(growth.is_finished());
    }

    #[test]
    fn test_fade_ramps_to_zero() {
        let mut fade = FadeOut::new(0.8, 0.4);

        assert!((fade.poll(0.2) - 0.4).abs() < 1e-6);
        assert!(!fade.is_finished());
        assert_eq!(fade.poll(0.2), 0.0);
        assert!(fade.is_finished());
    }
}
