use bevy::prelude::Resource;

/// Detects two activations (click or lone tap) inside a short window
#[derive(Resource, Debug, Clone)]
pub struct ResetGesture {
    /// Seconds allowed between the two activations
    window: f64,
    last_activation: Option<f64>,
}

impl Default for ResetGesture {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl ResetGesture {
    pub fn new(window: f64) -> Self {
        Self {
            window,
            last_activation: None,
        }
    }

    /// Record an activation at `now` (seconds). Returns true when it completes a double activation.
    pub fn register(&mut self, now: f64) -> bool {
        match self.last_activation {
            Some(last) if now - last <= self.window => {
                // consumed; a third tap starts a new pair
                self.last_activation = None;
                true
            }
            _ => {
                self.last_activation = Some(now);
                false
            }
        }
    }
}
