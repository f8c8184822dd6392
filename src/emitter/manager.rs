use std::collections::BTreeMap;

use bevy::math::Vec2;

use super::factory::{EmitterConfig, EmitterFactory, EmitterHandle, EmitterParam};
use super::growth::{FadeOut, GrowthAnimation};
use crate::input::ContactId;
use crate::scan::contact::ContactTracker;
use crate::scan::machine::LifecycleCommand;

/// One emitter anchored to a contact
#[derive(Debug, Clone)]
pub struct Emitter {
    pub id: ContactId,
    pub anchor: Vec2,
    /// `None` when the backend failed to create visuals
    pub instance: Option<EmitterHandle>,
    pub growth: Option<GrowthAnimation>,
    pub fade: Option<FadeOut>,
    /// Last opacity pushed to the backend
    opacity: f32,
}

impl Emitter {
    pub fn is_degraded(&self) -> bool {
        self.instance.is_none()
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }
}

/// Owns every emitter, at most one per contact identifier
#[derive(Debug, Clone)]
pub struct EmitterManager {
    emitters: BTreeMap<ContactId, Emitter>,
    config: EmitterConfig,
}

impl EmitterManager {
    pub fn new(config: EmitterConfig) -> Self {
        Self {
            emitters: BTreeMap::new(),
            config,
        }
    }

    #[cfg(test)]
    pub fn get(&self, id: ContactId) -> Option<&Emitter> {
        self.emitters.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Emitter> {
        self.emitters.values()
    }

    pub fn len(&self) -> usize {
        self.emitters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emitters.is_empty()
    }

    pub fn apply(&mut self, commands: &[LifecycleCommand], factory: &mut dyn EmitterFactory) {
        for command in commands {
            match *command {
                LifecycleCommand::Create { id, anchor } => {
                    self.create(id, anchor, factory);
                }
                LifecycleCommand::Destroy(id) => self.destroy(id, factory),
                LifecycleCommand::DestroyAll => self.destroy_all(factory),
            }
        }
    }

    /// Create an emitter for `id` at `anchor`. No-op when one is already live.
    /// Returns whether a new emitter was made.
    pub fn create(&mut self, id: ContactId, anchor: Vec2, factory: &mut dyn EmitterFactory) -> bool {
        if let Some(existing) = self.emitters.get(&id) {
            if !existing.is_fading() {
                return false;
            }
            // on its way out anyway; finish it so the new one takes the slot
            self.release(id, factory);
        }

        let emitter = match factory.create(anchor, &self.config) {
            Ok(handle) => {
                log::info!("Emitter {} created for contact {}", handle, id);
                let initial = self.config.initial_params();
                Emitter {
                    id,
                    anchor,
                    instance: Some(handle),
                    growth: self.config.growth_enabled.then(|| {
                        GrowthAnimation::new(
                            self.config.cold,
                            self.config.warm,
                            self.config.growth_duration,
                        )
                    }),
                    fade: None,
                    opacity: initial.opacity,
                }
            }
            Err(err) => {
                log::warn!("Emitter for contact {} running without visuals: {}", id, err);
                Emitter {
                    id,
                    anchor,
                    instance: None,
                    growth: None,
                    fade: None,
                    opacity: 0.0,
                }
            }
        };

        self.emitters.insert(id, emitter);
        true
    }

    /// Cancel growth, then fade out (if configured) or remove at once.
    /// Destroying an emitter that is already fading removes it immediately.
    pub fn destroy(&mut self, id: ContactId, factory: &mut dyn EmitterFactory) {
        let fade_duration = self.config.fade_duration;
        let Some(emitter) = self.emitters.get_mut(&id) else {
            return;
        };

        emitter.growth = None;

        if fade_duration > 0.0 && emitter.instance.is_some() && !emitter.is_fading() {
            emitter.fade = Some(FadeOut::new(emitter.opacity, fade_duration));
            return;
        }

        self.release(id, factory);
    }

    pub fn destroy_all(&mut self, factory: &mut dyn EmitterFactory) {
        let ids: Vec<ContactId> = self.emitters.keys().copied().collect();
        for id in ids {
            self.destroy(id, factory);
        }
    }

    /// Follow active contacts; emitters whose contact lifted hold their last anchor
    pub fn reposition(&mut self, tracker: &ContactTracker, factory: &mut dyn EmitterFactory) {
        for emitter in self.emitters.values_mut() {
            let Some(position) = tracker.position(emitter.id) else {
                continue;
            };
            if position == emitter.anchor {
                continue;
            }
            emitter.anchor = position;
            if let Some(handle) = emitter.instance {
                factory.reposition(handle, position);
            }
        }
    }

    /// Poll growth animations and fades by `dt` seconds
    pub fn tick(&mut self, dt: f32, factory: &mut dyn EmitterFactory) {
        let mut finished = Vec::new();

        for emitter in self.emitters.values_mut() {
            let Some(handle) = emitter.instance else {
                continue;
            };

            if let Some(growth) = emitter.growth.as_mut() {
                let params = growth.poll(dt);
                let done = growth.is_finished();

                let result = EmitterParam::ALL
                    .into_iter()
                    .try_for_each(|param| factory.set_parameter(handle, param, params.get(param)));

                match result {
                    Ok(()) => {
                        emitter.opacity = params.opacity;
                        if done {
                            emitter.growth = None;
                        }
                    }
                    Err(err) => {
                        log::warn!("Growth of {} cancelled: {}", handle, err);
                        emitter.growth = None;
                    }
                }
            }

            if let Some(fade) = emitter.fade.as_mut() {
                let opacity = fade.poll(dt);
                // removal follows regardless, so a failed write changes nothing
                let _ = factory.set_parameter(handle, EmitterParam::Opacity, opacity);
                emitter.opacity = opacity;
                if fade.is_finished() {
                    finished.push(emitter.id);
                }
            }
        }

        for id in finished {
            self.release(id, factory);
        }
    }

    fn release(&mut self, id: ContactId, factory: &mut dyn EmitterFactory) {
        if let Some(emitter) = self.emitters.remove(&id) {
            if let Some(handle) = emitter.instance {
                factory.destroy(handle);
            }
            log::info!("Emitter for contact {} destroyed", id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::factory::testing::RecordingFactory;
    use crate::input::{Contact, ContactEvent, ContactEventKind};

    const DT: f32 = 1.0 / 60.0;

    fn instant_config() -> EmitterConfig {
        EmitterConfig {
            fade_duration: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_create_is_at_most_once_per_id() {
        let mut manager = EmitterManager::new(instant_config());
        let mut factory = RecordingFactory::default();

        assert!(manager.create(ContactId(1), Vec2::ZERO, &mut factory));
        assert!(!manager.create(ContactId(1), Vec2::ONE, &mut factory));

        assert_eq!(manager.len(), 1);
        assert_eq!(factory.created.len(), 1);
    }

    #[test]
    fn test_growth_pushes_parameters_until_warm() {
        let config = EmitterConfig::default();
        let mut manager = EmitterManager::new(config.clone());
        let mut factory = RecordingFactory::default();
        manager.create(ContactId(1), Vec2::ZERO, &mut factory);

        for _ in 0..100 {
            manager.tick(DT, &mut factory);
        }

        let emitter = manager.get(ContactId(1)).unwrap();
        assert!(emitter.growth.is_none());
        let (_, _, last_opacity) = factory
            .parameters
            .iter()
            .rev()
            .find(|(_, param, _)| *param == EmitterParam::Opacity)
            .copied()
            .unwrap();
        assert!((last_opacity - config.warm.opacity).abs() < 1e-5);
        // three parameters per tick while growing, nothing after
        assert!(factory.parameters.len() < 100 * 3);
    }

    #[test]
    fn test_destroy_cancels_growth() {
        let mut manager = EmitterManager::new(instant_config());
        let mut factory = RecordingFactory::default();
        manager.create(ContactId(1), Vec2::ZERO, &mut factory);
        manager.tick(DT, &mut factory);
        let pushed = factory.parameters.len();

        manager.destroy(ContactId(1), &mut factory);
        manager.tick(DT, &mut factory);

        assert!(manager.is_empty());
        assert_eq!(factory.destroyed.len(), 1);
        assert_eq!(factory.parameters.len(), pushed);
    }

    #[test]
    fn test_fade_then_release() {
        let mut manager = EmitterManager::new(EmitterConfig::default());
        let mut factory = RecordingFactory::default();
        manager.create(ContactId(1), Vec2::ZERO, &mut factory);

        manager.destroy(ContactId(1), &mut factory);
        assert!(manager.get(ContactId(1)).unwrap().is_fading());
        assert!(factory.destroyed.is_empty());

        for _ in 0..60 {
            manager.tick(DT, &mut factory);
        }

        assert!(manager.is_empty());
        assert_eq!(factory.destroyed.len(), 1);
    }

    #[test]
    fn test_second_destroy_during_fade_releases_immediately() {
        let mut manager = EmitterManager::new(EmitterConfig::default());
        let mut factory = RecordingFactory::default();
        manager.create(ContactId(1), Vec2::ZERO, &mut factory);

        manager.destroy(ContactId(1), &mut factory);
        manager.tick(DT, &mut factory);
        manager.destroy(ContactId(1), &mut factory);

        assert!(manager.is_empty());
        assert_eq!(factory.destroyed.len(), 1);
        assert!(factory.live.is_empty());
    }

    #[test]
    fn test_create_replaces_fading_emitter() {
        let mut manager = EmitterManager::new(EmitterConfig::default());
        let mut factory = RecordingFactory::default();
        manager.create(ContactId(1), Vec2::ZERO, &mut factory);
        manager.destroy(ContactId(1), &mut factory);

        assert!(manager.create(ContactId(1), Vec2::ONE, &mut factory));

        assert_eq!(manager.len(), 1);
        assert_eq!(factory.live.len(), 1);
        assert!(!manager.get(ContactId(1)).unwrap().is_fading());
    }

    #[test]
    fn test_failed_create_keeps_degraded_emitter() {
        let mut manager = EmitterManager::new(EmitterConfig::default());
        let mut factory = RecordingFactory::failing();

        assert!(manager.create(ContactId(3), Vec2::new(5.0, 5.0), &mut factory));
        let emitter = manager.get(ContactId(3)).unwrap();
        assert!(emitter.is_degraded());

        // anchor tracking still works
        let mut tracker = ContactTracker::new();
        tracker.apply(
            &ContactEvent::touches(ContactEventKind::Start, vec![Contact::new(3, 9.0, 9.0)]),
            false,
        );
        manager.reposition(&tracker, &mut factory);
        manager.tick(DT, &mut factory);
        assert_eq!(manager.get(ContactId(3)).unwrap().anchor, Vec2::new(9.0, 9.0));

        // degraded emitters skip the fade
        manager.destroy(ContactId(3), &mut factory);
        assert!(manager.is_empty());
        assert!(factory.destroyed.is_empty());
    }

    #[test]
    fn test_parameter_failure_cancels_growth_only() {
        let mut manager = EmitterManager::new(EmitterConfig::default());
        let mut factory = RecordingFactory::default();
        manager.create(ContactId(1), Vec2::ZERO, &mut factory);
        factory.fail_set_parameter = true;

        manager.tick(DT, &mut factory);

        let emitter = manager.get(ContactId(1)).unwrap();
        assert!(emitter.growth.is_none());
        assert!(!emitter.is_degraded());
    }

    #[test]
    fn test_reposition_holds_lifted_contacts() {
        let mut manager = EmitterManager::new(instant_config());
        let mut factory = RecordingFactory::default();
        manager.create(ContactId(1), Vec2::new(1.0, 1.0), &mut factory);
        manager.create(ContactId(2), Vec2::new(2.0, 2.0), &mut factory);

        let mut tracker = ContactTracker::new();
        tracker.apply(
            &ContactEvent::touches(ContactEventKind::Start, vec![Contact::new(1, 40.0, 40.0)]),
            false,
        );
        manager.reposition(&tracker, &mut factory);

        assert_eq!(manager.get(ContactId(1)).unwrap().anchor, Vec2::new(40.0, 40.0));
        assert_eq!(manager.get(ContactId(2)).unwrap().anchor, Vec2::new(2.0, 2.0));
        let handle = manager.get(ContactId(1)).unwrap().instance.unwrap();
        assert_eq!(factory.live[&handle], Vec2::new(40.0, 40.0));
    }

    #[test]
    fn test_destroy_all_on_empty_manager_calls_nothing() {
        let mut manager = EmitterManager::new(EmitterConfig::default());
        let mut factory = RecordingFactory::default();

        manager.apply(&[LifecycleCommand::DestroyAll], &mut factory);

        assert!(factory.destroyed.is_empty());
    }
}
