// scan/session.rs

use bevy::prelude::Resource;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::contact::{ContactDelta, ContactTracker};
use super::machine::{LifecycleCommand, ScanMachine, ScanPhase};
use crate::config::{ScanConfig, ScanSettings};
use crate::emitter::{EmitterFactory, EmitterManager};
use crate::input::ContactEvent;
use crate::particles::{LinkConfig, ParticlePool, ProximityLink, proximity_links};

/// The whole simulation: contacts, scan state, particles and emitters.
///
/// Input handlers call `handle_event`/`reset`, the fixed loop calls `tick`.
/// Each leaves every map consistent before returning.
#[derive(Debug, Resource)]
pub struct ScanSession {
    tracker: ContactTracker,
    machine: ScanMachine,
    pool: ParticlePool,
    emitters: EmitterManager,
    settings: ScanSettings,
    links: LinkConfig,
    rng: StdRng,
}

impl ScanSession {
    /// Create a session, seeded from the config or from entropy
    pub fn new(config: &ScanConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: &ScanConfig, rng: StdRng) -> Self {
        ScanSession {
            tracker: ContactTracker::new(),
            machine: ScanMachine::new(
                config.scan.required_contacts,
                config.scan.teardown_policy,
            ),
            pool: ParticlePool::new(config.particles.clone()),
            emitters: EmitterManager::new(config.emitter.clone()),
            settings: config.scan.clone(),
            links: config.links.clone(),
            rng,
        }
    }

    // === Query Methods ===

    pub fn tracker(&self) -> &ContactTracker {
        &self.tracker
    }

    pub fn phase(&self) -> ScanPhase {
        self.machine.phase()
    }

    pub fn is_complete(&self) -> bool {
        self.machine.is_complete()
    }

    pub fn required_contacts(&self) -> usize {
        self.machine.required_contacts()
    }

    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    pub fn emitters(&self) -> &EmitterManager {
        &self.emitters
    }

    /// Links to draw this frame
    pub fn proximity_links(&self) -> Vec<ProximityLink> {
        proximity_links(&self.pool, &self.links)
    }

    // === Mutation Methods ===

    /// Reconcile one input event. Lifted contacts lose their emitters unless
    /// the completed scan keeps them.
    pub fn handle_event(
        &mut self,
        event: &ContactEvent,
        factory: &mut dyn EmitterFactory,
    ) -> ContactDelta {
        let delta = self.tracker.apply(event, self.machine.is_complete());
        if !delta.removed.is_empty() {
            let commands = self.machine.contacts_lifted(&delta.removed);
            self.emitters.apply(&commands, factory);
        }
        delta
    }

    /// One frame: progress, physics, state machine, emitter lifecycle.
    /// Returns the lifecycle commands the state machine issued.
    pub fn tick(&mut self, dt: f32, factory: &mut dyn EmitterFactory) -> Vec<LifecycleCommand> {
        self.tracker.advance_progress(self.settings.progress_step);

        for contact in self.tracker.contacts() {
            if self.tracker.progress(contact.id) < 1.0 {
                self.pool.emit(
                    contact.position,
                    self.settings.scan_emission_per_tick,
                    &mut self.rng,
                );
            }
        }
        self.pool.step();

        let commands = self.machine.observe(&self.tracker);
        for command in &commands {
            if let LifecycleCommand::Create { anchor, .. } = *command {
                self.pool
                    .emit(anchor, self.settings.completion_burst, &mut self.rng);
            }
        }

        self.emitters.apply(&commands, factory);
        self.emitters.reposition(&self.tracker, factory);
        self.emitters.tick(dt, factory);

        commands
    }

    /// Back to idle: clear contacts, progress and the completion flag, tear down every emitter
    pub fn reset(&mut self, factory: &mut dyn EmitterFactory) {
        let commands = self.machine.reset();
        self.tracker.clear();
        self.emitters.apply(&commands, factory);
    }
}
