use crate::config::ScanConfig;
use crate::emitter::{AmbientFields, step_ambient_fields};
use crate::scan::{LifecycleCommand, ResetGesture, ScanSession};
use crate::visual::emitters::draw_ambient_fields;
use crate::visual::fingerprint::{draw_contact_indicator, draw_fingerprints};
use crate::visual::interactions::{apply_contact_events, apply_reset_requests};
use crate::visual::particles::draw_scan_particles;
use bevy::prelude::*;

/// Simulation rate; progress, physics and emitter timing are all per tick
const TICK_HZ: f64 = 60.0;

pub struct ScanPlugin;

impl Plugin for ScanPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_hz(TICK_HZ))
            .add_systems(Startup, setup_session)
            .add_systems(FixedUpdate, (tick_session, step_ambient_fields).chain())
            .add_systems(
                Update,
                (
                    // Input handlers
                    apply_contact_events,
                    apply_reset_requests,
                    // Drawing (read-only)
                    draw_scan_particles,
                    draw_ambient_fields,
                    draw_fingerprints,
                    draw_contact_indicator,
                )
                    .chain(),
            );
    }
}

/// Load the config and build the simulation resources from it
fn setup_session(mut commands: Commands) {
    let config = match ScanConfig::load() {
        Ok(config) => {
            info!(
                "Loaded scan config: {} contacts, step {}, pool capacity {}",
                config.scan.required_contacts,
                config.scan.progress_step,
                config.particles.capacity
            );
            config
        }
        Err(e) => {
            error!("Failed to load scan config, using defaults: {}", e);
            ScanConfig::default()
        }
    };

    let fields = match config.rng_seed {
        Some(seed) => AmbientFields::seeded(config.emitter.max_instances, seed.wrapping_add(1)),
        None => AmbientFields::new(
            config.emitter.max_instances,
            rand::SeedableRng::from_rng(&mut rand::rng()),
        ),
    };

    commands.insert_resource(ScanSession::new(&config));
    commands.insert_resource(fields);
    commands.insert_resource(ResetGesture::new(config.input.double_tap_window));
    commands.insert_resource(config);
}

/// System: One frame of the driving loop
fn tick_session(
    time: Res<Time>,
    mut session: ResMut<ScanSession>,
    mut fields: ResMut<AmbientFields>,
) {
    let commands = session.tick(time.delta_secs(), &mut *fields);

    if commands
        .iter()
        .any(|c| matches!(c, LifecycleCommand::Create { .. }))
    {
        info!(
            "Scan complete, {} emitters active ({} degraded), {} ambient fields, {} particles",
            session.emitters().len(),
            session.emitters().iter().filter(|e| e.is_degraded()).count(),
            fields.len(),
            session.pool().len()
        );
    }
}
