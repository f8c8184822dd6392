use bevy::prelude::*;

use crate::emitter::AmbientFields;
use crate::input::{ContactEvent, ResetRequest};
use crate::scan::ScanSession;

/// System: Reconcile normalized contact events into the session
pub fn apply_contact_events(
    mut events: MessageReader<ContactEvent>,
    mut session: ResMut<ScanSession>,
    mut fields: ResMut<AmbientFields>,
) {
    for event in events.read() {
        let delta = session.handle_event(event, &mut *fields);
        if delta.is_empty() {
            continue;
        }
        for id in &delta.added {
            debug!("Contact {} down ({} active)", id, session.tracker().contact_count());
        }
        for id in &delta.removed {
            if session.is_complete() {
                debug!("Contact {} lifted, its emitter stays until reset", id);
            } else {
                debug!("Contact {} lifted ({} active)", id, session.tracker().contact_count());
            }
        }
    }
}

/// System: Double tap or `R` returns everything to idle
pub fn apply_reset_requests(
    mut requests: MessageReader<ResetRequest>,
    mut session: ResMut<ScanSession>,
    mut fields: ResMut<AmbientFields>,
) {
    if requests.read().count() == 0 {
        return;
    }

    if session.emitters().is_empty() {
        session.reset(&mut *fields);
        info!("Scan reset");
        return;
    }

    let emitters = session.emitters().len();
    session.reset(&mut *fields);
    info!("Scan reset, tearing down {} emitters", emitters);
}
