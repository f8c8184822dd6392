use bevy::prelude::*;

use crate::camera::Viewport;
use crate::scan::ScanSession;
use crate::visual::utils::hue_color;

/// System: Draw the scan particles, each with a soft halo, then the proximity web
pub fn draw_scan_particles(session: Res<ScanSession>, viewport: Res<Viewport>, mut gizmos: Gizmos) {
    if session.pool().is_empty() {
        return;
    }

    for particle in session.pool().iter() {
        let center = Isometry2d::from_translation(viewport.to_world(particle.position));
        let alpha = particle.opacity();

        gizmos
            .circle_2d(center, particle.size * 3.0, hue_color(particle.hue, 0.6, alpha * 0.12))
            .resolution(8);
        gizmos
            .circle_2d(center, particle.size, hue_color(particle.hue, 0.6, alpha))
            .resolution(8);
    }

    // Gizmo lines have a fixed width, so link weight only shows through alpha
    for link in session.proximity_links() {
        gizmos.line_2d(
            viewport.to_world(link.from),
            viewport.to_world(link.to),
            hue_color(link.weight.hue, 0.7, link.weight.alpha),
        );
    }
}
