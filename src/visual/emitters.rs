use bevy::prelude::*;

use crate::camera::Viewport;
use crate::emitter::AmbientFields;

/// Pale cyan of the ambient fields
const FIELD_COLOR: (f32, f32, f32) = (0.6, 1.0, 1.0);

/// System: Draw every ambient field's motes and their links
pub fn draw_ambient_fields(fields: Res<AmbientFields>, viewport: Res<Viewport>, mut gizmos: Gizmos) {
    let (r, g, b) = FIELD_COLOR;

    for field in fields.iter() {
        let opacity = field.params.opacity;
        if opacity <= 0.0 {
            continue;
        }

        for (mote, position) in field.motes().iter().zip(field.positions()) {
            gizmos
                .circle_2d(
                    Isometry2d::from_translation(viewport.to_world(position)),
                    mote.size,
                    Color::srgba(r, g, b, opacity),
                )
                .resolution(8);
        }

        for (from, to, alpha) in field.links() {
            gizmos.line_2d(
                viewport.to_world(from),
                viewport.to_world(to),
                Color::srgba(r, g, b, alpha),
            );
        }
    }
}
