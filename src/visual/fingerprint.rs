use std::f32::consts::{PI, TAU};

use bevy::prelude::*;

use crate::camera::Viewport;
use crate::scan::ScanSession;
use crate::scan::machine::ScanPhase;
use crate::visual::utils::ring_color;

/// Outer radius of a fingerprint, pixels
const FINGERPRINT_RADIUS: f32 = 60.0;
/// Concentric rings filled one after another as the scan progresses
const RING_COUNT: usize = 8;
/// Ridge curves appear past this progress
const RIDGE_THRESHOLD: f32 = 0.3;
/// Outer glow appears past this progress
const GLOW_THRESHOLD: f32 = 0.8;

/// Spacing of the contact-count indicator dots, pixels
const INDICATOR_SPACING: f32 = 24.0;
const INDICATOR_TOP: f32 = 32.0;

/// Finger number marks sit this far above the fingerprint center
const MARKER_LIFT: f32 = 80.0;
const MARKER_SPACING: f32 = 6.0;
const MARKER_HEIGHT: f32 = 12.0;

/// How much of ring `ring` is drawn at `progress`: rings fill inside-out
pub fn ring_progress(progress: f32, ring: usize) -> f32 {
    (progress * RING_COUNT as f32 - ring as f32).clamp(0.0, 1.0)
}

/// Tally marks naming the `ordinal`-th finger, as segments relative to the
/// fingerprint center (world space, +y up)
pub fn finger_marker(ordinal: usize) -> Vec<(Vec2, Vec2)> {
    let first_x = -MARKER_SPACING * (ordinal as f32 - 1.0) * 0.5;
    (0..ordinal)
        .map(|i| {
            let x = first_x + MARKER_SPACING * i as f32;
            (
                Vec2::new(x, MARKER_LIFT - MARKER_HEIGHT * 0.5),
                Vec2::new(x, MARKER_LIFT + MARKER_HEIGHT * 0.5),
            )
        })
        .collect()
}

/// System: Draw a filling fingerprint under every active contact, numbered in id order
pub fn draw_fingerprints(session: Res<ScanSession>, viewport: Res<Viewport>, mut gizmos: Gizmos) {
    let tracker = session.tracker();
    let marker_color = Color::srgba(1.0, 1.0, 1.0, 0.8);

    for (index, contact) in tracker.contacts().enumerate() {
        let center = viewport.to_world(contact.position);
        draw_fingerprint(&mut gizmos, center, tracker.progress(contact.id));

        for (from, to) in finger_marker(index + 1) {
            gizmos.line_2d(center + from, center + to, marker_color);
        }
    }
}

fn draw_fingerprint(gizmos: &mut Gizmos, center: Vec2, progress: f32) {
    let radius = FINGERPRINT_RADIUS;

    for ring in 0..RING_COUNT {
        let fill = ring_progress(progress, ring);
        if fill <= 0.0 {
            continue;
        }
        let r = radius / RING_COUNT as f32 * (ring + 1) as f32;
        let color = ring_color(ring as f32 / (RING_COUNT - 1) as f32, fill);
        gizmos
            .arc_2d(Isometry2d::from_translation(center), TAU * fill, r, color)
            .resolution(48);
    }

    // Characteristic ridge curves
    if progress > RIDGE_THRESHOLD {
        let curve = ((progress - RIDGE_THRESHOLD) * 2.0).clamp(0.0, 1.0);
        for i in 0..3 {
            let angle = TAU / 3.0 * i as f32;
            let offset = Vec2::from_angle(angle) * radius * 0.3;
            gizmos
                .arc_2d(
                    Isometry2d::new(center + offset, Rot2::radians(angle)),
                    PI * curve,
                    radius * 0.4,
                    Color::srgba(0.0, 1.0, 1.0, 0.6 * curve),
                )
                .resolution(24);
        }
    }

    if progress > GLOW_THRESHOLD {
        gizmos
            .circle_2d(
                Isometry2d::from_translation(center),
                radius + 10.0,
                Color::srgba(1.0, 1.0, 1.0, 0.3),
            )
            .resolution(64);
    }
}

/// System: One dot per required contact along the top edge, lit per active contact.
/// Green with the full hand down; ringed once the scan has completed.
pub fn draw_contact_indicator(
    session: Res<ScanSession>,
    viewport: Res<Viewport>,
    mut gizmos: Gizmos,
) {
    let required = session.required_contacts();
    let active = session.tracker().contact_count();
    let complete = session.phase() == ScanPhase::Complete;

    let lit = if active == required {
        Color::srgb(0.0, 1.0, 0.0)
    } else {
        Color::srgb(0.0, 1.0, 1.0)
    };
    let dim = Color::srgba(1.0, 1.0, 1.0, 0.2);
    let ring = Color::srgba(0.0, 1.0, 0.0, 0.5);

    let first_x = viewport.width * 0.5 - INDICATOR_SPACING * (required as f32 - 1.0) * 0.5;
    for slot in 0..required {
        let window_pos = Vec2::new(first_x + INDICATOR_SPACING * slot as f32, INDICATOR_TOP);
        let center = Isometry2d::from_translation(viewport.to_world(window_pos));
        if slot < active {
            gizmos.circle_2d(center, 7.0, lit);
            gizmos.circle_2d(center, 4.0, lit);
        } else {
            gizmos.circle_2d(center, 7.0, dim);
        }
        if complete {
            gizmos.circle_2d(center, 11.0, ring);
        }
    }
}
