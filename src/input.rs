use std::collections::BTreeMap;
use std::fmt;

use bevy::input::touch::{TouchInput, TouchPhase};
use bevy::prelude::*;
use bevy::window::{CursorLeft, CursorMoved};

use crate::scan::reset::ResetGesture;

pub struct InputPlugin;
impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ActiveTouches>()
            .init_resource::<ResetGesture>()
            .add_message::<ContactEvent>()
            .add_message::<ResetRequest>()
            .add_systems(Update, (collect_contact_events, collect_reset_requests));
    }
}

/// Opaque device-assigned identifier for one contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContactId(pub u64);

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Synthetic identifier used for mouse/pen input
pub const POINTER_CONTACT_ID: ContactId = ContactId(0);

/// One active pointer or touch point.
///
/// Positions are window pixels: top-left origin, +y down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub id: ContactId,
    pub position: Vec2,
}

impl Contact {
    #[cfg(test)]
    pub fn new(id: u64, x: f32, y: f32) -> Self {
        Self {
            id: ContactId(id),
            position: Vec2::new(x, y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactEventKind {
    Start,
    Move,
    End,
    Cancel,
}

/// Which device produced an event. End/Cancel only clear contacts of their own channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputChannel {
    Touch,
    Pointer,
}

/// Normalized input: the full contact set for a channel (Start/Move), or
/// the channel going empty (End/Cancel, no positions).
#[derive(Message, Debug, Clone)]
pub struct ContactEvent {
    pub kind: ContactEventKind,
    pub channel: InputChannel,
    pub contacts: Vec<Contact>,
}

impl ContactEvent {
    pub fn touches(kind: ContactEventKind, contacts: Vec<Contact>) -> Self {
        let contacts = match kind {
            ContactEventKind::End | ContactEventKind::Cancel => Vec::new(),
            _ => contacts,
        };
        Self {
            kind,
            channel: InputChannel::Touch,
            contacts,
        }
    }

    pub fn pointer_move(position: Vec2) -> Self {
        Self {
            kind: ContactEventKind::Move,
            channel: InputChannel::Pointer,
            contacts: vec![Contact {
                id: POINTER_CONTACT_ID,
                position,
            }],
        }
    }

    pub fn pointer_cancel() -> Self {
        Self {
            kind: ContactEventKind::Cancel,
            channel: InputChannel::Pointer,
            contacts: Vec::new(),
        }
    }
}

/// Request to return the scan to idle (double tap or key command)
#[derive(Message, Debug, Clone, Copy)]
pub struct ResetRequest;

/// Touches currently down, folded from per-touch phase messages so each
/// event can carry the full contact set.
#[derive(Resource, Default, Debug)]
pub struct ActiveTouches {
    touches: BTreeMap<u64, Vec2>,
}

impl ActiveTouches {
    /// Apply one touch phase and report which kind of set-level event it produces
    pub fn fold(&mut self, id: u64, phase: TouchPhase, position: Vec2) -> ContactEventKind {
        match phase {
            TouchPhase::Started => {
                self.touches.insert(id, position);
                ContactEventKind::Start
            }
            TouchPhase::Moved => {
                self.touches.insert(id, position);
                ContactEventKind::Move
            }
            TouchPhase::Ended => {
                self.touches.remove(&id);
                if self.touches.is_empty() {
                    ContactEventKind::End
                } else {
                    ContactEventKind::Move
                }
            }
            TouchPhase::Canceled => {
                self.touches.remove(&id);
                if self.touches.is_empty() {
                    ContactEventKind::Cancel
                } else {
                    ContactEventKind::Move
                }
            }
        }
    }

    pub fn snapshot(&self) -> Vec<Contact> {
        self.touches
            .iter()
            .map(|(&id, &position)| Contact {
                id: ContactId(id),
                position,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.touches.is_empty()
    }
}

fn collect_contact_events(
    mut touch_events: MessageReader<TouchInput>,
    mut cursor_moved: MessageReader<CursorMoved>,
    mut cursor_left: MessageReader<CursorLeft>,
    mut touches: ResMut<ActiveTouches>,
    mut out: MessageWriter<ContactEvent>,
) {
    for ev in touch_events.read() {
        let kind = touches.fold(ev.id, ev.phase, ev.position);
        out.write(ContactEvent::touches(kind, touches.snapshot()));
    }

    // Mouse scans on hover; ignored while fingers are down so the two
    // channels don't fight over the same contact
    if touches.is_empty() {
        if let Some(last) = cursor_moved.read().last() {
            out.write(ContactEvent::pointer_move(last.position));
        }
        if cursor_left.read().next().is_some() {
            out.write(ContactEvent::pointer_cancel());
        }
    } else {
        cursor_moved.clear();
        cursor_left.clear();
    }
}

fn collect_reset_requests(
    time: Res<Time>,
    keys: Res<ButtonInput<KeyCode>>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    mut gesture: ResMut<ResetGesture>,
    mut out: MessageWriter<ResetRequest>,
) {
    if keys.just_pressed(KeyCode::KeyR) {
        out.write(ResetRequest);
        return;
    }

    // Only a lone finger counts as a tap, otherwise laying down the full
    // hand would read as a double tap
    let tapped = mouse_buttons.just_pressed(MouseButton::Left)
        || (touches.any_just_pressed() && touches.iter().count() == 1);

    if tapped && gesture.register(time.elapsed_secs_f64()) {
        out.write(ResetRequest);
    }
}
