use std::collections::BTreeMap;

use bevy::math::Vec2;

use crate::input::{Contact, ContactEvent, ContactEventKind, ContactId, InputChannel};

#[derive(Debug, Clone, Copy)]
struct TrackedContact {
    position: Vec2,
    channel: InputChannel,
}

/// Identifiers that appeared or vanished while applying one event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDelta {
    pub added: Vec<ContactId>,
    pub removed: Vec<ContactId>,
}

impl ContactDelta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Active contacts and the scan progress accumulated by each.
#[derive(Debug, Clone, Default)]
pub struct ContactTracker {
    contacts: BTreeMap<ContactId, TrackedContact>,
    progress: BTreeMap<ContactId, f32>,
}

impl ContactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // === Queries ===

    /// Active contacts, ordered by identifier
    pub fn contacts(&self) -> impl Iterator<Item = Contact> + '_ {
        self.contacts.iter().map(|(&id, tracked)| Contact {
            id,
            position: tracked.position,
        })
    }

    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    pub fn position(&self, id: ContactId) -> Option<Vec2> {
        self.contacts.get(&id).map(|tracked| tracked.position)
    }

    #[cfg(test)]
    pub fn is_active(&self, id: ContactId) -> bool {
        self.contacts.contains_key(&id)
    }

    /// Scan progress in [0, 1]; 0 for contacts not yet ticked
    pub fn progress(&self, id: ContactId) -> f32 {
        self.progress.get(&id).copied().unwrap_or(0.0)
    }

    #[cfg(test)]
    pub fn progress_entries(&self) -> impl Iterator<Item = (ContactId, f32)> + '_ {
        self.progress.iter().map(|(&id, &p)| (id, p))
    }

    /// Exactly `required` contacts are down and every one has finished scanning
    pub fn all_complete(&self, required: usize) -> bool {
        self.contacts.len() == required
            && self.contacts.keys().all(|id| self.progress(*id) >= 1.0)
    }

    /// Progress entries exist only for active contacts (unless retained)
    #[cfg(test)]
    pub fn is_consistent(&self) -> bool {
        self.progress.keys().all(|id| self.contacts.contains_key(id))
    }

    // === Mutation ===

    /// Replace the event channel's contact set with the one in `event`.
    ///
    /// Touch input takes the surface over: any touch event evicts the pointer
    /// contact, and pointer events are ignored while a touch is down.
    /// With `retain_progress` set, progress of vanished contacts is kept.
    pub fn apply(&mut self, event: &ContactEvent, retain_progress: bool) -> ContactDelta {
        if event.channel == InputChannel::Pointer && self.has_channel(InputChannel::Touch) {
            return ContactDelta::default();
        }

        let next: BTreeMap<ContactId, Vec2> = match event.kind {
            ContactEventKind::Start | ContactEventKind::Move => event
                .contacts
                .iter()
                .filter_map(sanitize)
                .map(|contact| (contact.id, contact.position))
                .collect(),
            ContactEventKind::End | ContactEventKind::Cancel => BTreeMap::new(),
        };

        let removed: Vec<ContactId> = self
            .contacts
            .iter()
            .filter(|(id, tracked)| {
                if tracked.channel == event.channel {
                    !next.contains_key(*id)
                } else {
                    event.channel == InputChannel::Touch
                }
            })
            .map(|(&id, _)| id)
            .collect();

        for id in &removed {
            self.contacts.remove(id);
            if !retain_progress {
                self.progress.remove(id);
            }
        }

        let added: Vec<ContactId> = next
            .keys()
            .filter(|id| !self.contacts.contains_key(*id))
            .copied()
            .collect();

        for (id, position) in next {
            self.contacts.insert(
                id,
                TrackedContact {
                    position,
                    channel: event.channel,
                },
            );
        }

        ContactDelta { added, removed }
    }

    /// One tick of scanning: every active contact gains `step`, clamped at 1.
    /// Contacts seen for the first time start from 0.
    pub fn advance_progress(&mut self, step: f32) {
        for id in self.contacts.keys() {
            let progress = self.progress.entry(*id).or_insert(0.0);
            *progress = (*progress + step).min(1.0);
        }
    }

    pub fn clear(&mut self) {
        self.contacts.clear();
        self.progress.clear();
    }

    fn has_channel(&self, channel: InputChannel) -> bool {
        self.contacts.values().any(|tracked| tracked.channel == channel)
    }
}

/// Drop contacts with non-finite coordinates, clamp negative ones to the surface edge
fn sanitize(contact: &Contact) -> Option<Contact> {
    if !contact.position.is_finite() {
        log::warn!(
            "Ignoring contact {} with non-finite position {}",
            contact.id,
            contact.position
        );
        return None;
    }

    Some(Contact {
        id: contact.id,
        position: contact.position.max(Vec2::ZERO),
    })
}
