use bevy::math::Vec2;
use serde::Deserialize;

use super::contact::ContactTracker;
use crate::input::ContactId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanPhase {
    /// Nothing on the surface, nothing completed
    #[default]
    Idle,
    /// At least one contact scanning, full hand not yet complete
    Scanning,
    /// Full hand completed; sticky until reset
    Complete,
}

/// What happens to an emitter when its finger lifts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeardownPolicy {
    /// Emitters stay put after a completed scan until an explicit reset
    #[default]
    PersistAfterCompletion,
    /// Emitters are torn down as soon as their contact lifts
    OnLift,
}

/// Instruction for the emitter lifecycle manager
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LifecycleCommand {
    Create { id: ContactId, anchor: Vec2 },
    Destroy(ContactId),
    DestroyAll,
}

/// Global scan state. Every transition returns the lifecycle commands it implies.
#[derive(Debug, Clone)]
pub struct ScanMachine {
    phase: ScanPhase,
    completed: bool,
    required_contacts: usize,
    policy: TeardownPolicy,
}

impl ScanMachine {
    pub fn new(required_contacts: usize, policy: TeardownPolicy) -> Self {
        Self {
            phase: ScanPhase::Idle,
            completed: false,
            required_contacts,
            policy,
        }
    }

    pub fn phase(&self) -> ScanPhase {
        self.phase
    }

    /// The completion flag: set on the rising edge, cleared only by reset
    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn required_contacts(&self) -> usize {
        self.required_contacts
    }

    /// Re-evaluate against the tracker. Emits one `Create` per contact on the
    /// tick the full hand first completes, nothing afterwards.
    pub fn observe(&mut self, tracker: &ContactTracker) -> Vec<LifecycleCommand> {
        if self.completed {
            return Vec::new();
        }

        if tracker.all_complete(self.required_contacts) {
            self.completed = true;
            self.phase = ScanPhase::Complete;
            log::info!("Scan complete with {} contacts", tracker.contact_count());

            return tracker
                .contacts()
                .map(|contact| LifecycleCommand::Create {
                    id: contact.id,
                    anchor: contact.position,
                })
                .collect();
        }

        self.phase = if tracker.contact_count() == 0 {
            ScanPhase::Idle
        } else {
            ScanPhase::Scanning
        };
        Vec::new()
    }

    /// Contacts lifted; whether their emitters go too depends on the policy
    pub fn contacts_lifted(&self, removed: &[ContactId]) -> Vec<LifecycleCommand> {
        let keep = match self.policy {
            TeardownPolicy::PersistAfterCompletion => self.completed,
            TeardownPolicy::OnLift => false,
        };
        if keep {
            return Vec::new();
        }

        removed
            .iter()
            .map(|&id| LifecycleCommand::Destroy(id))
            .collect()
    }

    /// Back to idle regardless of contacts
    pub fn reset(&mut self) -> Vec<LifecycleCommand> {
        if self.phase != ScanPhase::Idle || self.completed {
            log::info!("Scan reset from {:?}", self.phase);
        }
        self.phase = ScanPhase::Idle;
        self.completed = false;
        vec![LifecycleCommand::DestroyAll]
    }
}
