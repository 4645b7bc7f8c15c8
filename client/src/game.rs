use crate::input::InputState;
use crate::network::Channel;
use log::{debug, info};
use shared::{clamp_paddle_y, ClientMessage, Role, Snapshot, INITIAL_PADDLE_Y};

/// Outcome of reconciling against an authoritative snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reconciliation {
    Unchanged,
    /// A role was (re)assigned and the held position seeded from the snapshot.
    Assigned { role: Role, seeded_y: f32 },
    /// The identity dropped out of the roster.
    Unassigned,
}

/// Sole authority for where this client thinks its own paddle is, and the
/// only gate for outbound paddle commands.
#[derive(Debug)]
pub struct PaddleController {
    identity: String,
    role: Option<Role>,
    held_y: f32,
}

impl PaddleController {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            role: None,
            held_y: INITIAL_PADDLE_Y,
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn position(&self) -> f32 {
        self.held_y
    }

    /// Clamps `candidate` and, if it differs from the held position, stores
    /// it and sends exactly one `paddle_move`. No-op without a role or an
    /// open channel. Returns whether a command was sent.
    pub fn propose(&mut self, candidate: f32, channel: &mut Channel) -> bool {
        let Some(role) = self.role else {
            return false;
        };
        if !channel.is_open() {
            return false;
        }

        let y = clamp_paddle_y(candidate);
        if y == self.held_y {
            return false;
        }

        self.held_y = y;
        channel.send(&ClientMessage::PaddleMove { player: role, y })
    }

    /// Per-frame held-key evaluation against the current input state.
    pub fn evaluate_held_keys(&mut self, input: &InputState, channel: &mut Channel) -> bool {
        match input.keyboard_target(self.held_y) {
            Some(target) => self.propose(target, channel),
            None => false,
        }
    }

    /// Re-derives the role from the snapshot roster. The held position is
    /// seeded from the snapshot only when the role changes; afterwards the
    /// local value stays authoritative for this client's own paddle.
    pub fn reconcile(&mut self, snapshot: &Snapshot) -> Reconciliation {
        let role = snapshot.role_of(&self.identity);
        if role == self.role {
            return Reconciliation::Unchanged;
        }

        self.role = role;
        match role {
            Some(role) => {
                self.held_y = clamp_paddle_y(snapshot.paddles.get(role).y);
                info!("Assigned {} (paddle at {})", role, self.held_y);
                Reconciliation::Assigned {
                    role,
                    seeded_y: self.held_y,
                }
            }
            None => {
                info!("{} is spectating", self.identity);
                Reconciliation::Unassigned
            }
        }
    }

    /// Forgets the role so the next snapshot seeds the position again.
    pub fn reset_role(&mut self) {
        self.role = None;
    }
}

/// Latest snapshot received, last write wins.
#[derive(Debug, Default)]
pub struct SnapshotSlot {
    latest: Option<Snapshot>,
    generation: u64,
}

impl SnapshotSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces whatever was held before; snapshots are never merged.
    pub fn replace(&mut self, snapshot: Snapshot) -> &Snapshot {
        self.generation += 1;
        debug!("Snapshot generation {}", self.generation);
        self.latest.insert(snapshot)
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.latest.as_ref()
    }

    /// Incremented on every replacement.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
