//! Pending delayed effects.
//!
//! The scheduler lives inside [`GameState`](crate::state::GameState), so taking
//! an effect out and applying it commit in the same state swap. It never
//! advances time on its own; the engine's tick decides what is due.

use crate::action::{ActionArgs, ActionKind};
use crate::state::{TeamId, Tick};

/// An action whose effect lands at `due`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingEffect {
    /// Insertion order; ties between equal due ticks resolve by it.
    pub seq: u64,
    pub kind: ActionKind,
    pub team: TeamId,
    pub args: ActionArgs,
    pub scheduled_at: Tick,
    pub due: Tick,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scheduler {
    next_seq: u64,
    /// Sorted by `seq`.
    pending: Vec<PendingEffect>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an effect and returns its sequence number.
    pub fn schedule(
        &mut self,
        kind: ActionKind,
        team: TeamId,
        args: ActionArgs,
        scheduled_at: Tick,
        due: Tick,
    ) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(PendingEffect {
            seq,
            kind,
            team,
            args,
            scheduled_at,
            due,
        });
        seq
    }

    /// Sequence numbers of every effect due at `current`, in FIFO order.
    pub fn due_at(&self, current: Tick) -> Vec<u64> {
        self.pending
            .iter()
            .filter(|effect| effect.due <= current)
            .map(|effect| effect.seq)
            .collect()
    }

    /// Removes an effect. Each effect can be taken once.
    pub fn take(&mut self, seq: u64) -> Option<PendingEffect> {
        let position = self.pending.iter().position(|effect| effect.seq == seq)?;
        Some(self.pending.remove(position))
    }

    pub fn pending(&self) -> impl Iterator<Item = &PendingEffect> {
        self.pending.iter()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
