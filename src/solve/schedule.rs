use crate::solve::overlay::Position;
use crate::solve::SolveResult;
use std::collections::HashSet;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
struct PendingDisplay {
    batch: u64,
    due: Instant,
    result: SolveResult,
    position: Position,
}

/// A scheduled result whose display time has come.
#[derive(Debug, Clone, PartialEq)]
pub struct DueDisplay {
    pub batch: u64,
    pub result: SolveResult,
    pub position: Position,
    /// Set on the first entry of its batch to fire.
    pub first_in_batch: bool,
}

/// Cancelable queue of delayed result displays, polled from the UI thread.
#[derive(Debug, Default)]
pub struct DisplaySchedule {
    pending: Vec<PendingDisplay>,
    fired_batches: HashSet<u64>,
}

impl DisplaySchedule {
    /// Queues every result of one response. Entry `i` is due at
    /// `received + delay + i * stagger`.
    pub fn schedule_batch(
        &mut self,
        batch: u64,
        results: Vec<SolveResult>,
        position: Position,
        received: Instant,
        delay: Duration,
        stagger: Duration,
    ) {
        for (index, result) in results.into_iter().enumerate() {
            let offset = stagger.saturating_mul(index as u32);
            self.pending.push(PendingDisplay {
                batch,
                due: received + delay + offset,
                result,
                position,
            });
        }
    }

    /// Removes and returns everything due at `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<DueDisplay> {
        let (mut due, rest): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|p| p.due <= now);
        self.pending = rest;
        due.sort_by_key(|p| p.due);

        let fired = due
            .into_iter()
            .map(|p| DueDisplay {
                first_in_batch: self.fired_batches.insert(p.batch),
                batch: p.batch,
                result: p.result,
                position: p.position,
            })
            .collect();
        self.fired_batches
            .retain(|batch| self.pending.iter().any(|p| p.batch == *batch));
        fired
    }

    /// Points the not yet shown entries of `batch` at `position`. Returns how
    /// many were moved.
    pub fn move_batch(&mut self, batch: u64, position: Position) -> usize {
        let mut moved = 0;
        for pending in self.pending.iter_mut().filter(|p| p.batch == batch) {
            pending.position = position;
            moved += 1;
        }
        moved
    }

    /// Drops every pending display and returns how many were cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        self.fired_batches.clear();
        cancelled
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.pending.iter().map(|p| p.due).min()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
