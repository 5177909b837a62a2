use crate::schedule::Schedule;
use crate::sequence::Sequence;
use crate::types::{Iterable, OneOrMany, VariableRef};

use super::block::PendingRegistry;
use super::timing::Timing;

/// One level of the construction stack. The body flavor is fixed when the
/// scope opens; schedule-like scopes additionally track pending blocks and
/// the timing they attach to their parent with.
#[derive(Debug)]
pub(crate) enum Scope {
    Sequence {
        body: Sequence,
    },
    Repetition {
        count: u32,
        body: Sequence,
    },
    Iteration {
        var: OneOrMany<VariableRef>,
        items: OneOrMany<Iterable>,
        body: Sequence,
    },
    Conditional {
        var: VariableRef,
        body: Sequence,
    },
    Schedule {
        timing: Timing,
        body: Schedule,
        pending: PendingRegistry,
    },
    SchedRepetition {
        count: u32,
        timing: Timing,
        body: Schedule,
        pending: PendingRegistry,
    },
    SchedIteration {
        var: OneOrMany<VariableRef>,
        items: OneOrMany<Iterable>,
        timing: Timing,
        body: Schedule,
        pending: PendingRegistry,
    },
    SchedConditional {
        var: VariableRef,
        timing: Timing,
        body: Schedule,
        pending: PendingRegistry,
    },
}

impl Scope {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Scope::Sequence { .. } => "sequence",
            Scope::Repetition { .. } => "repeat",
            Scope::Iteration { .. } => "for",
            Scope::Conditional { .. } => "if",
            Scope::Schedule { .. } => "schedule",
            Scope::SchedRepetition { .. } => "schedule repeat",
            Scope::SchedIteration { .. } => "schedule for",
            Scope::SchedConditional { .. } => "schedule if",
        }
    }

    pub(crate) fn is_schedule_like(&self) -> bool {
        matches!(
            self,
            Scope::Schedule { .. }
                | Scope::SchedRepetition { .. }
                | Scope::SchedIteration { .. }
                | Scope::SchedConditional { .. }
        )
    }

    pub(crate) fn pending(&self) -> Option<&PendingRegistry> {
        match self {
            Scope::Schedule { pending, .. }
            | Scope::SchedRepetition { pending, .. }
            | Scope::SchedIteration { pending, .. }
            | Scope::SchedConditional { pending, .. } => Some(pending),
            _ => None,
        }
    }

    pub(crate) fn pending_mut(&mut self) -> Option<&mut PendingRegistry> {
        match self {
            Scope::Schedule { pending, .. }
            | Scope::SchedRepetition { pending, .. }
            | Scope::SchedIteration { pending, .. }
            | Scope::SchedConditional { pending, .. } => Some(pending),
            _ => None,
        }
    }
}
