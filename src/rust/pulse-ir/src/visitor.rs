//! Read-only traversal of program trees.
//!
//! Implement [`Visitor`] and hand the root to [`walk_sequence`] or
//! [`walk_schedule`]. Every hook has a no-op default, so an
//! implementation only overrides the nodes it cares about. [`Visitor::visit_op`]
//! fires for every leaf before the per-kind hook, which is usually the
//! right place for cross-cutting passes such as channel collection.

use crate::operation::{
    Barrier, CompensateDc, Discriminate, Operation, Play, PulseDecl, Record, SetFrequency,
    SetPhase, ShiftFrequency, ShiftPhase, Store, Trace, VariableDecl, Wait,
};
use crate::schedule::{
    SchedConditional, SchedIteration, SchedRepetition, Schedulable, Schedule, ScheduledOperation,
};
use crate::sequence::{Conditional, Iteration, Repetition, Sequence, SequenceItem};

/// Hooks for each node kind of a program tree.
///
/// Container hooks (`visit_sequence`, `visit_schedule`, the control-flow
/// hooks) fire before their children; leaves fire `visit_op` first and the
/// per-kind hook second.
#[allow(unused_variables)]
pub trait Visitor {
    fn visit_sequence(&mut self, sequence: &Sequence) {}
    fn visit_schedule(&mut self, schedule: &Schedule) {}

    /// A timed entry, before its payload.
    fn visit_scheduled(&mut self, scheduled: &ScheduledOperation) {}

    fn visit_repetition(&mut self, repetition: &Repetition) {}
    fn visit_iteration(&mut self, iteration: &Iteration) {}
    fn visit_conditional(&mut self, conditional: &Conditional) {}
    fn visit_sched_repetition(&mut self, repetition: &SchedRepetition) {}
    fn visit_sched_iteration(&mut self, iteration: &SchedIteration) {}
    fn visit_sched_conditional(&mut self, conditional: &SchedConditional) {}

    /// Every leaf operation, before its per-kind hook.
    fn visit_op(&mut self, op: &Operation) {}

    fn visit_play(&mut self, op: &Play) {}
    fn visit_wait(&mut self, op: &Wait) {}
    fn visit_barrier(&mut self, op: &Barrier) {}
    fn visit_set_frequency(&mut self, op: &SetFrequency) {}
    fn visit_shift_frequency(&mut self, op: &ShiftFrequency) {}
    fn visit_set_phase(&mut self, op: &SetPhase) {}
    fn visit_shift_phase(&mut self, op: &ShiftPhase) {}
    fn visit_record(&mut self, op: &Record) {}
    fn visit_trace(&mut self, op: &Trace) {}
    fn visit_compensate_dc(&mut self, op: &CompensateDc) {}
    fn visit_variable_decl(&mut self, op: &VariableDecl) {}
    fn visit_pulse_decl(&mut self, op: &PulseDecl) {}
    fn visit_discriminate(&mut self, op: &Discriminate) {}
    fn visit_store(&mut self, op: &Store) {}
}

/// Walks a sequence depth-first in list order.
pub fn walk_sequence<V: Visitor + ?Sized>(visitor: &mut V, sequence: &Sequence) {
    visitor.visit_sequence(sequence);
    for item in sequence {
        match item {
            SequenceItem::Op(op) => dispatch_op(visitor, op),
            SequenceItem::Repeat(node) => {
                visitor.visit_repetition(node);
                walk_sequence(visitor, &node.body);
            }
            SequenceItem::For(node) => {
                visitor.visit_iteration(node);
                walk_sequence(visitor, &node.body);
            }
            SequenceItem::If(node) => {
                visitor.visit_conditional(node);
                walk_sequence(visitor, &node.body);
            }
            SequenceItem::Nested(nested) => walk_sequence(visitor, nested),
        }
    }
}

/// Walks a schedule depth-first in list order.
pub fn walk_schedule<V: Visitor + ?Sized>(visitor: &mut V, schedule: &Schedule) {
    visitor.visit_schedule(schedule);
    for scheduled in schedule {
        visitor.visit_scheduled(scheduled);
        match &scheduled.op {
            Schedulable::Op(op) => dispatch_op(visitor, op),
            Schedulable::Repeat(node) => {
                visitor.visit_sched_repetition(node);
                walk_schedule(visitor, &node.body);
            }
            Schedulable::For(node) => {
                visitor.visit_sched_iteration(node);
                walk_schedule(visitor, &node.body);
            }
            Schedulable::If(node) => {
                visitor.visit_sched_conditional(node);
                walk_schedule(visitor, &node.body);
            }
            Schedulable::Nested(nested) => walk_schedule(visitor, nested),
        }
    }
}

fn dispatch_op<V: Visitor + ?Sized>(visitor: &mut V, op: &Operation) {
    visitor.visit_op(op);
    match op {
        Operation::Play(op) => visitor.visit_play(op),
        Operation::Wait(op) => visitor.visit_wait(op),
        Operation::Barrier(op) => visitor.visit_barrier(op),
        Operation::SetFrequency(op) => visitor.visit_set_frequency(op),
        Operation::ShiftFrequency(op) => visitor.visit_shift_frequency(op),
        Operation::SetPhase(op) => visitor.visit_set_phase(op),
        Operation::ShiftPhase(op) => visitor.visit_shift_phase(op),
        Operation::Record(op) => visitor.visit_record(op),
        Operation::Trace(op) => visitor.visit_trace(op),
        Operation::CompensateDc(op) => visitor.visit_compensate_dc(op),
        Operation::VariableDecl(op) => visitor.visit_variable_decl(op),
        Operation::PulseDecl(op) => visitor.visit_pulse_decl(op),
        Operation::Discriminate(op) => visitor.visit_discriminate(op),
        Operation::Store(op) => visitor.visit_store(op),
    }
}
