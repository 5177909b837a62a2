//! Scoped construction of sequences and schedules.
//!
//! A [`Builder`] keeps a stack of open scopes. Roots open with
//! [`Builder::sequence`] or [`Builder::schedule`]; control flow and nested
//! programs open child scopes through closures and close when the closure
//! returns. Each scope's body flavor is fixed at open time by its parent,
//! so the same `repeat`/`for_each`/`conditional` calls produce sequence
//! nodes under a sequence and timed schedule nodes under a schedule.
//!
//! Emits into a schedule-like scope return an [`OpToken`] naming the new
//! entry. Unnamed entries get generated names (`op_1`, `op_2`, ...); the
//! counter is per builder, so names never repeat within one session.

mod block;
mod scope;
mod timing;

pub use block::PendingBlock;
pub use timing::{OpToken, RefOp, Timing};

use indexmap::IndexMap;
use log::debug;

use pulse_units::{Duration, Frequency, Phase, Threshold};

use self::scope::Scope;
use crate::control_flow::validate_iteration;
use crate::operation::{
    Barrier, CompensateDc, Discriminate, Operation, Play, PulseDecl, Record, SetFrequency,
    SetPhase, ShiftFrequency, ShiftPhase, Store, StoreMode, Trace, VariableDType, VariableDecl,
    Wait,
};
use crate::schedule::{
    RefPt, SchedConditional, SchedIteration, SchedRepetition, Schedulable, Schedule,
    ScheduledOperation,
};
use crate::sequence::{Conditional, Iteration, Repetition, Sequence, SequenceItem};
use crate::types::{
    ChannelRef, Identifier, Integration, Iterable, OneOrMany, PulseOrRef, PulseType, ValueOrVar,
    VariableRef,
};
use crate::{Error, Result};

/// Stack-based program builder. One builder drives one construction
/// session; it can build several roots in turn and keeps its name counter
/// across them.
#[derive(Debug, Default)]
pub struct Builder {
    stack: Vec<Scope>,
    op_counter: u64,
    block_counter: u64,
}

/// Outcome of closing the innermost scope.
enum Closed {
    Sequence(Sequence),
    Schedule(Schedule),
    Attached(Option<OpToken>),
}

impl Builder {
    pub fn new() -> Self {
        Builder::default()
    }

    /// Builds an implicitly timed root program.
    pub fn sequence<F>(&mut self, build: F) -> Result<Sequence>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        if !self.stack.is_empty() {
            return Err(Error::RootScope {
                operation: "sequence",
            });
        }
        debug!("open root sequence scope");
        self.stack.push(Scope::Sequence {
            body: Sequence::new(),
        });
        if let Err(err) = build(self) {
            self.stack.pop();
            return Err(err);
        }
        match self.close_scope()? {
            Closed::Sequence(seq) => Ok(seq),
            Closed::Schedule(_) | Closed::Attached(_) => {
                unreachable!("a root sequence scope closes to a sequence")
            }
        }
    }

    /// Builds an explicitly timed root program.
    pub fn schedule<F>(&mut self, build: F) -> Result<Schedule>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        if !self.stack.is_empty() {
            return Err(Error::RootScope {
                operation: "schedule",
            });
        }
        debug!("open root schedule scope");
        self.stack.push(Scope::Schedule {
            timing: Timing::default(),
            body: Schedule::new(),
            pending: IndexMap::new(),
        });
        if let Err(err) = build(self) {
            self.stack.pop();
            return Err(err);
        }
        match self.close_scope()? {
            Closed::Schedule(schedule) => Ok(schedule),
            Closed::Sequence(_) | Closed::Attached(_) => {
                unreachable!("a root schedule scope closes to a schedule")
            }
        }
    }

    /// Opens a nested sequence inside a sequence-like scope.
    pub fn sub_sequence<F>(&mut self, build: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let parent = self.stack.last().ok_or(Error::NoOpenScope)?;
        if parent.is_schedule_like() {
            return Err(Error::ScopeKind {
                operation: "sub_sequence",
                expected: "sequence",
                actual: parent.kind(),
            });
        }
        self.enter(
            Scope::Sequence {
                body: Sequence::new(),
            },
            build,
        )
        .map(|_| ())
    }

    /// Opens a nested schedule inside a schedule-like scope and returns
    /// the token of the resulting entry.
    pub fn sub_schedule<F>(&mut self, timing: impl Into<Timing>, build: F) -> Result<OpToken>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let parent = self.stack.last().ok_or(Error::NoOpenScope)?;
        if !parent.is_schedule_like() {
            return Err(Error::ScopeKind {
                operation: "sub_schedule",
                expected: "schedule",
                actual: parent.kind(),
            });
        }
        let timing = self.scheduled_timing(timing.into());
        let token = self.enter(
            Scope::Schedule {
                timing,
                body: Schedule::new(),
                pending: IndexMap::new(),
            },
            build,
        )?;
        match token {
            Some(token) => Ok(token),
            None => unreachable!("schedule-like parents always yield tokens"),
        }
    }

    /// Runs the body a fixed number of times. The node flavor follows the
    /// parent scope; `timing` applies only under a schedule-like parent.
    pub fn repeat<F>(
        &mut self,
        count: u32,
        timing: impl Into<Timing>,
        build: F,
    ) -> Result<Option<OpToken>>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let schedule_like = match self.stack.last() {
            None => return Err(Error::NoOpenScope),
            Some(parent) => parent.is_schedule_like(),
        };
        let scope = if schedule_like {
            Scope::SchedRepetition {
                count,
                timing: self.scheduled_timing(timing.into()),
                body: Schedule::new(),
                pending: IndexMap::new(),
            }
        } else {
            Scope::Repetition {
                count,
                body: Sequence::new(),
            }
        };
        self.enter(scope, build)
    }

    /// Runs the body once per entry of `items`, binding the loop
    /// variables. Shape and length of `vars` against `items` are checked
    /// before the scope opens.
    pub fn for_each<F>(
        &mut self,
        vars: &[&str],
        items: impl Into<OneOrMany<Iterable>>,
        timing: impl Into<Timing>,
        build: F,
    ) -> Result<Option<OpToken>>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let var = Self::var_list(vars)?;
        let items = items.into();
        validate_iteration(&var, &items)?;
        let schedule_like = match self.stack.last() {
            None => return Err(Error::NoOpenScope),
            Some(parent) => parent.is_schedule_like(),
        };
        let scope = if schedule_like {
            Scope::SchedIteration {
                var,
                items,
                timing: self.scheduled_timing(timing.into()),
                body: Schedule::new(),
                pending: IndexMap::new(),
            }
        } else {
            Scope::Iteration {
                var,
                items,
                body: Sequence::new(),
            }
        };
        self.enter(scope, build)
    }

    /// Runs the body only when the condition variable is true.
    pub fn conditional<F>(
        &mut self,
        var: &str,
        timing: impl Into<Timing>,
        build: F,
    ) -> Result<Option<OpToken>>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let var = VariableRef::new(var)?;
        let schedule_like = match self.stack.last() {
            None => return Err(Error::NoOpenScope),
            Some(parent) => parent.is_schedule_like(),
        };
        let scope = if schedule_like {
            Scope::SchedConditional {
                var,
                timing: self.scheduled_timing(timing.into()),
                body: Schedule::new(),
                pending: IndexMap::new(),
            }
        } else {
            Scope::Conditional {
                var,
                body: Sequence::new(),
            }
        };
        self.enter(scope, build)
    }

    /// Emits a leaf operation into the innermost scope. Returns a token
    /// under a schedule-like scope; `timing` is ignored under a
    /// sequence-like scope.
    pub fn emit(
        &mut self,
        op: impl Into<Operation>,
        timing: impl Into<Timing>,
    ) -> Result<Option<OpToken>> {
        let op = op.into();
        let schedule_like = match self.stack.last() {
            None => return Err(Error::NoOpenScope),
            Some(parent) => {
                debug!("emit {} into {} scope", op.op_type(), parent.kind());
                parent.is_schedule_like()
            }
        };
        if schedule_like {
            self.attach_scheduled(Schedulable::Op(op), timing.into())
                .map(Some)
        } else {
            self.attach_item(SequenceItem::Op(op));
            Ok(None)
        }
    }

    pub fn play(
        &mut self,
        channel: &str,
        pulse: impl Into<PulseOrRef>,
        timing: impl Into<Timing>,
    ) -> Result<Option<OpToken>> {
        self.emit(Play::new(ChannelRef::new(channel)?, pulse), timing)
    }

    /// Waits on the given channels. A schedule times each channel
    /// explicitly, so the multi-channel form is a sequence-only shorthand.
    pub fn wait(
        &mut self,
        channels: &[&str],
        duration: Duration,
        timing: impl Into<Timing>,
    ) -> Result<Option<OpToken>> {
        if channels.len() > 1 && self.stack.last().is_some_and(Scope::is_schedule_like) {
            return Err(Error::MultiChannelWait {
                count: channels.len(),
            });
        }
        self.emit(Wait::new(Self::channel_list(channels)?, duration), timing)
    }

    /// Aligns the given channels (all channels when empty). Barriers have
    /// no place in a schedule, where alignment is explicit.
    pub fn barrier(&mut self, channels: &[&str]) -> Result<()> {
        match self.stack.last() {
            None => return Err(Error::NoOpenScope),
            Some(parent) if parent.is_schedule_like() => {
                return Err(Error::ScopeKind {
                    operation: "barrier",
                    expected: "sequence",
                    actual: parent.kind(),
                });
            }
            Some(_) => {}
        }
        self.emit(Barrier::new(Self::channel_list(channels)?), ())?;
        Ok(())
    }

    pub fn set_frequency(
        &mut self,
        channel: &str,
        frequency: impl Into<ValueOrVar<Frequency>>,
        timing: impl Into<Timing>,
    ) -> Result<Option<OpToken>> {
        self.emit(
            SetFrequency::new(ChannelRef::new(channel)?, frequency),
            timing,
        )
    }

    pub fn shift_frequency(
        &mut self,
        channel: &str,
        frequency: impl Into<ValueOrVar<Frequency>>,
        timing: impl Into<Timing>,
    ) -> Result<Option<OpToken>> {
        self.emit(
            ShiftFrequency::new(ChannelRef::new(channel)?, frequency),
            timing,
        )
    }

    pub fn set_phase(
        &mut self,
        channel: &str,
        phase: impl Into<ValueOrVar<Phase>>,
        timing: impl Into<Timing>,
    ) -> Result<Option<OpToken>> {
        self.emit(SetPhase::new(ChannelRef::new(channel)?, phase), timing)
    }

    pub fn shift_phase(
        &mut self,
        channel: &str,
        phase: impl Into<ValueOrVar<Phase>>,
        timing: impl Into<Timing>,
    ) -> Result<Option<OpToken>> {
        self.emit(ShiftPhase::new(ChannelRef::new(channel)?, phase), timing)
    }

    pub fn record(
        &mut self,
        channel: &str,
        var: &str,
        duration: Duration,
        integration: Integration,
        timing: impl Into<Timing>,
    ) -> Result<Option<OpToken>> {
        self.emit(
            Record::new(
                ChannelRef::new(channel)?,
                VariableRef::new(var)?,
                duration,
                integration,
            ),
            timing,
        )
    }

    pub fn trace(
        &mut self,
        channel: &str,
        var: &str,
        duration: Duration,
        timing: impl Into<Timing>,
    ) -> Result<Option<OpToken>> {
        self.emit(
            Trace::new(ChannelRef::new(channel)?, VariableRef::new(var)?, duration),
            timing,
        )
    }

    pub fn compensate_dc(
        &mut self,
        channel: &str,
        duration: impl Into<ValueOrVar<Duration>>,
        timing: impl Into<Timing>,
    ) -> Result<Option<OpToken>> {
        self.emit(
            CompensateDc::new(ChannelRef::new(channel)?, duration),
            timing,
        )
    }

    /// Resets a channel's accumulated area without playing anything.
    pub fn dc_reset(
        &mut self,
        channel: &str,
        timing: impl Into<Timing>,
    ) -> Result<Option<OpToken>> {
        self.emit(CompensateDc::reset(ChannelRef::new(channel)?), timing)
    }

    pub fn var_decl(
        &mut self,
        name: &str,
        dtype: VariableDType,
        timing: impl Into<Timing>,
    ) -> Result<Option<OpToken>> {
        self.emit(VariableDecl::new(Identifier::new(name)?, dtype), timing)
    }

    pub fn pulse_decl(
        &mut self,
        name: &str,
        pulse: impl Into<PulseType>,
        timing: impl Into<Timing>,
    ) -> Result<Option<OpToken>> {
        self.emit(PulseDecl::new(Identifier::new(name)?, pulse), timing)
    }

    pub fn discriminate(
        &mut self,
        target: &str,
        source: &str,
        threshold: Threshold,
        timing: impl Into<Timing>,
    ) -> Result<Option<OpToken>> {
        self.emit(
            Discriminate::new(VariableRef::new(target)?, VariableRef::new(source)?, threshold),
            timing,
        )
    }

    pub fn store(
        &mut self,
        key: &str,
        source: &str,
        mode: StoreMode,
        timing: impl Into<Timing>,
    ) -> Result<Option<OpToken>> {
        self.emit(Store::new(key, VariableRef::new(source)?, mode), timing)
    }

    /// Plays a probe pulse and records the response. Under a schedule the
    /// record is anchored to the start of the play, so both run
    /// simultaneously; in a sequence they run back to back. Returns the
    /// record token, the natural anchor for follow-up operations.
    pub fn measure(
        &mut self,
        drive: &str,
        pulse: impl Into<PulseOrRef>,
        record: Record,
        timing: impl Into<Timing>,
    ) -> Result<Option<OpToken>> {
        let play_token = self.play(drive, pulse, timing)?;
        match play_token {
            Some(token) => {
                let anchor = Timing::new()
                    .ref_op(&token)
                    .ref_pt(RefPt::Start)
                    .ref_pt_new(RefPt::Start);
                self.emit(record, anchor)
            }
            None => self.emit(record, ()),
        }
    }

    /// [`Builder::measure`] followed by thresholding the recorded value.
    pub fn measure_and_discriminate(
        &mut self,
        drive: &str,
        pulse: impl Into<PulseOrRef>,
        record: Record,
        discriminate: Discriminate,
        timing: impl Into<Timing>,
    ) -> Result<Option<OpToken>> {
        let token = self.measure(drive, pulse, record, timing)?;
        self.emit(discriminate, ())?;
        Ok(token)
    }

    /// Captures a deferred block against the innermost schedule scope.
    ///
    /// The closure runs only when the block is handed back to
    /// [`Builder::add_block`], on the same scope or any scope nested
    /// below it. Closing a scope that still owns captured blocks fails
    /// with their capture sites.
    #[track_caller]
    pub fn capture_block<F>(&mut self, build: F) -> Result<PendingBlock>
    where
        F: FnOnce(&mut Self) -> Result<()> + 'static,
    {
        let site = crate::BlockSite::new(std::panic::Location::caller());
        let parent = self.stack.last_mut().ok_or(Error::NoOpenScope)?;
        let kind = parent.kind();
        let Some(pending) = parent.pending_mut() else {
            return Err(Error::ScopeKind {
                operation: "capture_block",
                expected: "schedule",
                actual: kind,
            });
        };
        self.block_counter += 1;
        let id = self.block_counter;
        pending.insert(id, site);
        debug!("captured pending block {id} at {site}");
        Ok(PendingBlock {
            id,
            site,
            run: Box::new(build),
        })
    }

    /// Runs a captured block inside a fresh nested schedule and removes it
    /// from the pending set of whichever open scope captured it. The block
    /// may be consumed in a scope nested below its owner.
    pub fn add_block(
        &mut self,
        block: PendingBlock,
        timing: impl Into<Timing>,
    ) -> Result<OpToken> {
        let parent = self.stack.last().ok_or(Error::NoOpenScope)?;
        if !parent.is_schedule_like() {
            return Err(Error::ScopeKind {
                operation: "add_block",
                expected: "schedule",
                actual: parent.kind(),
            });
        }
        let owner = self
            .stack
            .iter_mut()
            .rev()
            .filter_map(Scope::pending_mut)
            .find(|pending| pending.contains_key(&block.id));
        match owner {
            Some(pending) => {
                pending.shift_remove(&block.id);
            }
            None => return Err(Error::ForeignBlock(block.site)),
        }
        debug!("consume pending block captured at {}", block.site);
        let PendingBlock { run, .. } = block;
        self.sub_schedule(timing, run)
    }

    fn enter<F>(&mut self, scope: Scope, build: F) -> Result<Option<OpToken>>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        debug!("open {} scope at depth {}", scope.kind(), self.stack.len());
        self.stack.push(scope);
        if let Err(err) = build(self) {
            self.stack.pop();
            return Err(err);
        }
        match self.close_scope()? {
            Closed::Attached(token) => Ok(token),
            Closed::Sequence(_) | Closed::Schedule(_) => {
                unreachable!("nested scopes attach to their parent")
            }
        }
    }

    fn close_scope(&mut self) -> Result<Closed> {
        let scope = self.stack.pop().ok_or(Error::NoOpenScope)?;
        debug!("close {} scope at depth {}", scope.kind(), self.stack.len());
        if let Some(pending) = scope.pending() {
            if !pending.is_empty() {
                return Err(Error::UnconsumedBlocks(pending.values().copied().collect()));
            }
        }
        match scope {
            Scope::Sequence { body } => {
                if self.stack.is_empty() {
                    Ok(Closed::Sequence(body))
                } else {
                    self.attach_item(SequenceItem::Nested(body));
                    Ok(Closed::Attached(None))
                }
            }
            Scope::Repetition { count, body } => {
                self.attach_item(SequenceItem::Repeat(Repetition::new(count, body)));
                Ok(Closed::Attached(None))
            }
            Scope::Iteration { var, items, body } => {
                self.attach_item(SequenceItem::For(Iteration::new(var, items, body)?));
                Ok(Closed::Attached(None))
            }
            Scope::Conditional { var, body } => {
                self.attach_item(SequenceItem::If(Conditional::new(var, body)));
                Ok(Closed::Attached(None))
            }
            Scope::Schedule { timing, body, .. } => {
                if self.stack.is_empty() {
                    Ok(Closed::Schedule(body))
                } else {
                    let token = self.attach_scheduled(Schedulable::Nested(body), timing)?;
                    Ok(Closed::Attached(Some(token)))
                }
            }
            Scope::SchedRepetition {
                count,
                timing,
                body,
                ..
            } => {
                let node = SchedRepetition::new(count, body);
                let token = self.attach_scheduled(Schedulable::Repeat(node), timing)?;
                Ok(Closed::Attached(Some(token)))
            }
            Scope::SchedIteration {
                var,
                items,
                timing,
                body,
                ..
            } => {
                let node = SchedIteration::new(var, items, body)?;
                let token = self.attach_scheduled(Schedulable::For(node), timing)?;
                Ok(Closed::Attached(Some(token)))
            }
            Scope::SchedConditional {
                var, timing, body, ..
            } => {
                let node = SchedConditional::new(var, body);
                let token = self.attach_scheduled(Schedulable::If(node), timing)?;
                Ok(Closed::Attached(Some(token)))
            }
        }
    }

    fn attach_item(&mut self, item: SequenceItem) {
        match self.stack.last_mut() {
            Some(
                Scope::Sequence { body }
                | Scope::Repetition { body, .. }
                | Scope::Iteration { body, .. }
                | Scope::Conditional { body, .. },
            ) => body.push(item),
            _ => unreachable!("sequence nodes only exist under sequence-like parents"),
        }
    }

    fn attach_scheduled(&mut self, op: Schedulable, timing: Timing) -> Result<OpToken> {
        let name = match timing.name {
            Some(name) => name,
            None => self.next_op_name(),
        };
        // An explicit zero offset is the same placement as no offset.
        let rel_time = timing.rel_time.filter(|t| !t.is_zero());
        let item = ScheduledOperation {
            name: Some(name.clone()),
            rel_time,
            ref_op: timing.ref_op,
            ref_pt: timing.ref_pt,
            ref_pt_new: timing.ref_pt_new,
            op,
        };
        match self.stack.last_mut() {
            Some(
                Scope::Schedule { body, .. }
                | Scope::SchedRepetition { body, .. }
                | Scope::SchedIteration { body, .. }
                | Scope::SchedConditional { body, .. },
            ) => {
                body.add_op(item);
                Ok(OpToken::new(name))
            }
            _ => unreachable!("schedule nodes only exist under schedule-like parents"),
        }
    }

    fn next_op_name(&mut self) -> String {
        self.op_counter += 1;
        format!("op_{}", self.op_counter)
    }

    /// Wrapper entries take their generated name when the scope opens, so
    /// numbering follows program order rather than close order.
    fn scheduled_timing(&mut self, timing: Timing) -> Timing {
        if timing.name.is_some() {
            timing
        } else {
            let name = self.next_op_name();
            timing.name(name)
        }
    }

    fn var_list(vars: &[&str]) -> Result<OneOrMany<VariableRef>> {
        match vars {
            [single] => Ok(OneOrMany::One(VariableRef::new(*single)?)),
            _ => {
                let refs = vars
                    .iter()
                    .map(|name| VariableRef::new(*name))
                    .collect::<Result<Vec<_>>>()?;
                Ok(OneOrMany::Many(refs))
            }
        }
    }

    fn channel_list(channels: &[&str]) -> Result<Vec<ChannelRef>> {
        channels.iter().map(|name| ChannelRef::new(*name)).collect()
    }
}

#[cfg(test)]
mod tests {
    use pulse_units::{Amplitude, Duration, Frequency, Phase, Time, Voltage};
    use serde_json::json;

    use super::*;
    use crate::types::{LinSpace, SquarePulse};

    fn pulse() -> SquarePulse {
        SquarePulse::new(Duration::nanos(100).unwrap(), Amplitude::volts(1.0))
    }

    #[test]
    fn sequence_emits_yield_no_tokens() {
        let mut builder = Builder::new();
        let seq = builder
            .sequence(|b| {
                assert!(b.play("drive", pulse(), ())?.is_none());
                assert!(
                    b.wait(&["drive", "readout"], Duration::nanos(50)?, ())?
                        .is_none()
                );
                b.barrier(&["drive"])?;
                assert!(
                    b.set_frequency("drive", Frequency::gigahertz(5.2), ())?
                        .is_none()
                );
                Ok(())
            })
            .unwrap();
        assert_eq!(seq.len(), 4);
    }

    #[test]
    fn schedule_emits_generated_names() {
        let mut builder = Builder::new();
        let schedule = builder
            .schedule(|b| {
                let first = b.play("drive", pulse(), ())?.unwrap();
                assert_eq!(first.name(), "op_1");
                let named = b.play("drive", pulse(), Timing::named("probe"))?.unwrap();
                assert_eq!(named.name(), "probe");
                let second = b.play("drive", pulse(), ())?.unwrap();
                assert_eq!(second.name(), "op_2");
                Ok(())
            })
            .unwrap();
        assert_eq!(schedule[0].name.as_deref(), Some("op_1"));
        assert_eq!(schedule[1].name.as_deref(), Some("probe"));

        // The counter is per builder, not per root.
        builder
            .schedule(|b| {
                let next = b.play("drive", pulse(), ())?.unwrap();
                assert_eq!(next.name(), "op_3");
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn wrapper_names_are_reserved_at_open() {
        let mut builder = Builder::new();
        let schedule = builder
            .schedule(|b| {
                b.play("drive", pulse(), ())?;
                b.repeat(2, (), |b| {
                    b.play("drive", pulse(), ())?;
                    Ok(())
                })?;
                b.play("drive", pulse(), ())?;
                Ok(())
            })
            .unwrap();
        // The repetition wrapper is numbered before its children.
        assert_eq!(schedule[0].name.as_deref(), Some("op_1"));
        assert_eq!(schedule[1].name.as_deref(), Some("op_2"));
        assert_eq!(schedule[2].name.as_deref(), Some("op_4"));
        let Schedulable::Repeat(node) = &schedule[1].op else {
            panic!("expected a repetition");
        };
        assert_eq!(node.body[0].name.as_deref(), Some("op_3"));
    }

    #[test]
    fn tokens_anchor_by_name() {
        let mut builder = Builder::new();
        let schedule = builder
            .schedule(|b| {
                let warmup = b.play("drive", pulse(), Timing::named("warmup"))?.unwrap();
                b.play(
                    "drive",
                    pulse(),
                    Timing::after(&warmup).rel_time(Time::nanos(30)),
                )?;
                Ok(())
            })
            .unwrap();
        let value = serde_json::to_value(&schedule).unwrap();
        assert_eq!(value[1]["ref_op"], json!("warmup"));
        assert_eq!(value[1]["ref_pt"], json!("end"));
        assert_eq!(value[1]["ref_pt_new"], json!("start"));
        assert_eq!(value[1]["rel_time"], json!({"ns": 30}));
    }

    #[test]
    fn zero_rel_time_collapses_to_unset() {
        let mut builder = Builder::new();
        let schedule = builder
            .schedule(|b| {
                b.play("drive", pulse(), Timing::new().rel_time(Time::nanos(0)))?;
                b.play("drive", pulse(), Timing::new().rel_time(Time::nanos(10)))?;
                Ok(())
            })
            .unwrap();
        assert!(schedule[0].rel_time.is_none());
        assert_eq!(schedule[1].rel_time, Some(Time::nanos(10)));
    }

    #[test]
    fn multi_channel_wait_is_sequence_only() {
        let mut builder = Builder::new();
        builder
            .schedule(|b| {
                let err = b
                    .wait(&["a", "b"], Duration::nanos(10).unwrap(), ())
                    .unwrap_err();
                assert!(matches!(err, Error::MultiChannelWait { count: 2 }));
                b.wait(&["a"], Duration::nanos(10)?, ())?;
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn barrier_is_sequence_only() {
        let mut builder = Builder::new();
        builder
            .schedule(|b| {
                let err = b.barrier(&["a"]).unwrap_err();
                assert!(matches!(
                    err,
                    Error::ScopeKind {
                        operation: "barrier",
                        ..
                    }
                ));
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn control_flow_follows_the_parent_flavor() {
        let mut builder = Builder::new();
        let seq = builder
            .sequence(|b| {
                let token = b.repeat(3, (), |b| {
                    b.play("drive", pulse(), ())?;
                    Ok(())
                })?;
                assert!(token.is_none());
                b.conditional("flag", (), |b| {
                    b.shift_phase("drive", Phase::degrees(90.0), ())?;
                    Ok(())
                })?;
                Ok(())
            })
            .unwrap();
        assert!(matches!(seq[0], SequenceItem::Repeat(_)));
        assert!(matches!(seq[1], SequenceItem::If(_)));

        let schedule = builder
            .schedule(|b| {
                let token = b
                    .repeat(3, Timing::named("loop"), |b| {
                        b.play("drive", pulse(), ())?;
                        Ok(())
                    })?
                    .unwrap();
                assert_eq!(token.name(), "loop");
                Ok(())
            })
            .unwrap();
        assert!(matches!(schedule[0].op, Schedulable::Repeat(_)));
        assert_eq!(schedule[0].name.as_deref(), Some("loop"));
    }

    #[test]
    fn for_each_validates_before_opening() {
        let mut builder = Builder::new();
        let seq = builder
            .sequence(|b| {
                b.for_each(
                    &["amp"],
                    Iterable::from(LinSpace::new(0.0, 1.0, 5).unwrap()),
                    (),
                    |b| {
                        b.play("drive", pulse(), ())?;
                        Ok(())
                    },
                )?;
                let err = b
                    .for_each(&["i", "j"], Iterable::from(vec![1i64, 2]), (), |_| Ok(()))
                    .unwrap_err();
                assert!(matches!(err, Error::IterationShape));
                let err = b
                    .for_each(
                        &["i", "j"],
                        vec![Iterable::from(vec![1i64, 2])],
                        (),
                        |_| Ok(()),
                    )
                    .unwrap_err();
                assert!(matches!(
                    err,
                    Error::IterationArity {
                        vars: 2,
                        iterables: 1
                    }
                ));
                Ok(())
            })
            .unwrap();
        assert_eq!(seq.len(), 1);
        assert!(matches!(seq[0], SequenceItem::For(_)));
    }

    #[test]
    fn roots_require_an_empty_stack() {
        let mut builder = Builder::new();
        assert!(matches!(
            builder.play("drive", pulse(), ()),
            Err(Error::NoOpenScope)
        ));
        builder
            .sequence(|b| {
                assert!(matches!(
                    b.schedule(|_| Ok(())),
                    Err(Error::RootScope {
                        operation: "schedule"
                    })
                ));
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn nested_roots_must_match_the_parent_flavor() {
        let mut builder = Builder::new();
        builder
            .sequence(|b| {
                assert!(matches!(
                    b.sub_schedule((), |_| Ok(())),
                    Err(Error::ScopeKind { .. })
                ));
                b.sub_sequence(|b| {
                    b.play("drive", pulse(), ())?;
                    Ok(())
                })?;
                Ok(())
            })
            .unwrap();
        builder
            .schedule(|b| {
                assert!(matches!(
                    b.sub_sequence(|_| Ok(())),
                    Err(Error::ScopeKind { .. })
                ));
                b.sub_schedule(Timing::named("inner"), |b| {
                    b.play("drive", pulse(), ())?;
                    Ok(())
                })?;
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn failed_scopes_are_discarded() {
        let mut builder = Builder::new();
        let err = builder.sequence(|b| {
            b.play("drive", pulse(), ())?;
            Err(Error::new("deliberate failure"))
        });
        assert!(err.is_err());
        // The stack unwound, so the builder is usable again.
        let seq = builder
            .sequence(|b| {
                b.play("drive", pulse(), ())?;
                Ok(())
            })
            .unwrap();
        assert_eq!(seq.len(), 1);
    }

    #[test]
    fn captured_blocks_insert_where_consumed() {
        let mut builder = Builder::new();
        let schedule = builder
            .schedule(|b| {
                b.play("drive", pulse(), ())?;
                let block = b.capture_block(|b| {
                    b.play("readout", pulse(), ())?;
                    Ok(())
                })?;
                b.play("drive", pulse(), ())?;
                let token = b.add_block(block, Timing::named("deferred"))?;
                assert_eq!(token.name(), "deferred");
                Ok(())
            })
            .unwrap();
        assert_eq!(schedule.len(), 3);
        assert_eq!(schedule[2].name.as_deref(), Some("deferred"));
        assert!(matches!(schedule[2].op, Schedulable::Nested(_)));
    }

    #[test]
    fn unconsumed_blocks_fail_the_scope() {
        let mut builder = Builder::new();
        let err = builder
            .schedule(|b| {
                b.capture_block(|_| Ok(()))?;
                b.capture_block(|_| Ok(()))?;
                Ok(())
            })
            .unwrap_err();
        match err {
            Error::UnconsumedBlocks(sites) => {
                assert_eq!(sites.len(), 2);
                assert!(sites[0].file().ends_with("mod.rs"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn blocks_captured_outside_are_consumable_in_nested_scopes() {
        let mut builder = Builder::new();
        let schedule = builder
            .schedule(|b| {
                let block = b.capture_block(|b| {
                    b.play("readout", pulse(), ())?;
                    Ok(())
                })?;
                b.sub_schedule(Timing::named("inner"), move |b| {
                    b.add_block(block, Timing::named("deferred"))?;
                    Ok(())
                })?;
                Ok(())
            })
            .unwrap();
        // The outer scope closed clean; the block landed in the nested one.
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule[0].name.as_deref(), Some("inner"));
        let Schedulable::Nested(inner) = &schedule[0].op else {
            panic!("expected a nested schedule");
        };
        assert_eq!(inner[0].name.as_deref(), Some("deferred"));
        assert!(matches!(inner[0].op, Schedulable::Nested(_)));
    }

    #[test]
    fn blocks_from_discarded_scopes_are_foreign() {
        let mut builder = Builder::new();
        let mut stray = None;
        let err = builder.schedule(|b| {
            stray = Some(b.capture_block(|_| Ok(()))?);
            Err(Error::new("abandon this scope"))
        });
        assert!(err.is_err());
        let block = stray.unwrap();
        builder
            .schedule(move |b| {
                let err = b.add_block(block, ()).unwrap_err();
                assert!(matches!(err, Error::ForeignBlock(_)));
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn capture_requires_a_schedule_scope() {
        let mut builder = Builder::new();
        builder
            .sequence(|b| {
                assert!(matches!(
                    b.capture_block(|_| Ok(())),
                    Err(Error::ScopeKind {
                        operation: "capture_block",
                        ..
                    })
                ));
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn measure_anchors_the_record_to_the_play() {
        let mut builder = Builder::new();
        let record = || {
            Record::new(
                ChannelRef::new("readout").unwrap(),
                VariableRef::new("result").unwrap(),
                Duration::nanos(200).unwrap(),
                Integration::default(),
            )
        };
        let schedule = builder
            .schedule(|b| {
                let token = b
                    .measure("drive", pulse(), record(), Timing::named("pi_pulse"))?
                    .unwrap();
                // The returned token names the record, not the play.
                assert_eq!(token.name(), "op_1");
                Ok(())
            })
            .unwrap();
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule[0].name.as_deref(), Some("pi_pulse"));
        assert_eq!(schedule[1].name.as_deref(), Some("op_1"));
        assert_eq!(schedule[1].ref_op.as_deref(), Some("pi_pulse"));
        assert_eq!(schedule[1].ref_pt, Some(RefPt::Start));
        assert_eq!(schedule[1].ref_pt_new, Some(RefPt::Start));

        let seq = builder
            .sequence(|b| {
                let disc = Discriminate::new(
                    VariableRef::new("bit")?,
                    VariableRef::new("result")?,
                    Voltage::volts(0.1),
                );
                b.measure_and_discriminate("drive", pulse(), record(), disc, ())?;
                Ok(())
            })
            .unwrap();
        assert_eq!(seq.len(), 3);
    }

    #[test]
    fn declaration_and_data_ops_emit() {
        let mut builder = Builder::new();
        let seq = builder
            .sequence(|b| {
                b.var_decl("result", VariableDType::Complex, ())?;
                b.pulse_decl("pi_half", pulse(), ())?;
                b.record(
                    "readout",
                    "result",
                    Duration::nanos(200)?,
                    Integration::default(),
                    (),
                )?;
                b.trace("monitor", "dbg", Duration::micros(1.0)?, ())?;
                b.discriminate("bit", "result", Voltage::volts(0.1), ())?;
                b.store("shots", "bit", StoreMode::Average, ())?;
                b.compensate_dc("flux", Duration::micros(2.0)?, ())?;
                b.dc_reset("flux", ())?;
                b.shift_phase("drive", Phase::degrees(90.0), ())?;
                Ok(())
            })
            .unwrap();
        assert_eq!(seq.len(), 9);
    }

    #[test]
    fn end_to_end_sequence_wire_form() {
        let mut builder = Builder::new();
        let seq = builder
            .sequence(|b| {
                b.play("drive", pulse(), ())?;
                b.wait(&["drive", "readout"], Duration::nanos(50)?, ())?;
                Ok(())
            })
            .unwrap();
        assert_eq!(
            serde_json::to_value(&seq).unwrap(),
            json!([
                {
                    "op_type": "play",
                    "channel": "drive",
                    "pulse": {
                        "pulse_type": "square",
                        "duration": {"ns": 100},
                        "amplitude": {"V": 1.0},
                    },
                },
                {
                    "op_type": "wait",
                    "channels": ["drive", "readout"],
                    "duration": {"ns": 50},
                },
            ])
        );
    }
}
