use std::fmt;

use pulse_units::RelTime;

use crate::schedule::RefPt;

/// Handle to an operation emitted into a schedule scope; anchors later
/// operations without spelling the generated name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpToken {
    name: String,
}

impl OpToken {
    pub(crate) fn new(name: String) -> Self {
        OpToken { name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for OpToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A timing anchor: an [`OpToken`] or a plain operation name.
pub trait RefOp {
    fn ref_name(&self) -> &str;
}

impl RefOp for OpToken {
    fn ref_name(&self) -> &str {
        self.name()
    }
}

impl RefOp for str {
    fn ref_name(&self) -> &str {
        self
    }
}

impl RefOp for String {
    fn ref_name(&self) -> &str {
        self
    }
}

/// Timing for one emitted operation. Consumed only by schedule-like
/// scopes; sequence-like scopes ignore it.
///
/// `()` converts to the default timing, so plain emits read as
/// `builder.play("ch", pulse, ())`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timing {
    pub(crate) name: Option<String>,
    pub(crate) rel_time: Option<RelTime>,
    pub(crate) ref_op: Option<String>,
    pub(crate) ref_pt: Option<RefPt>,
    pub(crate) ref_pt_new: Option<RefPt>,
}

impl Timing {
    pub fn new() -> Self {
        Timing::default()
    }

    /// Timing that only assigns an explicit name.
    pub fn named(name: impl Into<String>) -> Self {
        Timing::new().name(name)
    }

    /// Timing that starts at the end of `anchor`.
    pub fn after<R: RefOp + ?Sized>(anchor: &R) -> Self {
        Timing::new()
            .ref_op(anchor)
            .ref_pt(RefPt::End)
            .ref_pt_new(RefPt::Start)
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn rel_time(mut self, rel_time: RelTime) -> Self {
        self.rel_time = Some(rel_time);
        self
    }

    pub fn ref_op<R: RefOp + ?Sized>(mut self, anchor: &R) -> Self {
        self.ref_op = Some(anchor.ref_name().to_owned());
        self
    }

    pub fn ref_pt(mut self, ref_pt: RefPt) -> Self {
        self.ref_pt = Some(ref_pt);
        self
    }

    pub fn ref_pt_new(mut self, ref_pt_new: RefPt) -> Self {
        self.ref_pt_new = Some(ref_pt_new);
        self
    }
}

impl From<()> for Timing {
    fn from((): ()) -> Self {
        Timing::default()
    }
}
