//! In-memory representation of pulse-level control programs.
//!
//! Programs are trees of operations in one of two flavors: an implicitly
//! timed [`Sequence`], where operations run back to back in list order, and
//! an explicitly timed [`Schedule`], where every entry is a
//! [`ScheduledOperation`] carrying timing relative to a named anchor. Both
//! flavors share the same leaf [`Operation`] set and serialize to a stable
//! JSON wire format with `op_type`-tagged nodes.
//!
//! [`builder::Builder`] assembles either flavor through scoped closures:
//!
//! ```
//! use pulse_ir::builder::Builder;
//! use pulse_ir::types::SquarePulse;
//! use pulse_units::{Amplitude, Duration};
//!
//! # fn main() -> pulse_ir::Result<()> {
//! let mut builder = Builder::new();
//! let seq = builder.sequence(|b| {
//!     let pulse = SquarePulse::new(Duration::nanos(100)?, Amplitude::volts(1.0));
//!     b.play("drive", pulse, ())?;
//!     b.wait(&["drive", "readout"], Duration::nanos(50)?, ())?;
//!     Ok(())
//! })?;
//! assert_eq!(seq.len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod operation;
pub mod schedule;
pub mod sequence;
pub mod types;
pub mod visitor;

mod control_flow;
mod error;

pub use control_flow::{ConditionalBase, IterationBase, RepetitionBase};
pub use error::{BlockSite, Error, Result};
pub use operation::Operation;
pub use schedule::{RefPt, Schedulable, Schedule, ScheduledOperation};
pub use sequence::{Conditional, Iteration, Repetition, Sequence, SequenceItem};
