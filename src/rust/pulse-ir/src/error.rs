use std::fmt;
use std::panic::Location;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Call site at which a pending block was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSite(&'static Location<'static>);

impl BlockSite {
    pub(crate) fn new(location: &'static Location<'static>) -> Self {
        BlockSite(location)
    }

    pub fn file(&self) -> &str {
        self.0.file()
    }

    pub fn line(&self) -> u32 {
        self.0.line()
    }
}

impl fmt::Display for BlockSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.0.file(), self.0.line(), self.0.column())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("no open scope; open one with `sequence` or `schedule` first")]
    NoOpenScope,
    #[error(
        "`{operation}` requires a {expected} scope, but the innermost scope is a {actual} scope"
    )]
    ScopeKind {
        operation: &'static str,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("`{operation}` opens a root scope and requires an empty scope stack")]
    RootScope { operation: &'static str },
    #[error("wait on {count} channels is only allowed in a sequence scope")]
    MultiChannelWait { count: usize },
    #[error(
        "scope closed with {count} unconsumed pending block(s), captured at {sites}",
        count = .0.len(),
        sites = join_sites(.0)
    )]
    UnconsumedBlocks(Vec<BlockSite>),
    #[error("pending block captured at {0} does not belong to the innermost schedule scope")]
    ForeignBlock(BlockSite),
    #[error("invalid identifier {0:?}")]
    InvalidIdentifier(String),
    #[error("iteration var and items must both be single or both be lists")]
    IterationShape,
    #[error("iteration declares {vars} variable(s) but provides {iterables} iterable(s)")]
    IterationArity { vars: usize, iterables: usize },
    #[error("iterables of a multi-variable iteration differ in length: {lengths:?}")]
    IterationLength { lengths: Vec<usize> },
    #[error("invalid linspace: {0}")]
    LinSpace(String),
    #[error("invalid range: {0}")]
    Range(String),
    #[error(transparent)]
    Unit(#[from] pulse_units::UnitError),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    pub fn new<T: fmt::Display>(msg: T) -> Self {
        Error::Anyhow(anyhow::anyhow!(msg.to_string()))
    }
}

fn join_sites(sites: &[BlockSite]) -> String {
    sites
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
