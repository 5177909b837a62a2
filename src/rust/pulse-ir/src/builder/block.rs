use std::fmt;

use indexmap::IndexMap;

use crate::{BlockSite, Result};

use super::Builder;

/// Call sites of the blocks captured in one schedule scope, keyed by
/// capture id in capture order.
pub(crate) type PendingRegistry = IndexMap<u64, BlockSite>;

/// A deferred piece of program captured by [`Builder::capture_block`].
///
/// The closure stays inert until the block is handed back to
/// [`Builder::add_block`] on the same schedule scope it was captured in.
pub struct PendingBlock {
    pub(crate) id: u64,
    pub(crate) site: BlockSite,
    pub(crate) run: Box<dyn FnOnce(&mut Builder) -> Result<()>>,
}

impl PendingBlock {
    /// Call site at which the block was captured.
    pub fn site(&self) -> BlockSite {
        self.site
    }
}

impl fmt::Debug for PendingBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingBlock")
            .field("id", &self.id)
            .field("site", &self.site)
            .finish_non_exhaustive()
    }
}
