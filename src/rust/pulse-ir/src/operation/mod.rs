mod builders;
mod variants;

pub use variants::*;
