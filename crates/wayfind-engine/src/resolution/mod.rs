pub mod candidates;
pub mod engine;
pub mod result;

pub use candidates::Candidates;
pub use engine::{ResolveOptions, Resolver};
pub use result::{Resolved, ResolvedList};
