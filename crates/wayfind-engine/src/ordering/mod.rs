pub mod relation;
pub mod snapshot;
pub mod verifier;

pub use relation::{Collation, Relation};
pub use snapshot::{ListProbe, OrderedSnapshot, ReadMode, SnapshotSource};
pub use verifier::{OrderVerifier, Reordered, Settle, VerifierOptions};
