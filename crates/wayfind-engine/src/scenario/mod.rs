pub mod outcome;
pub mod session;
pub mod suite;

pub use outcome::Outcome;
pub use session::Session;
pub use suite::{Scenario, ScenarioReport, Status, Suite, SuiteReport};
