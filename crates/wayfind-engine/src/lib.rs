pub mod backend;
pub mod config;
pub mod error;
pub mod formatter;
pub mod navigation;
pub mod ordering;
pub mod resolution;
pub mod scenario;
pub mod wait;

pub use error::CheckError;
pub use wayfind_common::protocol;
