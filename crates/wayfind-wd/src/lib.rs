pub mod backend;
pub mod suites;
pub mod webdriver;
