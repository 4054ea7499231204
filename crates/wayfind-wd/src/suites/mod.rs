pub mod saucedemo;
