pub mod discovery;
pub mod runner;
