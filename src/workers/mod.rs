pub mod executor;
pub mod reclaimer;
