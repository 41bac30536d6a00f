//! Command implementations.

pub mod inspect_db;
pub mod run;
pub mod verify;
