//! Two-player local duel: fighters move on a shared field, trade shots, and
//! burn through shield and health until one of them drops.

pub mod audio;
pub mod collision;
pub mod compute;
pub mod config;
pub mod driver;
pub mod entities;
pub mod error;
pub mod input;
pub mod session;
pub mod tuning;
