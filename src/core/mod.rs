//! Services sitting between storage rows and the hierarchy engine.

pub mod services;
