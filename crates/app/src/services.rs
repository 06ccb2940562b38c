//! Application services, the operation surface presentation layers call.
//!
//! Services accept port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod minion_service;
