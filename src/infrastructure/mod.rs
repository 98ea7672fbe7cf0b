//! Infrastructure layer - storage, delivery and service implementations

pub mod account;
pub mod api_key;
pub mod auth;
pub mod cooldown;
pub(crate) mod deadline;
pub mod email;
pub mod logging;
pub mod services;
pub mod storage;
