#![doc = "The `taskforge` library crate."]
#![doc = ""]
#![doc = "A multi-user task tracker: accounts with signed session tokens, an access"]
#![doc = "guard in front of the task routes, and task operations scoped to the owner."]
#![doc = "The binary (`main.rs`) only loads configuration, opens the store and runs"]
#![doc = "the HTTP server built from these modules."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod tasks;

pub use crate::config::Config;
pub use crate::error::AppError;
pub use crate::state::AppState;
