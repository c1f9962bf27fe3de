pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod snowflake;

pub use config::Config;
pub use error::GatewayError;
pub use gateway::dispatcher::{Event, EventDispatcher};
pub use gateway::{GatewayConnection, SessionHandle};
