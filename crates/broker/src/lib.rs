//! Broker Service (spec §4.B): hosts Partition Logs and serves
//! Produce/Consume/Metadata/BrokerAddress/Shutdown over HTTP/JSON.

pub mod background;
pub mod config;
pub mod dto;
pub mod routes;
pub mod service;
pub mod state;

pub use config::BrokerConfig;
pub use routes::router;
pub use state::BrokerState;
