//! Client-side components: the Router (metadata cache + bootstrap
//! failover), the Producer Batcher, the single-partition Consumer, and the
//! Consumer Group built on top of it.

pub mod batcher;
pub mod consumer;
pub mod consumer_group;
pub mod dto;
pub mod partitioner;
pub mod router;
pub mod sys_admin;
pub mod transport;

pub use batcher::{BatcherConfig, ProducerBatcher};
pub use consumer::Consumer;
pub use consumer_group::ConsumerGroup;
pub use router::Router;
pub use sys_admin::SysAdmin;
