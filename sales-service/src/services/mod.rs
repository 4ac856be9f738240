//! Service layer: the ERP store contract and its implementations, plus
//! authorization, metrics and session tokens.

pub mod authorization;
pub mod database;
pub mod memory;
pub mod metrics;
pub mod session;
pub mod store;

pub use authorization::{capabilities, Authorizer, StaticPolicy, TrustUpstream};
pub use database::Database;
pub use memory::MemoryStore;
pub use metrics::{get_metrics, init_metrics};
pub use store::SalesStore;
