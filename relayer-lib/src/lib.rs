pub mod api;
pub mod blockstore;
pub mod chain;
pub mod health;
pub mod metrics;
