//! Jenkins gateway
//!
//! A caching, retrying front for the Jenkins remote API: folder-aware job
//! listings, symbolic build references, build status and console log
//! summaries, plus build triggers and job management.

pub mod audit;
pub mod build_ref;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod hierarchy;
pub mod logs;
pub mod remote;
pub mod resilience;
pub mod ui;

pub use error::{GatewayError, GatewayResult};
pub use gateway::Gateway;
