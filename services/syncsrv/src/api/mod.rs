//! HTTP API handlers

pub mod admin_handlers;
pub mod advisory_handlers;
pub mod dashboard_handlers;
pub mod dto;
pub mod health_handlers;
pub mod node_handlers;
pub mod record_handlers;
