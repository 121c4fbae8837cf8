//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (chunk size > 0, backlog > 0)
//! - Validate addresses parse before anything binds
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("listener.backlog must be greater than zero")]
    Backlog,

    #[error("relay.chunk_size must be greater than zero")]
    ChunkSize,

    #[error("images.path_prefix '{0}' must start with '/'")]
    PathPrefix(String),

    #[error("easter_egg.trigger_host must not be empty")]
    TriggerHost,

    #[error("timeouts.connect_secs must be greater than zero")]
    ConnectTimeout,

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if config.listener.backlog == 0 {
        errors.push(ValidationError::Backlog);
    }
    if config.relay.chunk_size == 0 {
        errors.push(ValidationError::ChunkSize);
    }
    if !config.images.path_prefix.starts_with('/') {
        errors.push(ValidationError::PathPrefix(config.images.path_prefix.clone()));
    }
    if config.easter_egg.trigger_host.trim().is_empty() {
        errors.push(ValidationError::TriggerHost);
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ConnectTimeout);
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
