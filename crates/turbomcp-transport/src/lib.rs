//! # TurboMCP Transport
//!
//! Transport layer implementations for the Model Context Protocol with runtime
//! selection, fault tolerance, and multiple protocol support.
//!
//! ## Supported Transports
//!
//! - **STDIO**: Standard input/output for command-line MCP servers (always available)
//! - **Streamable HTTP**: MCP 2025-06-18 compliant HTTP transport with SSE server push
//!
//! ## Reliability Features
//!
//! - **Circuit Breakers**: Automatic fault detection and recovery mechanisms
//! - **Retry Logic**: Configurable exponential backoff with jitter
//! - **Health Monitoring**: Real-time transport health status tracking
//! - **Connection Pooling**: Efficient connection reuse and management
//! - **Message Deduplication**: Prevention of duplicate message processing
//! - **Graceful Degradation**: Maintained service availability during failures
//!
//! ## Module Organization
//!
//! ```text
//! turbomcp-transport/
//! ├── core/               # Core transport traits and error types
//! ├── resilience/         # Circuit breakers, retry logic, health checks
//! ├── security/           # Auth, origin validation, rate limiting, sessions
//! ├── stdio/              # Standard I/O transport implementation
//! ├── streamable_http_v2/ # MCP 2025-06-18 Streamable HTTP server transport
//! ├── streamable_http_client/ # Streamable HTTP client transport
//! └── child_process/      # Subprocess transport for stdio-launched servers
//! ```
//!
//! ## Usage Examples
//!
//! ### Runtime Transport Selection
//!
//! ```rust,no_run
//! use turbomcp_transport::Features;
//!
//! if Features::has_http() {
//!     println!("HTTP transport available");
//! }
//!
//! // Always available
//! assert!(Features::has_stdio());
//!
//! // Get list of all available transports
//! let available = Features::available_transports();
//! println!("Available transports: {:?}", available);
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all
)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,  // Error documentation in progress
    clippy::cast_possible_truncation,  // Intentional in metrics code
    clippy::must_use_candidate,  // Too pedantic for library APIs
    clippy::return_self_not_must_use,  // Constructor methods don't need must_use
    clippy::struct_excessive_bools,  // Sometimes bools are the right design
    clippy::missing_panics_doc,  // Panic docs added where genuinely needed
    clippy::default_trait_access  // Default::default() is sometimes clearer
)]

pub mod bidirectional;
pub mod core;

// MCP 2025-06-18 Compliant Streamable HTTP Transport
#[cfg(feature = "http")]
#[cfg_attr(docsrs, doc(cfg(feature = "http")))]
pub mod streamable_http_v2;

#[cfg(feature = "http")]
#[cfg_attr(docsrs, doc(cfg(feature = "http")))]
pub mod streamable_http_client;

#[cfg(feature = "stdio")]
pub mod stdio;

pub mod child_process;

pub mod config;
pub mod resilience;
pub mod security;
pub mod shared;

// Re-export bidirectional transport functionality
pub use bidirectional::{
    BidirectionalTransportWrapper, ConnectionState, CorrelationContext, MessageDirection,
    MessageRouter, ProtocolDirectionValidator, RouteAction,
};

// Re-export core transport traits and types
pub use core::{
    BidirectionalTransport, StreamingTransport, Transport, TransportCapabilities, TransportConfig,
    TransportError, TransportEvent, TransportMessage, TransportMetrics, TransportResult,
    TransportState, TransportType,
};

// Re-export transport implementations
#[cfg(feature = "stdio")]
pub use stdio::StdioTransport;

#[cfg(feature = "http")]
pub use streamable_http_client::{StreamableHttpClientConfig, StreamableHttpClientTransport};

#[cfg(feature = "http")]
pub use streamable_http_v2::{StreamableHttpConfig, StreamableHttpConfigBuilder, create_router};

// Re-export child process transport (always available)
pub use child_process::{ChildProcessConfig, ChildProcessTransport};

// Re-export utilities
pub use config::TransportConfigBuilder;
pub use resilience::{
    CircuitBreakerConfig, CircuitBreakerStats, CircuitState, HealthCheckConfig, HealthInfo,
    HealthStatus, RetryConfig, TurboTransport,
};
pub use security::{
    AuthConfig, AuthMethod, EnhancedSecurityConfigBuilder, OriginConfig, RateLimitConfig,
    RateLimiter, SecureSessionInfo, SecurityConfigBuilder, SecurityError, SecurityValidator,
    SessionSecurityConfig, SessionSecurityManager, validate_message_size,
};
pub use shared::SharedTransport;

/// Transport feature detection
#[derive(Debug)]
pub struct Features;

impl Features {
    /// Check if stdio transport is available
    #[must_use]
    pub const fn has_stdio() -> bool {
        cfg!(feature = "stdio")
    }

    /// Check if HTTP transport is available
    #[must_use]
    pub const fn has_http() -> bool {
        cfg!(feature = "http")
    }

    /// Check if child process transport is available (always true)
    #[must_use]
    pub const fn has_child_process() -> bool {
        true
    }

    /// Get list of available transport types
    #[must_use]
    pub fn available_transports() -> Vec<TransportType> {
        let mut transports = Vec::new();

        if Self::has_stdio() {
            transports.push(TransportType::Stdio);
        }
        if Self::has_http() {
            transports.push(TransportType::Http);
        }
        if Self::has_child_process() {
            transports.push(TransportType::ChildProcess);
        }

        transports
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_detection() {
        let transports = Features::available_transports();
        assert!(
            !transports.is_empty(),
            "At least one transport should be available"
        );

        // stdio should always be available in default configuration
        assert!(Features::has_stdio());
    }
}
