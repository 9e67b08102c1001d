//! Metrics Error Types

/// Errors raised while building, rendering or serving the metrics registry
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("Prometheus registry error: {0}")]
    Prometheus(#[from] prometheus::Error),

    #[error("Failed to encode metrics: {message}")]
    Encoding { message: String },

    #[error("Cannot listen on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Metrics endpoint failed: {message}")]
    Serve { message: String },
}

impl crate::core::error_handling::ContextualError for MetricsError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, MetricsError::Bind { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            MetricsError::Bind { .. } => {
                Some("Cannot open the metrics port (check listen-address and listen-port)")
            }
            _ => None,
        }
    }
}

/// Result type for metrics operations
pub type MetricsResult<T> = Result<T, MetricsError>;
