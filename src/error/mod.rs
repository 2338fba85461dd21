//! Error Handling Module
//!
//! This module provides error handling for the MakeHub provider, including:
//! - Core error types (`LlmError`, `ErrorCategory`)
//! - Type conversions from common error types
//!
//! # Example
//!
//! ```rust,ignore
//! use siumai_provider_makehub::error::{LlmError, ErrorCategory};
//!
//! let error = LlmError::api_error(503, "MakeHub: Server error. Please try again later.");
//! assert_eq!(error.category(), ErrorCategory::Server);
//! assert!(error.is_retryable());
//! ```

// Module declarations
mod conversions;
pub mod types;

// Re-exports for public API
pub use types::*;
