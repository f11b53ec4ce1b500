//! Attempt Timeouts
//!
//! Each provider attempt is bounded independently of the HTTP client timeout,
//! so a hung connection costs at most one attempt before the gateway moves on.
//!
//! ```ignore
//! let reply = with_timeout(
//!     Duration::from_secs(60),
//!     provider.generate(&request),
//!     "gemini attempt",
//! )
//! .await?;
//! ```

use std::future::Future;
use std::time::Duration;

use crate::types::{ForgeError, Result};

/// Execute an async operation with a timeout
///
/// Returns `ForgeError::Timeout` if the operation does not complete in time.
/// The inner future is dropped on expiry.
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(ForgeError::timeout(operation_name, timeout)),
    }
}
