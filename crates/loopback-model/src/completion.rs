//! Callback-style completion for SDK operations.
//!
//! Every operation is an `async fn` returning [`AppResult`]. [`dispatch`]
//! adapts one to a pair of success and failure callbacks for callers that
//! prefer that style.

use std::future::Future;

use tokio::task::JoinHandle;
use tracing::error;

use loopback_core::error::AppError;
use loopback_core::result::AppResult;

/// Run `operation` on the current runtime and call exactly one callback.
///
/// `success` receives the value, `failure` the error. A panic inside the
/// operation is reported to `failure` as an internal error. The returned
/// handle resolves once the callback has returned.
pub fn dispatch<T, Fut, S, F>(operation: Fut, success: S, failure: F) -> JoinHandle<()>
where
    T: Send + 'static,
    Fut: Future<Output = AppResult<T>> + Send + 'static,
    S: FnOnce(T) + Send + 'static,
    F: FnOnce(AppError) + Send + 'static,
{
    tokio::spawn(async move {
        let outcome = match tokio::spawn(operation).await {
            Ok(result) => result,
            Err(join_error) => {
                error!(error = %join_error, "Operation aborted before completing");
                Err(AppError::internal(format!("Operation aborted: {join_error}")))
            }
        };
        match outcome {
            Ok(value) => success(value),
            Err(err) => failure(err),
        }
    })
}
