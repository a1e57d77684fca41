//! Request-scoped deadlines for store calls.

use std::future::Future;
use std::time::Duration;

use portal_core::error::AppError;
use portal_core::result::AppResult;

/// Run `fut`, failing with a `Database` error if it does not finish in time.
pub async fn with_deadline<T, F>(deadline: Duration, operation: &str, fut: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(AppError::database(format!(
            "{operation} timed out after {}ms",
            deadline.as_millis()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::error::ErrorKind;

    #[tokio::test(start_paused = true)]
    async fn test_deadline_exceeded() {
        let result: AppResult<()> = with_deadline(Duration::from_secs(1), "slow query", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Database);
        assert!(err.message.contains("slow query"));
    }

    #[tokio::test]
    async fn test_deadline_passes_result_through() {
        let value = with_deadline(Duration::from_secs(1), "fast query", async { Ok(42) })
            .await
            .unwrap();
        assert_eq!(value, 42);
    }
}
