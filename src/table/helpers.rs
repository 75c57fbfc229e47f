/// Retry configuration for batch operations
pub(crate) mod retry_config {
    use std::future::Future;
    use std::time::Duration;
    use tokio::time::sleep;

    use crate::Error;
    use crate::table::types::{BackoffConfig, RetryConfig};

    /// Calculate retry delay with exponential backoff
    ///
    /// # Arguments
    /// * `attempt` - The retry attempt number (0-based)
    /// * `initial` - Initial delay duration
    /// * `max` - Maximum delay duration
    ///
    /// # Returns
    /// Duration to wait before retrying
    pub(crate) fn retry_delay(attempt: usize, initial: Duration, max: Duration) -> Duration {
        let factor = u32::try_from(attempt)
            .ok()
            .and_then(|attempt| 2u64.checked_pow(attempt))
            .unwrap_or(u64::MAX);
        let delay_ms = (initial.as_millis() as u64).saturating_mul(factor);
        let capped_delay = delay_ms.min(max.as_millis() as u64);
        Duration::from_millis(capped_delay)
    }

    /// Unbounded exponential backoff whose attempt counter never resets
    #[derive(Debug)]
    pub(crate) struct Backoff {
        attempt: usize,
        config: BackoffConfig,
    }

    impl Backoff {
        pub(crate) fn new(config: BackoffConfig) -> Self {
            Self { attempt: 0, config }
        }

        /// Delay for the current attempt
        pub(crate) fn delay(&self) -> Duration {
            retry_delay(
                self.attempt,
                self.config.initial_delay,
                self.config.max_delay,
            )
        }

        /// Move to the next attempt once a delay has been fully waited out
        pub(crate) fn advance(&mut self) {
            self.attempt = self.attempt.saturating_add(1);
        }
    }

    /// Run `operation` until it succeeds, fails with a non-retryable error,
    /// or `config.max_retries` is used up.
    pub(crate) async fn with_retry<O, F, Fut>(config: &RetryConfig, mut operation: F) -> Result<O, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<O, Error>>,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(output) => return Ok(output),
                Err(err)
                    if err.is_retryable()
                        && config.max_retries.is_none_or(|max| attempt < max) =>
                {
                    let delay = retry_delay(attempt, config.initial_delay, config.max_delay);
                    log::warn!(
                        "BatchGetItem attempt {} failed, retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        err
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Key attribute conversion
pub(crate) mod keys {
    use aws_sdk_dynamodb::types::AttributeValue;
    use serde::Serialize;
    use serde_dynamo::to_attribute_value;

    use crate::Error;

    /// Serialize a key value, rejecting types DynamoDB cannot use as a key
    pub(crate) fn key_attribute<V>(name: &str, value: &V) -> Result<AttributeValue, Error>
    where
        V: Serialize + ?Sized,
    {
        let value: AttributeValue = to_attribute_value(value)?;
        match value {
            AttributeValue::S(_) | AttributeValue::N(_) | AttributeValue::B(_) => Ok(value),
            _ => Err(Error::validation(format!(
                "key attribute {name:?} must be a string, number or binary value"
            ))),
        }
    }
}

/// Projection expression builder
pub(crate) mod expressions {
    use std::collections::HashMap;

    use crate::Error;

    /// Turn attribute paths into a projection expression with `#pN` name placeholders
    ///
    /// `Address.City` and `Tags[0]` style paths are supported; list indexes are
    /// kept verbatim after the placeholder.
    pub(crate) fn projection<S>(paths: &[S]) -> Result<(String, HashMap<String, String>), Error>
    where
        S: AsRef<str>,
    {
        let mut placeholders: HashMap<String, String> = HashMap::new();
        let mut expression = Vec::with_capacity(paths.len());

        for path in paths {
            let path = path.as_ref();
            let mut segments = Vec::new();

            for segment in path.split('.') {
                let (name, index) = segment.split_at(segment.find('[').unwrap_or(segment.len()));
                if name.is_empty() {
                    return Err(Error::validation(format!(
                        "invalid projection path {path:?}"
                    )));
                }

                let next = placeholders.len();
                let placeholder = placeholders
                    .entry(name.to_string())
                    .or_insert_with(|| format!("#p{next}"));
                segments.push(format!("{placeholder}{index}"));
            }

            expression.push(segments.join("."));
        }

        let names = placeholders
            .into_iter()
            .map(|(name, placeholder)| (placeholder, name))
            .collect();

        Ok((expression.join(", "), names))
    }
}

/// Batch processing utilities
pub(crate) mod batch_processor {
    /// Maximum number of keys DynamoDB accepts in one BatchGetItem request
    pub(crate) const BATCH_READ_SIZE: usize = 100;
}
