use std::time::Duration;

/// Partition key type alias - fully generic
pub type PartitionKey<PK> = PK;

/// Sort key type alias - fully generic
pub type SortKey<SK> = Option<SK>;

/// Composite key type alias - fully generic
pub type CompositeKey<PK, SK> = (PK, SortKey<SK>);

/// Retry configuration for failed BatchGetItem requests
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts, `None` retries for as long as the error is retryable
    pub max_retries: Option<usize>,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
}

/// Backoff applied before re-requesting unprocessed keys
///
/// There is no attempt limit: unprocessed keys are retried until the
/// store accepts them. Wrap the call in a timeout to bound latency.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackoffConfig {
    /// Delay before the first follow-up request
    pub initial_delay: Duration,
    /// Maximum delay between follow-up requests
    pub max_delay: Duration,
}

/// Tuning for a batch get operation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchGetConfig {
    /// Pacing of follow-up requests for unprocessed keys
    pub unprocessed_backoff: BackoffConfig,
    /// Retry policy for requests that fail outright
    pub transport_retry: RetryConfig,
}

impl BatchGetConfig {
    /// 500ms initial delay doubling up to one minute, transport retries unbounded
    pub const DEFAULT: BatchGetConfig = BatchGetConfig {
        unprocessed_backoff: BackoffConfig {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(60),
        },
        transport_retry: RetryConfig {
            max_retries: None,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(60),
        },
    };
}

impl Default for BatchGetConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
