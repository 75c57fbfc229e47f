//! # DynamoDB Batch Get
//!
//! Fetch many items by primary key with `BatchGetItem`, decoding them lazily
//! one at a time:
//! - Keys are merged into as few requests as the 100-key limit allows
//! - Unprocessed keys are re-requested after an exponential backoff
//! - Failed requests are retried while the error is retryable
//! - Errors never panic; they stop the iterator and are reported once
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dynamo_batch_get::{Error, Table};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct Reading {
//!     #[serde(rename = "ID")]
//!     id: i64,
//!     #[serde(rename = "Month")]
//!     month: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let client = dynamo_batch_get::dynamodb_client().await.clone();
//!     let table = Table::new("Readings", client);
//!
//!     let mut iter = table
//!         .batch(["ID", "Month"])
//!         .get([(1, Some("2015-10")), (42, Some("2015-12"))])
//!         .and([(42, Some("1992-02"))])
//!         .consistent(true)
//!         .iter();
//!
//!     while let Some(reading) = iter.next::<Reading>().await {
//!         println!("{reading:?}");
//!     }
//!
//!     match iter.into_err() {
//!         Some(err) => Err(err),
//!         None => Ok(()),
//!     }
//! }
//! ```
#![deny(
    warnings,
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    unused_allocation,
    unused_comparisons,
    unused_parens,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results,
    deprecated,
    unknown_lints,
    unreachable_code,
    unused_mut
)]

mod error;
pub use error::Error;

/// Batch get module
pub mod table;

// Re-export main types for convenience
pub use table::{
    Batch, BatchGet, BatchGetConfig, BatchGetIter, BatchGetTransport, CompositeKey, DynamoTable,
    HashKey, Keyed, Table,
};

// Re-export aws-config types for configuration
pub use aws_config::{BehaviorVersion, Region, SdkConfig, defaults};

use aws_sdk_dynamodb::Client as DynamoDbClient;
use tokio::sync::OnceCell;

/// Client shared by [`DynamoTable::batch_get`] and anything else asking [`dynamodb_client`]
static GLOBAL_CLIENT: OnceCell<DynamoDbClient> = OnceCell::const_new();

/// SDK settings used when nothing was passed to [`init`] or [`init_with_client`]
///
/// The SDK itself retries twice in standard mode; batch gets retry again
/// on top of that according to their own [`BatchGetConfig`]. Set
/// `AWS_PROFILE=localstack` to point the client at a local LocalStack.
async fn aws_config_defaults() -> SdkConfig {
    use aws_types::sdk_config::{RetryConfig, TimeoutConfig};
    use std::time::Duration;

    let timeout_config = TimeoutConfig::builder()
        .connect_timeout(Duration::from_secs(3))
        .read_timeout(Duration::from_secs(20))
        .operation_timeout(Duration::from_secs(60))
        .build();

    let mut loader = defaults(BehaviorVersion::latest())
        .retry_config(
            RetryConfig::standard()
                .with_max_attempts(3)
                .with_initial_backoff(Duration::from_millis(200)),
        )
        .timeout_config(timeout_config);

    if std::env::var("AWS_PROFILE").unwrap_or_default() == "localstack" {
        loader = loader.endpoint_url("http://127.0.0.1:4566");
    }

    loader.load().await
}

/// Build the global client from `config`
///
/// Has no effect if the global client already exists.
///
/// ```rust,no_run
/// # async fn example() {
/// let config = dynamo_batch_get::defaults(dynamo_batch_get::BehaviorVersion::latest())
///     .region(dynamo_batch_get::Region::new("eu-west-1"))
///     .load()
///     .await;
/// dynamo_batch_get::init(&config).await;
/// # }
/// ```
pub async fn init(config: &SdkConfig) {
    let _ = GLOBAL_CLIENT
        .get_or_init(|| async { DynamoDbClient::new(config) })
        .await;
}

/// Install `client` as the global client
///
/// Has no effect if the global client already exists.
pub async fn init_with_client(client: DynamoDbClient) {
    let _ = GLOBAL_CLIENT.get_or_init(|| async { client }).await;
}

/// The global client, created from environment defaults on first use
pub async fn dynamodb_client() -> &'static DynamoDbClient {
    GLOBAL_CLIENT
        .get_or_init(|| async {
            let config = aws_config_defaults().await;
            DynamoDbClient::new(&config)
        })
        .await
}
