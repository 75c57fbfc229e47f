use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::operation::batch_get_item::{BatchGetItemInput, BatchGetItemOutput};
use std::future::Future;

use crate::Error;
use crate::table::batch::Batch;
use crate::table::types::BatchGetConfig;

/// Executes a single BatchGetItem request
///
/// Implemented for [`aws_sdk_dynamodb::Client`]. Provide your own implementation
/// to route requests elsewhere or to script responses in tests.
pub trait BatchGetTransport: Send + Sync {
    /// Send one request and return the raw response page
    fn execute(
        &self,
        input: BatchGetItemInput,
    ) -> impl Future<Output = Result<BatchGetItemOutput, Error>> + Send;
}

impl BatchGetTransport for Client {
    async fn execute(&self, input: BatchGetItemInput) -> Result<BatchGetItemOutput, Error> {
        self.batch_get_item()
            .set_request_items(input.request_items)
            .set_return_consumed_capacity(input.return_consumed_capacity)
            .send()
            .await
            .map_err(Into::into)
    }
}

/// A named table reachable through a transport
#[derive(Clone, Debug)]
pub struct Table<C = Client> {
    name: String,
    client: C,
    config: BatchGetConfig,
}

impl<C> Table<C>
where
    C: BatchGetTransport + Clone,
{
    /// Create a handle for `name` using the default batch get configuration
    pub fn new(name: impl Into<String>, client: C) -> Self {
        Self {
            name: name.into(),
            client,
            config: BatchGetConfig::DEFAULT,
        }
    }

    /// Replace the retry and backoff configuration
    pub fn with_config(mut self, config: BatchGetConfig) -> Self {
        self.config = config;
        self
    }

    /// Table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Batch get configuration
    pub fn config(&self) -> &BatchGetConfig {
        &self.config
    }

    pub(crate) fn client(&self) -> &C {
        &self.client
    }

    /// Start a batch with the given hash key name, and range key name if provided
    ///
    /// Passing more than two names does not fail here; the error is kept on the
    /// batch and returned by every operation built from it.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use dynamo_batch_get::table::Table;
    /// # use serde::Deserialize;
    /// #[derive(Deserialize)]
    /// struct Reading {
    ///     #[serde(rename = "ID")]
    ///     id: i64,
    ///     #[serde(rename = "Month")]
    ///     month: String,
    /// }
    ///
    /// # async fn example(client: aws_sdk_dynamodb::Client) -> Result<(), dynamo_batch_get::Error> {
    /// let table = Table::new("Readings", client);
    /// let readings: Vec<Reading> = table
    ///     .batch(["ID", "Month"])
    ///     .get([(1, Some("2015-10")), (42, Some("2015-12")), (42, Some("1992-02"))])
    ///     .all()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn batch<I, S>(&self, key_names: I) -> Batch<C>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Batch::new(self.clone(), key_names)
    }
}
