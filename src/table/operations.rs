use serde::{Serialize, de::DeserializeOwned};
use std::future::Future;

use crate::error::Error;
use crate::table::batch::BatchGet;
use crate::table::transport::{BatchGetTransport, Table};
use crate::table::types::{BatchGetConfig, CompositeKey};

/// Typed table description used to build batch gets
pub trait DynamoTable: DeserializeOwned + Send + Sync {
    /// Associated partition key type
    type PK: Serialize + Send + Sync;

    /// Associated sort key type
    type SK: Serialize + Send + Sync;

    /// Name of table to retrieve
    const TABLE: &'static str;

    /// Partition key of the table
    const PARTITION_KEY: &'static str;

    /// Sort key of the table
    const SORT_KEY: Option<&'static str> = None;

    /// Retry and backoff configuration for batch gets
    const BATCH_GET_CONFIG: BatchGetConfig = BatchGetConfig::DEFAULT;

    /// Partition key name, followed by the sort key name if the table has one
    fn key_names() -> Vec<&'static str> {
        std::iter::once(Self::PARTITION_KEY)
            .chain(Self::SORT_KEY)
            .collect()
    }

    /// Get the DynamoDB client for this table
    ///
    /// By default, returns the global client. Can be overridden for testing
    /// or to use a different client per table.
    fn dynamodb_client() -> impl Future<Output = &'static aws_sdk_dynamodb::Client> {
        crate::dynamodb_client()
    }

    /// Table handle for this type on an explicit transport
    fn batch_table<C>(client: C) -> Table<C>
    where
        C: BatchGetTransport + Clone,
    {
        Table::new(Self::TABLE, client).with_config(Self::BATCH_GET_CONFIG)
    }

    /// Batch get request for `keys` on an explicit transport
    fn batch_get_with<C>(client: C, keys: Vec<CompositeKey<Self::PK, Self::SK>>) -> BatchGet<C>
    where
        C: BatchGetTransport + Clone,
    {
        Self::batch_table(client).batch(Self::key_names()).get(keys)
    }

    /// Batch retrieve multiple items using the global client
    ///
    /// Keys that do not exist are simply absent from the result, so this
    /// returns an empty vector rather than [`Error::NotFound`].
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use dynamo_batch_get::{DynamoTable, Error};
    /// # use serde::Deserialize;
    /// #
    /// # #[derive(Debug, Deserialize)]
    /// # struct User {
    /// #     user_id: String,
    /// # }
    /// #
    /// # impl DynamoTable for User {
    /// #     type PK = String;
    /// #     type SK = String;
    /// #     const TABLE: &'static str = "users";
    /// #     const PARTITION_KEY: &'static str = "user_id";
    /// # }
    ///
    /// async fn example() -> Result<(), Error> {
    ///     let keys = vec![("user1".to_string(), None), ("user2".to_string(), None)];
    ///
    ///     let users = User::batch_get(keys).await?;
    ///     println!("Retrieved {} users", users.len());
    ///
    ///     Ok(())
    /// }
    /// ```
    fn batch_get(
        keys: Vec<CompositeKey<Self::PK, Self::SK>>,
    ) -> impl Future<Output = Result<Vec<Self>, Error>> {
        async move {
            if keys.is_empty() {
                return Ok(Vec::new());
            }

            let client = Self::dynamodb_client().await.clone();
            match Self::batch_get_with(client, keys).all().await {
                Err(Error::NotFound) => Ok(Vec::new()),
                result => result,
            }
        }
    }
}
