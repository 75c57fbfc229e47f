mod batch;
mod helpers;
mod iter;
mod operations;
mod transport;
mod types;

pub use batch::{Batch, BatchGet, HashKey, Keyed};
pub use iter::BatchGetIter;
pub use operations::DynamoTable;
pub use transport::{BatchGetTransport, Table};
pub use types::{BackoffConfig, BatchGetConfig, CompositeKey, PartitionKey, RetryConfig, SortKey};
