/// Test helpers and fixtures for batch get integration tests
///
/// Provides a scripted transport that records every request it receives,
/// and the fixtures shared by the test files.
pub mod fixtures;

use aws_sdk_dynamodb::operation::batch_get_item::{BatchGetItemInput, BatchGetItemOutput};
use aws_sdk_dynamodb::types::{AttributeValue, KeysAndAttributes};
use dynamo_batch_get::Error;
use dynamo_batch_get::table::BatchGetTransport;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

pub use fixtures::*;

pub type Item = HashMap<String, AttributeValue>;

/// Transport replaying scripted responses in order
#[derive(Clone, Debug, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Debug, Default)]
struct MockState {
    responses: VecDeque<Result<BatchGetItemOutput, Error>>,
    requests: Vec<BatchGetItemInput>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response
    pub fn respond(&self, output: BatchGetItemOutput) -> &Self {
        self.inner.lock().unwrap().responses.push_back(Ok(output));
        self
    }

    /// Queue a failed request
    pub fn fail(&self, err: Error) -> &Self {
        self.inner.lock().unwrap().responses.push_back(Err(err));
        self
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<BatchGetItemInput> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.inner.lock().unwrap().requests.len()
    }

    /// Keys sent for `table` in request number `index`
    pub fn requested_keys(&self, index: usize, table: &str) -> Vec<Item> {
        self.requests()[index]
            .request_items()
            .and_then(|items| items.get(table))
            .map(|keys| keys.keys.clone())
            .unwrap_or_default()
    }
}

impl BatchGetTransport for MockTransport {
    async fn execute(&self, input: BatchGetItemInput) -> Result<BatchGetItemOutput, Error> {
        let mut state = self.inner.lock().unwrap();
        state.requests.push(input);
        let count = state.requests.len();
        state
            .responses
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected request #{count}"))
    }
}

/// Response page with `items` and, if non-empty, `unprocessed` keys
pub fn page(table: &str, items: Vec<Item>, unprocessed: Vec<Item>) -> BatchGetItemOutput {
    let mut output = BatchGetItemOutput::builder().responses(table, items);
    if !unprocessed.is_empty() {
        output = output.unprocessed_keys(
            table,
            KeysAndAttributes::builder()
                .set_keys(Some(unprocessed))
                .build()
                .unwrap(),
        );
    }
    output.build()
}
