use aws_sdk_dynamodb::operation::batch_get_item::{BatchGetItemInput, BatchGetItemOutput};
use aws_sdk_dynamodb::types::{
    AttributeValue, ConsumedCapacity, KeysAndAttributes, ReturnConsumedCapacity,
};
use futures_util::stream;
use serde::de::DeserializeOwned;
use serde_dynamo::from_item;
use std::collections::{HashMap, VecDeque};
use tokio::time::sleep;
use tokio_stream::Stream;

use crate::Error;
use crate::table::batch::BatchGet;
use crate::table::helpers::retry_config::{Backoff, with_retry};
use crate::table::transport::BatchGetTransport;

type Item = HashMap<String, AttributeValue>;

/// One response page and how far it has been read
#[derive(Debug)]
struct Page {
    items: VecDeque<Item>,
    unprocessed: Option<KeysAndAttributes>,
}

#[derive(Debug)]
enum State {
    /// Nothing requested yet
    Idle,
    /// Request for these keys is about to be sent
    Fetching(KeysAndAttributes),
    /// Items of the current page are being handed out
    HasBufferedItems(Page),
    /// Store left these keys unprocessed, wait before asking again
    NeedsBackoff(KeysAndAttributes),
    /// All keys answered
    Exhausted,
    /// Stopped on an error, no further requests are made
    Failed(Error),
}

/// Iterator over the results of a batch get
///
/// Pages are requested lazily. When the store reports unprocessed keys, a
/// follow-up request for exactly those keys is sent after an exponential
/// backoff. Neither that backoff nor the retry of failed requests has a
/// time limit, so wrap calls in [`tokio::time::timeout`] if latency must be
/// bounded. Dropping a pending [`next`](Self::next) future keeps the
/// outstanding keys in the iterator.
#[must_use = "iterators do nothing unless polled"]
#[derive(Debug)]
pub struct BatchGetIter<C> {
    get: BatchGet<C>,
    state: State,
    chunks: VecDeque<KeysAndAttributes>,
    pages: usize,
    received: usize,
    backoff: Backoff,
    consumed_capacity: Vec<ConsumedCapacity>,
}

impl<C> BatchGetIter<C>
where
    C: BatchGetTransport + Clone,
{
    pub(crate) fn new(get: BatchGet<C>) -> Self {
        let backoff = Backoff::new(get.table().config().unprocessed_backoff.clone());
        Self {
            get,
            state: State::Idle,
            chunks: VecDeque::new(),
            pages: 0,
            received: 0,
            backoff,
            consumed_capacity: Vec::new(),
        }
    }

    /// Decode the next item, fetching another page if needed
    ///
    /// Returns `None` once every item has been returned or an error occurred;
    /// check [`err`](Self::err) to tell the two apart. After `None`, every
    /// further call returns `None` without touching the network.
    pub async fn next<T>(&mut self) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let item = self.next_item().await?;
        match from_item(item) {
            Ok(out) => Some(out),
            Err(err) => {
                self.state = State::Failed(err.into());
                None
            }
        }
    }

    /// The error that stopped iteration, if any
    pub fn err(&self) -> Option<&Error> {
        match &self.state {
            State::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Consume the iterator, returning the error that stopped it, if any
    pub fn into_err(self) -> Option<Error> {
        match self.state {
            State::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Decode every remaining item
    pub async fn all<T>(mut self) -> Result<Vec<T>, Error>
    where
        T: DeserializeOwned,
    {
        let mut out = Vec::new();
        while let Some(item) = self.next().await {
            out.push(item);
        }
        match self.into_err() {
            Some(err) => Err(err),
            None => Ok(out),
        }
    }

    /// Turn the iterator into a stream of decoded items
    ///
    /// An error ends the stream after being yielded once.
    pub fn into_stream<T>(self) -> impl Stream<Item = Result<T, Error>>
    where
        T: DeserializeOwned,
    {
        stream::unfold(Some(self), |iter| async move {
            let mut iter = iter?;
            match iter.next::<T>().await {
                Some(item) => Some((Ok(item), Some(iter))),
                None => iter.into_err().map(|err| (Err(err), None)),
            }
        })
    }

    /// Number of response pages received so far
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Capacity consumed by every request sent so far
    pub fn consumed_capacity(&self) -> &[ConsumedCapacity] {
        &self.consumed_capacity
    }

    async fn next_item(&mut self) -> Option<Item> {
        loop {
            match &mut self.state {
                State::Exhausted | State::Failed(_) => return None,
                State::Idle => {
                    self.state = match self.get.build() {
                        Ok(chunks) => {
                            self.chunks = chunks;
                            self.next_chunk()
                        }
                        Err(err) => State::Failed(err),
                    };
                }
                State::HasBufferedItems(page) => {
                    if let Some(item) = page.items.pop_front() {
                        return Some(item);
                    }
                    self.state = match page.unprocessed.take() {
                        Some(keys) => State::NeedsBackoff(keys),
                        None => self.next_chunk(),
                    };
                }
                State::NeedsBackoff(keys) => {
                    let keys = keys.clone();
                    let delay = self.backoff.delay();
                    log::debug!(
                        "{} unprocessed keys in table {}, retrying in {:?}",
                        keys.keys.len(),
                        self.get.table().name(),
                        delay
                    );
                    sleep(delay).await;
                    // Only a completed wait counts towards the backoff
                    self.backoff.advance();
                    self.state = State::Fetching(keys);
                }
                State::Fetching(keys) => {
                    let keys = keys.clone();
                    self.state = match self.fetch(keys).await {
                        // An empty first page means none of the keys exist, as long
                        // as it answered the whole request. Later empty pages are not
                        // reinterpreted.
                        Ok(page)
                            if page.items.is_empty() && self.pages == 1 && self.chunks.is_empty() =>
                        {
                            State::Failed(Error::NotFound)
                        }
                        Ok(page) => State::HasBufferedItems(page),
                        Err(err) => State::Failed(err),
                    };
                }
            }
        }
    }

    fn next_chunk(&mut self) -> State {
        match self.chunks.pop_front() {
            Some(keys) => State::Fetching(keys),
            None if self.received == 0 => State::Failed(Error::NotFound),
            None => {
                log::trace!(
                    "batch get on {} finished after {} pages",
                    self.get.table().name(),
                    self.pages
                );
                State::Exhausted
            }
        }
    }

    async fn fetch(&mut self, keys: KeysAndAttributes) -> Result<Page, Error> {
        let table = self.get.table();
        let name = table.name();

        log::debug!(
            "requesting {} keys from table {} (page {})",
            keys.keys.len(),
            name,
            self.pages + 1
        );

        let input = BatchGetItemInput::builder()
            .request_items(name, keys)
            .return_consumed_capacity(ReturnConsumedCapacity::Total)
            .build()?;

        let client = table.client();
        let output = with_retry(&table.config().transport_retry, move || {
            client.execute(input.clone())
        })
        .await?;

        self.pages += 1;
        let page = page_for_table(output, name, &mut self.consumed_capacity);
        self.received += page.items.len();
        Ok(page)
    }
}

/// Split a response into this table's items and unprocessed keys
fn page_for_table(
    output: BatchGetItemOutput,
    table_name: &str,
    consumed_capacity: &mut Vec<ConsumedCapacity>,
) -> Page {
    let items = output
        .responses
        .and_then(|mut responses| responses.remove(table_name))
        .unwrap_or_default();

    let unprocessed = output
        .unprocessed_keys
        .and_then(|mut unprocessed| unprocessed.remove(table_name))
        .filter(|keys| !keys.keys.is_empty());

    if let Some(capacities) = output.consumed_capacity {
        consumed_capacity.extend(capacities);
    }

    Page {
        items: items.into(),
        unprocessed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(id: &str) -> Item {
        HashMap::from([("ID".to_string(), AttributeValue::S(id.to_string()))])
    }

    #[test]
    fn test_page_keeps_only_own_table() {
        let output = BatchGetItemOutput::builder()
            .responses("Readings", vec![key("1"), key("2")])
            .responses("Other", vec![key("3")])
            .unprocessed_keys(
                "Other",
                KeysAndAttributes::builder().keys(key("4")).build().unwrap(),
            )
            .consumed_capacity(ConsumedCapacity::builder().table_name("Readings").build())
            .build();

        let mut capacity = Vec::new();
        let page = page_for_table(output, "Readings", &mut capacity);

        assert_eq!(page.items, VecDeque::from([key("1"), key("2")]));
        assert!(page.unprocessed.is_none());
        assert_eq!(capacity.len(), 1);
    }

    #[test]
    fn test_page_ignores_empty_unprocessed_keys() {
        let output = BatchGetItemOutput::builder()
            .unprocessed_keys(
                "Readings",
                KeysAndAttributes::builder().set_keys(Some(Vec::new())).build().unwrap(),
            )
            .build();

        let page = page_for_table(output, "Readings", &mut Vec::new());
        assert!(page.items.is_empty());
        assert!(page.unprocessed.is_none());
    }

    #[test]
    fn test_page_with_unprocessed_keys() {
        let output = BatchGetItemOutput::builder()
            .responses("Readings", vec![key("1")])
            .unprocessed_keys(
                "Readings",
                KeysAndAttributes::builder().keys(key("2")).build().unwrap(),
            )
            .build();

        let page = page_for_table(output, "Readings", &mut Vec::new());
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.unprocessed.unwrap().keys, vec![key("2")]);
    }
}
