use aws_sdk_dynamodb::types::{AttributeValue, KeysAndAttributes};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::{HashMap, VecDeque};

use crate::Error;
use crate::table::helpers::batch_processor::BATCH_READ_SIZE;
use crate::table::helpers::expressions::projection;
use crate::table::helpers::keys::key_attribute;
use crate::table::iter::BatchGetIter;
use crate::table::transport::{BatchGetTransport, Table};
use crate::table::types::CompositeKey;

/// The key of one item to fetch
pub trait Keyed {
    /// Hash key value type
    type Hash: Serialize + ?Sized;
    /// Range key value type
    type Range: Serialize + ?Sized;

    /// Hash key value
    fn hash_key(&self) -> &Self::Hash;

    /// Range key value, if the key has one
    fn range_key(&self) -> Option<&Self::Range>;
}

impl<H, R> Keyed for CompositeKey<H, R>
where
    H: Serialize,
    R: Serialize,
{
    type Hash = H;
    type Range = R;

    fn hash_key(&self) -> &H {
        &self.0
    }

    fn range_key(&self) -> Option<&R> {
        self.1.as_ref()
    }
}

/// A key made of a hash key value only
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashKey<H>(pub H);

impl<H> Keyed for HashKey<H>
where
    H: Serialize,
{
    type Hash = H;
    type Range = H;

    fn hash_key(&self) -> &H {
        &self.0
    }

    fn range_key(&self) -> Option<&H> {
        None
    }
}

/// Names of the hash key and range key for building batch requests
#[derive(Clone, Debug)]
pub struct Batch<C> {
    table: Table<C>,
    hash_key: Option<String>,
    range_key: Option<String>,
    err: Option<String>,
}

impl<C> Batch<C>
where
    C: BatchGetTransport + Clone,
{
    pub(crate) fn new<I, S>(table: Table<C>, key_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = key_names.into_iter().map(Into::into).collect();
        let mut batch = Self {
            table,
            hash_key: None,
            range_key: None,
            err: None,
        };

        match names.len() {
            0 => {}
            1 => batch.hash_key = names.pop(),
            2 => {
                batch.range_key = names.pop();
                batch.hash_key = names.pop();
            }
            n => {
                batch.err = Some(format!(
                    "only a hash key and a range key name may be given, got {n} names"
                ))
            }
        }

        batch
    }

    /// Hash key attribute name
    pub fn hash_key(&self) -> Option<&str> {
        self.hash_key.as_deref()
    }

    /// Range key attribute name
    pub fn range_key(&self) -> Option<&str> {
        self.range_key.as_deref()
    }

    /// Key name validation error, if too many names were given
    pub fn err(&self) -> Option<&str> {
        self.err.as_deref()
    }

    /// Create a batch get request for the given keys
    ///
    /// Keys that cannot be encoded do not fail here; the first such error is
    /// returned when the request is executed.
    pub fn get<I, K>(self, keys: I) -> BatchGet<C>
    where
        I: IntoIterator<Item = K>,
        K: Keyed,
    {
        let err = self.err.clone().map(Error::Validation);
        let mut get = BatchGet {
            batch: self,
            keys: Vec::new(),
            projection: Vec::new(),
            consistent: false,
            err,
        };
        get.add(keys);
        get
    }
}

/// A BatchGetItem request under construction
#[must_use = "a batch get does nothing until it is iterated"]
#[derive(Debug)]
pub struct BatchGet<C> {
    batch: Batch<C>,
    keys: Vec<HashMap<String, AttributeValue>>,
    projection: Vec<String>,
    consistent: bool,
    err: Option<Error>,
}

impl<C> BatchGet<C>
where
    C: BatchGetTransport + Clone,
{
    /// Add more keys to be fetched
    pub fn and<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Keyed,
    {
        self.add(keys);
        self
    }

    /// Use a strongly consistent read if `on` is true
    ///
    /// Reads are eventually consistent by default. Strongly consistent reads
    /// consume more capacity.
    pub fn consistent(mut self, on: bool) -> Self {
        self.consistent = on;
        self
    }

    /// Only return the given attribute paths for every item
    pub fn project<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Number of keys added so far
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether no keys were added
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterate over the results, fetching pages as they are needed
    pub fn iter(self) -> BatchGetIter<C> {
        BatchGetIter::new(self)
    }

    /// Execute the request and decode every item
    pub async fn all<T>(self) -> Result<Vec<T>, Error>
    where
        T: DeserializeOwned,
    {
        self.iter().all().await
    }

    pub(crate) fn table(&self) -> &Table<C> {
        &self.batch.table
    }

    fn add<I, K>(&mut self, keys: I)
    where
        I: IntoIterator<Item = K>,
        K: Keyed,
    {
        for key in keys {
            match self.key_item(&key) {
                Ok(item) => self.keys.push(item),
                Err(err) => self.set_error(err),
            }
        }
    }

    fn key_item<K: Keyed>(&self, key: &K) -> Result<HashMap<String, AttributeValue>, Error> {
        let Some(hash_key) = self.batch.hash_key.as_deref() else {
            return Err(Error::validation("a hash key name is required to get items"));
        };

        let mut item = HashMap::with_capacity(2);
        let _ = item.insert(
            hash_key.to_string(),
            key_attribute(hash_key, key.hash_key())?,
        );

        if let (Some(range_key), Some(value)) = (self.batch.range_key.as_deref(), key.range_key()) {
            let _ = item.insert(range_key.to_string(), key_attribute(range_key, value)?);
        }

        Ok(item)
    }

    fn set_error(&mut self, err: Error) {
        if self.err.is_none() {
            self.err = Some(err);
        }
    }

    /// Merge every key into per-request chunks sharing projection and consistency
    pub(crate) fn build(&mut self) -> Result<VecDeque<KeysAndAttributes>, Error> {
        if let Some(err) = self.err.take() {
            return Err(err);
        }
        if self.keys.is_empty() {
            return Err(Error::validation("no keys to get"));
        }

        let (expression, names) = if self.projection.is_empty() {
            (None, None)
        } else {
            let (expression, names) = projection(&self.projection)?;
            (Some(expression), Some(names))
        };

        self.keys
            .chunks(BATCH_READ_SIZE)
            .map(|chunk| {
                KeysAndAttributes::builder()
                    .set_keys(Some(chunk.to_vec()))
                    .set_projection_expression(expression.clone())
                    .set_expression_attribute_names(names.clone())
                    .set_consistent_read(self.consistent.then_some(true))
                    .build()
                    .map_err(Into::into)
            })
            .collect()
    }
}
