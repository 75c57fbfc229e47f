/// Common test fixtures and data structures
use super::Item;
use aws_sdk_dynamodb::types::AttributeValue;
use dynamo_batch_get::DynamoTable;
use dynamo_batch_get::table::{BackoffConfig, BatchGetConfig, RetryConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

pub const READINGS: &str = "Readings";

/// Monthly reading keyed by `ID` and `Month`
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
pub struct Reading {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "Month")]
    pub month: String,
    #[serde(rename = "Value")]
    pub value: f64,
}

impl Reading {
    pub fn new(id: i64, month: &str, value: f64) -> Self {
        Self {
            id,
            month: month.to_string(),
            value,
        }
    }

    pub fn item(&self) -> Item {
        serde_dynamo::to_item(self).unwrap()
    }

    pub fn key(&self) -> Item {
        reading_key(self.id, &self.month)
    }
}

impl DynamoTable for Reading {
    type PK = i64;
    type SK = String;
    const TABLE: &'static str = READINGS;
    const PARTITION_KEY: &'static str = "ID";
    const SORT_KEY: Option<&'static str> = Some("Month");
    const BATCH_GET_CONFIG: BatchGetConfig = FAST_CONFIG;
}

/// Key map as sent on the wire for a reading
pub fn reading_key(id: i64, month: &str) -> Item {
    HashMap::from([
        ("ID".to_string(), AttributeValue::N(id.to_string())),
        ("Month".to_string(), AttributeValue::S(month.to_string())),
    ])
}

/// The three readings of the batch get examples
pub fn sample_readings() -> Vec<Reading> {
    vec![
        Reading::new(1, "2015-10", 10.5),
        Reading::new(42, "2015-12", 3.0),
        Reading::new(42, "1992-02", 7.25),
    ]
}

/// Short delays so tests that use real time stay fast
pub const FAST_CONFIG: BatchGetConfig = BatchGetConfig {
    unprocessed_backoff: BackoffConfig {
        initial_delay: Duration::from_millis(100),
        max_delay: Duration::from_secs(1),
    },
    transport_retry: RetryConfig {
        max_retries: None,
        initial_delay: Duration::from_millis(50),
        max_delay: Duration::from_secs(1),
    },
};
