/// Example: Streaming a batch get across unprocessed-key retries
///
/// Run against LocalStack with `AWS_PROFILE=localstack`. The `Readings` table
/// must exist with `ID` (number) as hash key and `Month` (string) as range key.
use dynamo_batch_get::{DynamoTable, Error, dynamodb_client};
use serde::Deserialize;
use tokio_stream::StreamExt;

#[derive(Debug, Deserialize)]
struct Reading {
    #[serde(rename = "ID")]
    id: i64,
    #[serde(rename = "Month")]
    month: String,
    #[serde(rename = "Value")]
    value: f64,
}

impl DynamoTable for Reading {
    type PK = i64;
    type SK = String;
    const TABLE: &'static str = "Readings";
    const PARTITION_KEY: &'static str = "ID";
    const SORT_KEY: Option<&'static str> = Some("Month");
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let client = dynamodb_client().await.clone();

    let keys = (1..=250)
        .map(|id| (id, Some("2015-10".to_string())))
        .collect();
    let mut stream = Box::pin(Reading::batch_get_with(client, keys).iter().into_stream::<Reading>());

    let mut count = 0;
    while let Some(reading) = stream.next().await {
        match reading {
            Ok(reading) => {
                count += 1;
                println!("{} {} = {}", reading.id, reading.month, reading.value);
            }
            Err(Error::NotFound) => {
                println!("None of the requested readings exist");
                return Ok(());
            }
            Err(err) => return Err(err),
        }
    }

    println!("Retrieved {count} readings");
    Ok(())
}
