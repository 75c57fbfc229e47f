use aws_sdk_dynamodb::error::{BuildError, ProvideErrorMetadata};
use aws_sdk_dynamodb::operation::batch_get_item::BatchGetItemError;
use aws_smithy_runtime_api::client::result::SdkError;
use aws_smithy_runtime_api::http::Response;
use serde_dynamo::Error as SerdeDynamoError;
use std::error::Error as StdError;
use std::fmt;

type DynamoBatchGetItemError = SdkError<BatchGetItemError, Response>;

/// Batch get operation error
#[derive(Debug)]
pub enum Error {
    /// Serde DynamoDB serialization/deserialization error
    SerdeDynamo(SerdeDynamoError),
    /// DynamoDB request builder error
    BuildError(BuildError),
    /// DynamoDB BatchGetItem operation error
    DynamoBatchGetItemError(DynamoBatchGetItemError),
    /// Invalid key names, key values or projection supplied to a batch
    Validation(String),
    /// None of the requested keys returned an item
    NotFound,
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Check if the error is the "no items found" sentinel
    ///
    /// Returned when the first page of a batch get answers every key and
    /// comes back empty, or when no page of a chunked batch returns an item.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound)
    }

    /// Check if the error was caused by invalid batch input
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Check if the error is a serialization/deserialization error
    ///
    /// Returns `true` for DynamoDB serialization errors.
    pub fn is_serialization_error(&self) -> bool {
        matches!(self, Error::SerdeDynamo(_))
    }

    /// Check if the error is a DynamoDB-related error
    ///
    /// Returns `true` for request builder and BatchGetItem operation errors.
    pub fn is_dynamodb_error(&self) -> bool {
        matches!(self, Error::BuildError(_) | Error::DynamoBatchGetItemError(_))
    }

    /// Check if a transport failure is worth sending again
    ///
    /// Timeouts, dispatch and response failures are retryable, as are the
    /// throttling and internal error responses of the service. Everything
    /// else, including all non-transport errors, is final.
    pub fn is_retryable(&self) -> bool {
        let Error::DynamoBatchGetItemError(sdk_err) = self else {
            return false;
        };

        match sdk_err {
            SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
                true
            }
            SdkError::ServiceError(context) => {
                let err = context.err();
                matches!(
                    err,
                    BatchGetItemError::ProvisionedThroughputExceededException(_)
                        | BatchGetItemError::RequestLimitExceeded(_)
                        | BatchGetItemError::InternalServerError(_)
                ) || err.code() == Some("ThrottlingException")
            }
            _ => false,
        }
    }
}

macro_rules! impl_from_error {
    ($name:ident, $variant:ident) => {
        impl From<$name> for Error {
            fn from(e: $name) -> Self {
                Error::$variant(e)
            }
        }
    };
    ($name:ident) => {
        impl From<$name> for Error {
            fn from(e: $name) -> Self {
                Error::$name(e)
            }
        }
    };
}

impl_from_error!(SerdeDynamoError, SerdeDynamo);
impl_from_error!(BuildError);
impl_from_error!(DynamoBatchGetItemError);

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SerdeDynamo(e) => write!(f, "DynamoDB serialization error: {}", e),
            Error::BuildError(e) => write!(f, "DynamoDB request builder error: {}", e),
            Error::DynamoBatchGetItemError(e) => {
                write!(f, "DynamoDB BatchGetItem operation failed: {}", e)
            }
            Error::Validation(message) => write!(f, "invalid batch get: {}", message),
            Error::NotFound => write!(f, "no items found"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::SerdeDynamo(e) => Some(e),
            Error::BuildError(e) => Some(e),
            Error::DynamoBatchGetItemError(e) => Some(e),
            Error::Validation(_) | Error::NotFound => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::types::error::{
        InternalServerError, ProvisionedThroughputExceededException, RequestLimitExceeded,
        ResourceNotFoundException,
    };
    use aws_smithy_runtime_api::http::StatusCode;
    use aws_smithy_types::body::SdkBody;
    use aws_smithy_types::error::ErrorMetadata;

    fn service_error(err: BatchGetItemError) -> Error {
        let status = StatusCode::try_from(400u16).unwrap();
        DynamoBatchGetItemError::service_error(err, Response::new(status, SdkBody::empty())).into()
    }

    #[test]
    fn test_is_serialization_error() {
        let err = Error::BuildError(BuildError::other("test"));
        assert!(!err.is_serialization_error());
    }

    #[test]
    fn test_is_dynamodb_error() {
        let err = Error::BuildError(BuildError::other("test"));
        assert!(err.is_dynamodb_error());
        assert!(!Error::NotFound.is_dynamodb_error());
    }

    #[test]
    fn test_error_conversion() {
        let build_err = BuildError::other("test");
        let err: Error = build_err.into();
        assert!(matches!(err, Error::BuildError(_)));
    }

    #[test]
    fn test_not_found_display() {
        assert!(Error::NotFound.is_not_found());
        assert_eq!(Error::NotFound.to_string(), "no items found");
    }

    #[test]
    fn test_validation_error() {
        let err = Error::validation("too many keys");
        assert!(err.is_validation_error());
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "invalid batch get: too many keys");
    }

    #[test]
    fn test_timeout_is_retryable() {
        let err: Error = DynamoBatchGetItemError::timeout_error("slow").into();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_construction_failure_is_final() {
        let err: Error = DynamoBatchGetItemError::construction_failure("bad input").into();
        assert!(!err.is_retryable());
        assert!(err.is_dynamodb_error());
    }

    #[test]
    fn test_provisioned_throughput_exceeded_is_retryable() {
        let err = service_error(BatchGetItemError::ProvisionedThroughputExceededException(
            ProvisionedThroughputExceededException::builder()
                .message("rate exceeded")
                .build(),
        ));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_request_limit_exceeded_is_retryable() {
        let err = service_error(BatchGetItemError::RequestLimitExceeded(
            RequestLimitExceeded::builder().message("limit").build(),
        ));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_internal_server_error_is_retryable() {
        let err = service_error(BatchGetItemError::InternalServerError(
            InternalServerError::builder().message("oops").build(),
        ));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_throttling_code_is_retryable() {
        let err = service_error(BatchGetItemError::generic(
            ErrorMetadata::builder()
                .code("ThrottlingException")
                .message("slow down")
                .build(),
        ));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_other_service_errors_are_final() {
        let err = service_error(BatchGetItemError::ResourceNotFoundException(
            ResourceNotFoundException::builder().message("no table").build(),
        ));
        assert!(!err.is_retryable());

        let err = service_error(BatchGetItemError::generic(
            ErrorMetadata::builder().code("ValidationException").build(),
        ));
        assert!(!err.is_retryable());
    }
}
