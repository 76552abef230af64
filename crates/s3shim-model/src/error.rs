//! The S3 error taxonomy.
//!
//! Every failure that reaches the wire is an [`S3Error`]: a machine-readable
//! [`S3ErrorCode`], a human-readable message, the HTTP status it renders with,
//! and optionally the bucket and request it concerns. The type is transport
//! agnostic; rendering lives in `s3shim-xml` and `s3shim-http`.

use std::fmt;

/// Well-known S3 error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum S3ErrorCode {
    /// AccessDenied error.
    AccessDenied,
    /// BadDigest error.
    BadDigest,
    /// BucketAlreadyExists error.
    BucketAlreadyExists,
    /// BucketAlreadyOwnedByYou error.
    BucketAlreadyOwnedByYou,
    /// BucketNotEmpty error.
    BucketNotEmpty,
    /// EntityTooLarge error.
    EntityTooLarge,
    /// InternalError error.
    #[default]
    InternalError,
    /// InvalidArgument error.
    InvalidArgument,
    /// InvalidBucketName error.
    InvalidBucketName,
    /// InvalidDigest error.
    InvalidDigest,
    /// InvalidRequest error.
    InvalidRequest,
    /// InvalidURI error.
    InvalidURI,
    /// KeyTooLongError error.
    KeyTooLongError,
    /// MalformedXML error.
    MalformedXML,
    /// MethodNotAllowed error.
    MethodNotAllowed,
    /// MissingContentLength error.
    MissingContentLength,
    /// NoSuchBucket error.
    NoSuchBucket,
    /// NoSuchKey error.
    NoSuchKey,
    /// NoSuchUpload error.
    NoSuchUpload,
    /// NoSuchVersion error.
    NoSuchVersion,
    /// NotImplemented error.
    NotImplemented,
    /// PreconditionFailed error.
    PreconditionFailed,
    /// RequestTimeout error.
    RequestTimeout,
    /// ServiceUnavailable error.
    ServiceUnavailable,
    /// SignatureDoesNotMatch error.
    SignatureDoesNotMatch,
}

impl S3ErrorCode {
    /// Returns the error code as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccessDenied => "AccessDenied",
            Self::BadDigest => "BadDigest",
            Self::BucketAlreadyExists => "BucketAlreadyExists",
            Self::BucketAlreadyOwnedByYou => "BucketAlreadyOwnedByYou",
            Self::BucketNotEmpty => "BucketNotEmpty",
            Self::EntityTooLarge => "EntityTooLarge",
            Self::InternalError => "InternalError",
            Self::InvalidArgument => "InvalidArgument",
            Self::InvalidBucketName => "InvalidBucketName",
            Self::InvalidDigest => "InvalidDigest",
            Self::InvalidRequest => "InvalidRequest",
            Self::InvalidURI => "InvalidURI",
            Self::KeyTooLongError => "KeyTooLongError",
            Self::MalformedXML => "MalformedXML",
            Self::MethodNotAllowed => "MethodNotAllowed",
            Self::MissingContentLength => "MissingContentLength",
            Self::NoSuchBucket => "NoSuchBucket",
            Self::NoSuchKey => "NoSuchKey",
            Self::NoSuchUpload => "NoSuchUpload",
            Self::NoSuchVersion => "NoSuchVersion",
            Self::NotImplemented => "NotImplemented",
            Self::PreconditionFailed => "PreconditionFailed",
            Self::RequestTimeout => "RequestTimeout",
            Self::ServiceUnavailable => "ServiceUnavailable",
            Self::SignatureDoesNotMatch => "SignatureDoesNotMatch",
        }
    }

    /// Returns the default HTTP status code for this error.
    #[must_use]
    pub fn default_status_code(&self) -> http::StatusCode {
        match self {
            Self::BadDigest
            | Self::EntityTooLarge
            | Self::InvalidArgument
            | Self::InvalidBucketName
            | Self::InvalidDigest
            | Self::InvalidRequest
            | Self::InvalidURI
            | Self::KeyTooLongError
            | Self::MalformedXML
            | Self::RequestTimeout => http::StatusCode::BAD_REQUEST,
            Self::AccessDenied | Self::SignatureDoesNotMatch => http::StatusCode::FORBIDDEN,
            Self::NoSuchBucket | Self::NoSuchKey | Self::NoSuchUpload | Self::NoSuchVersion => {
                http::StatusCode::NOT_FOUND
            }
            Self::MethodNotAllowed => http::StatusCode::METHOD_NOT_ALLOWED,
            Self::BucketAlreadyExists | Self::BucketAlreadyOwnedByYou | Self::BucketNotEmpty => {
                http::StatusCode::CONFLICT
            }
            Self::MissingContentLength => http::StatusCode::LENGTH_REQUIRED,
            Self::PreconditionFailed => http::StatusCode::PRECONDITION_FAILED,
            Self::InternalError => http::StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotImplemented => http::StatusCode::NOT_IMPLEMENTED,
            Self::ServiceUnavailable => http::StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Returns the default message for this error.
    #[must_use]
    pub fn default_message(&self) -> &'static str {
        match self {
            Self::AccessDenied => "Access Denied",
            Self::BadDigest => "The Content-MD5 you specified did not match what we received.",
            Self::BucketAlreadyExists => {
                "The requested bucket name is not available. The bucket namespace is shared by all users of the system. Please select a different name and try again."
            }
            Self::BucketAlreadyOwnedByYou => {
                "Your previous request to create the named bucket succeeded and you already own it."
            }
            Self::BucketNotEmpty => "The bucket you tried to delete is not empty.",
            Self::EntityTooLarge => "Your proposed upload exceeds the maximum allowed object size.",
            Self::InternalError => "We encountered an internal error. Please try again.",
            Self::InvalidArgument => "Invalid Argument",
            Self::InvalidBucketName => "The specified bucket is not valid.",
            Self::InvalidDigest => "The Content-MD5 you specified is not valid.",
            Self::InvalidRequest => "Invalid Request",
            Self::InvalidURI => "Couldn't parse the specified URI.",
            Self::KeyTooLongError => "Your key is too long.",
            Self::MalformedXML => "The XML you provided was not well-formed or did not validate against our published schema.",
            Self::MethodNotAllowed => "The specified method is not allowed against this resource.",
            Self::MissingContentLength => "You must provide the Content-Length HTTP header.",
            Self::NoSuchBucket => "The specified bucket does not exist.",
            Self::NoSuchKey => "The specified key does not exist.",
            Self::NoSuchUpload => "The specified multipart upload does not exist.",
            Self::NoSuchVersion => {
                "Indicates that the version ID specified in the request does not match an existing version."
            }
            Self::NotImplemented => {
                "A header you provided implies functionality that is not implemented."
            }
            Self::PreconditionFailed => {
                "At least one of the preconditions you specified did not hold."
            }
            Self::RequestTimeout => {
                "Your socket connection to the server was not read from or written to within the timeout period."
            }
            Self::ServiceUnavailable => "Reduce your request rate.",
            Self::SignatureDoesNotMatch => {
                "The request signature we calculated does not match the signature you provided."
            }
        }
    }
}

impl fmt::Display for S3ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An S3 error response.
#[derive(Debug)]
pub struct S3Error {
    /// The error code.
    pub code: S3ErrorCode,
    /// A human-readable error message.
    pub message: String,
    /// The bucket the failing request addressed, if any.
    pub bucket_name: Option<String>,
    /// The request ID.
    pub request_id: Option<String>,
    /// The HTTP status code.
    pub status_code: http::StatusCode,
    /// The underlying source error, if any.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for S3Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S3Error({}): {}", self.code, self.message)
    }
}

impl std::error::Error for S3Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl S3Error {
    /// Create a new S3Error from an error code.
    #[must_use]
    pub fn new(code: S3ErrorCode) -> Self {
        Self::with_message(code, code.default_message())
    }

    /// Create a new S3Error with a custom message.
    #[must_use]
    pub fn with_message(code: S3ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status_code: code.default_status_code(),
            message: message.into(),
            code,
            bucket_name: None,
            request_id: None,
            source: None,
        }
    }

    /// Set the bucket this error refers to.
    #[must_use]
    pub fn with_bucket(mut self, bucket_name: impl Into<String>) -> Self {
        self.bucket_name = Some(bucket_name.into());
        self
    }

    /// Set the request ID.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Set the source error.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Create a NoSuchBucket error.
    #[must_use]
    pub fn no_such_bucket(bucket_name: impl Into<String>) -> Self {
        Self::new(S3ErrorCode::NoSuchBucket).with_bucket(bucket_name)
    }

    /// Create a NoSuchKey error.
    #[must_use]
    pub fn no_such_key(bucket_name: impl Into<String>) -> Self {
        Self::new(S3ErrorCode::NoSuchKey).with_bucket(bucket_name)
    }

    /// Create a BucketAlreadyExists error.
    #[must_use]
    pub fn bucket_already_exists(bucket_name: impl Into<String>) -> Self {
        Self::new(S3ErrorCode::BucketAlreadyExists).with_bucket(bucket_name)
    }

    /// Create a BucketNotEmpty error.
    #[must_use]
    pub fn bucket_not_empty(bucket_name: impl Into<String>) -> Self {
        Self::new(S3ErrorCode::BucketNotEmpty).with_bucket(bucket_name)
    }

    /// Create a InternalError error.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::with_message(S3ErrorCode::InternalError, message)
    }

    /// Create a InvalidArgument error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::with_message(S3ErrorCode::InvalidArgument, message)
    }

    /// Create a InvalidBucketName error.
    #[must_use]
    pub fn invalid_bucket_name() -> Self {
        Self::new(S3ErrorCode::InvalidBucketName)
    }

    /// Create a InvalidRequest error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::with_message(S3ErrorCode::InvalidRequest, message)
    }

    /// Create a MethodNotAllowed error.
    #[must_use]
    pub fn method_not_allowed() -> Self {
        Self::new(S3ErrorCode::MethodNotAllowed)
    }
}

/// Create an S3Error from an error code.
///
/// # Examples
///
/// ```
/// use s3shim_model::s3_error;
/// use s3shim_model::error::S3ErrorCode;
///
/// let err = s3_error!(NoSuchBucket);
/// assert_eq!(err.code, S3ErrorCode::NoSuchBucket);
///
/// let err = s3_error!(InvalidRequest, "bad header");
/// assert_eq!(err.message, "bad header");
/// ```
#[macro_export]
macro_rules! s3_error {
    ($code:ident) => {
        $crate::error::S3Error::new($crate::error::S3ErrorCode::$code)
    };
    ($code:ident, $msg:expr) => {
        $crate::error::S3Error::with_message($crate::error::S3ErrorCode::$code, $msg)
    };
}
