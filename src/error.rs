use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid URL in {var}: {reason}")]
    InvalidUrl { var: String, reason: String },
    #[error("Invalid organization id: {0}")]
    InvalidOrgId(String),
    #[error("Signing key is incomplete, {0} is not set")]
    IncompleteSigningKey(String),
    #[error("Unable to read private key {path}: {source}")]
    PrivateKeyRead {
        path: String,
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum SecretError {
    #[error("Crypto error: {0}")]
    Crypto(#[from] openssl::error::ErrorStack),
    #[error("Unable to encode client secret: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Invalid PEM: {0}")]
    InvalidPem(#[from] std::string::FromUtf8Error),
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Client id is not configured")]
    NoClientId,
    #[error("Client secret is not configured")]
    NoClientSecret,
    #[error("Invalid token endpoint URL")]
    InvalidUrl,
    #[error("Client credentials were rejected")]
    InvalidClient,
    #[error("Token endpoint returned an unusable response")]
    ServerError,
    #[error("Token request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Unable to sign client secret: {0}")]
    Secret(#[from] SecretError),
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Organization id is not configured")]
    NoOrgId,
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Server responded with {status}")]
    Server { status: StatusCode },
    #[error("API error {}: {}", .0.message_code, .0.message.as_deref().unwrap_or("no message"))]
    Api(ErrorMessage),
    #[error("Invalid response: {0}")]
    Decode(serde_json::Error),
    #[error("Unable to encode request body: {0}")]
    Encode(serde_json::Error),
}

impl ApiError {
    /// Missing client id, client secret or org id. Nothing was sent.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ApiError::NoOrgId | ApiError::Auth(AuthError::NoClientId | AuthError::NoClientSecret)
        )
    }

    /// The server kept rejecting the bearer token after the refresh retry.
    pub fn is_rejected_auth(&self) -> bool {
        matches!(self, ApiError::Server { status } if *status == StatusCode::UNAUTHORIZED)
    }

    /// The API's own error payload, if this failure carries one.
    pub fn message(&self) -> Option<&ErrorMessage> {
        match self {
            ApiError::Api(message) => Some(message),
            _ => None,
        }
    }
}

/// Error codes Apple puts in `error.errors[].messageCode`.
///
/// Codes this crate has no special handling for are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageCode {
    InvalidClient,
    Unauthorized,
    DefaultBidAmountExceedsDailyCap,
    Forbidden,
    Other(String),
}

impl MessageCode {
    pub fn as_str(&self) -> &str {
        match self {
            MessageCode::InvalidClient => "invalid_client",
            MessageCode::Unauthorized => "UNAUTHORIZED",
            MessageCode::DefaultBidAmountExceedsDailyCap => "DEFAULT_BID_AMOUNT_EXCEEDS_DAILY_CAP",
            MessageCode::Forbidden => "FORBIDDEN",
            MessageCode::Other(code) => code,
        }
    }
}

impl From<String> for MessageCode {
    fn from(code: String) -> Self {
        match code.as_str() {
            "invalid_client" => MessageCode::InvalidClient,
            "UNAUTHORIZED" => MessageCode::Unauthorized,
            "DEFAULT_BID_AMOUNT_EXCEEDS_DAILY_CAP" => MessageCode::DefaultBidAmountExceedsDailyCap,
            "FORBIDDEN" => MessageCode::Forbidden,
            _ => MessageCode::Other(code),
        }
    }
}

impl From<MessageCode> for String {
    fn from(code: MessageCode) -> Self {
        code.as_str().to_string()
    }
}

impl PartialEq<&str> for MessageCode {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl std::fmt::Display for MessageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMessage {
    pub message_code: MessageCode,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
}

impl ErrorMessage {
    pub fn new(message_code: MessageCode) -> Self {
        Self {
            message_code,
            message: None,
            field: None,
        }
    }
}
