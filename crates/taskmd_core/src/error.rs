use std::fmt;

const DECODE_PREFIX: &str = "Unable to parse task: ";
const ENCODE_PREFIX: &str = "Unable to build task: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    InvalidInput(String),
    InvalidData(String),
    Decode(String),
    Encode(String),
}

impl AppError {
    pub fn invalid_input<M: Into<String>>(message: M) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_data<M: Into<String>>(message: M) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn decode<M: Into<String>>(message: M) -> Self {
        Self::Decode(message.into())
    }

    pub fn encode<M: Into<String>>(message: M) -> Self {
        Self::Encode(message.into())
    }

    pub fn into_decode(self) -> Self {
        match self {
            Self::Decode(_) => self,
            other => Self::Decode(other.message().to_string()),
        }
    }

    pub fn into_encode(self) -> Self {
        match self {
            Self::Encode(_) => self,
            other => Self::Encode(other.message().to_string()),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidData(_) => "invalid_data",
            Self::Decode(_) => "decode_error",
            Self::Encode(_) => "encode_error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::InvalidInput(message) => message,
            Self::InvalidData(message) => message,
            Self::Decode(message) => message,
            Self::Encode(message) => message,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(message) => write!(f, "{DECODE_PREFIX}{message}"),
            Self::Encode(message) => write!(f, "{ENCODE_PREFIX}{message}"),
            other => write!(f, "{} - {}", other.code(), other.message()),
        }
    }
}

impl std::error::Error for AppError {}
