//! Transient user notifications attached to mutation responses
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Response envelope `{ "data": .., "notice": .. }`
#[derive(Debug, Serialize)]
pub struct WithNotice<T> {
    pub data: T,
    pub notice: Notice,
}

impl<T> WithNotice<T> {
    pub fn new(data: T, notice: Notice) -> Self {
        Self { data, notice }
    }
}
