//! One-shot notifications carried in the session until the next render
//! that displays them.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::ApiError;
use crate::constants::session::FLASH_KEY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
}

impl Level {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: Level,
    pub text: String,
}

impl FlashMessage {
    /// CSS modifier used by the templates.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        self.level.as_str()
    }
}

pub async fn push(session: &Session, level: Level, text: impl Into<String>) -> Result<(), ApiError> {
    let mut messages: Vec<FlashMessage> = session.get(FLASH_KEY).await?.unwrap_or_default();
    messages.push(FlashMessage {
        level,
        text: text.into(),
    });
    session.insert(FLASH_KEY, messages).await?;
    Ok(())
}

pub async fn success(session: &Session, text: impl Into<String>) -> Result<(), ApiError> {
    push(session, Level::Success, text).await
}

pub async fn error(session: &Session, text: impl Into<String>) -> Result<(), ApiError> {
    push(session, Level::Error, text).await
}

/// Removes and returns every pending message, oldest first.
pub async fn take(session: &Session) -> Result<Vec<FlashMessage>, ApiError> {
    Ok(session
        .remove::<Vec<FlashMessage>>(FLASH_KEY)
        .await?
        .unwrap_or_default())
}
