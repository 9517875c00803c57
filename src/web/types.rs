//! Inbound subscription data and its validation.
//! The storefront sends `{ "email": "...", "first_name": "..." }`, only the email is required.

use derive_more::Display;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, thiserror::Error)]
pub enum DataParsingError {
    #[error("email is missing or empty")]
    EmailMissing,
}

// ###################################
// ->   STRUCTS
// ###################################
/// Deserializable subscription body.
/// Every field is optional so a missing email can be reported as such.
/// A field that isn't a string is dropped on its own and never fails the whole body.
#[derive(Debug, Default, Deserialize)]
pub struct SubscribeBody {
    #[serde(default, deserialize_with = "string_or_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub first_name: Option<String>,
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_string))
}

/// A validated subscription, ready to be forwarded to Klaviyo.
#[derive(Debug, Clone)]
pub struct SubscriptionRequest {
    pub email: SubscriberEmail,
    pub first_name: Option<FirstName>,
}

impl SubscriptionRequest {
    /// Parses the raw request body.
    /// A body that isn't a JSON object is treated the same as one without an email.
    pub fn parse_json(body: &[u8]) -> Result<Self, DataParsingError> {
        let body: SubscribeBody = serde_json::from_slice(body).unwrap_or_else(|er| {
            debug!("{:<12} - Unparseable subscribe body: {er}", "PARSE");
            SubscribeBody::default()
        });

        body.try_into()
    }
}

impl TryFrom<SubscribeBody> for SubscriptionRequest {
    type Error = DataParsingError;

    fn try_from(body: SubscribeBody) -> Result<Self, Self::Error> {
        let email = body
            .email
            .ok_or(DataParsingError::EmailMissing)
            .and_then(SubscriberEmail::parse)?;

        Ok(SubscriptionRequest {
            email,
            first_name: body.first_name.and_then(FirstName::parse),
        })
    }
}

/// A non-empty email.
/// Format checks are left to Klaviyo, whose rejection is relayed to the caller.
#[derive(Debug, Clone, Display)]
pub struct SubscriberEmail(String);

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SubscriberEmail {
    pub fn parse<S>(value: S) -> Result<Self, DataParsingError>
    where
        S: AsRef<str>,
    {
        let value = value.as_ref().trim();
        if value.is_empty() {
            return Err(DataParsingError::EmailMissing);
        }

        Ok(SubscriberEmail(value.to_owned()))
    }
}

/// A non-empty first name, `None` when nothing usable was sent.
#[derive(Debug, Clone, Display)]
pub struct FirstName(String);

impl AsRef<str> for FirstName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FirstName {
    pub fn parse<S>(value: S) -> Option<Self>
    where
        S: AsRef<str>,
    {
        let value = value.as_ref().trim();
        (!value.is_empty()).then(|| FirstName(value.to_owned()))
    }
}
