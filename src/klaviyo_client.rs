use reqwest::{
    header::{HeaderValue, ACCEPT, AUTHORIZATION},
    Client, StatusCode,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::{config::KlaviyoConfig, utils::error_chain_fmt, web::types::SubscriptionRequest};

pub const SUBSCRIPTION_JOBS_PATH: &str = "api/profile-subscription-bulk-create-jobs/";
const REVISION_HEADER: &str = "revision";

/// Outcome of a single call to the Klaviyo subscription endpoint.
#[derive(Debug)]
pub enum UpstreamResult {
    /// Klaviyo queued the job (202).
    Accepted,
    /// Klaviyo answered with any other status, `body` is its (JSON) error body.
    Rejected { status: StatusCode, body: Value },
    /// No usable answer: network error, timeout or an error body that isn't JSON.
    TransportFailure { cause: Error },
}

#[derive(Debug)]
pub struct KlaviyoClient {
    pub http_client: Client,
    pub url: reqwest::Url,
    pub list_id: String,
    pub custom_source: String,
    revision: HeaderValue,
    api_key: SecretString,
}

impl KlaviyoClient {
    pub fn new<S: AsRef<str>>(
        base_url: S,
        api_key: SecretString,
        list_id: String,
        revision: &str,
        custom_source: String,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        let url = reqwest::Url::parse(base_url.as_ref())
            .and_then(|base| base.join(SUBSCRIPTION_JOBS_PATH))
            .map_err(|e| Error::UrlParsing(e.to_string()))?;
        let revision = HeaderValue::from_str(revision)
            .map_err(|e| Error::InvalidHeader(e.to_string()))?;

        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(KlaviyoClient {
            http_client,
            url,
            list_id,
            custom_source,
            revision,
            api_key,
        })
    }

    pub fn from_config(config: &KlaviyoConfig) -> Result<Self> {
        Self::new(
            &config.api_base_url,
            config.api_key.clone(),
            config.list_id.clone(),
            &config.revision,
            config.custom_source.clone(),
            config.timeout(),
        )
    }

    /// Creates a profile subscription job for the subscriber.
    /// Never retries, a failed call is reported once to the caller.
    #[instrument(name = "Creating a Klaviyo subscription job", skip_all)]
    pub async fn subscribe(&self, subscriber: &SubscriptionRequest) -> UpstreamResult {
        match self.send_subscription_job(subscriber).await {
            Ok(result) => result,
            Err(cause) => UpstreamResult::TransportFailure { cause },
        }
    }

    async fn send_subscription_job(
        &self,
        subscriber: &SubscriptionRequest,
    ) -> Result<UpstreamResult> {
        let job = SubscriptionJob::new(subscriber, &self.list_id, &self.custom_source);

        let resp = self
            .http_client
            .post(self.url.clone())
            .header(AUTHORIZATION, self.auth_header()?)
            .header(REVISION_HEADER, self.revision.clone())
            .header(ACCEPT, "application/json")
            .json(&job)
            .send()
            .await?;

        let status = resp.status();
        debug!("{:<12} - Klaviyo responded with: {status}", "KLAVIYO");

        if status == StatusCode::ACCEPTED {
            return Ok(UpstreamResult::Accepted);
        }

        let bytes = resp.bytes().await?;
        let body: Value = serde_json::from_slice(&bytes).map_err(Error::MalformedBody)?;

        Ok(UpstreamResult::Rejected { status, body })
    }

    fn auth_header(&self) -> Result<HeaderValue> {
        let mut value =
            HeaderValue::from_str(&format!("Klaviyo-API-Key {}", self.api_key.expose_secret()))
                .map_err(|e| Error::InvalidHeader(e.to_string()))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

// ###################################
// ->   PAYLOAD
// ###################################
/// Body of `POST /api/profile-subscription-bulk-create-jobs/`.
#[derive(Serialize, Debug)]
pub struct SubscriptionJob<'a> {
    pub data: JobData<'a>,
}

#[derive(Serialize, Debug)]
pub struct JobData<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub attributes: JobAttributes<'a>,
    pub relationships: JobRelationships<'a>,
}

#[derive(Serialize, Debug)]
pub struct JobAttributes<'a> {
    pub custom_source: &'a str,
    pub profiles: Profiles<'a>,
}

#[derive(Serialize, Debug)]
pub struct Profiles<'a> {
    pub data: Vec<Profile<'a>>,
}

#[derive(Serialize, Debug)]
pub struct Profile<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub attributes: ProfileAttributes<'a>,
}

#[derive(Serialize, Debug)]
pub struct ProfileAttributes<'a> {
    pub email: &'a str,
    pub properties: ProfileProperties<'a>,
}

#[derive(Serialize, Debug)]
pub struct ProfileProperties<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<&'a str>,
}

#[derive(Serialize, Debug)]
pub struct JobRelationships<'a> {
    pub list: ListRelationship<'a>,
}

#[derive(Serialize, Debug)]
pub struct ListRelationship<'a> {
    pub data: ListRef<'a>,
}

#[derive(Serialize, Debug)]
pub struct ListRef<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub id: &'a str,
}

impl<'a> SubscriptionJob<'a> {
    pub fn new(
        subscriber: &'a SubscriptionRequest,
        list_id: &'a str,
        custom_source: &'a str,
    ) -> Self {
        let profile = Profile {
            kind: "profile",
            attributes: ProfileAttributes {
                email: subscriber.email.as_ref(),
                properties: ProfileProperties {
                    first_name: subscriber.first_name.as_ref().map(|name| name.as_ref()),
                },
            },
        };

        SubscriptionJob {
            data: JobData {
                kind: "profile-subscription-bulk-create-job",
                attributes: JobAttributes {
                    custom_source,
                    profiles: Profiles {
                        data: vec![profile],
                    },
                },
                relationships: JobRelationships {
                    list: ListRelationship {
                        data: ListRef { kind: "list", id: list_id },
                    },
                },
            },
        }
    }
}

// ###################################
// ->   ERROR & RESULT
// ###################################
pub type Result<T> = core::result::Result<T, Error>;

#[derive(thiserror::Error)]
pub enum Error {
    #[error("failed to parse the Klaviyo url: {0}")]
    UrlParsing(String),
    #[error("invalid header value: {0}")]
    InvalidHeader(String),
    #[error("Klaviyo error response is not valid JSON")]
    MalformedBody(#[source] serde_json::Error),

    #[error("reqwest error")]
    Reqwest(#[from] reqwest::Error),
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
