//! Bluesky (AT Protocol) publisher

use async_trait::async_trait;
use hn_drip_domain::{PublishError, PublishResult, Publisher, RenderedPost};
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

const POST_COLLECTION: &str = "app.bsky.feed.post";
const LINK_FEATURE: &str = "app.bsky.richtext.facet#link";

/// Bluesky publisher: logs in with an app password, then creates a post record
pub struct BlueskyPublisher {
    client: Client,
    service_url: String,
    identifier: String,
    password: SecretString,
    max_chars: usize,
    enabled: bool,
}

impl BlueskyPublisher {
    pub fn with_service_url(
        identifier: String,
        password: SecretString,
        service_url: String,
        max_chars: usize,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            service_url: service_url.trim_end_matches('/').to_string(),
            identifier,
            password,
            max_chars,
            enabled: true,
        }
    }

    /// Create a disabled publisher (for dry-run and preview)
    pub fn disabled() -> Self {
        Self {
            client: Client::new(),
            service_url: String::new(),
            identifier: String::new(),
            password: SecretString::new("".into()),
            max_chars: 300,
            enabled: false,
        }
    }

    async fn create_session(&self) -> Result<Session, PublishError> {
        let url = format!("{}/xrpc/com.atproto.server.createSession", self.service_url);

        let response = self
            .client
            .post(&url)
            .json(&CreateSessionRequest {
                identifier: &self.identifier,
                password: self.password.expose_secret(),
            })
            .send()
            .await
            .map_err(|e| PublishError::Network(e.to_string()))?;

        let response = check_status(response, "create session").await?;

        response
            .json()
            .await
            .map_err(|e| PublishError::Api(format!("Invalid session response: {}", e)))
    }

    async fn create_record(
        &self,
        session: &Session,
        post: &RenderedPost,
    ) -> Result<CreateRecordResponse, PublishError> {
        let url = format!("{}/xrpc/com.atproto.repo.createRecord", self.service_url);

        let created_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(|e| PublishError::Api(e.to_string()))?;

        let request = CreateRecordRequest {
            repo: &session.did,
            collection: POST_COLLECTION,
            record: PostRecord {
                record_type: POST_COLLECTION,
                text: &post.text,
                created_at,
                facets: post
                    .links
                    .iter()
                    .map(|link| Facet {
                        index: ByteSlice {
                            byte_start: link.byte_start,
                            byte_end: link.byte_end,
                        },
                        features: vec![FacetFeature {
                            feature_type: LINK_FEATURE,
                            uri: &link.uri,
                        }],
                    })
                    .collect(),
            },
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", session.access_jwt))
            .json(&request)
            .send()
            .await
            .map_err(|e| PublishError::Network(e.to_string()))?;

        let response = check_status(response, "create post").await?;

        response
            .json()
            .await
            .map_err(|e| PublishError::Api(format!("Invalid createRecord response: {}", e)))
    }
}

#[derive(Serialize)]
struct CreateSessionRequest<'a> {
    identifier: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Session {
    access_jwt: String,
    did: String,
}

#[derive(Serialize)]
struct CreateRecordRequest<'a> {
    repo: &'a str,
    collection: &'static str,
    record: PostRecord<'a>,
}

#[derive(Serialize)]
struct PostRecord<'a> {
    #[serde(rename = "$type")]
    record_type: &'static str,
    text: &'a str,
    #[serde(rename = "createdAt")]
    created_at: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    facets: Vec<Facet<'a>>,
}

#[derive(Serialize)]
struct Facet<'a> {
    index: ByteSlice,
    features: Vec<FacetFeature<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ByteSlice {
    byte_start: usize,
    byte_end: usize,
}

#[derive(Serialize)]
struct FacetFeature<'a> {
    #[serde(rename = "$type")]
    feature_type: &'static str,
    uri: &'a str,
}

#[derive(Deserialize)]
struct CreateRecordResponse {
    uri: String,
}

async fn check_status(response: Response, action: &str) -> Result<Response, PublishError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(PublishError::RateLimited);
    }

    let body = response.text().await.unwrap_or_default();

    if status == StatusCode::UNAUTHORIZED || body.contains("AuthenticationRequired") {
        return Err(PublishError::Auth(format!("Failed to {}: {}", action, body)));
    }

    Err(PublishError::Api(format!(
        "Failed to {} ({}): {}",
        action, status, body
    )))
}

/// `at://did/app.bsky.feed.post/rkey` to a bsky.app web URL
fn web_url(at_uri: &str) -> Option<String> {
    let rest = at_uri.strip_prefix("at://")?;
    let mut parts = rest.splitn(3, '/');
    let did = parts.next()?;
    let collection = parts.next()?;
    let rkey = parts.next()?;
    if collection != POST_COLLECTION || rkey.is_empty() {
        return None;
    }
    Some(format!("https://bsky.app/profile/{}/post/{}", did, rkey))
}

#[async_trait]
impl Publisher for BlueskyPublisher {
    async fn publish(&self, post: &RenderedPost) -> Result<PublishResult, PublishError> {
        if !self.enabled {
            return Err(PublishError::Api("Publisher is disabled".to_string()));
        }

        let len = post.text.chars().count();
        if len > self.max_chars {
            return Err(PublishError::ContentTooLong {
                len,
                max: self.max_chars,
            });
        }

        let session = self.create_session().await?;
        tracing::debug!(did = %session.did, "Created Bluesky session");

        let record = self.create_record(&session, post).await?;

        Ok(PublishResult {
            url: web_url(&record.uri),
            id: record.uri,
        })
    }

    fn platform(&self) -> &'static str {
        "bluesky"
    }
}
