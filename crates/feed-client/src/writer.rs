//! HTTP writer for document mutations.
//!
//! The feed itself is read-only; status updates and deletions go
//! through the gateway's REST API.

use serde_json::json;
use url::Url;

use crate::{FeedError, MessageStatus};

/// Issues document mutations against the gateway REST API.
pub struct DocumentWriter {
    http: reqwest::Client,
    base: Url,
    collection: String,
}

impl DocumentWriter {
    /// Create a writer for one collection.
    pub fn new(api_url: &str, collection: impl Into<String>) -> Result<Self, FeedError> {
        Ok(Self {
            http: reqwest::Client::new(),
            base: Url::parse(api_url)?,
            collection: collection.into(),
        })
    }

    /// Update a document's status field.
    pub async fn set_status(&self, doc_id: &str, status: MessageStatus) -> Result<(), FeedError> {
        let status_str = match status {
            MessageStatus::Read => "read",
            MessageStatus::Unread => "unread",
        };
        let url = self.doc_url(doc_id)?;
        let resp = self
            .http
            .patch(url)
            .json(&json!({ "status": status_str }))
            .send()
            .await?;
        Self::check(resp).await
    }

    /// Delete a document by id.
    pub async fn delete(&self, doc_id: &str) -> Result<(), FeedError> {
        let url = self.doc_url(doc_id)?;
        let resp = self.http.delete(url).send().await?;
        Self::check(resp).await
    }

    fn doc_url(&self, doc_id: &str) -> Result<Url, FeedError> {
        let path = format!("collections/{}/documents/{}", self.collection, doc_id);
        Ok(self.base.join(&path)?)
    }

    async fn check(resp: reqwest::Response) -> Result<(), FeedError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let message = resp.text().await.unwrap_or_default();
        tracing::error!(status = status.as_u16(), message, "Document mutation failed");
        Err(FeedError::ApiError {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_url_joins_collection_and_id() {
        let writer = DocumentWriter::new("https://docs.example.com/v1/", "messages").unwrap();
        let url = writer.doc_url("abc123").unwrap();
        assert_eq!(
            url.as_str(),
            "https://docs.example.com/v1/collections/messages/documents/abc123"
        );
    }
}
