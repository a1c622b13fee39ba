//! Gmail API HTTP client
//!
//! Implements [`MailApi`] over the Gmail REST API.
//! Uses synchronous HTTP (ureq); every call blocks until the response arrives.

use log::debug;

use super::api::{ListLabelsResponse, ListMessagesResponse};
use crate::error::ApiError;
use crate::fetch::{MailApi, MessageFilter, MessagePage};
use crate::models::{Label, Message, MessageFormat, MessageId};
use crate::session::Session;

/// Gmail API client
#[derive(Debug, Clone)]
pub struct GmailClient {
    base_url: String,
}

impl Default for GmailClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GmailClient {
    /// Gmail API base URL
    const BASE_URL: &'static str = "https://gmail.googleapis.com/gmail/v1";

    pub fn new() -> Self {
        Self::with_base_url(Self::BASE_URL)
    }

    /// Point the client at another server
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn user_url(&self, session: &Session, path: &str) -> String {
        format!(
            "{}/users/{}/{}",
            self.base_url,
            urlencoding::encode(session.user_id()),
            path
        )
    }

    fn bearer(session: &Session) -> String {
        format!("Bearer {}", session.access_token())
    }
}

impl MailApi for GmailClient {
    fn list_labels(&self, session: &Session) -> Result<Vec<Label>, ApiError> {
        const OP: &str = "list labels";
        let url = self.user_url(session, "labels");

        let mut response = ureq::get(&url)
            .header("Authorization", &Self::bearer(session))
            .call()
            .map_err(|e| ApiError::from_ureq(OP, e))?;

        let labels: ListLabelsResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| ApiError::from_ureq(OP, e))?;

        Ok(labels.labels.unwrap_or_default())
    }

    fn list_messages(
        &self,
        session: &Session,
        filter: &MessageFilter,
        page_token: Option<&str>,
    ) -> Result<MessagePage, ApiError> {
        const OP: &str = "list messages";
        let url = self.user_url(session, "messages");

        let mut request = ureq::get(&url).header("Authorization", &Self::bearer(session));
        match filter {
            MessageFilter::Query(q) => {
                request = request.query("q", q);
            }
            MessageFilter::Labels(ids) => {
                for id in ids {
                    request = request.query("labelIds", id.as_str());
                }
            }
        }
        if let Some(token) = page_token {
            request = request.query("pageToken", token);
        }

        let mut response = request.call().map_err(|e| ApiError::from_ureq(OP, e))?;
        let list: ListMessagesResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| ApiError::from_ureq(OP, e))?;

        debug!(
            "Listed page: {} messages, estimate {:?}, more: {}",
            list.messages.as_ref().map_or(0, Vec::len),
            list.result_size_estimate,
            list.next_page_token.is_some()
        );
        Ok(list.into())
    }

    fn get_message(
        &self,
        session: &Session,
        id: &MessageId,
        format: MessageFormat,
    ) -> Result<Message, ApiError> {
        const OP: &str = "get message";
        let url = self.user_url(
            session,
            &format!("messages/{}", urlencoding::encode(id.as_str())),
        );

        let mut response = ureq::get(&url)
            .header("Authorization", &Self::bearer(session))
            .query("format", format.as_str())
            .call()
            .map_err(|e| ApiError::from_ureq(OP, e))?;

        response
            .body_mut()
            .read_json()
            .map_err(|e| ApiError::from_ureq(OP, e))
    }
}
