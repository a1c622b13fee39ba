//! Gmail API integration
//!
//! This module provides:
//! - OAuth2 consent and refresh against Google's endpoints
//! - Gmail API client implementing [`crate::fetch::MailApi`]

mod auth;
mod client;
#[cfg(test)]
mod loopback;

pub use auth::GoogleOAuth;
pub use client::GmailClient;

/// Gmail API response types
pub mod api {
    use serde::Deserialize;

    use crate::fetch::MessagePage;
    use crate::models::{Label, MessageId};

    /// Response from listing labels
    #[derive(Debug, Deserialize)]
    pub struct ListLabelsResponse {
        pub labels: Option<Vec<Label>>,
    }

    /// Response from listing messages
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ListMessagesResponse {
        pub messages: Option<Vec<MessageRef>>,
        pub next_page_token: Option<String>,
        pub result_size_estimate: Option<u32>,
    }

    /// Reference to a message (just ID and thread ID)
    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct MessageRef {
        pub id: String,
        pub thread_id: Option<String>,
    }

    impl From<ListMessagesResponse> for MessagePage {
        fn from(response: ListMessagesResponse) -> Self {
            MessagePage {
                items: response
                    .messages
                    .unwrap_or_default()
                    .into_iter()
                    .map(|m| MessageId::new(m.id))
                    .collect(),
                next_page_token: response.next_page_token,
            }
        }
    }

    /// Token endpoint response (authorization code or refresh grant)
    #[derive(Debug, Deserialize)]
    pub struct TokenResponse {
        pub access_token: String,
        pub refresh_token: Option<String>,
        pub expires_in: Option<i64>,
        pub scope: Option<String>,
        pub token_type: Option<String>,
    }

}
