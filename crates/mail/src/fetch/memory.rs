//! In-memory mailbox implementing [`MailApi`]
//!
//! Serves a fixed label list and a fixed paged listing, records every call,
//! and can be told to fail at a given point. Used for testing.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{MailApi, MessageFilter, MessagePage};
use crate::error::ApiError;
use crate::models::{Label, Message, MessageFormat, MessageId};
use crate::session::Session;

/// A call received by [`InMemoryMailApi`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    ListLabels,
    ListMessages {
        filter: MessageFilter,
        page_token: Option<String>,
    },
    GetMessage {
        id: MessageId,
        format: MessageFormat,
    },
}

#[derive(Default)]
pub struct InMemoryMailApi {
    labels: Vec<Label>,
    pages: Vec<Vec<MessageId>>,
    messages: HashMap<MessageId, Message>,
    fail_labels: bool,
    fail_on_page: Option<usize>,
    fail_on_message: Option<MessageId>,
    calls: Mutex<Vec<ApiCall>>,
}

impl InMemoryMailApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_labels(mut self, labels: Vec<Label>) -> Self {
        self.labels = labels;
        self
    }

    /// Set the paged listing; ids without a registered message get a bare one
    pub fn with_pages<P, I>(mut self, pages: P) -> Self
    where
        P: IntoIterator<Item = I>,
        I: IntoIterator,
        I::Item: Into<MessageId>,
    {
        self.pages = pages
            .into_iter()
            .map(|page| page.into_iter().map(Into::into).collect())
            .collect();
        for id in self.pages.iter().flatten() {
            self.messages
                .entry(id.clone())
                .or_insert_with(|| Message::new(id.clone()));
        }
        self
    }

    /// Register the message returned for its id
    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.insert(message.id.clone(), message);
        self
    }

    pub fn failing_labels(mut self) -> Self {
        self.fail_labels = true;
        self
    }

    /// Fail the listing call for the zero-based page `index`
    pub fn failing_on_page(mut self, index: usize) -> Self {
        self.fail_on_page = Some(index);
        self
    }

    pub fn failing_on_message(mut self, id: impl Into<MessageId>) -> Self {
        self.fail_on_message = Some(id.into());
        self
    }

    /// Calls received so far, in order
    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: ApiCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn page_token(index: usize) -> String {
        format!("page-{}", index)
    }

    fn page_index(token: Option<&str>) -> Result<usize, ApiError> {
        match token {
            None => Ok(0),
            Some(token) => token
                .strip_prefix("page-")
                .and_then(|n| n.parse().ok())
                .ok_or(ApiError::Status {
                    operation: "list messages",
                    status: 400,
                }),
        }
    }
}

impl MailApi for InMemoryMailApi {
    fn list_labels(&self, _session: &Session) -> Result<Vec<Label>, ApiError> {
        self.record(ApiCall::ListLabels);
        if self.fail_labels {
            return Err(ApiError::Status {
                operation: "list labels",
                status: 500,
            });
        }
        Ok(self.labels.clone())
    }

    fn list_messages(
        &self,
        _session: &Session,
        filter: &MessageFilter,
        page_token: Option<&str>,
    ) -> Result<MessagePage, ApiError> {
        self.record(ApiCall::ListMessages {
            filter: filter.clone(),
            page_token: page_token.map(str::to_string),
        });

        let index = Self::page_index(page_token)?;
        if self.fail_on_page == Some(index) {
            return Err(ApiError::Status {
                operation: "list messages",
                status: 500,
            });
        }

        let items = self.pages.get(index).cloned().unwrap_or_default();
        let next_page_token = if index + 1 < self.pages.len() {
            Some(Self::page_token(index + 1))
        } else {
            None
        };
        Ok(MessagePage {
            items,
            next_page_token,
        })
    }

    fn get_message(
        &self,
        _session: &Session,
        id: &MessageId,
        format: MessageFormat,
    ) -> Result<Message, ApiError> {
        self.record(ApiCall::GetMessage {
            id: id.clone(),
            format,
        });

        if self.fail_on_message.as_ref() == Some(id) {
            return Err(ApiError::Transport {
                operation: "get message",
                message: "connection reset".to_string(),
            });
        }

        self.messages.get(id).cloned().ok_or(ApiError::Status {
            operation: "get message",
            status: 404,
        })
    }
}
