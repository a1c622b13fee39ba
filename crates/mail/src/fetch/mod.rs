//! Read operations over the remote mailbox
//!
//! [`MailApi`] is the transport seam (three remote calls); [`MailFetcher`]
//! layers pagination, accumulation and the error policy on top of it.

mod fetcher;
mod memory;

pub use fetcher::MailFetcher;
pub use memory::{ApiCall, InMemoryMailApi};

use crate::error::ApiError;
use crate::models::{Label, LabelId, Message, MessageFormat, MessageId};
use crate::session::Session;

/// Which messages a listing should return
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageFilter {
    /// Gmail search syntax, e.g. `from:shop.example older_than:1y`
    Query(String),
    /// Messages carrying all of the given labels
    Labels(Vec<LabelId>),
}

impl MessageFilter {
    pub fn query(q: impl Into<String>) -> Self {
        MessageFilter::Query(q.into())
    }

    pub fn labels<I, L>(ids: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<LabelId>,
    {
        MessageFilter::Labels(ids.into_iter().map(Into::into).collect())
    }
}

/// One page of a message listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessagePage {
    pub items: Vec<MessageId>,
    pub next_page_token: Option<String>,
}

impl MessagePage {
    /// Continuation token, treating an empty token as absent
    pub fn continuation(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Remote mailbox calls, all blocking
pub trait MailApi {
    fn list_labels(&self, session: &Session) -> Result<Vec<Label>, ApiError>;

    fn list_messages(
        &self,
        session: &Session,
        filter: &MessageFilter,
        page_token: Option<&str>,
    ) -> Result<MessagePage, ApiError>;

    fn get_message(
        &self,
        session: &Session,
        id: &MessageId,
        format: MessageFormat,
    ) -> Result<Message, ApiError>;
}

impl<T: MailApi + ?Sized> MailApi for &T {
    fn list_labels(&self, session: &Session) -> Result<Vec<Label>, ApiError> {
        (**self).list_labels(session)
    }

    fn list_messages(
        &self,
        session: &Session,
        filter: &MessageFilter,
        page_token: Option<&str>,
    ) -> Result<MessagePage, ApiError> {
        (**self).list_messages(session, filter, page_token)
    }

    fn get_message(
        &self,
        session: &Session,
        id: &MessageId,
        format: MessageFormat,
    ) -> Result<Message, ApiError> {
        (**self).get_message(session, id, format)
    }
}
