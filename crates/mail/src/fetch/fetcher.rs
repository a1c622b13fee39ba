//! Paginated fetch operations
//!
//! Each operation comes in two forms:
//! - `try_*` returns the error, so an empty mailbox and a failed call can be told apart
//! - the plain form logs the error and returns an empty result instead
//!
//! Any failure aborts the whole operation; partial results are never returned.

use log::{debug, error, info};
use std::collections::BTreeSet;

use super::{MailApi, MessageFilter};
use crate::error::MailError;
use crate::models::{Label, LabelId, Message, MessageFormat, MessageId};
use crate::session::Session;

/// Read-only operations over a [`MailApi`]
pub struct MailFetcher<A> {
    api: A,
}

impl<A: MailApi> MailFetcher<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    // === Labels ===

    /// All labels, in remote listing order
    pub fn try_list_labels(&self, session: &Session) -> Result<Vec<Label>, MailError> {
        let labels = self.api.list_labels(session)?;
        debug!("Listed {} labels", labels.len());
        Ok(labels)
    }

    /// All labels; empty on failure
    pub fn list_labels(&self, session: &Session) -> Vec<Label> {
        self.try_list_labels(session)
            .unwrap_or_else(|e| swallow("list labels", e))
    }

    /// Id of the first label whose name equals `name`, ignoring case.
    ///
    /// With duplicate names the first one in remote listing order wins.
    pub fn try_find_label_id_by_name(
        &self,
        session: &Session,
        name: &str,
    ) -> Result<Option<LabelId>, MailError> {
        let labels = self.try_list_labels(session)?;
        Ok(labels
            .into_iter()
            .find(|label| label.name_matches(name))
            .map(|label| label.id))
    }

    /// Label lookup by name; `None` when absent or on failure
    pub fn find_label_id_by_name(&self, session: &Session, name: &str) -> Option<LabelId> {
        self.try_find_label_id_by_name(session, name)
            .unwrap_or_else(|e| swallow("find label", e))
    }

    // === Messages ===

    /// Full messages matching a Gmail search query, in listing order
    pub fn try_fetch_messages_by_query(
        &self,
        session: &Session,
        query: &str,
    ) -> Result<Vec<Message>, MailError> {
        self.fetch_messages(session, &MessageFilter::query(query))
    }

    /// Full messages matching a query; empty on failure
    pub fn fetch_messages_by_query(&self, session: &Session, query: &str) -> Vec<Message> {
        self.try_fetch_messages_by_query(session, query)
            .unwrap_or_else(|e| swallow("fetch messages by query", e))
    }

    /// Full messages carrying the given labels, in listing order
    pub fn try_fetch_messages_by_labels(
        &self,
        session: &Session,
        label_ids: &[LabelId],
    ) -> Result<Vec<Message>, MailError> {
        self.fetch_messages(session, &MessageFilter::labels(label_ids.iter().cloned()))
    }

    /// Full messages carrying the given labels; empty on failure
    pub fn fetch_messages_by_labels(
        &self,
        session: &Session,
        label_ids: &[LabelId],
    ) -> Vec<Message> {
        self.try_fetch_messages_by_labels(session, label_ids)
            .unwrap_or_else(|e| swallow("fetch messages by labels", e))
    }

    /// Distinct `From` values of messages carrying the given labels.
    ///
    /// Uses metadata-only fetches. Messages without a `From` header add nothing.
    pub fn try_fetch_senders_by_labels(
        &self,
        session: &Session,
        label_ids: &[LabelId],
    ) -> Result<BTreeSet<String>, MailError> {
        let filter = MessageFilter::labels(label_ids.iter().cloned());
        let mut senders = BTreeSet::new();
        self.for_each_message(session, &filter, MessageFormat::Metadata, |message| {
            match message.sender() {
                Some(sender) => {
                    senders.insert(sender.to_string());
                }
                None => debug!("Message {} has no sender", message.id),
            }
        })?;
        info!("Collected {} distinct senders", senders.len());
        Ok(senders)
    }

    /// Distinct senders for the given labels; empty on failure
    pub fn fetch_senders_by_labels(
        &self,
        session: &Session,
        label_ids: &[LabelId],
    ) -> BTreeSet<String> {
        self.try_fetch_senders_by_labels(session, label_ids)
            .unwrap_or_else(|e| swallow("fetch senders by labels", e))
    }

    // === Pagination ===

    /// Every message id matching `filter`, following continuation tokens
    /// until the remote stops returning one.
    pub fn try_list_message_ids(
        &self,
        session: &Session,
        filter: &MessageFilter,
    ) -> Result<Vec<MessageId>, MailError> {
        let mut page = self.api.list_messages(session, filter, None)?;
        let mut ids = std::mem::take(&mut page.items);
        let mut pages = 1;

        while let Some(token) = page.continuation().map(str::to_string) {
            page = self.api.list_messages(session, filter, Some(&token))?;
            ids.append(&mut page.items);
            pages += 1;
        }

        debug!("Listed {} message ids over {} pages", ids.len(), pages);
        Ok(ids)
    }

    fn fetch_messages(
        &self,
        session: &Session,
        filter: &MessageFilter,
    ) -> Result<Vec<Message>, MailError> {
        let mut messages = Vec::new();
        self.for_each_message(session, filter, MessageFormat::Full, |message| {
            messages.push(message)
        })?;
        info!("Fetched {} messages", messages.len());
        Ok(messages)
    }

    /// List all ids, then fetch each one in listing order
    fn for_each_message<F>(
        &self,
        session: &Session,
        filter: &MessageFilter,
        format: MessageFormat,
        mut accumulate: F,
    ) -> Result<(), MailError>
    where
        F: FnMut(Message),
    {
        let ids = self.try_list_message_ids(session, filter)?;
        for id in &ids {
            let message = self.api.get_message(session, id, format)?;
            accumulate(message);
        }
        Ok(())
    }
}

/// Log a failed operation and fall back to the empty value
fn swallow<T: Default>(operation: &str, err: MailError) -> T {
    error!("Failed to {}: {}", operation, err);
    T::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Credential, GMAIL_READONLY_SCOPE};
    use crate::error::ApiError;
    use crate::fetch::{ApiCall, InMemoryMailApi};

    fn session() -> Session {
        Session::new(Credential {
            access_token: "token".to_string(),
            refresh_token: None,
            expiry: None,
            scope: GMAIL_READONLY_SCOPE.to_string(),
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            token_uri: None,
        })
    }

    fn ids(messages: &[Message]) -> Vec<&str> {
        messages.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn test_pagination_concatenates_pages_in_order() {
        let api = InMemoryMailApi::new().with_pages([vec!["a", "b"], vec!["c"], vec!["d", "e"]]);
        let fetcher = MailFetcher::new(&api);

        let messages = fetcher.fetch_messages_by_query(&session(), "in:inbox");
        assert_eq!(ids(&messages), vec!["a", "b", "c", "d", "e"]);

        let listings: Vec<Option<String>> = api
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                ApiCall::ListMessages { page_token, .. } => Some(page_token),
                _ => None,
            })
            .collect();
        assert_eq!(
            listings,
            vec![None, Some("page-1".to_string()), Some("page-2".to_string())]
        );
    }

    #[test]
    fn test_no_pages_yields_empty() {
        let api = InMemoryMailApi::new();
        let fetcher = MailFetcher::new(&api);

        let result = fetcher.try_fetch_messages_by_query(&session(), "").unwrap();
        assert!(result.is_empty());
        assert_eq!(api.calls().len(), 1);
    }

    #[test]
    fn test_single_page_with_empty_items() {
        let api = InMemoryMailApi::new().with_pages([Vec::<&str>::new()]);
        let fetcher = MailFetcher::new(&api);
        let ids = fetcher
            .try_list_message_ids(&session(), &MessageFilter::query("x"))
            .unwrap();
        assert!(ids.is_empty());
    }

    #[test]
    fn test_fetch_by_labels_uses_full_format_and_label_filter() {
        let api = InMemoryMailApi::new().with_pages([vec!["m1"]]);
        let fetcher = MailFetcher::new(&api);
        let labels = vec![LabelId::new(LabelId::CATEGORY_UPDATES)];

        let messages = fetcher.fetch_messages_by_labels(&session(), &labels);
        assert_eq!(ids(&messages), vec!["m1"]);
        assert_eq!(
            api.calls(),
            vec![
                ApiCall::ListMessages {
                    filter: MessageFilter::Labels(labels),
                    page_token: None
                },
                ApiCall::GetMessage {
                    id: MessageId::new("m1"),
                    format: MessageFormat::Full
                },
            ]
        );
    }

    #[test]
    fn test_failure_mid_pagination_discards_everything() {
        let api = InMemoryMailApi::new()
            .with_pages([vec!["a"], vec!["b"], vec!["c"]])
            .failing_on_page(1);
        let fetcher = MailFetcher::new(&api);

        assert!(fetcher.fetch_messages_by_query(&session(), "q").is_empty());

        let err = fetcher.try_fetch_messages_by_query(&session(), "q").unwrap_err();
        assert!(matches!(
            err,
            MailError::Api(ApiError::Status { status: 500, .. })
        ));
        // no message was fetched before the listing failed
        assert!(
            !api.calls()
                .iter()
                .any(|c| matches!(c, ApiCall::GetMessage { .. }))
        );
    }

    #[test]
    fn test_failure_fetching_a_message_discards_everything() {
        let api = InMemoryMailApi::new()
            .with_pages([vec!["a", "b", "c"]])
            .failing_on_message("c");
        let fetcher = MailFetcher::new(&api);

        assert!(
            fetcher
                .fetch_messages_by_labels(&session(), &[LabelId::new(LabelId::INBOX)])
                .is_empty()
        );
        assert!(
            fetcher
                .try_fetch_messages_by_labels(&session(), &[LabelId::new(LabelId::INBOX)])
                .is_err()
        );
    }

    #[test]
    fn test_senders_are_deduplicated() {
        let api = InMemoryMailApi::new()
            .with_pages([vec!["a", "b"], vec!["c"]])
            .with_message(Message::new("a").with_headers([("From", "Shop <deals@shop.example>")]))
            .with_message(Message::new("b").with_headers([("From", "Shop <deals@shop.example>")]))
            .with_message(Message::new("c").with_headers([("From", "news@paper.example")]));
        let fetcher = MailFetcher::new(&api);

        let senders = fetcher
            .fetch_senders_by_labels(&session(), &[LabelId::new(LabelId::CATEGORY_PROMOTIONS)]);
        assert_eq!(senders.len(), 2);
        assert!(senders.contains("Shop <deals@shop.example>"));
        assert!(senders.contains("news@paper.example"));
    }

    #[test]
    fn test_senders_use_metadata_format() {
        let api = InMemoryMailApi::new()
            .with_message(Message::new("a").with_headers([("From", "x@example.com")]))
            .with_pages([vec!["a"]]);
        let fetcher = MailFetcher::new(&api);

        fetcher.fetch_senders_by_labels(&session(), &[LabelId::new(LabelId::INBOX)]);
        assert!(api.calls().contains(&ApiCall::GetMessage {
            id: MessageId::new("a"),
            format: MessageFormat::Metadata
        }));
    }

    #[test]
    fn test_message_without_from_contributes_nothing() {
        let api = InMemoryMailApi::new()
            .with_pages([vec!["a", "b"]])
            .with_message(Message::new("a").with_headers([("Subject", "no sender")]))
            .with_message(Message::new("b").with_headers([("From", "b@example.com")]));
        let fetcher = MailFetcher::new(&api);

        let senders = fetcher
            .try_fetch_senders_by_labels(&session(), &[LabelId::new(LabelId::INBOX)])
            .unwrap();
        assert_eq!(senders.into_iter().collect::<Vec<_>>(), vec!["b@example.com"]);
    }

    #[test]
    fn test_senders_failure_yields_empty_set() {
        let api = InMemoryMailApi::new()
            .with_pages([vec!["a"], vec!["b"]])
            .failing_on_message("b");
        let fetcher = MailFetcher::new(&api);

        assert!(
            fetcher
                .fetch_senders_by_labels(&session(), &[LabelId::new(LabelId::INBOX)])
                .is_empty()
        );
    }

    #[test]
    fn test_find_label_first_case_insensitive_match() {
        let api = InMemoryMailApi::new()
            .with_labels(vec![Label::new("1", "Promo"), Label::new("2", "promo")]);
        let fetcher = MailFetcher::new(&api);

        assert_eq!(
            fetcher.find_label_id_by_name(&session(), "PROMO"),
            Some(LabelId::new("1"))
        );
        assert_eq!(fetcher.find_label_id_by_name(&session(), "Promotions"), None);
    }

    #[test]
    fn test_find_label_on_failure_is_none() {
        let api = InMemoryMailApi::new()
            .with_labels(vec![Label::new("1", "Promo")])
            .failing_labels();
        let fetcher = MailFetcher::new(&api);

        assert_eq!(fetcher.find_label_id_by_name(&session(), "Promo"), None);
        assert!(fetcher.try_find_label_id_by_name(&session(), "Promo").is_err());
    }

    #[test]
    fn test_list_labels_preserves_order_and_swallows_errors() {
        let labels = vec![
            Label::system("INBOX", "INBOX"),
            Label::new("Label_1", "Receipts"),
        ];
        let ok = InMemoryMailApi::new().with_labels(labels.clone());
        assert_eq!(MailFetcher::new(&ok).list_labels(&session()), labels);

        let failing = InMemoryMailApi::new().with_labels(labels).failing_labels();
        assert!(MailFetcher::new(&failing).list_labels(&session()).is_empty());
    }
}
