//! Mail crate - read-only access to a Gmail mailbox
//!
//! This crate provides:
//! - Credential management (token file, refresh, interactive consent)
//! - An immutable authenticated [`Session`]
//! - Paginated fetch operations over labels and messages ([`MailFetcher`])
//! - The Gmail HTTP transport ([`GmailClient`], [`GoogleOAuth`])
//!
//! Everything is synchronous; each remote call blocks until it completes.

pub mod auth;
pub mod config;
pub mod error;
pub mod fetch;
pub mod gmail;
pub mod models;
pub mod session;

pub use auth::{
    Credential, CredentialManager, FileTokenStore, GMAIL_READONLY_SCOPE, InMemoryTokenStore,
    OAuthProvider, TokenStore,
};
pub use config::{ClientSecret, MailPaths};
pub use error::{ApiError, AuthError, MailError};
pub use fetch::{InMemoryMailApi, MailApi, MailFetcher, MessageFilter, MessagePage};
pub use gmail::{GmailClient, GoogleOAuth};
pub use models::{EmailAddress, Label, LabelId, LabelKind, Message, MessageFormat, MessageId};
pub use session::Session;
