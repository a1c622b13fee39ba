//! Domain models for mail entities

mod address;
mod label;
mod message;

pub use address::EmailAddress;
pub use label::{Label, LabelId, LabelKind};
pub use message::{Header, Message, MessageBody, MessageFormat, MessageId, MessagePart};
