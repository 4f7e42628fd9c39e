//! Transport collaborators for leafwire widgets.
//!
//! Outbound, [`ChannelTransport`] turns comm calls into [`CommMessage`]s on
//! a tokio channel. Inbound, [`Dispatcher`] routes `update` messages to the
//! registered widget's `apply_patch`.

pub mod channel;
pub mod dispatch;
pub mod error;
pub mod message;

pub use channel::ChannelTransport;
pub use dispatch::Dispatcher;
pub use error::{DispatchError, TransportError};
pub use message::{CommBody, CommMessage};
