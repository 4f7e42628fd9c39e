//! State synchronization core for mirrored widgets.
//!
//! A widget is a struct of [`Property`] cells sharing one [`Comm`]. Local
//! assignments propagate outward through the comm's [`Transport`]; inbound
//! patches are applied through [`Widget::apply_patch`] without echoing.
//!
//! ```text
//!   Property::set ─▶ Comm ─▶ Transport::send_patch        (outbound)
//!   Transport ─▶ Widget::apply_patch ─▶ StateCodec::decode ─▶ Property (inbound)
//! ```
//!
//! Composite widgets hold their children in a [`ChildList`] of
//! [`Holder`]s, owning (shared `Rc`) or referencing (resolved through an
//! explicit [`WidgetRegistry`]).

pub mod children;
pub mod codec;
pub mod comm;
pub mod error;
pub mod holder;
pub mod property;
pub mod protocol;

pub use children::ChildList;
pub use codec::StateCodec;
pub use comm::{Comm, CommEvent, NullTransport, RecordingTransport, Transport};
pub use error::DecodeError;
pub use holder::{Holder, SharedWidget, WidgetRegistry};
pub use property::{Origin, Property};
pub use protocol::{ApplyReport, StateFields, Widget};

pub use leafwire_types::{Buffer, Encoded, Envelope, WidgetId};
