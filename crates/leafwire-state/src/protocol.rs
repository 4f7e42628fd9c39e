//! Widget state protocol: serialize-all and apply-patch over a widget's full
//! inherited field set.
//!
//! # Field registration
//!
//! Each level of a widget hierarchy is a struct holding its base level (or,
//! at the root, the widget's [`Comm`]) plus its own [`Property`] fields.
//! The [`state_fields!`](crate::state_fields) macro registers those fields:
//! the generated [`StateFields`] impl visits the base first, then the
//! level's own fields in declaration order. No runtime reflection.
//!
//! ```text
//! WidgetBase   (_model_module … _view_name)      root, owns the Comm
//!   └── LayerBase  (name, base, bottom, …)
//!         └── RasterLayerBase (opacity, visible)
//!               └── Heatmap (locations, min_opacity, …)
//! ```
//!
//! [`Property`]: crate::Property

use leafwire_types::{Envelope, WidgetId};
use tracing::trace;

use crate::{Comm, DecodeError};

/// Outcome of applying one inbound envelope.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ApplyReport {
    /// Fields decoded and assigned.
    pub applied: Vec<&'static str>,
    /// Fields whose value failed to decode; prior values kept.
    pub rejected: Vec<(&'static str, DecodeError)>,
    /// Names this widget does not know; ignored.
    pub unknown: Vec<String>,
}

impl ApplyReport {
    /// No field was rejected.
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }

    pub fn was_applied(&self, name: &str) -> bool {
        self.applied.iter().any(|applied| *applied == name)
    }
}

/// Base-to-derived access to a widget's fields.
///
/// Implemented per hierarchy level with [`state_fields!`](crate::state_fields).
pub trait StateFields {
    /// The widget's comm (owned by the root level).
    fn comm(&self) -> &Comm;

    /// Append every field name, base first.
    fn collect_field_names(&self, names: &mut Vec<&'static str>);

    /// Append every field's current value, base first.
    fn write_state(&self, env: &mut Envelope);

    /// Append every dirty field, base first, clearing the flags.
    fn write_dirty(&mut self, env: &mut Envelope);

    /// Clear every dirty flag without encoding anything.
    fn clear_dirty(&mut self);

    /// Apply the entries of `env` that name one of this widget's fields.
    fn read_state(&mut self, env: &Envelope, report: &mut ApplyReport);
}

/// A native object whose state is mirrored by a remote renderer.
///
/// Object safe: child collections hold `dyn Widget`.
pub trait Widget: StateFields {
    fn id(&self) -> WidgetId {
        self.comm().id()
    }

    /// Field names in serialization order.
    fn fields(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        self.collect_field_names(&mut names);
        names
    }

    /// Full snapshot of every field.
    fn serialize_state(&self) -> Envelope {
        let mut env = Envelope::new();
        self.write_state(&mut env);
        env
    }

    /// Apply an inbound (possibly partial) envelope without echoing it back.
    ///
    /// Absent fields are untouched, unknown names are ignored, and a field
    /// that fails to decode keeps its prior value without stopping the rest.
    fn apply_patch(&mut self, patch: &Envelope) -> ApplyReport {
        let mut report = ApplyReport::default();
        self.read_state(patch, &mut report);

        if report.applied.len() + report.rejected.len() < patch.len() {
            let known = self.fields();
            for name in patch.field_names() {
                if !known.iter().any(|k| *k == name) {
                    trace!(widget = %self.id(), field = name, "ignoring unknown field");
                    report.unknown.push(name.to_string());
                }
            }
        }
        report
    }

    /// Send every dirty field as one patch, if the comm can send.
    fn flush(&mut self) {
        if !self.comm().can_send() {
            return;
        }
        let mut patch = Envelope::new();
        self.write_dirty(&mut patch);
        if !patch.is_empty() {
            self.comm().send_patch(patch);
        }
    }

    /// Publish the full state to the transport.
    ///
    /// Pending local changes are part of the snapshot, so their dirty flags
    /// are cleared rather than sent separately.
    fn open(&mut self) {
        self.clear_dirty();
        let state = self.serialize_state();
        self.comm().open(state);
    }

    /// Run `f` with outward propagation held, then send everything it
    /// changed as a single patch. Holds nest; the outermost one flushes.
    fn hold_sync<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R
    where
        Self: Sized,
    {
        self.comm().hold();
        let result = f(self);
        if self.comm().release() {
            self.flush();
        }
        result
    }
}

/// Register a hierarchy level's fields.
///
/// The root level names the member holding its [`Comm`]; a derived level
/// names the member holding its base level. Both then list their own
/// [`Property`](crate::Property) members in serialization order.
///
/// ```ignore
/// state_fields!(WidgetBase { comm: comm, fields: [_model_name, _view_name] });
/// state_fields!(Heatmap { base: raster, fields: [locations, max] });
/// ```
#[macro_export]
macro_rules! state_fields {
    ($ty:ty { comm: $comm:ident, fields: [$($field:ident),* $(,)?] $(,)? }) => {
        impl $crate::StateFields for $ty {
            fn comm(&self) -> &$crate::Comm {
                &self.$comm
            }

            fn collect_field_names(&self, names: &mut ::std::vec::Vec<&'static str>) {
                $( names.push(self.$field.name()); )*
            }

            fn write_state(&self, env: &mut $crate::Envelope) {
                $( self.$field.write_into(env); )*
            }

            fn write_dirty(&mut self, env: &mut $crate::Envelope) {
                $( self.$field.drain_into(env); )*
            }

            fn clear_dirty(&mut self) {
                $( self.$field.mark_clean(); )*
            }

            fn read_state(&mut self, env: &$crate::Envelope, report: &mut $crate::ApplyReport) {
                $( self.$field.read_from(env, report); )*
            }
        }
    };
    ($ty:ty { base: $base:ident, fields: [$($field:ident),* $(,)?] $(,)? }) => {
        impl $crate::StateFields for $ty {
            fn comm(&self) -> &$crate::Comm {
                $crate::StateFields::comm(&self.$base)
            }

            fn collect_field_names(&self, names: &mut ::std::vec::Vec<&'static str>) {
                $crate::StateFields::collect_field_names(&self.$base, names);
                $( names.push(self.$field.name()); )*
            }

            fn write_state(&self, env: &mut $crate::Envelope) {
                $crate::StateFields::write_state(&self.$base, env);
                $( self.$field.write_into(env); )*
            }

            fn write_dirty(&mut self, env: &mut $crate::Envelope) {
                $crate::StateFields::write_dirty(&mut self.$base, env);
                $( self.$field.drain_into(env); )*
            }

            fn clear_dirty(&mut self) {
                $crate::StateFields::clear_dirty(&mut self.$base);
                $( self.$field.mark_clean(); )*
            }

            fn read_state(&mut self, env: &$crate::Envelope, report: &mut $crate::ApplyReport) {
                $crate::StateFields::read_state(&mut self.$base, env, report);
                $( self.$field.read_from(env, report); )*
            }
        }
    };
}
