//! Typed property cell: one named field of a widget.

use std::fmt;

use leafwire_types::{Buffer, Encoded, Envelope};
use serde_json::Value;
use strum::{AsRefStr, Display};
use tracing::{trace, warn};

use crate::{ApplyReport, Comm, DecodeError, StateCodec};

/// Where an assignment comes from.
///
/// Local assignments propagate outward; patch assignments came from the
/// remote side and must not be echoed back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Origin {
    Local,
    Patch,
}

/// One named, typed field.
///
/// Every `set` marks the field dirty, even when the value is unchanged.
/// If the widget's comm is open and not held, the field goes out at once as
/// a one-field patch and the dirty flag clears; otherwise it stays dirty
/// until the widget flushes.
pub struct Property<T> {
    name: &'static str,
    value: T,
    dirty: bool,
    comm: Comm,
}

impl<T: StateCodec> Property<T> {
    pub fn new(comm: &Comm, name: &'static str, value: T) -> Self {
        Self {
            name,
            value,
            dirty: false,
            comm: comm.clone(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Assign locally and propagate.
    pub fn set(&mut self, value: T) {
        self.assign(value, Origin::Local);
    }

    /// Mutate in place, then propagate as a local assignment.
    pub fn update(&mut self, f: impl FnOnce(&mut T)) {
        f(&mut self.value);
        self.mark_local();
    }

    pub fn assign(&mut self, value: T, origin: Origin) {
        self.value = value;
        match origin {
            Origin::Local => self.mark_local(),
            Origin::Patch => {
                // Remote value wins; nothing pending for this field anymore
                self.dirty = false;
                trace!(field = self.name, widget = %self.comm.id(), "assigned from patch");
            }
        }
    }

    fn mark_local(&mut self) {
        self.dirty = true;
        if self.comm.can_send() {
            let mut patch = Envelope::new();
            patch.insert(self.name, self.value.encode());
            self.dirty = false;
            self.comm.send_patch(patch);
        }
    }

    pub fn encode(&self) -> Encoded {
        self.value.encode()
    }

    /// Decode an inbound value and assign it as patch-originated.
    ///
    /// On error the prior value stays in place.
    pub fn apply_encoded(&mut self, value: &Value, buffers: &[Buffer]) -> Result<(), DecodeError> {
        let incoming = T::decode(value, buffers)?;
        let merged = T::merge_from_patch(&self.value, incoming);
        self.assign(merged, Origin::Patch);
        Ok(())
    }

    /// Append the current value to `env`.
    pub fn write_into(&self, env: &mut Envelope) {
        env.insert(self.name, self.encode());
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Append the value to `env` only if dirty, clearing the flag.
    pub fn drain_into(&mut self, env: &mut Envelope) {
        if std::mem::take(&mut self.dirty) {
            env.insert(self.name, self.encode());
        }
    }

    /// Apply this field's entry from `env`, if present, recording the outcome.
    pub fn read_from(&mut self, env: &Envelope, report: &mut ApplyReport) {
        let Some(value) = env.get(self.name) else {
            return;
        };
        match self.apply_encoded(value, env.buffers()) {
            Ok(()) => report.applied.push(self.name),
            Err(err) => {
                warn!(
                    field = self.name,
                    widget = %self.comm.id(),
                    error = %err,
                    "rejected patch field, keeping prior value"
                );
                report.rejected.push((self.name, err));
            }
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("dirty", &self.dirty)
            .finish()
    }
}
