//! Typed widget identifier.
//!
//! `WidgetId` wraps a UUIDv7 (time-ordered, globally unique). On the wire it
//! is the 32-character hex model id the remote renderer keys its models by;
//! inside a state value another widget is referenced as `IPY_MODEL_<hex>`.
//! Display and serde both use the hex form; [`WidgetId::parse`] also
//! accepts hyphenated UUID text. The `short()` form (first 8 hex chars) is
//! for logs only, never a lookup key.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};

/// Prefix the remote renderer uses for widget references inside state values.
pub const MODEL_REF_PREFIX: &str = "IPY_MODEL_";

/// A widget identifier (UUIDv7).
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct WidgetId(uuid::Uuid);

impl WidgetId {
    /// A fresh, time-ordered identity.
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// First 8 hex characters, for human display only.
    pub fn short(&self) -> String {
        self.to_hex()[..8].to_string()
    }

    /// The renderer's model id form: 32 lowercase hex chars.
    pub fn to_hex(&self) -> String {
        self.0.as_simple().to_string()
    }

    /// The raw 16 bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    pub fn from_bytes(b: [u8; 16]) -> Self {
        Self(uuid::Uuid::from_bytes(b))
    }

    /// Accepts the 32-char hex form as well as hyphenated UUID text.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        uuid::Uuid::parse_str(s).map(Self)
    }

    /// Render as a widget reference (`IPY_MODEL_<hex>`).
    pub fn to_model_ref(&self) -> String {
        format!("{MODEL_REF_PREFIX}{}", self.to_hex())
    }

    /// Parse a widget reference produced by [`WidgetId::to_model_ref`].
    ///
    /// Returns `None` when the prefix is missing or the remainder is not an ID.
    pub fn from_model_ref(s: &str) -> Option<Self> {
        s.strip_prefix(MODEL_REF_PREFIX)
            .and_then(|hex| Self::parse(hex).ok())
    }

    /// A nil / zero ID, for sentinel values only.
    pub fn nil() -> Self {
        Self(uuid::Uuid::nil())
    }

    /// Check if this is the nil ID.
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for WidgetId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<uuid::Uuid> for WidgetId {
    fn from(u: uuid::Uuid) -> Self {
        Self(u)
    }
}

impl From<WidgetId> for uuid::Uuid {
    fn from(id: WidgetId) -> uuid::Uuid {
        id.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Model ids are plain hex on the wire
        write!(f, "{}", self.0.as_simple())
    }
}

impl Serialize for WidgetId {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for WidgetId {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let text = String::deserialize(d)?;
        Self::parse(&text).map_err(D::Error::custom)
    }
}

impl fmt::Debug for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WidgetId({})", self.short())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(WidgetId::new(), WidgetId::new());
    }

    #[test]
    fn test_display_is_plain_hex() {
        let id = WidgetId::new();
        let shown = id.to_string();
        assert_eq!(shown.len(), 32);
        assert!(shown.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(shown, id.to_hex());
    }

    #[test]
    fn test_short_is_prefix() {
        let id = WidgetId::new();
        assert_eq!(id.short().len(), 8);
        assert!(id.to_hex().starts_with(&id.short()));
    }

    #[test]
    fn test_model_ref_roundtrip() {
        let id = WidgetId::new();
        let reference = id.to_model_ref();
        assert!(reference.starts_with("IPY_MODEL_"));
        assert_eq!(WidgetId::from_model_ref(&reference), Some(id));
    }

    #[test]
    fn test_model_ref_rejects_other_shapes() {
        let id = WidgetId::new();
        assert_eq!(WidgetId::from_model_ref(&id.to_hex()), None);
        assert_eq!(WidgetId::from_model_ref("IPY_MODEL_not-hex"), None);
        assert_eq!(WidgetId::from_model_ref(""), None);
    }

    #[test]
    fn test_bytes_roundtrip() {
        let id = WidgetId::new();
        assert_eq!(WidgetId::from_bytes(*id.as_bytes()), id);
    }

    #[test]
    fn test_serde_uses_hex_form() {
        let id = WidgetId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.to_hex()));
        assert_eq!(json, format!("\"{id}\""));
        let back: WidgetId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        let uuid: uuid::Uuid = id.into();
        let hyphenated: WidgetId = serde_json::from_str(&format!("\"{uuid}\"")).unwrap();
        assert_eq!(hyphenated, id);
        assert!(serde_json::from_str::<WidgetId>("\"not-an-id\"").is_err());
    }

    #[test]
    fn test_nil() {
        assert!(WidgetId::nil().is_nil());
        assert!(!WidgetId::new().is_nil());
    }
}
