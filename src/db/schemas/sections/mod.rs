//! Per-player sections
//!
//! Each gameplay subsystem owns one section of the player document. A
//! section is an independently versioned sub-document (its own `_v`
//! marker) addressed by player id + section key, so a reader can load one
//! section without touching the others.

mod account;
mod inventory;
mod progress;
mod social;

use bson::{RawBsonRef, RawDocument};
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::types::{PlayerbookError, Result};

use super::version::SchemaVersion;

pub use account::{PaySection, SettingsSection, ShopPurchase, ShopSection};
pub use inventory::{BagSection, EquipSection, EquipSlot, Hero, HeroSection, ItemStack};
pub use progress::{ActivityProgress, ActivitySection, SignInSection, TaskProgress, TaskSection};
pub use social::{FriendEntry, FriendSection, GuildSection, Mail, MailSection};

/// Field holding a section's own version marker
pub const SECTION_VERSION_FIELD: &str = "_v";

/// Top-level key of every known section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKey {
    Bag,
    Equip,
    Hero,
    Task,
    Activity,
    SignIn,
    Friend,
    Guild,
    Mail,
    Pay,
    Shop,
    Settings,
}

impl SectionKey {
    pub const ALL: [SectionKey; 12] = [
        SectionKey::Bag,
        SectionKey::Equip,
        SectionKey::Hero,
        SectionKey::Task,
        SectionKey::Activity,
        SectionKey::SignIn,
        SectionKey::Friend,
        SectionKey::Guild,
        SectionKey::Mail,
        SectionKey::Pay,
        SectionKey::Shop,
        SectionKey::Settings,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SectionKey::Bag => "bag",
            SectionKey::Equip => "equip",
            SectionKey::Hero => "hero",
            SectionKey::Task => "task",
            SectionKey::Activity => "activity",
            SectionKey::SignIn => "sign_in",
            SectionKey::Friend => "friend",
            SectionKey::Guild => "guild",
            SectionKey::Mail => "mail",
            SectionKey::Pay => "pay",
            SectionKey::Shop => "shop",
            SectionKey::Settings => "settings",
        }
    }

    pub fn parse(key: &str) -> Option<SectionKey> {
        match key {
            "bag" => Some(SectionKey::Bag),
            "equip" => Some(SectionKey::Equip),
            "hero" => Some(SectionKey::Hero),
            "task" => Some(SectionKey::Task),
            "activity" => Some(SectionKey::Activity),
            "sign_in" => Some(SectionKey::SignIn),
            "friend" => Some(SectionKey::Friend),
            "guild" => Some(SectionKey::Guild),
            "mail" => Some(SectionKey::Mail),
            "pay" => Some(SectionKey::Pay),
            "shop" => Some(SectionKey::Shop),
            "settings" => Some(SectionKey::Settings),
            _ => None,
        }
    }
}

impl std::fmt::Display for SectionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A section of the player document
pub trait Section: Serialize + DeserializeOwned + Default + Clone + Send + Sync {
    const KEY: SectionKey;

    /// Highest `_v` of this section the build reads strictly
    const VERSION: i32;
}

/// Decode one section value.
///
/// Absent or null sections are the zero value. A malformed section fails
/// the document, unless it was written by a newer build (document
/// `schema_version` or section `_v` above what we know): then it is
/// defaulted with a warning.
pub(crate) fn decode_section<S: Section>(
    value: RawBsonRef<'_>,
    schema: SchemaVersion,
) -> Result<S> {
    let raw: &RawDocument = match value {
        RawBsonRef::Null | RawBsonRef::Undefined => return Ok(S::default()),
        RawBsonRef::Document(raw) => raw,
        other => {
            return default_if_newer(
                schema,
                None,
                format!("expected a document, found {:?}", other.element_type()),
            )
        }
    };

    let section_version = match raw.get(SECTION_VERSION_FIELD) {
        Ok(Some(RawBsonRef::Int32(v))) => Some(v),
        Ok(Some(RawBsonRef::Int64(v))) => Some(i32::try_from(v).unwrap_or(i32::MAX)),
        _ => None,
    };

    match bson::from_slice::<S>(raw.as_bytes()) {
        Ok(section) => Ok(section),
        Err(e) => default_if_newer(schema, section_version, e.to_string()),
    }
}

fn default_if_newer<S: Section>(
    schema: SchemaVersion,
    section_version: Option<i32>,
    reason: String,
) -> Result<S> {
    let newer_section = section_version.is_some_and(|v| v > S::VERSION);

    if schema.is_future() || newer_section {
        warn!(
            section = %S::KEY,
            schema_version = schema.number(),
            section_version = section_version.unwrap_or_default(),
            known_version = S::VERSION,
            "defaulting unreadable section from a newer writer: {}",
            reason
        );
        return Ok(S::default());
    }

    Err(PlayerbookError::Decode(format!(
        "section '{}': {}",
        S::KEY,
        reason
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{doc, RawDocumentBuf};

    fn section_value(doc: bson::Document) -> RawDocumentBuf {
        RawDocumentBuf::from_document(&doc! { "section": doc }).unwrap()
    }

    #[test]
    fn test_key_round_trip() {
        for key in SectionKey::ALL {
            assert_eq!(SectionKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(SectionKey::parse("unknown"), None);
    }

    #[test]
    fn test_null_section_is_default() {
        let raw = RawDocumentBuf::from_document(&doc! { "bag": null }).unwrap();
        let value = raw.get("bag").unwrap().unwrap();
        let bag: BagSection = decode_section(value, SchemaVersion::Known(3)).unwrap();
        assert_eq!(bag, BagSection::default());
    }

    #[test]
    fn test_malformed_known_section_fails() {
        let raw = section_value(doc! { "capacity": "lots" });
        let value = raw.get("section").unwrap().unwrap();
        let result: Result<BagSection> = decode_section(value, SchemaVersion::Known(3));
        assert!(matches!(result, Err(PlayerbookError::Decode(_))));
    }

    #[test]
    fn test_malformed_newer_section_defaults() {
        let raw = section_value(doc! { "_v": BagSection::VERSION + 1, "capacity": "lots" });
        let value = raw.get("section").unwrap().unwrap();
        let bag: BagSection = decode_section(value, SchemaVersion::Known(3)).unwrap();
        assert_eq!(bag, BagSection::default());
    }

    #[test]
    fn test_future_document_defaults_wrong_shape() {
        let raw = RawDocumentBuf::from_document(&doc! { "bag": [1, 2, 3] }).unwrap();
        let value = raw.get("bag").unwrap().unwrap();

        let lenient: BagSection = decode_section(value, SchemaVersion::Future(9)).unwrap();
        assert_eq!(lenient, BagSection::default());

        let strict: Result<BagSection> = decode_section(value, SchemaVersion::Known(3));
        assert!(strict.is_err());
    }
}
