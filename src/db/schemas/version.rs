//! Document schema versions

use bson::{RawBsonRef, RawDocument};

use crate::types::{PlayerbookError, Result};

/// Highest `schema_version` this build knows how to read strictly
pub const CURRENT_SCHEMA_VERSION: i32 = 3;

/// Field holding the document's schema version
pub const SCHEMA_VERSION_FIELD: &str = "schema_version";

/// How a stored document's version relates to this build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    /// No version marker (or 0): written before versioning existed
    Legacy,
    /// A version this build understands
    Known(i32),
    /// Written by a newer build
    Future(i32),
}

impl SchemaVersion {
    pub fn classify(version: i32) -> Self {
        match version {
            v if v <= 0 => SchemaVersion::Legacy,
            v if v <= CURRENT_SCHEMA_VERSION => SchemaVersion::Known(v),
            v => SchemaVersion::Future(v),
        }
    }

    /// Read the version marker from a raw document
    pub fn read(raw: &RawDocument) -> Result<Self> {
        match raw.get(SCHEMA_VERSION_FIELD)? {
            None | Some(RawBsonRef::Null) => Ok(SchemaVersion::Legacy),
            Some(RawBsonRef::Int32(v)) => Ok(Self::classify(v)),
            Some(RawBsonRef::Int64(v)) => Ok(Self::classify(
                i32::try_from(v).unwrap_or(i32::MAX),
            )),
            Some(other) => Err(PlayerbookError::Decode(format!(
                "{} must be an integer, found {:?}",
                SCHEMA_VERSION_FIELD,
                other.element_type()
            ))),
        }
    }

    pub fn number(self) -> i32 {
        match self {
            SchemaVersion::Legacy => 0,
            SchemaVersion::Known(v) | SchemaVersion::Future(v) => v,
        }
    }

    pub fn is_legacy(self) -> bool {
        matches!(self, SchemaVersion::Legacy)
    }

    pub fn is_future(self) -> bool {
        matches!(self, SchemaVersion::Future(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{doc, RawDocumentBuf};

    #[test]
    fn test_classify() {
        assert_eq!(SchemaVersion::classify(0), SchemaVersion::Legacy);
        assert_eq!(SchemaVersion::classify(2), SchemaVersion::Known(2));
        assert_eq!(
            SchemaVersion::classify(CURRENT_SCHEMA_VERSION + 1),
            SchemaVersion::Future(CURRENT_SCHEMA_VERSION + 1)
        );
    }

    #[test]
    fn test_read_marker() {
        let missing = RawDocumentBuf::from_document(&doc! { "player_id": "p1" }).unwrap();
        assert!(SchemaVersion::read(&missing).unwrap().is_legacy());

        let wide = RawDocumentBuf::from_document(&doc! { "schema_version": 9_i64 }).unwrap();
        assert_eq!(SchemaVersion::read(&wide).unwrap(), SchemaVersion::Future(9));

        let bad = RawDocumentBuf::from_document(&doc! { "schema_version": "3" }).unwrap();
        assert!(matches!(
            SchemaVersion::read(&bad),
            Err(PlayerbookError::Decode(_))
        ));
    }
}
