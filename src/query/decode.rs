//! Decode targets
//!
//! The page engine is generic over its item type but never constructs
//! one itself: the caller hands it a factory, the factory produces a
//! fresh target per document, and the target fills itself from the raw
//! bytes. Raw decoding lets a target skip fields it does not know
//! without materialising them.

use bson::{Document, RawDocument};

use crate::types::Result;

/// Something that can be populated from one stored document
pub trait DecodeTarget: Send {
    fn decode_from(&mut self, raw: &RawDocument) -> Result<()>;
}

impl<T: DecodeTarget + ?Sized> DecodeTarget for Box<T> {
    fn decode_from(&mut self, raw: &RawDocument) -> Result<()> {
        (**self).decode_from(raw)
    }
}

impl DecodeTarget for Document {
    fn decode_from(&mut self, raw: &RawDocument) -> Result<()> {
        *self = Document::try_from(raw)?;
        Ok(())
    }
}

/// Implement [`DecodeTarget`] for plain serde types by deserializing the
/// raw bytes. Unknown fields are skipped, absent fields follow the type's
/// own `#[serde(default)]` rules.
#[macro_export]
macro_rules! serde_decode_target {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::query::DecodeTarget for $ty {
                fn decode_from(
                    &mut self,
                    raw: &::bson::RawDocument,
                ) -> $crate::types::Result<()> {
                    *self = ::bson::from_slice(raw.as_bytes())?;
                    Ok(())
                }
            }
        )+
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{doc, RawDocumentBuf};
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Row {
        player_id: String,
        lv: i32,
    }

    serde_decode_target!(Row);

    #[test]
    fn test_serde_target_ignores_extra_fields() {
        let raw = RawDocumentBuf::from_document(&doc! {
            "player_id": "p1",
            "lv": 12,
            "bag": { "items": [ { "item_id": 1, "count": 5_i64 } ] },
        })
        .unwrap();

        let mut row = Row::default();
        row.decode_from(&raw).unwrap();
        assert_eq!(
            row,
            Row {
                player_id: "p1".into(),
                lv: 12,
            }
        );
    }

    #[test]
    fn test_serde_target_rejects_wrong_type() {
        let raw = RawDocumentBuf::from_document(&doc! { "lv": "twelve" }).unwrap();
        let mut row = Row::default();
        assert!(row.decode_from(&raw).is_err());
    }

    #[test]
    fn test_boxed_and_document_targets() {
        let source = doc! { "player_id": "p2", "lv": 3 };
        let raw = RawDocumentBuf::from_document(&source).unwrap();

        let mut boxed: Box<Row> = Box::default();
        boxed.decode_from(&raw).unwrap();
        assert_eq!(boxed.player_id, "p2");

        let mut document = Document::new();
        document.decode_from(&raw).unwrap();
        assert_eq!(document, source);
    }
}
