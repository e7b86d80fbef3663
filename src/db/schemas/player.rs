//! Player document schema
//!
//! One document per player persona in the `player_info` collection. The
//! identity fields live at the top level next to one sub-document per
//! gameplay section. This crate only reads these documents; they are
//! created at registration and mutated by the game servers.

use bson::{doc, DateTime, Document, RawBsonRef, RawDocument};
use mongodb::options::IndexOptions;
use serde::Serialize;

use crate::db::mongo::IntoIndexes;
use crate::query::DecodeTarget;
use crate::types::{PlayerbookError, Result};

use super::sections::{
    decode_section, ActivitySection, BagSection, EquipSection, FriendSection, GuildSection,
    HeroSection, MailSection, PaySection, Section, SectionKey, SettingsSection, ShopSection,
    SignInSection, TaskSection,
};
use super::version::{SchemaVersion, CURRENT_SCHEMA_VERSION};

/// Collection name for player documents
pub const PLAYER_COLLECTION: &str = "player_info";

/// Top-level fields every player listing relies on.
///
/// These names are part of the persisted document contract; renaming any
/// of them needs a data migration.
pub const PLAYER_SUMMARY_FIELDS: [&str; 9] = [
    "player_id",
    "unique_id",
    "user_id",
    "nickname",
    "lv",
    "power",
    "area_id",
    "login_time",
    "register_time",
];

/// Identity and headline stats of a player
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct PlayerSummary {
    /// Primary key, immutable
    pub player_id: String,
    /// Secondary unique key, immutable
    pub unique_id: String,
    /// Owning account; one account may own one persona per area
    pub user_id: String,
    pub nickname: String,
    pub lv: i32,
    pub power: i64,
    /// Area (shard) the persona lives on, immutable
    pub area_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_time: Option<DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub register_time: Option<DateTime>,
}

impl PlayerSummary {
    /// Top-level fields a query must return to fill this target. The
    /// schema version rides along so timestamp rules match a full read.
    pub fn projected_fields() -> Vec<&'static str> {
        let mut fields = PLAYER_SUMMARY_FIELDS.to_vec();
        fields.push(super::version::SCHEMA_VERSION_FIELD);
        fields
    }

    /// Apply one top-level field. Returns `false` for keys that are not
    /// summary fields so the caller can try them elsewhere.
    pub(crate) fn apply_field(
        &mut self,
        key: &str,
        value: RawBsonRef<'_>,
        schema: SchemaVersion,
    ) -> Result<bool> {
        match key {
            "player_id" => self.player_id = read_string(key, value)?,
            "unique_id" => self.unique_id = read_string(key, value)?,
            "user_id" => self.user_id = read_string(key, value)?,
            "nickname" => self.nickname = read_string(key, value)?,
            "lv" => self.lv = read_i32(key, value)?,
            "power" => self.power = read_i64(key, value)?,
            "area_id" => self.area_id = read_i32(key, value)?,
            "login_time" => self.login_time = read_time(key, value, schema)?,
            "register_time" => self.register_time = read_time(key, value, schema)?,
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl DecodeTarget for PlayerSummary {
    fn decode_from(&mut self, raw: &RawDocument) -> Result<()> {
        let schema = SchemaVersion::read(raw)?;
        *self = PlayerSummary::default();

        for entry in raw.iter() {
            let (key, value) = entry?;
            self.apply_field(key, value, schema)?;
        }
        Ok(())
    }
}

/// Full player aggregate
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct PlayerInfo {
    pub schema_version: i32,
    #[serde(flatten)]
    pub summary: PlayerSummary,
    pub bag: BagSection,
    pub equip: EquipSection,
    pub hero: HeroSection,
    pub task: TaskSection,
    pub activity: ActivitySection,
    pub sign_in: SignInSection,
    pub friend: FriendSection,
    pub guild: GuildSection,
    pub mail: MailSection,
    pub pay: PaySection,
    pub shop: ShopSection,
    pub settings: SettingsSection,
}

impl PlayerInfo {
    /// New aggregate at the current schema version with empty sections
    pub fn new(summary: PlayerSummary) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            summary,
            ..Default::default()
        }
    }

    pub fn player_id(&self) -> &str {
        &self.summary.player_id
    }
}

impl DecodeTarget for PlayerInfo {
    /// Walks the raw document once. Identity fields are read strictly;
    /// sections decode independently; unknown keys are skipped without
    /// being deserialized.
    fn decode_from(&mut self, raw: &RawDocument) -> Result<()> {
        let schema = SchemaVersion::read(raw)?;
        *self = PlayerInfo {
            schema_version: schema.number(),
            ..Default::default()
        };

        for entry in raw.iter() {
            let (key, value) = entry?;

            if self.summary.apply_field(key, value, schema)? {
                continue;
            }

            let Some(section) = SectionKey::parse(key) else {
                continue;
            };

            match section {
                SectionKey::Bag => self.bag = decode_section(value, schema)?,
                SectionKey::Equip => self.equip = decode_section(value, schema)?,
                SectionKey::Hero => self.hero = decode_section(value, schema)?,
                SectionKey::Task => self.task = decode_section(value, schema)?,
                SectionKey::Activity => self.activity = decode_section(value, schema)?,
                SectionKey::SignIn => self.sign_in = decode_section(value, schema)?,
                SectionKey::Friend => self.friend = decode_section(value, schema)?,
                SectionKey::Guild => self.guild = decode_section(value, schema)?,
                SectionKey::Mail => self.mail = decode_section(value, schema)?,
                SectionKey::Pay => self.pay = decode_section(value, schema)?,
                SectionKey::Shop => self.shop = decode_section(value, schema)?,
                SectionKey::Settings => self.settings = decode_section(value, schema)?,
            }
        }
        Ok(())
    }
}

/// One section of one player, read without the rest of the document
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SectionOf<S: Section> {
    pub player_id: String,
    pub section: S,
}

impl<S: Section> SectionOf<S> {
    /// Top-level fields a query must return to fill this target
    pub fn projected_fields() -> [&'static str; 3] {
        ["player_id", super::version::SCHEMA_VERSION_FIELD, S::KEY.as_str()]
    }
}

impl<S: Section> DecodeTarget for SectionOf<S> {
    fn decode_from(&mut self, raw: &RawDocument) -> Result<()> {
        let schema = SchemaVersion::read(raw)?;

        self.player_id = match raw.get("player_id")? {
            Some(value) => read_string("player_id", value)?,
            None => String::new(),
        };
        self.section = match raw.get(S::KEY.as_str())? {
            Some(value) => decode_section(value, schema)?,
            None => S::default(),
        };
        Ok(())
    }
}

impl IntoIndexes for PlayerInfo {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "player_id": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("player_id_unique".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "unique_id": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("unique_id_unique".to_string())
                        .build(),
                ),
            ),
            // One persona per account per area
            (
                doc! { "user_id": 1, "area_id": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("user_area_unique".to_string())
                        .build(),
                ),
            ),
            // Default listing order
            (
                doc! { "register_time": -1, "player_id": 1 },
                Some(
                    IndexOptions::builder()
                        .name("register_time_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

fn type_mismatch(key: &str, expected: &str, found: RawBsonRef<'_>) -> PlayerbookError {
    PlayerbookError::Decode(format!(
        "field '{}': expected {}, found {:?}",
        key,
        expected,
        found.element_type()
    ))
}

fn read_string(key: &str, value: RawBsonRef<'_>) -> Result<String> {
    match value {
        RawBsonRef::String(s) => Ok(s.to_string()),
        RawBsonRef::Null => Ok(String::new()),
        other => Err(type_mismatch(key, "string", other)),
    }
}

fn read_i64(key: &str, value: RawBsonRef<'_>) -> Result<i64> {
    match value {
        RawBsonRef::Int32(v) => Ok(i64::from(v)),
        RawBsonRef::Int64(v) => Ok(v),
        RawBsonRef::Double(v) if v.fract() == 0.0 && v.abs() < 9.0e18 => Ok(v as i64),
        RawBsonRef::Null => Ok(0),
        other => Err(type_mismatch(key, "integer", other)),
    }
}

fn read_i32(key: &str, value: RawBsonRef<'_>) -> Result<i32> {
    let wide = read_i64(key, value)?;
    i32::try_from(wide).map_err(|_| {
        PlayerbookError::Decode(format!("field '{}': {} does not fit in i32", key, wide))
    })
}

/// Timestamps are BSON dates. Documents from before schema versioning
/// stored unix seconds instead.
fn read_time(
    key: &str,
    value: RawBsonRef<'_>,
    schema: SchemaVersion,
) -> Result<Option<DateTime>> {
    match value {
        RawBsonRef::DateTime(dt) => Ok(Some(dt)),
        RawBsonRef::Null => Ok(None),
        RawBsonRef::Int64(secs) if schema.is_legacy() => Ok(Some(DateTime::from_millis(
            secs.saturating_mul(1000),
        ))),
        RawBsonRef::Int32(secs) if schema.is_legacy() => Ok(Some(DateTime::from_millis(
            i64::from(secs) * 1000,
        ))),
        other => Err(type_mismatch(key, "date", other)),
    }
}
