//! Social sections: friends, guild membership and mailbox

use bson::DateTime;
use serde::{Deserialize, Serialize};

use super::{ItemStack, Section, SectionKey};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct FriendEntry {
    pub player_id: String,
    pub intimacy: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct FriendSection {
    #[serde(rename = "_v")]
    pub version: i32,
    pub friends: Vec<FriendEntry>,
    /// Player ids this player has blocked
    pub blocked: Vec<String>,
    /// Incoming friend requests
    pub pending: Vec<String>,
}

impl Section for FriendSection {
    const KEY: SectionKey = SectionKey::Friend;
    const VERSION: i32 = 1;
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct GuildSection {
    #[serde(rename = "_v")]
    pub version: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,
    pub role: i32,
    pub contribution: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joined_at: Option<DateTime>,
}

impl Section for GuildSection {
    const KEY: SectionKey = SectionKey::Guild;
    const VERSION: i32 = 1;
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Mail {
    pub mail_id: String,
    pub template_id: i32,
    pub title: String,
    pub read: bool,
    pub claimed: bool,
    pub attachments: Vec<ItemStack>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_at: Option<DateTime>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct MailSection {
    #[serde(rename = "_v")]
    pub version: i32,
    pub mails: Vec<Mail>,
}

impl MailSection {
    pub fn unread(&self) -> usize {
        self.mails.iter().filter(|mail| !mail.read).count()
    }
}

impl Section for MailSection {
    const KEY: SectionKey = SectionKey::Mail;
    const VERSION: i32 = 2;
}
