//! Account-level sections: payments, shop purchases and client settings

use bson::DateTime;
use serde::{Deserialize, Serialize};

use super::{Section, SectionKey};

/// Recharge totals; amounts are in the smallest currency unit
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct PaySection {
    #[serde(rename = "_v")]
    pub version: i32,
    pub total_amount: i64,
    pub order_count: i32,
    pub vip_level: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_pay_at: Option<DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_card_expire: Option<DateTime>,
}

impl Section for PaySection {
    const KEY: SectionKey = SectionKey::Pay;
    const VERSION: i32 = 1;
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct ShopPurchase {
    pub shop_id: i32,
    pub goods_id: i32,
    pub count: i32,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct ShopSection {
    #[serde(rename = "_v")]
    pub version: i32,
    pub purchases: Vec<ShopPurchase>,
    pub refresh_count: i32,
}

impl Section for ShopSection {
    const KEY: SectionKey = SectionKey::Shop;
    const VERSION: i32 = 1;
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct SettingsSection {
    #[serde(rename = "_v")]
    pub version: i32,
    pub language: String,
    pub music: bool,
    pub sound: bool,
}

impl Section for SettingsSection {
    const KEY: SectionKey = SectionKey::Settings;
    const VERSION: i32 = 1;
}
