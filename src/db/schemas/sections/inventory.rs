//! Inventory sections: bag, equipment and heroes

use serde::{Deserialize, Serialize};

use super::{Section, SectionKey};

/// Quantity of one item
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct ItemStack {
    pub item_id: i32,
    pub count: i64,
}

/// Backpack contents
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct BagSection {
    #[serde(rename = "_v")]
    pub version: i32,
    pub items: Vec<ItemStack>,
    pub capacity: i32,
}

impl BagSection {
    /// Total count held of one item across stacks
    pub fn count_of(&self, item_id: i32) -> i64 {
        self.items
            .iter()
            .filter(|stack| stack.item_id == item_id)
            .map(|stack| stack.count)
            .sum()
    }
}

impl Section for BagSection {
    const KEY: SectionKey = SectionKey::Bag;
    const VERSION: i32 = 1;
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct EquipSlot {
    pub slot: i32,
    pub equip_id: i32,
    pub level: i32,
    pub star: i32,
}

/// Worn equipment, one entry per occupied slot
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct EquipSection {
    #[serde(rename = "_v")]
    pub version: i32,
    pub slots: Vec<EquipSlot>,
}

impl Section for EquipSection {
    const KEY: SectionKey = SectionKey::Equip;
    const VERSION: i32 = 1;
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Hero {
    pub hero_id: i32,
    pub level: i32,
    pub star: i32,
    pub power: i64,
}

/// Owned heroes and the active formation (hero ids in slot order)
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct HeroSection {
    #[serde(rename = "_v")]
    pub version: i32,
    pub heroes: Vec<Hero>,
    pub formation: Vec<i32>,
}

impl Section for HeroSection {
    const KEY: SectionKey = SectionKey::Hero;
    const VERSION: i32 = 2;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_of_sums_stacks() {
        let bag = BagSection {
            items: vec![
                ItemStack {
                    item_id: 1001,
                    count: 99,
                },
                ItemStack {
                    item_id: 2002,
                    count: 1,
                },
                ItemStack {
                    item_id: 1001,
                    count: 5,
                },
            ],
            ..Default::default()
        };
        assert_eq!(bag.count_of(1001), 104);
        assert_eq!(bag.count_of(3003), 0);
    }
}
