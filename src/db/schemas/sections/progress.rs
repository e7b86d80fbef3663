//! Progression sections: tasks, activities and daily sign-in

use bson::DateTime;
use serde::{Deserialize, Serialize};

use super::{Section, SectionKey};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct TaskProgress {
    pub task_id: i32,
    pub progress: i64,
    pub claimed: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct TaskSection {
    #[serde(rename = "_v")]
    pub version: i32,
    pub main_task_id: i32,
    pub daily: Vec<TaskProgress>,
    pub weekly_points: i32,
}

impl Section for TaskSection {
    const KEY: SectionKey = SectionKey::Task;
    const VERSION: i32 = 1;
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct ActivityProgress {
    pub activity_id: i32,
    pub round: i32,
    pub score: i64,
    pub rewards_claimed: Vec<i32>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct ActivitySection {
    #[serde(rename = "_v")]
    pub version: i32,
    pub entries: Vec<ActivityProgress>,
}

impl Section for ActivitySection {
    const KEY: SectionKey = SectionKey::Activity;
    const VERSION: i32 = 1;
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct SignInSection {
    #[serde(rename = "_v")]
    pub version: i32,
    pub days_signed: i32,
    pub streak: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sign_in: Option<DateTime>,
}

impl Section for SignInSection {
    const KEY: SectionKey = SectionKey::SignIn;
    const VERSION: i32 = 1;
}
