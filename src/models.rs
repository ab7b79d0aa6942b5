use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BlockStatus {
    #[default]
    Planned,
    Completed,
}

impl BlockStatus {
    pub fn toggled(self) -> Self {
        match self {
            BlockStatus::Planned => BlockStatus::Completed,
            BlockStatus::Completed => BlockStatus::Planned,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn weight(self) -> i64 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

/// Recurring daily commitment. May cross midnight (end before start).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FixedEvent {
    pub id: Uuid,
    pub title: String,
    pub start_time: String, // "HH:mm"
    pub end_time: String,   // "HH:mm"
    #[serde(default)]
    pub do_not_disturb: bool,
}

/// Library entry for a task with no fixed time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlexibleTask {
    pub id: Uuid,
    pub title: String,
    pub priority: Priority,
}

/// Library entry for sub-tasks usually slotted inside fixed events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FixedTaskPreset {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub default_duration_min: Option<u32>,
}

/// A task placed on today's timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduledBlock {
    pub id: Uuid,
    pub title: String,
    pub start_time: String, // "HH:mm"
    pub end_time: String,   // "HH:mm"
    #[serde(default)]
    pub status: BlockStatus,
    // Fixed event whose gap this block was created in. Layout ignores it.
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub original_task_id: Option<Uuid>,
    pub created_at: DateTime<FixedOffset>,

    // reflection / artifacts
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub facts: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub banner_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub generated_app_key: Option<String>,
    #[serde(default)]
    pub generated_page_key: Option<String>,
}

impl ScheduledBlock {
    pub fn planned(
        title: String,
        start_time: String,
        end_time: String,
        created_at: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            start_time,
            end_time,
            status: BlockStatus::Planned,
            parent_id: None,
            original_task_id: None,
            created_at,
            notes: None,
            facts: Vec::new(),
            description: None,
            banner_url: None,
            image_url: None,
            generated_app_key: None,
            generated_page_key: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == BlockStatus::Completed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlannerSettings {
    pub default_fill_min: u32,
    pub default_preset_min: u32,
    pub max_facts: usize,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            default_fill_min: 30,
            default_preset_min: 30,
            max_facts: 3,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Db {
    #[serde(default)]
    pub settings: PlannerSettings,
    #[serde(default)]
    pub fixed_events: Vec<FixedEvent>,
    #[serde(default)]
    pub flexible_tasks: Vec<FlexibleTask>,
    #[serde(default)]
    pub presets: Vec<FixedTaskPreset>,
    #[serde(default)]
    pub blocks: Vec<ScheduledBlock>,
    // Fixed events ticked off for today.
    #[serde(default)]
    pub completed_fixed_ids: Vec<Uuid>,
}

impl Db {
    /// Starter skeleton for a fresh install: a few commitments and library entries.
    pub fn starter() -> Self {
        let fixed = |title: &str, start: &str, end: &str, dnd: bool| FixedEvent {
            id: Uuid::new_v4(),
            title: title.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            do_not_disturb: dnd,
        };
        let preset = |title: &str, min: u32| FixedTaskPreset {
            id: Uuid::new_v4(),
            title: title.to_string(),
            default_duration_min: Some(min),
        };
        let task = |title: &str, priority: Priority| FlexibleTask {
            id: Uuid::new_v4(),
            title: title.to_string(),
            priority,
        };

        Db {
            settings: PlannerSettings::default(),
            fixed_events: vec![
                fixed("Sleep", "23:00", "07:00", true),
                fixed("Work", "09:00", "18:00", false),
                fixed("Dinner", "19:00", "20:00", false),
            ],
            flexible_tasks: vec![
                task("Read Book", Priority::High),
                task("Workout", Priority::Medium),
                task("Meditation", Priority::Low),
            ],
            presets: vec![
                preset("Email Check", 15),
                preset("Meeting", 30),
                preset("Deep Work", 60),
                preset("Coffee Break", 10),
            ],
            blocks: Vec::new(),
            completed_fixed_ids: Vec::new(),
        }
    }
}
