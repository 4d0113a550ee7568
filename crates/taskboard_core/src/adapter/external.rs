//! Adapter for items from an external to-do source.
//!
//! # Responsibility
//! - Translate the external item shape into a task creation request.
//!
//! # Invariants
//! - The adapter never invents categories; unknown labels become
//!   uncategorized.
//! - External IDs are not reused; imported tasks get fresh board IDs.

use crate::model::category::Category;
use crate::model::task::TaskPriority;
use crate::service::task_service::NewTask;
use serde::{Deserialize, Serialize};

/// Item shape produced by the external source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalTodoItem {
    /// Source-side identifier such as `EXT-1000`.
    pub item_id: String,
    pub name: String,
    #[serde(default)]
    pub is_completed: bool,
    /// 1 (lowest) to 5 (highest).
    #[serde(default = "default_urgency")]
    pub urgency: u8,
    #[serde(default)]
    pub label: Option<String>,
}

fn default_urgency() -> u8 {
    3
}

/// Creation request plus the completion flag carried over from the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdaptedTask {
    pub request: NewTask,
    pub completed: bool,
}

/// Converts external items into board task requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskAdapter;

impl TaskAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Maps an external urgency score onto a task priority.
    ///
    /// Scores outside 1..=5 fall back to `Medium`.
    pub fn priority_for_urgency(urgency: u8) -> TaskPriority {
        match urgency {
            1 | 2 => TaskPriority::Low,
            4 | 5 => TaskPriority::High,
            _ => TaskPriority::Medium,
        }
    }

    /// Adapts one item, resolving its label against `categories`.
    pub fn adapt(&self, item: &ExternalTodoItem, categories: &[Category]) -> AdaptedTask {
        let category_id = item.label.as_deref().and_then(|label| {
            categories
                .iter()
                .find(|category| category.matches_name(label))
                .map(|category| category.id)
        });

        AdaptedTask {
            request: NewTask {
                title: item.name.clone(),
                due_date: None,
                category_id,
                priority: Some(Self::priority_for_urgency(item.urgency)),
            },
            completed: item.is_completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ExternalTodoItem, TaskAdapter};
    use crate::model::category::Category;
    use crate::model::task::TaskPriority;

    fn item(urgency: u8, label: Option<&str>) -> ExternalTodoItem {
        ExternalTodoItem {
            item_id: "EXT-1000".to_string(),
            name: "Call plumber".to_string(),
            is_completed: true,
            urgency,
            label: label.map(str::to_string),
        }
    }

    #[test]
    fn urgency_maps_onto_three_priorities() {
        let expected = [
            (0, TaskPriority::Medium),
            (1, TaskPriority::Low),
            (2, TaskPriority::Low),
            (3, TaskPriority::Medium),
            (4, TaskPriority::High),
            (5, TaskPriority::High),
            (9, TaskPriority::Medium),
        ];
        for (urgency, priority) in expected {
            assert_eq!(TaskAdapter::priority_for_urgency(urgency), priority);
        }
    }

    #[test]
    fn label_resolves_case_insensitively_or_falls_back_to_uncategorized() {
        let home = Category::new("Home");
        let categories = vec![home.clone()];
        let adapter = TaskAdapter::new();

        let known = adapter.adapt(&item(4, Some("home")), &categories);
        assert_eq!(known.request.category_id, Some(home.id));
        assert_eq!(known.request.title, "Call plumber");
        assert_eq!(known.request.priority, Some(TaskPriority::High));
        assert!(known.completed);

        let unknown = adapter.adapt(&item(3, Some("Garden")), &categories);
        assert_eq!(unknown.request.category_id, None);
    }

    #[test]
    fn missing_fields_take_source_defaults() {
        let parsed: ExternalTodoItem =
            serde_json::from_str(r#"{"item_id":"EXT-7","name":"Read"}"#).unwrap();
        assert_eq!(parsed.urgency, 3);
        assert!(!parsed.is_completed);
        assert_eq!(parsed.label, None);
    }
}
