use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::timestamp_now;

/// Input structure for creating a task.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskCreate {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// At most 1000 characters if provided.
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

/// Input structure for updating a task. Omitted fields keep their value.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct TaskUpdate {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    /// `None` when omitted, `Some(None)` for an explicit `null`, which clears it.
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(length(max = 1000))]
    pub description: Option<Option<String>>,

    pub completed: Option<bool>,
}

/// A task entity as stored in the `tasks` table and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// UUID v4 in hyphenated form.
    pub id: String,
    /// Owner of the task.
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Keeps a present-but-null field distinct from a missing one.
fn explicit_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Query parameters accepted when listing tasks.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TaskQuery {
    /// Only return tasks whose `completed` flag matches.
    pub completed: Option<bool>,
}

impl Task {
    /// Creates a new, open task owned by `user_id`.
    /// `created_at` and `updated_at` are both set to the current time.
    pub fn new(input: TaskCreate, user_id: &str) -> Self {
        let now = timestamp_now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title: input.title,
            description: input.description,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies the fields present in `update` and bumps `updated_at`.
    pub fn apply(&mut self, update: TaskUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(completed) = update.completed {
            self.completed = completed;
        }
        self.touch();
    }

    pub fn toggle_completed(&mut self) {
        self.completed = !self.completed;
        self.touch();
    }

    fn touch(&mut self) {
        // Never move backwards, even if the clock does.
        self.updated_at = timestamp_now().max(self.updated_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_creation() {
        let input = TaskCreate {
            title: "Test Task".to_string(),
            description: Some("This is a test task".to_string()),
        };

        let task = Task::new(input, "user_0123456789ab");
        assert_eq!(task.title, "Test Task");
        assert_eq!(task.user_id, "user_0123456789ab");
        assert!(!task.completed);
        assert_eq!(task.created_at, task.updated_at);
        assert!(Uuid::parse_str(&task.id).is_ok());
    }

    #[test]
    fn test_task_create_validation() {
        let valid = TaskCreate {
            title: "Valid Task".to_string(),
            description: None,
        };
        assert!(valid.validate().is_ok());

        let empty_title = TaskCreate {
            title: "".to_string(),
            description: None,
        };
        assert!(empty_title.validate().is_err());

        let long_title = TaskCreate {
            title: "a".repeat(201),
            description: None,
        };
        assert!(long_title.validate().is_err());

        let long_description = TaskCreate {
            title: "Valid title".to_string(),
            description: Some("b".repeat(1001)),
        };
        assert!(long_description.validate().is_err());

        let max_lengths = TaskCreate {
            title: "a".repeat(200),
            description: Some("b".repeat(1000)),
        };
        assert!(max_lengths.validate().is_ok());
    }

    #[test]
    fn test_task_update_validation() {
        assert!(TaskUpdate::default().validate().is_ok());

        let empty_title = TaskUpdate {
            title: Some("".to_string()),
            ..Default::default()
        };
        assert!(empty_title.validate().is_err());
    }

    #[test]
    fn test_apply_keeps_omitted_fields() {
        let mut task = Task::new(
            TaskCreate {
                title: "Original".to_string(),
                description: Some("Keep me".to_string()),
            },
            "user_0123456789ab",
        );
        let created_at = task.created_at;

        task.apply(TaskUpdate {
            completed: Some(true),
            ..Default::default()
        });

        assert_eq!(task.title, "Original");
        assert_eq!(task.description.as_deref(), Some("Keep me"));
        assert!(task.completed);
        assert_eq!(task.created_at, created_at);
        assert!(task.updated_at >= created_at);
    }

    #[test]
    fn test_toggle_completed() {
        let mut task = Task::new(
            TaskCreate {
                title: "Toggle".to_string(),
                description: None,
            },
            "user_0123456789ab",
        );
        task.toggle_completed();
        assert!(task.completed);
        task.toggle_completed();
        assert!(!task.completed);
    }

    #[test]
    fn test_update_distinguishes_null_from_missing() {
        let omitted: TaskUpdate = serde_json::from_str(r#"{"completed": true}"#).unwrap();
        assert_eq!(omitted.description, None);

        let cleared: TaskUpdate = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));

        let set: TaskUpdate = serde_json::from_str(r#"{"description": "new"}"#).unwrap();
        assert_eq!(set.description, Some(Some("new".to_string())));

        let too_long = TaskUpdate {
            description: Some(Some("b".repeat(1001))),
            ..Default::default()
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_apply_clears_description() {
        let mut task = Task::new(
            TaskCreate {
                title: "Has notes".to_string(),
                description: Some("Old notes".to_string()),
            },
            "user_0123456789ab",
        );

        task.apply(TaskUpdate {
            description: Some(None),
            ..Default::default()
        });
        assert_eq!(task.description, None);
        assert_eq!(task.title, "Has notes");
    }
}
