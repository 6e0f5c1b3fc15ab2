//! Presentation models for the HTML board.

use crate::error::{Error, Result};
use crate::tasks::{Task, TaskView};
use crate::templates;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Page title shown on the board.
pub const BOARD_TITLE: &str = "Task Board";

/// Template used to render the board.
const BOARD_TEMPLATE: &str = "board.html.tera";

/// A task prepared for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskViewModel {
    /// Hyphenated task id.
    pub id: String,
    /// Task title.
    pub title: String,
    /// Whether the task is completed.
    pub is_completed: bool,
    /// Whether the task is archived.
    pub is_archived: bool,
    /// Age of the task, e.g. `"5m ago"`.
    pub created_ago: String,
    /// Due date as `YYYY-MM-DD HH:MM`, if any.
    pub due_date_formatted: Option<String>,
    /// Whether the due date has passed on an incomplete task.
    pub is_overdue: bool,
}

impl TaskViewModel {
    /// Build the view model for `task` as seen at `now`.
    #[must_use]
    pub fn from_task(task: &Task, now: DateTime<Utc>) -> Self {
        Self {
            id: task.id.to_string(),
            title: task.title.clone(),
            is_completed: task.is_completed,
            is_archived: task.is_archived,
            created_ago: format_relative_time(task.created_at, now),
            due_date_formatted: task.due_date.map(format_timestamp),
            // Archived tasks still show the badge; only the overdue view excludes them.
            is_overdue: !task.is_completed && task.due_date.is_some_and(|due| due < now),
        }
    }
}

/// One entry of the filter navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterLink {
    /// View name used in the query string.
    pub name: &'static str,
    /// Whether this is the view being shown.
    pub selected: bool,
}

/// Everything the board template reads.
#[derive(Debug, Clone, Serialize)]
pub struct BoardContext {
    /// Page title.
    pub title: &'static str,
    /// Name of the current view.
    pub filter: &'static str,
    /// Navigation entries, one per view.
    pub filters: Vec<FilterLink>,
    /// Tasks in the current view.
    pub tasks: Vec<TaskViewModel>,
    /// Crate version for the footer.
    pub version: &'static str,
}

impl BoardContext {
    /// Build the board for `view` from the tasks it contains.
    #[must_use]
    pub fn build(view: TaskView, tasks: &[Task], now: DateTime<Utc>) -> Self {
        Self {
            title: BOARD_TITLE,
            filter: view.as_str(),
            filters: TaskView::ALL
                .iter()
                .map(|v| FilterLink { name: v.as_str(), selected: *v == view })
                .collect(),
            tasks: tasks.iter().map(|task| TaskViewModel::from_task(task, now)).collect(),
            version: crate::VERSION,
        }
    }
}

/// Render the HTML board.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn render_board(view: TaskView, tasks: &[Task], now: DateTime<Utc>) -> Result<String> {
    let board = BoardContext::build(view, tasks, now);
    let context = tera::Context::from_serialize(&board)
        .map_err(|e| Error::Template(format!("Failed to build board context: {e}")))?;
    templates::render(BOARD_TEMPLATE, &context)
}

/// Describe how long ago `then` was.
///
/// Under a minute is "just now"; then minutes, hours and days up to a week;
/// older instants fall back to the absolute timestamp.
#[must_use]
pub fn format_relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now - then;
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if elapsed.num_seconds() < 60 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else if days < 7 {
        format!("{days}d ago")
    } else {
        format_timestamp(then)
    }
}

/// Format a timestamp as `YYYY-MM-DD HH:MM` (UTC).
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_format_relative_time_buckets() {
        let now = now();
        assert_eq!(format_relative_time(now, now), "just now");
        assert_eq!(format_relative_time(now - Duration::seconds(59), now), "just now");
        assert_eq!(format_relative_time(now - Duration::seconds(60), now), "1m ago");
        assert_eq!(format_relative_time(now - Duration::minutes(59), now), "59m ago");
        assert_eq!(format_relative_time(now - Duration::minutes(90), now), "1h ago");
        assert_eq!(format_relative_time(now - Duration::hours(23), now), "23h ago");
        assert_eq!(format_relative_time(now - Duration::hours(49), now), "2d ago");
        assert_eq!(format_relative_time(now - Duration::days(6), now), "6d ago");
        assert_eq!(format_relative_time(now - Duration::days(7), now), "2024-06-08 12:00");
    }

    #[test]
    fn test_future_creation_reads_just_now() {
        // Clock skew between writers.
        let now = now();
        assert_eq!(format_relative_time(now + Duration::minutes(5), now), "just now");
    }

    #[test]
    fn test_view_model_overdue_badge() {
        let now = now();
        let mut task = Task::new(Uuid::new_v4(), "Report", Some(now - Duration::hours(1)), now);
        let vm = TaskViewModel::from_task(&task, now);
        assert!(vm.is_overdue);
        assert_eq!(vm.due_date_formatted.as_deref(), Some("2024-06-15 11:00"));

        task.set_completed(true, now);
        assert!(!TaskViewModel::from_task(&task, now).is_overdue);

        let undated = Task::new(Uuid::new_v4(), "Someday", None, now);
        let vm = TaskViewModel::from_task(&undated, now);
        assert!(!vm.is_overdue);
        assert!(vm.due_date_formatted.is_none());
    }

    #[test]
    fn test_board_context_marks_selected_filter() {
        let board = BoardContext::build(TaskView::Overdue, &[], now());
        assert_eq!(board.filter, "overdue");
        let selected: Vec<_> = board.filters.iter().filter(|f| f.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, "overdue");
        assert_eq!(board.filters.len(), TaskView::ALL.len());
    }

    #[test]
    #[serial_test::serial]
    fn test_render_board_lists_tasks() {
        templates::reset_cache().unwrap();
        templates::init_templates(Some(std::path::Path::new("/nonexistent"))).unwrap();

        let now = now();
        let tasks = vec![
            Task::new(Uuid::new_v4(), "Water the plants", None, now - Duration::minutes(3)),
            Task::new(Uuid::new_v4(), "Pay rent", Some(now - Duration::days(1)), now),
        ];
        let html = render_board(TaskView::Active, &tasks, now).unwrap();

        assert!(html.contains("Water the plants"));
        assert!(html.contains("3m ago"));
        assert!(html.contains("Pay rent"));
        assert!(html.contains("class=\"overdue\""));
        assert!(html.contains(&format!("/board/tasks/{}/archive?filter=active", tasks[0].id)));
    }

    #[test]
    #[serial_test::serial]
    fn test_render_empty_board() {
        templates::reset_cache().unwrap();
        templates::init_templates(Some(std::path::Path::new("/nonexistent"))).unwrap();

        let html = render_board(TaskView::Archived, &[], now()).unwrap();
        assert!(html.contains("No archived tasks."));
    }
}
