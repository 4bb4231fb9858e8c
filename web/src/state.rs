//! Local view-state patches for the cached task list.
//!
//! The UI loads the full list once, then keeps it current by applying one
//! patch per confirmed mutation: append after create, replace after a
//! status change, remove after delete. The cache can drift from the store
//! if another client mutates it; only a page reload reconciles that.

use todo_graph::Task;

/// One confirmed mutation's effect on the cached list.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskListPatch {
    Append(Task),
    Replace(Task),
    Remove(i32),
}

/// Applies a patch in place. Replacing or removing an id that is not in
/// the list leaves the list untouched.
pub fn apply_patch(tasks: &mut Vec<Task>, patch: TaskListPatch) {
    match patch {
        TaskListPatch::Append(task) => tasks.push(task),
        TaskListPatch::Replace(updated) => {
            if let Some(existing) = tasks.iter_mut().find(|task| task.id == updated.id) {
                *existing = updated;
            }
        }
        TaskListPatch::Remove(id) => tasks.retain(|task| task.id != id),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use todo_graph::TaskStatus;

    use super::*;

    fn task(id: i32, title: &str) -> Task {
        let timestamp = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        Task {
            id,
            title: title.to_string(),
            description: String::new(),
            status: TaskStatus::Pending,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    fn ids(tasks: &[Task]) -> Vec<i32> {
        tasks.iter().map(|task| task.id).collect()
    }

    #[test]
    fn append_adds_to_the_end() {
        let mut tasks = vec![task(1, "One")];

        apply_patch(&mut tasks, TaskListPatch::Append(task(2, "Two")));

        assert_eq!(ids(&tasks), [1, 2]);
    }

    #[test]
    fn replace_swaps_the_matching_task_in_place() {
        let mut tasks = vec![task(1, "One"), task(2, "Two"), task(3, "Three")];
        let mut updated = task(2, "Two");
        updated.status = TaskStatus::Completed;

        apply_patch(&mut tasks, TaskListPatch::Replace(updated));

        assert_eq!(ids(&tasks), [1, 2, 3]);
        assert_eq!(tasks[1].status, TaskStatus::Completed);
    }

    #[test]
    fn replace_of_an_unknown_id_changes_nothing() {
        let mut tasks = vec![task(1, "One")];

        apply_patch(&mut tasks, TaskListPatch::Replace(task(9, "Ghost")));

        assert_eq!(ids(&tasks), [1]);
        assert_eq!(tasks[0].title, "One");
    }

    #[test]
    fn remove_filters_out_the_matching_task() {
        let mut tasks = vec![task(1, "One"), task(2, "Two")];

        apply_patch(&mut tasks, TaskListPatch::Remove(1));

        assert_eq!(ids(&tasks), [2]);
    }

    #[test]
    fn remove_of_an_unknown_id_changes_nothing() {
        let mut tasks = vec![task(1, "One")];

        apply_patch(&mut tasks, TaskListPatch::Remove(9));

        assert_eq!(ids(&tasks), [1]);
    }

    #[test]
    fn create_toggle_delete_sequence_matches_the_ui_flow() {
        let mut tasks = Vec::new();

        apply_patch(&mut tasks, TaskListPatch::Append(task(1, "Buy milk")));
        apply_patch(&mut tasks, TaskListPatch::Append(task(2, "Call mom")));

        let mut completed = task(1, "Buy milk");
        completed.status = TaskStatus::Completed;
        apply_patch(&mut tasks, TaskListPatch::Replace(completed));
        apply_patch(&mut tasks, TaskListPatch::Remove(2));

        assert_eq!(ids(&tasks), [1]);
        assert_eq!(tasks[0].status, TaskStatus::Completed);
    }
}
