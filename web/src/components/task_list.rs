use dioxus::prelude::*;
use todo_graph::{Task, TaskStatus};

use crate::state::{apply_patch, TaskListPatch};
use crate::task_client;

/// The task cards below the form, newest last.
#[component]
pub fn TaskList(tasks: Signal<Vec<Task>>) -> Element {
    let current = tasks();

    rsx! {
        div {
            h2 { class: "text-xl font-semibold text-gray-800 mb-4", "Tasks ({current.len()})" }
            if current.is_empty() {
                div { class: "bg-white rounded-lg shadow-md p-8 text-center text-gray-500",
                    "No tasks yet. Create your first task above!"
                }
            } else {
                div { class: "space-y-3",
                    {current.iter().map(|task| rsx! {
                        TaskRow { key: "{task.id}", task: task.clone(), tasks }
                    })}
                }
            }
        }
    }
}

#[component]
fn TaskRow(task: Task, mut tasks: Signal<Vec<Task>>) -> Element {
    let task_id = task.id;
    let current_status = task.status;

    let handle_toggle = move |_| {
        spawn(async move {
            match task_client().update_task_status(task_id, current_status.toggled()).await {
                Ok(Some(updated)) => {
                    tasks.with_mut(|list| apply_patch(list, TaskListPatch::Replace(updated)));
                }
                Ok(None) => tracing::warn!("Task {task_id} no longer exists"),
                Err(e) => tracing::error!("Error updating task status: {e}"),
            }
        });
    };

    let handle_delete = move |_| {
        spawn(async move {
            match task_client().delete_task(task_id).await {
                Ok(true) => {
                    tasks.with_mut(|list| apply_patch(list, TaskListPatch::Remove(task_id)));
                }
                Ok(false) => tracing::warn!("Task {task_id} was already gone"),
                Err(e) => tracing::error!("Error deleting task: {e}"),
            }
        });
    };

    let (badge_color, badge_text) = match task.status {
        TaskStatus::Pending => ("bg-yellow-100 text-yellow-800", "Pending"),
        TaskStatus::Completed => ("bg-green-100 text-green-800", "Completed"),
    };
    let created = task.created_at.format("%b %-d, %Y").to_string();

    rsx! {
        div { class: "bg-white rounded-lg shadow-md p-4",
            div { class: "flex items-start justify-between gap-4",
                h3 { class: "text-lg font-medium text-gray-900", "{task.title}" }
                div { class: "flex gap-2 shrink-0",
                    button {
                        class: "px-3 py-1 text-sm bg-blue-100 text-blue-700 rounded hover:bg-blue-200",
                        onclick: handle_toggle,
                        if task.status == TaskStatus::Pending {
                            "Complete"
                        } else {
                            "Reopen"
                        }
                    }
                    button {
                        class: "px-3 py-1 text-sm bg-red-100 text-red-700 rounded hover:bg-red-200",
                        onclick: handle_delete,
                        "Delete"
                    }
                }
            }
            if !task.description.is_empty() {
                p { class: "text-gray-600 mt-2", "{task.description}" }
            }
            div { class: "flex items-center gap-3 mt-3",
                span { class: "px-2 py-1 text-xs font-medium rounded-full {badge_color}", "{badge_text}" }
                span { class: "text-xs text-gray-400", "Created: {created}" }
            }
        }
    }
}
