use dioxus::prelude::*;
use todo_graph::{CreateTaskInput, Task};

use crate::state::{apply_patch, TaskListPatch};
use crate::task_client;

/// The create-task form at the top of the page.
///
/// The submit button stays disabled while the title is blank or a create
/// is already in flight, so the server's blank-title rule is rarely hit
/// from here.
#[component]
pub fn TaskForm(mut tasks: Signal<Vec<Task>>, mut submitting: Signal<bool>) -> Element {
    let mut title = use_signal(String::new);
    let mut description = use_signal(String::new);

    let handle_create = move |_| {
        if title().trim().is_empty() || submitting() {
            return;
        }
        submitting.set(true);
        spawn(async move {
            let input = CreateTaskInput {
                title: title(),
                description: Some(description()),
            };
            match task_client().create_task(input).await {
                Ok(created) => {
                    tasks.with_mut(|list| apply_patch(list, TaskListPatch::Append(created)));
                    title.set(String::new());
                    description.set(String::new());
                }
                Err(e) => tracing::error!("Error creating task: {e}"),
            }
            submitting.set(false);
        });
    };

    rsx! {
        div { class: "bg-white rounded-lg shadow-md p-6 mb-8",
            h2 { class: "text-xl font-semibold text-gray-800 mb-4", "Add New Task" }
            input {
                class: "w-full px-4 py-2 border border-gray-300 rounded-lg mb-3 focus:outline-none focus:ring-2 focus:ring-blue-500",
                placeholder: "Enter task title...",
                value: "{title}",
                oninput: move |evt| title.set(evt.value()),
            }
            textarea {
                class: "w-full px-4 py-2 border border-gray-300 rounded-lg mb-3 focus:outline-none focus:ring-2 focus:ring-blue-500",
                placeholder: "Enter task description (optional)...",
                rows: 3,
                value: "{description}",
                oninput: move |evt| description.set(evt.value()),
            }
            button {
                class: "px-6 py-2 bg-blue-600 text-white rounded-lg hover:bg-blue-700 disabled:opacity-50 disabled:cursor-not-allowed",
                disabled: title().trim().is_empty() || submitting(),
                onclick: handle_create,
                if submitting() {
                    "Adding..."
                } else {
                    "Add Task"
                }
            }
        }
    }
}
