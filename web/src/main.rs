mod components;
mod state;

use dioxus::prelude::*;
use todo_graph::Task;
use todo_graph_client::TaskClient;

use crate::components::{LoadingSpinner, TaskForm, TaskList};

/// Where the API server listens.
pub const GRAPHQL_ENDPOINT: &str = "http://localhost:5000/graphql";

pub fn task_client() -> TaskClient {
    TaskClient::new(GRAPHQL_ENDPOINT)
}

fn main() {
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    let mut tasks = use_signal(Vec::<Task>::new);
    let mut loading = use_signal(|| true);
    let submitting = use_signal(|| false);

    // Load the full list once on mount. From then on the list is patched
    // locally per confirmed mutation; see `state::apply_patch`.
    use_effect(move || {
        spawn(async move {
            match task_client().get_all_tasks().await {
                Ok(loaded) => tasks.set(loaded),
                Err(e) => tracing::error!("Error loading tasks: {e}"),
            }
            loading.set(false);
        });
    });

    rsx! {
        main { class: "min-h-screen bg-gray-50 py-8",
            div { class: "max-w-3xl mx-auto px-6",
                h1 { class: "text-4xl font-bold text-gray-900 mb-8", "Todo List" }

                TaskForm { tasks, submitting }

                if loading() {
                    LoadingSpinner { message: "Loading tasks...".to_string() }
                } else {
                    TaskList { tasks }
                }
            }
        }
    }
}
