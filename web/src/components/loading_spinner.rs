use dioxus::prelude::*;

/// A centered spinner with a caption for loading states.
#[component]
pub fn LoadingSpinner(message: String) -> Element {
    rsx! {
        div { class: "flex flex-col items-center justify-center py-12",
            div { class: "animate-spin rounded-full h-12 w-12 border-b-2 border-blue-600 mb-4" }
            p { class: "text-gray-600", "{message}" }
        }
    }
}
