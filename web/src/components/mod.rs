mod loading_spinner;
mod task_form;
mod task_list;

pub use loading_spinner::LoadingSpinner;
pub use task_form::TaskForm;
pub use task_list::TaskList;
