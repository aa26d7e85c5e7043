mod task;
mod user;

pub use task::{create_task, delete_task, get_task, list_tasks, update_task};
pub use user::{create_user, delete_user, get_user, list_users, update_user};
