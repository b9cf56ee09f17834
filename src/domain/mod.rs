pub mod share;
pub mod task;
pub mod user;

pub use share::SharePermission;
pub use task::{Task, TaskList};
pub use user::User;
