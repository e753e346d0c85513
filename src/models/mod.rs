mod category;
mod task;

pub use category::{
    Category, CategoryId, CategoryUpdate, NewCategory, DEFAULT_CATEGORY_COLOR,
    DEFAULT_CATEGORY_ICON,
};
pub use task::{NewTask, Priority, Task, TaskId, TaskUpdate};
