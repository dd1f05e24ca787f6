mod task;

pub use task::{Comment, Metadata, Relation, SubTask, Task};
