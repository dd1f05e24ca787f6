pub mod config;
pub mod dates;
pub mod error;
pub mod markdown;
pub mod model;
pub mod schema;
pub mod task_api;
pub mod utility;

pub use config::{Config, ConfigOverrides};
pub use dates::DateResolver;
pub use error::AppError;
pub use markdown::parse_markdown;
pub use model::{Comment, Metadata, Relation, SubTask, Task};
pub use task_api::{
    json2md, md2json, md2json_value, md2json_with, md2json_with_overrides,
    task_to_markdown,
};
