pub mod front_matter;
pub mod list;
pub mod sections;

pub use sections::{RAW_SECTION, Section, Sections, parse_markdown};
