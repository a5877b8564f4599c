pub mod format;

pub use format::{format_date, format_kg, format_optional, truncate_string};
