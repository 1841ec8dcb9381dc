pub mod html;

pub use html::{format_value, normalized_percentage, render_table};
