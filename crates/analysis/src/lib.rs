pub mod render;
pub mod summary;

pub use render::{render_script, write_script, RenderError, PALETTE};
pub use summary::{summarize, Summary, UNREVIEWED_TRIM};
