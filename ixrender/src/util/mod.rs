//! Pure helpers shared by the managers: text escaping and mount path safety.

mod format;
mod path;

pub use format::{escape_dollar, format_duration, shell_quote};
pub use path::{EXACT_RESTRICTED_ROOTS, PREFIX_RESTRICTED_ROOTS, is_allowed_path, resolve_path};
