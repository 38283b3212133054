//! Pure domain services.

mod format_resolver;

pub use format_resolver::resolve_format;
