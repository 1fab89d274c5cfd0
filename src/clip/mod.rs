pub(crate) mod core;
pub(crate) mod timeline;
