pub(crate) mod build;
pub(crate) mod clusters;
pub(crate) mod config;
pub(crate) mod slice;
pub(crate) mod stretch;
