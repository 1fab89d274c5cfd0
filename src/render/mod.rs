pub(crate) mod backend;
pub(crate) mod frame;
pub(crate) mod pipeline;
pub(crate) mod warp;
