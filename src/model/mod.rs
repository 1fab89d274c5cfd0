pub(crate) mod grid;
pub(crate) mod sample;
pub(crate) mod scene;
