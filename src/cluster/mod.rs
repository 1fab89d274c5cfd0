pub(crate) mod kmeans;
pub(crate) mod sequencer;
