pub(crate) mod manifest;
