use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ClipgridError::configuration("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(
        ClipgridError::scheduling("x")
            .to_string()
            .contains("scheduling error:")
    );
    assert!(
        ClipgridError::clustering("x")
            .to_string()
            .contains("clustering error:")
    );
    assert!(ClipgridError::kernel("x").to_string().contains("kernel error:"));
    assert!(
        ClipgridError::validation("x")
            .to_string()
            .contains("validation error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ClipgridError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
