use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(SplitError::decode("x").to_string().contains("decode error:"));
    assert!(SplitError::encode("x").to_string().contains("encode error:"));
    assert!(
        SplitError::config("x")
            .to_string()
            .contains("configuration error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SplitError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn anyhow_converts_via_question_mark() {
    fn fails() -> SplitResult<()> {
        Err(anyhow::anyhow!("wrapped"))?;
        Ok(())
    }
    assert!(matches!(fails(), Err(SplitError::Other(_))));
}
