use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        BoothError::invalid_selection("x")
            .to_string()
            .contains("invalid selection:")
    );
    assert!(
        BoothError::unknown_layout("mosaic")
            .to_string()
            .contains("unknown layout 'mosaic'")
    );
    assert!(BoothError::decode("x").to_string().contains("decode error:"));
    assert!(
        BoothError::gallery("x")
            .to_string()
            .contains("gallery error:")
    );
    assert!(BoothError::config("x").to_string().contains("config error:"));
}

#[test]
fn structured_variants_render_their_fields() {
    let err = BoothError::InsufficientPhotos {
        available: 1,
        required: 2,
    };
    assert!(err.to_string().contains("at least 2"));
    assert!(err.to_string().contains("has 1"));

    let err = BoothError::SelectionLimitExceeded { limit: 9 };
    assert!(err.to_string().contains("maximum 9"));
}

#[test]
fn render_wraps_cause_once() {
    let err = BoothError::render(BoothError::decode("bad jpeg"));
    let BoothError::Render(inner) = &err else {
        panic!("expected render error, got {err:?}");
    };
    assert!(matches!(**inner, BoothError::Decode(_)));
    assert!(err.to_string().contains("bad jpeg"));

    let twice = BoothError::render(err);
    let BoothError::Render(inner) = twice else {
        panic!("expected render error");
    };
    assert!(matches!(*inner, BoothError::Decode(_)));
}

#[test]
fn render_passes_cancellation_through() {
    assert!(matches!(
        BoothError::render(BoothError::Cancelled),
        BoothError::Cancelled
    ));
    assert!(matches!(
        BoothError::render(BoothError::StaleRender),
        BoothError::StaleRender
    ));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = BoothError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
