use super::*;

#[test]
fn defaults_match_reference_values() {
    let cfg = EditorConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.output, OutputSize::reference());
    assert_eq!(cfg.stamp_width_fraction, 0.18);
    assert_eq!(cfg.jpeg_quality, 92);
    assert_eq!((cfg.min_scale, cfg.max_scale), (0.3, 3.0));
    assert!((cfg.rotate_step_rad - 15f64.to_radians()).abs() < 1e-12);
    assert_eq!(cfg.max_stamps, None);
}

#[test]
fn partial_json_overrides_only_given_keys() {
    let json = br#"{ "jpeg_quality": 80, "theme": "blue", "max_stamps": 12 }"#;
    let cfg = EditorConfig::from_reader(&json[..]).unwrap();
    assert_eq!(cfg.jpeg_quality, 80);
    assert_eq!(cfg.theme, CatTheme::Blue);
    assert_eq!(cfg.max_stamps, Some(12));
    assert_eq!(cfg.stamp_width_fraction, 0.18);
}

#[test]
fn invalid_values_are_rejected() {
    assert!(EditorConfig::from_reader(&br#"{ "jpeg_quality": 0 }"#[..]).is_err());
    assert!(EditorConfig::from_reader(&br#"{ "min_scale": 4.0 }"#[..]).is_err());
    assert!(EditorConfig::from_reader(&br#"{ "preview_threads": 0 }"#[..]).is_err());
    assert!(EditorConfig::from_reader(&br#"{ "unknown_key": 1 }"#[..]).is_err());
    assert!(EditorConfig::from_reader(&b"not json"[..]).is_err());
}

#[test]
fn scale_bounds_follow_config() {
    let bounds = EditorConfig::default().scale_bounds().unwrap();
    assert_eq!((bounds.min(), bounds.max()), (0.3, 3.0));

    let inverted = EditorConfig {
        min_scale: 3.0,
        max_scale: 0.3,
        ..EditorConfig::default()
    };
    assert!(inverted.scale_bounds().unwrap_err().to_string().contains("scale bounds"));
    assert!(inverted.validate().is_err());
}
