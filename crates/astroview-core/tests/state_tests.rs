use astroview_core::{CameraView, RotationDirection, ViewerSettings};

#[test]
fn test_viewer_settings_default() {
    let settings = ViewerSettings::default();
    assert!(settings.rotation_enabled);
    assert_eq!(settings.rotation_direction, RotationDirection::Clockwise);
    assert_eq!(settings.view, CameraView::Side);
    assert_eq!(settings.window_width, 1280);
    assert_eq!(settings.window_height, 720);
    assert!(settings.vsync);
}

#[test]
fn test_viewer_settings_serialization() {
    let mut settings = ViewerSettings::default();
    settings.rotation_enabled = false;
    settings.view = CameraView::Top;
    settings.spin_deg_per_sec = 45.0;

    let json = serde_json::to_string(&settings).expect("Failed to serialize ViewerSettings");
    let deserialized: ViewerSettings =
        serde_json::from_str(&json).expect("Failed to deserialize ViewerSettings");

    assert_eq!(settings, deserialized);
}

#[test]
fn test_viewer_settings_save_and_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("settings.json");

    let mut settings = ViewerSettings::default();
    settings.rotation_direction = RotationDirection::CounterClockwise;
    settings.view = CameraView::Free;

    settings.save_to(&path).expect("save settings");
    let loaded = ViewerSettings::load_from(&path).expect("load settings");
    assert_eq!(settings, loaded);
}

#[test]
fn test_viewer_settings_load_rejects_garbage() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "not json at all").expect("write garbage");

    assert!(ViewerSettings::load_from(&path).is_err());
}

#[test]
fn test_settings_survive_missing_log_section() {
    // Settings written by an older build without the log section still load.
    let json = r#"{
        "rotation_enabled": true,
        "rotation_direction": "clockwise",
        "view": "side",
        "spin_deg_per_sec": 18.0,
        "window_width": 800,
        "window_height": 600,
        "vsync": false
    }"#;
    let settings: ViewerSettings = serde_json::from_str(json).expect("parse");
    assert_eq!(settings.window_width, 800);
    assert_eq!(settings.log.level, "info");
}
