use tl_detector::config::{DetectorConfig, LightSourceKind};

fn shipped(name: &str) -> String {
    format!("{}/../config/{}", env!("CARGO_MANIFEST_DIR"), name)
}

#[test]
fn simulator_config_uses_ground_truth() -> anyhow::Result<()> {
    let config = DetectorConfig::load(shipped("sim_traffic_light_config.yaml"))?;
    assert!(!config.is_site);
    assert_eq!(config.stop_lines().len(), 8);
    assert_eq!(config.light_source_kind(), LightSourceKind::GroundTruth);
    Ok(())
}

#[test]
fn site_config_uses_vision() -> anyhow::Result<()> {
    let config = DetectorConfig::load(shipped("site_traffic_light_config.yaml"))?;
    assert!(config.is_site);
    assert_eq!(config.stop_lines().len(), 1);
    assert_eq!(config.light_source_kind(), LightSourceKind::Vision);
    assert_eq!(config.detector.timeout().as_millis(), 250);
    Ok(())
}

#[test]
fn missing_file_is_an_error() {
    assert!(DetectorConfig::load(shipped("does_not_exist.yaml")).is_err());
}
