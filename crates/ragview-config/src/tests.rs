use super::*;
use std::collections::HashMap;
use std::io::Write;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_defaults_match_explorer_sidebar() {
    let config = Config::default();
    assert_eq!(config.explorer.root_dir, PathBuf::from("./ragtest"));
    assert_eq!(config.explorer.community_level, 2);
    assert_eq!(config.explorer.response_type, "Multiple Paragraphs");
    assert_eq!(config.query.program, "python");
    assert_eq!(config.query.args, vec!["-m", "graphrag.query"]);
    assert!(config.query.timeout_secs.is_none());
}

#[test]
fn test_partial_toml_fills_defaults() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[explorer]\nroot_dir = \"/data/rag\"\n\n[query]\ntimeout_secs = 30").unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.explorer.root_dir, PathBuf::from("/data/rag"));
    assert_eq!(config.explorer.community_level, 2);
    assert_eq!(config.query.timeout_secs, Some(30));
    assert_eq!(config.server.port, 8501);
}

#[test]
fn test_yaml_config() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(file, "explorer:\n  community_level: 4\n  response_type: Single Paragraph").unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.explorer.community_level, 4);
    assert_eq!(config.explorer.response_type, "Single Paragraph");
}

#[test]
fn test_unknown_extension_rejected() {
    let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
    let err = Config::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Format(_)));
}

#[test]
fn test_env_overrides() {
    let mut config = Config::default();
    config
        .apply_env(env(&[
            ("RAGVIEW_ROOT", "/srv/graphrag"),
            ("RAGVIEW_PORT", "9000"),
            ("RAGVIEW_QUERY_TIMEOUT", "120"),
        ]))
        .unwrap();
    assert_eq!(config.explorer.root_dir, PathBuf::from("/srv/graphrag"));
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.query.timeout_secs, Some(120));
}

#[test]
fn test_zero_timeout_disables_limit() {
    let mut config = Config::default();
    config.query.timeout_secs = Some(10);
    config.apply_env(env(&[("RAGVIEW_QUERY_TIMEOUT", "0")])).unwrap();
    assert!(config.query.timeout_secs.is_none());
}

#[test]
fn test_bad_port_is_reported() {
    let mut config = Config::default();
    let err = config.apply_env(env(&[("RAGVIEW_PORT", "http")])).unwrap_err();
    assert!(err.to_string().contains("RAGVIEW_PORT"));
}

#[test]
fn test_community_level_bounds() {
    let mut explorer = ExplorerConfig::default();
    explorer.community_level = MAX_COMMUNITY_LEVEL;
    assert!(explorer.validate().is_ok());
    explorer.community_level = MAX_COMMUNITY_LEVEL + 1;
    assert!(explorer.validate().is_err());
}
