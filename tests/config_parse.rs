use textsift::config::Config;

#[test]
fn parse_example_config() {
    let raw = include_str!("../textsift.example.toml");
    let cfg: Config = toml::from_str(raw).expect("parse TOML");
    assert_eq!(cfg.ocr.poll_interval_seconds, 5);
    assert_eq!(cfg.ocr.max_poll_attempts, 60);
    assert_eq!(cfg.chunking.max_chars, 2000);
    assert!(!cfg.paths.out_dir.is_empty());
}

#[test]
fn defaults_cover_an_empty_config() {
    let cfg: Config = toml::from_str("").expect("parse empty TOML");
    assert_eq!(cfg.ocr.max_poll_attempts, 60);
    assert_eq!(cfg.chunking.max_chars, 2000);
    assert_eq!(cfg.storage.key_prefix, "reports");
    assert!(cfg.storage.bucket.is_empty());
}
