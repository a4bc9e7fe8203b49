//! Persistence and versioning behavior of `DomainConfig`.

use std::fs;

use domain_shared::prelude::*;
use domain_tests::{init_tracing, list_dir, read_json};

fn custom_bossfight() -> BossfightConfig {
    BossfightConfig {
        min_n_rounds: 2,
        max_n_rounds: 5,
        min_boss_bullet_velocity: 0.3,
        boss_rand_fire_prob: 0.45,
        boss_scale: 1.5,
        ..Default::default()
    }
}

#[test]
fn bind_then_restore_roundtrips_fields() -> anyhow::Result<()> {
    init_tracing();
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("config.json");

    let mut cfg = DomainConfig::new(custom_bossfight());
    cfg.bind(&path)?;

    let restored = DomainConfig::restore(DomainKind::Bossfight, &path)?;
    assert_eq!(restored.schema(), cfg.schema());
    assert_eq!(restored.update_timestamp(), cfg.update_timestamp());
    assert_eq!(restored.bound_path(), Some(path.as_path()));
    assert_eq!(restored.cache_dir(), cfg.cache_dir());
    assert!(restored.extras().is_empty());

    let any = DomainConfig::restore_any(&path)?;
    assert_eq!(any.kind(), DomainKind::Bossfight);
    Ok(())
}

#[test]
fn binding_same_path_twice_is_a_noop() -> anyhow::Result<()> {
    init_tracing();
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("config.json");

    let mut cfg = DomainConfig::with_cache_name(BossfightConfig::default(), "cache");
    cfg.bind(&path)?;
    let cache_dir = cfg.cache_dir().map(|p| p.to_path_buf());
    let written = fs::read_to_string(&path)?;

    // Change memory without touching disk; a real rebind would rewrite the file.
    cfg.schema_mut().set("boss_scale", &FieldValue::Float(2.0)).unwrap();
    cfg.bind(&path)?;

    assert_eq!(cfg.cache_dir().map(|p| p.to_path_buf()), cache_dir);
    assert_eq!(fs::read_to_string(&path)?, written);
    assert!(list_dir(&tmp.path().join("cache"))?.is_empty());
    Ok(())
}

#[test]
fn cached_update_snapshots_old_values_and_rewrites_file() -> anyhow::Result<()> {
    init_tracing();
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("config.json");

    let mut cfg = DomainConfig::with_cache_name(
        BossfightConfig {
            min_n_rounds: 1,
            max_n_rounds: 2,
            ..Default::default()
        },
        "cache",
    );
    cfg.bind(&path)?;

    let report = cfg.update([("min_n_rounds", 5)], true)?;

    let snapshots = list_dir(&tmp.path().join("cache"))?;
    assert_eq!(snapshots.len(), 1);
    assert_eq!(report.snapshot.as_deref(), Some(snapshots[0].as_path()));

    let old = read_json(&snapshots[0])?;
    assert_eq!(old["min_n_rounds"], 1);
    assert_eq!(old["max_n_rounds"], 2);

    let live = read_json(&path)?;
    assert_eq!(live["min_n_rounds"], 5);
    assert_eq!(live["max_n_rounds"], 2);
    Ok(())
}

#[test]
fn unknown_key_is_skipped_but_timestamp_moves() -> anyhow::Result<()> {
    init_tracing();
    let mut cfg = DomainConfig::new(BossfightConfig::default());
    let before = cfg.update_timestamp();
    let fields_before = cfg.schema().fields();

    let report = cfg.update([("nonexistent", 9)], false)?;

    assert_eq!(report.skipped, vec!["nonexistent".to_string()]);
    assert!(report.applied.is_empty());
    assert!(cfg.get("nonexistent").is_none());
    assert!(cfg.extras().is_empty());
    assert_eq!(cfg.schema().fields(), fields_before);
    assert!(cfg.update_timestamp() > before);
    Ok(())
}

#[test]
fn uncached_update_never_snapshots() -> anyhow::Result<()> {
    init_tracing();
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("config.json");

    let mut cfg = DomainConfig::with_cache_name(BossfightConfig::default(), "cache");
    cfg.bind(&path)?;
    let report = cfg.update([("max_n_barriers", 2)], false)?;

    assert!(report.snapshot.is_none());
    assert!(list_dir(&tmp.path().join("cache"))?.is_empty());
    assert_eq!(read_json(&path)?["max_n_barriers"], 2);
    Ok(())
}

#[test]
fn unbound_update_touches_no_files() -> anyhow::Result<()> {
    init_tracing();
    let tmp = tempfile::tempdir()?;
    let cwd_cache = std::env::current_dir()?.join("cache-unbound");

    let mut cfg = DomainConfig::with_cache_name(BossfightConfig::default(), "cache-unbound");
    let report = cfg.update([("max_n_barriers", 2)], true)?;

    assert!(report.snapshot.is_none());
    assert_eq!(cfg.get("max_n_barriers"), Some(FieldValue::Int(2)));
    assert!(cfg.bound_path().is_none());
    assert!(cfg.cache_dir().is_none());
    assert!(!cwd_cache.exists());
    assert!(list_dir(tmp.path())?.is_empty());
    Ok(())
}

#[test]
fn timestamps_never_decrease() -> anyhow::Result<()> {
    init_tracing();
    let tmp = tempfile::tempdir()?;
    let mut cfg = DomainConfig::with_cache_name(BossfightConfig::default(), "cache");
    cfg.bind(tmp.path().join("config.json"))?;

    let mut last = cfg.update_timestamp();
    for health in 1..=10 {
        cfg.update([("max_boss_round_health", health)], true)?;
        assert!(cfg.update_timestamp() >= last);
        last = cfg.update_timestamp();
    }
    // One snapshot per update, none overwritten.
    assert_eq!(list_dir(&tmp.path().join("cache"))?.len(), 10);
    Ok(())
}

#[test]
fn snapshots_chain_back_through_history() -> anyhow::Result<()> {
    init_tracing();
    let tmp = tempfile::tempdir()?;
    let mut cfg = DomainConfig::with_cache_name(BossfightConfig::default(), "cache");
    cfg.bind(tmp.path().join("config.json"))?;

    for scale in [0.5, 0.75, 1.25] {
        cfg.update([("boss_scale", scale)], true)?;
    }

    let scales = list_dir(&tmp.path().join("cache"))?
        .iter()
        .map(|p| read_json(p).map(|v| v["boss_scale"].as_f64()))
        .collect::<anyhow::Result<Vec<_>>>()?;
    assert_eq!(scales, vec![Some(1.0), Some(0.5), Some(0.75)]);
    Ok(())
}

#[test]
fn extras_survive_update_and_rewrite() -> anyhow::Result<()> {
    init_tracing();
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("config.json");
    fs::write(
        &path,
        r#"{"game": "dc_bossfight", "min_boss_scale": 0.5, "max_boss_scale": 1.0}"#,
    )?;

    let mut cfg = DomainConfig::restore_any(&path)?;
    let report = cfg.update(
        [
            ("max_boss_scale", FieldValue::Float(2.0)),
            ("boss_scale", FieldValue::Float(1.5)),
        ],
        true,
    )?;
    assert_eq!(report.applied.len(), 2);

    let live = read_json(&path)?;
    assert_eq!(live["min_boss_scale"], 0.5);
    assert_eq!(live["max_boss_scale"], 2.0);
    assert_eq!(live["boss_scale"], 1.5);
    Ok(())
}

#[test]
fn restore_of_missing_or_malformed_file_fails() {
    init_tracing();
    let tmp = tempfile::tempdir().unwrap();

    let missing = DomainConfig::restore(DomainKind::Bossfight, tmp.path().join("none.json"));
    assert!(matches!(missing, Err(DomainError::Io { .. })));

    let bad = tmp.path().join("bad.json");
    fs::write(&bad, "{ not json").unwrap();
    let malformed = DomainConfig::restore(DomainKind::Bossfight, &bad);
    assert!(matches!(malformed, Err(DomainError::Parse { .. })));

    let untagged = tmp.path().join("untagged.json");
    fs::write(&untagged, r#"{"boss_scale": 1.0}"#).unwrap();
    assert!(matches!(
        DomainConfig::restore_any(&untagged),
        Err(DomainError::MissingDomain { .. })
    ));
}

#[test]
fn persisted_files_never_leak_cache_name() -> anyhow::Result<()> {
    init_tracing();
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("config.json");

    let mut cfg = DomainConfig::with_cache_name(BossfightConfig::default(), "cache");
    cfg.bind(&path)?;
    cfg.update([("boss_scale", 0.5)], true)?;

    let mut files = vec![path.clone()];
    files.extend(list_dir(&tmp.path().join("cache"))?);
    for file in files {
        let json = read_json(&file)?;
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("cache_name"), "{} leaks cache_name", file.display());
        assert_eq!(obj["game"], "dc_bossfight");
    }
    Ok(())
}
