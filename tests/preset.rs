mod common;

use addon_keeper_lib::core::enablement::Enablement;
use addon_keeper_lib::core::preset::{apply, Intent, PresetManager};
use addon_keeper_lib::models::error::SError;
use addon_keeper_lib::models::preset::Preset;
use common::setup_test_env;
use std::collections::BTreeSet;
use std::fs;

fn set(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

fn preset(id: &str, addons: &[&str]) -> Preset {
    Preset {
        id: id.to_string(),
        name: format!("Preset {id}"),
        description: None,
        addons: set(addons),
    }
}

#[test]
fn test_preset_storage_round_trip() {
    let env = setup_test_env();
    let manager = PresetManager::new(&env.config.join("presets")).unwrap();

    manager.create(preset("vfr", &["b", "a"])).unwrap();
    manager.create(preset("airliner", &["c"])).unwrap();

    let ids: Vec<String> = manager.list().unwrap().into_iter().map(|p| p.id).collect();
    assert_eq!(ids, vec!["airliner", "vfr"]);

    let mut vfr = manager.get("vfr").unwrap();
    assert_eq!(vfr.addons, set(&["a", "b"]));
    vfr.description = Some("Low and slow".into());
    vfr.addons = set(&["a"]);
    manager.update(vfr.clone()).unwrap();
    assert_eq!(manager.get("vfr").unwrap(), vfr);

    manager.remove("vfr").unwrap();
    assert!(matches!(manager.get("vfr"), Err(SError::PresetNotFound(_))));
    assert!(matches!(
        manager.update(preset("vfr", &[])),
        Err(SError::PresetNotFound(_))
    ));
    assert!(matches!(
        manager.create(Preset {
            name: "  ".into(),
            ..preset("blank", &[])
        }),
        Err(SError::Validation(_))
    ));
}

#[test]
fn test_apply_reconciles_enabled_set() {
    let env = setup_test_env();
    let lib = env.library();
    for name in ["X", "Y", "Z"] {
        env.install_package(&lib, name, false);
    }
    Enablement::enable(&lib, &env.community, "Y").unwrap();
    Enablement::enable(&lib, &env.community, "Z").unwrap();

    let applied = apply(&lib, &env.community, &preset("p", &["X", "Y", "unknown"])).unwrap();

    assert_eq!(
        applied,
        vec![Intent::Disable("Z".into()), Intent::Enable("X".into())]
    );
    assert_eq!(lib.enabled_ids(&env.community), set(&["X", "Y"]));

    // Applying again changes nothing
    let again = apply(&lib, &env.community, &preset("p", &["X", "Y"])).unwrap();
    assert!(again.is_empty());
}

#[test]
fn test_apply_continues_past_failures() {
    let env = setup_test_env();
    let lib = env.library();
    for name in ["A", "B", "C"] {
        env.install_package(&lib, name, false);
    }
    Enablement::enable(&lib, &env.community, "C").unwrap();
    // A foreign folder blocks the link of A
    fs::create_dir_all(env.community.join("A")).unwrap();

    let err = apply(&lib, &env.community, &preset("p", &["A", "B"])).unwrap_err();

    match err {
        SError::PartialFailure(failures) => {
            assert_eq!(failures.len(), 1);
            assert!(failures[0].contains("'A'"));
        }
        other => panic!("expected PartialFailure, got {other:?}"),
    }
    // Every other intent still ran
    assert_eq!(lib.enabled_ids(&env.community), set(&["B"]));
}

#[test]
fn test_concurrent_creates_of_one_id_conflict() {
    let env = setup_test_env();
    let manager = PresetManager::new(&env.config.join("presets")).unwrap();

    let outcomes: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let manager = &manager;
                s.spawn(move || {
                    let addon = format!("addon-{i}");
                    manager.create(preset("shared", &[addon.as_str()]))
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(outcomes
        .iter()
        .filter(|r| r.is_err())
        .all(|r| matches!(r, Err(SError::Conflict(_)))));

    let winner = outcomes.into_iter().find_map(Result::ok).unwrap();
    assert_eq!(manager.get("shared").unwrap(), winner);
}
