use super::*;
use crate::domain::PlatformMask;

fn resolve_all(key: &str, _: Platform) -> Option<String> {
    (!key.starts_with("missing")).then(|| format!("{key}.asset"))
}

fn design() -> Catalog {
    Catalog::from_entries(
        vec![
            CatalogEntry::bundled("hero", "Chars/hero", "chars").with_labels(&["character"]),
            CatalogEntry::bundled("villain", "Chars/villain", "chars"),
            CatalogEntry::bundled("forest", "Levels/forest", "levels").as_scene(),
            CatalogEntry::packaged("menu", "Scenes/menu").as_scene(),
            CatalogEntry::packaged("logo", "UI/logo").with_group("ui"),
            CatalogEntry::bundled("hd_sky", "Sky/hd", "sky_hd")
                .with_platforms(PlatformMask::STANDALONE),
        ],
        vec!["chars".to_string(), "sky_hd".to_string()],
    )
    .unwrap()
}

#[test]
fn test_compile_for_platform() {
    let design = design();
    let output = compile(&design, Platform::Android, &resolve_all).unwrap();

    assert_eq!(output.catalog.platform(), Some(Platform::Android));
    assert_eq!(output.catalog.len(), 5);
    assert!(!output.catalog.contains("hd_sky"));
    assert!(output.catalog.entries().all(|e| e.labels.is_empty()));
    assert_eq!(
        output.catalog.local_bundle_names().iter().collect::<Vec<_>>(),
        vec!["chars", "sky_hd"]
    );

    assert_eq!(
        output.bundle_assignment.get("chars"),
        Some(&vec![
            "Chars/hero.asset".to_string(),
            "Chars/villain.asset".to_string()
        ])
    );
    assert_eq!(
        output.bundle_assignment.keys().collect::<Vec<_>>(),
        vec!["chars", "levels"]
    );
}

#[test]
fn test_design_catalog_untouched() {
    let design = design();
    let before = design.clone();
    compile(&design, Platform::Android, &resolve_all).unwrap();
    assert_eq!(design, before);
    assert_eq!(design.resolve("hero").unwrap().labels, vec!["character"]);
}

#[test]
fn test_scene_list_delta() {
    let output = compile(&design(), Platform::Ios, &resolve_all).unwrap();
    assert!(output.scene_list.add.contains("Scenes/menu"));
    assert!(output.scene_list.remove.contains("Levels/forest"));
    assert_eq!(output.scene_list.add.len(), 1);
    assert_eq!(output.scene_list.remove.len(), 1);
}

#[test]
fn test_unused_local_bundle_reported() {
    let output = compile(&design(), Platform::Android, &resolve_all).unwrap();
    assert_eq!(
        output.anomalies,
        vec![Anomaly::BundleDeclaredUnused {
            bundle: "sky_hd".to_string()
        }]
    );

    let output = compile(&design(), Platform::Windows, &resolve_all).unwrap();
    assert!(output.anomalies.is_empty());
}

#[test]
fn test_entry_without_bundle_reported_not_dropped() {
    let design = Catalog::from_entries(
        vec![CatalogEntry::bundled("orphan", "Chars/orphan", "")],
        Vec::new(),
    )
    .unwrap();
    let output = compile(&design, Platform::Linux, &resolve_all).unwrap();
    assert!(output.catalog.contains("orphan"));
    assert!(output.bundle_assignment.is_empty());
    assert_eq!(
        output.anomalies,
        vec![Anomaly::EntryWithoutBundle {
            id: "orphan".to_string()
        }]
    );
    assert!(output.anomalies[0].to_string().contains("names no bundle"));
}

#[test]
fn test_unresolved_keys_listed() {
    let design = Catalog::from_entries(
        vec![
            CatalogEntry::packaged("a", "missing/a"),
            CatalogEntry::packaged("b", "UI/b"),
            CatalogEntry::bundled("c", "missing/c", "chars"),
        ],
        Vec::new(),
    )
    .unwrap();
    let err = compile(&design, Platform::Android, &resolve_all).unwrap_err();
    let AddressableError::CompileFailed { message } = err else {
        panic!("expected CompileFailed, got {err:?}");
    };
    assert!(message.starts_with("2 entries"));
    assert!(message.contains("'a'"));
    assert!(message.contains("'c'"));
    assert!(!message.contains("'b'"));
}

#[test]
fn test_missing_asset_name_defaults_to_file_name() {
    let mut forest = CatalogEntry::bundled("forest", "Levels/forest.unity", "levels");
    forest.asset_name = String::new();
    let mut named = CatalogEntry::bundled("sky", "Sky/sky.mat", "levels");
    named.asset_name = String::from("SkyMaterial");
    let design = Catalog::from_entries(vec![forest, named], Vec::new()).unwrap();

    let output = compile(&design, Platform::Linux, &resolve_all).unwrap();
    assert_eq!(output.catalog.resolve("forest").unwrap().asset_name, "forest.unity");
    assert_eq!(output.catalog.resolve("sky").unwrap().asset_name, "SkyMaterial");
}

#[test]
fn test_dependency_only_local_bundle_stays_local() {
    use crate::resolver::{DependencyGraph, Partitioner};

    let design = Catalog::from_entries(
        vec![CatalogEntry::bundled("hero", "Chars/hero", "chars")],
        vec!["shaders".to_string(), "ghost".to_string()],
    )
    .unwrap();
    let graph = DependencyGraph::from_edges([("chars", vec!["shaders"]), ("shaders", vec![])]);

    let output = compile(&design, Platform::Android, &resolve_all).unwrap();
    assert_eq!(
        output.anomalies,
        vec![
            Anomaly::BundleDeclaredUnused {
                bundle: "ghost".to_string()
            },
            Anomaly::BundleDeclaredUnused {
                bundle: "shaders".to_string()
            },
        ]
    );
    assert_eq!(
        output.catalog.local_bundle_names(),
        design.local_bundle_names()
    );

    let result = Partitioner::new(&output.catalog, &graph).run();
    assert!(result.is_local("shaders"));
    assert_eq!(result.remote.iter().collect::<Vec<_>>(), vec!["chars"]);
    assert_eq!(
        result.declared_local_not_in_manifest.iter().collect::<Vec<_>>(),
        vec!["ghost"]
    );
    assert!(matches!(
        result.check(),
        Err(AddressableError::ManifestMismatch { .. })
    ));
}
