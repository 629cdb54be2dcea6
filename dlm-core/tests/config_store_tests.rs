//! End-to-end activation over file-based configuration

use dlm_core::{ConfigError, DlmConfig, MemoryStore};
use dlm_engine::ConfigSource;
use dlm_types::audience::Person;
use dlm_types::OwnerId;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const TEMPLATE_LAYOUT: &str = r#"<layout ID="1">
  <folder ID="s1" type="root" hidden="false">
    <folder ID="s2" type="header" hidden="false"/>
    <folder ID="s3" type="regular" hidden="false">
      <channel ID="n4" fname="welcome"/>
    </folder>
  </folder>
</layout>
"#;

const STORE: &str = r#"
users:
  - name: templateUser
    id: 10
    profile: { id: 1, fname: default, layout_id: 1, structure_stylesheet_id: 4, theme_stylesheet_id: 5 }
    layout: layouts/template.xml
    theme_preferences:
      channels:
        n4: { skin: blue }
  - name: campusFragment
    id: 20
    profile: { id: 1, fname: default, layout_id: 2 }
    layout: layouts/template.xml
system_profiles:
  - { id: 3, fname: default, layout_id: 7, structure_stylesheet_id: 8, theme_stylesheet_id: 9 }
"#;

const CONFIG: &str = r#"
system:
  templateUserName: templateUser
fragments:
  - name: Department
    owner: deptFragment
    precedence: 80
    audience:
      - attribute: { name: department, value: sales }
  - name: Campus
    owner: campusFragment
    precedence: 20
    audience:
      - everyone
  - name: Drafts
    owner: draftFragment
"#;

fn write_fixture(dir: &Path) {
    fs::create_dir_all(dir.join("layouts")).unwrap();
    fs::write(dir.join("layouts/template.xml"), TEMPLATE_LAYOUT).unwrap();
    fs::write(dir.join("store.yml"), STORE).unwrap();
    fs::write(dir.join("dlm.yml"), CONFIG).unwrap();
}

#[test]
fn test_activate_from_files() {
    let temp = TempDir::new().unwrap();
    write_fixture(temp.path());

    let config = DlmConfig::from_file(temp.path().join("dlm.yml")).unwrap();
    assert_eq!(config.fragments().len(), 3);
    let store_path = config.resolve_relative(Path::new("store.yml"));
    let store = MemoryStore::from_file(store_path).unwrap();

    let (activator, store) = dlm_core::activator(config, store);
    activator.ensure_activated();

    // deptFragment did not exist and was created from the template user
    let dept = activator.cached_view(&OwnerId::from("deptFragment")).unwrap();
    assert_eq!(dept.label(), "U21L1");
    assert!(dept.layout.find_by_id("U21L1s3").is_some());
    assert!(dept.layout.find_by_id("U21L1s2").is_none());
    assert!(dept.theme_preferences.channels.contains_key("U21L1n4"));
    assert_eq!(store.save_count(), 1);

    // campusFragment has no stylesheets and falls back to the system profile
    let campus = activator.cached_view(&OwnerId::from("campusFragment")).unwrap();
    assert_eq!(campus.profile_id, 3);
    assert_eq!(campus.label(), "U20L7");

    // Drafts has no audience
    assert!(!activator.has_user_view(&OwnerId::from("draftFragment")));
    assert_eq!(activator.cache().len(), 2);
}

#[test]
fn test_audience_ordering_from_files() {
    let temp = TempDir::new().unwrap();
    write_fixture(temp.path());

    let config = DlmConfig::from_file(temp.path().join("dlm.yml")).unwrap();
    let store = MemoryStore::from_file(temp.path().join("store.yml")).unwrap();
    let (activator, _) = dlm_core::activator(config, store);

    let sales = Person::new("jdoe").with_attribute("department", "sales");
    let names: Vec<_> = activator
        .applicable_views(&sales)
        .iter()
        .map(|view| view.fragment_name.clone())
        .collect();
    assert_eq!(names, vec!["Department", "Campus"]);

    let visitor = Person::new("guest");
    assert_eq!(activator.applicable_views(&visitor).len(), 1);
}

#[test]
fn test_missing_layout_file() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("store.yml"), STORE).unwrap();

    let err = MemoryStore::from_file(temp.path().join("store.yml")).unwrap_err();
    assert!(matches!(err, ConfigError::ReadError(_)));
}

#[test]
fn test_malformed_layout_file() {
    let temp = TempDir::new().unwrap();
    write_fixture(temp.path());
    fs::write(temp.path().join("layouts/template.xml"), "<layout><folder>").unwrap();

    let err = MemoryStore::from_file(temp.path().join("store.yml")).unwrap_err();
    assert!(matches!(err, ConfigError::Layout { .. }));
}
