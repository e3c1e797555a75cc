use gridlife_core::{StoreError, TemplateRecord, TemplateStore};
use gridlife_storage::TemplateLibrary;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn scratch_file(tag: &str) -> PathBuf {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_micros();
    std::env::temp_dir().join(format!(
        "gridlife_library_{tag}_{}_{}.json",
        std::process::id(),
        timestamp
    ))
}

fn record(rows: &[&str]) -> TemplateRecord {
    TemplateRecord::from_rows(rows.iter().map(|row| (*row).to_owned()).collect())
}

#[test]
fn missing_file_reads_as_empty_library() {
    let path = scratch_file("missing");
    let library = TemplateLibrary::open(&path);
    assert!(library.load_all().expect("load_all").is_empty());
    assert!(matches!(
        library.load("glider"),
        Err(StoreError::NotFound(name)) if name == "glider"
    ));
}

#[test]
fn saved_records_round_trip_by_name() {
    let path = scratch_file("roundtrip");
    let mut library = TemplateLibrary::open(&path);

    let blinker = record(&["###"]);
    let name = library.append(blinker.clone()).expect("append");
    assert_eq!(name, "config0");

    let reloaded = library.load(&name).expect("load");
    assert_eq!(reloaded, blinker);

    let _ = fs::remove_file(&path);
}

#[test]
fn two_saves_produce_two_distinct_entries() {
    let path = scratch_file("distinct");
    let mut library = TemplateLibrary::open(&path);

    let first = library.append(record(&["##", "##"])).expect("first append");
    let second = library.append(record(&["#"])).expect("second append");
    assert_ne!(first, second);

    let entries = library.load_all().expect("load_all");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[&first].template, vec!["##", "##"]);
    assert_eq!(entries[&second].template, vec!["#"]);

    let _ = fs::remove_file(&path);
}

#[test]
fn defaults_fill_in_for_sparse_repository_entries() {
    let path = scratch_file("defaults");
    fs::write(
        &path,
        r####"{ "glider": { "template": [" # ", "  #", "###"] } }"####,
    )
    .expect("write fixture");

    let library = TemplateLibrary::open(&path);
    let glider = library.load("glider").expect("load");
    assert_eq!(glider.alive, '#');
    assert_eq!(glider.row_offset, 0);
    assert_eq!(glider.col_offset, 0);
    assert_eq!(glider.cells().len(), 5);

    let _ = fs::remove_file(&path);
}

#[test]
fn malformed_repository_surfaces_as_such() {
    let path = scratch_file("malformed");
    fs::write(&path, "{ not json").expect("write fixture");

    let library = TemplateLibrary::open(&path);
    assert!(matches!(
        library.load_all(),
        Err(StoreError::Malformed(_))
    ));

    let _ = fs::remove_file(&path);
}
