use std::fs::{self, File};

use pretty_assertions::assert_eq;
use tempfile::tempdir;

use super::*;

fn names(files: &[SqlFile]) -> Vec<String> {
    files
        .iter()
        .filter_map(|file| file.path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect()
}

#[test]
fn empty_dir() {
    let dir = tempdir().unwrap();
    assert!(discover(dir.path(), FileKind::Fixture).is_empty());
    assert!(discover(dir.path(), FileKind::Sample).is_empty());
}

#[test]
fn fixtures_and_samples_are_disjoint() {
    let dir = tempdir().unwrap();
    File::create(dir.path().join("keywords.test.sql")).unwrap();
    File::create(dir.path().join("schema.sql")).unwrap();
    File::create(dir.path().join("notes.txt")).unwrap();

    let fixtures = discover(dir.path(), FileKind::Fixture);
    let samples = discover(dir.path(), FileKind::Sample);
    assert_eq!(names(&fixtures), vec!["keywords.test.sql"]);
    assert_eq!(names(&samples), vec!["schema.sql"]);
}

#[test]
fn sorted_and_recursive() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("b");
    fs::create_dir(&sub).unwrap();
    File::create(dir.path().join("c.test.sql")).unwrap();
    File::create(sub.join("a.test.sql")).unwrap();
    File::create(dir.path().join("a.test.sql")).unwrap();

    let files = discover(dir.path(), FileKind::Fixture);
    let relative: Vec<_> = files
        .iter()
        .map(|file| file.path.strip_prefix(dir.path()).unwrap().to_path_buf())
        .collect();
    assert_eq!(
        relative,
        vec![
            PathBuf::from("a.test.sql"),
            PathBuf::from("b/a.test.sql"),
            PathBuf::from("c.test.sql"),
        ]
    );
}

#[test]
fn skip_hidden_and_target() {
    let dir = tempdir().unwrap();
    let hidden = dir.path().join(".hidden");
    let target = dir.path().join("target");
    fs::create_dir(&hidden).unwrap();
    fs::create_dir(&target).unwrap();

    File::create(hidden.join("x.test.sql")).unwrap();
    File::create(target.join("x.test.sql")).unwrap();
    File::create(dir.path().join(".x.test.sql")).unwrap();
    File::create(dir.path().join("real.test.sql")).unwrap();

    let files = discover(dir.path(), FileKind::Fixture);
    assert_eq!(names(&files), vec!["real.test.sql"]);
}

#[test]
fn single_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("one.test.sql");
    File::create(&path).unwrap();

    assert_eq!(
        discover_in(&path, FileKind::Fixture),
        vec![SqlFile::new(path.clone())]
    );
    assert!(discover_in(&path, FileKind::Sample).is_empty());
}

#[test]
fn missing_path() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope");
    assert!(discover_in(&missing, FileKind::Sample).is_empty());
}
