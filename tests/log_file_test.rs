//! LogFile Tests
//!
//! Lines must be visible to an independent reader as soon as `write`
//! returns, before the log is closed.

use artifact_sink::{Error, LogFile};

#[test]
fn test_write_visible_before_close() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("train.log");
    let mut log = LogFile::open(&path).unwrap();

    log.write("hello").unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.ends_with("hello\n"));
    assert!(log.is_open());
}

#[test]
fn test_lines_appended_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("train.log");
    let mut log = LogFile::open(&path).unwrap();

    for epoch in 1..=3 {
        log.write(&format!("epoch {epoch}: loss={:.2}", 1.0 / f64::from(epoch)))
            .unwrap();
    }
    log.close().unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec!["epoch 1: loss=1.00", "epoch 2: loss=0.50", "epoch 3: loss=0.33"]
    );
}

#[test]
fn test_empty_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("train.log");
    let mut log = LogFile::open(&path).unwrap();

    log.write("").unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "\n");
}

#[test]
fn test_write_after_close_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("train.log");
    let mut log = LogFile::open(&path).unwrap();
    log.write("first").unwrap();
    log.close().unwrap();

    let err = log.write("second").unwrap_err();

    assert!(matches!(err, Error::Closed { ref path } if path.ends_with("train.log")));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\n");
}
