use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn test_cli_create_archive_and_log() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Setup: a small tree with a nested directory
    let source_dir = tempdir()?;
    fs::write(source_dir.path().join("file1.txt"), "Hello, this is the first file.\n")?;
    let nested_dir = source_dir.path().join("nested");
    fs::create_dir(&nested_dir)?;
    fs::write(nested_dir.join("nested_file.dat"), [0, 1, 2, 3, 4, 5])?;

    let out_dir = tempdir()?;
    let archive_path = out_dir.path().join("tree.tar");
    let log_path = out_dir.path().join("run.log");

    // 2. Create the archive
    let mut cmd = Command::cargo_bin("partar")?;
    cmd.arg("--dir")
        .arg(source_dir.path())
        .arg("--out")
        .arg(&archive_path)
        .arg("--workers")
        .arg("4")
        .arg("--log-file")
        .arg(&log_path);
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Archive complete"));

    assert!(archive_path.exists());

    // 3. Read the archive back and check the entry set
    let bytes = fs::read(&archive_path)?;
    let mut archive = tar::Archive::new(&bytes[..]);
    let names: Vec<String> = archive
        .entries()?
        .map(|e| {
            e.unwrap()
                .path()
                .unwrap()
                .to_string_lossy()
                .trim_end_matches('/')
                .to_string()
        })
        .collect();
    assert!(names.contains(&".".to_string()));
    assert!(names.contains(&"file1.txt".to_string()));
    assert!(names.contains(&"nested".to_string()));
    assert!(names.contains(&"nested/nested_file.dat".to_string()));

    // 4. The run must have logged to the requested file
    let log = fs::read_to_string(&log_path)?;
    assert!(log.contains("starting archive run"));
    assert!(log.contains("archive run complete"));

    Ok(())
}

#[test]
fn test_cli_streams_archive_to_stdout() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Setup
    let source_dir = tempdir()?;
    fs::write(source_dir.path().join("data.txt"), "streamed")?;
    let out_dir = tempdir()?;
    let log_path = out_dir.path().join("run.log");

    // 2. `-` sends the tar stream to stdout
    let mut cmd = Command::cargo_bin("partar")?;
    cmd.arg("--dir")
        .arg(source_dir.path())
        .arg("--out")
        .arg("-")
        .arg("--log-file")
        .arg(&log_path);
    let output = cmd.output()?;
    assert!(output.status.success());

    // 3. Stdout must be a readable tar archive
    let mut archive = tar::Archive::new(&output.stdout[..]);
    let mut found_data = false;
    for entry in archive.entries()? {
        let entry = entry?;
        if entry.path()?.to_string_lossy().contains("data.txt") {
            found_data = true;
        }
    }
    assert!(found_data, "data.txt should be in the streamed archive");

    Ok(())
}

#[test]
fn test_cli_missing_source_dir_fails() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = tempdir()?;

    let mut cmd = Command::cargo_bin("partar")?;
    cmd.arg("--dir")
        .arg("/definitely/not/a/real/dir")
        .arg("--out")
        .arg(out_dir.path().join("never.tar"))
        .arg("--log-file")
        .arg(out_dir.path().join("run.log"));
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Error"));

    Ok(())
}

#[test]
fn test_cli_rejects_zero_workers() -> Result<(), Box<dyn std::error::Error>> {
    let source_dir = tempdir()?;
    let out_dir = tempdir()?;

    let mut cmd = Command::cargo_bin("partar")?;
    cmd.arg("--dir")
        .arg(source_dir.path())
        .arg("--out")
        .arg(out_dir.path().join("never.tar"))
        .arg("--workers")
        .arg("0")
        .arg("--log-file")
        .arg(out_dir.path().join("run.log"));
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("workers must be at least 1"));

    Ok(())
}
