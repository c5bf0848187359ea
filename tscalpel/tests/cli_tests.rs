//! Command-line behaviour of the trackscalpel binary
//!
//! Every invocation points `TRACKSCALPEL_CONFIG` at an empty file so a user
//! configuration on the test machine cannot leak in.

mod helpers;

use std::path::Path;
use std::process::{Command, Output};

use helpers::{chapters_at_seconds, write_ramp_wav, PlaylistBuilder};
use tempfile::TempDir;

fn trackscalpel(dir: &Path, args: &[&str]) -> Output {
    let config = dir.join("empty.toml");
    if !config.exists() {
        std::fs::write(&config, "").unwrap();
    }
    Command::new(env!("CARGO_BIN_EXE_trackscalpel"))
        .args(args)
        .env("TRACKSCALPEL_CONFIG", &config)
        .env_remove("RUST_LOG")
        .current_dir(dir)
        .output()
        .unwrap()
}

fn whole_seconds_playlist(dir: &Path) -> String {
    let path = dir.join("00001.mpls");
    PlaylistBuilder::new()
        .item(27_000_000, 27_450_000)
        .chapter(0, 27_000_000)
        .chapter(0, 27_045_000)
        .chapter(0, 27_135_000)
        .write(&path);
    path.to_string_lossy().into_owned()
}

#[test]
fn test_sample_rate_lists_splits() {
    let dir = TempDir::new().unwrap();
    let playlist = whole_seconds_playlist(dir.path());

    let output = trackscalpel(dir.path(), &["48000", &playlist]);
    assert!(output.status.success(), "{:?}", output);
    assert_eq!(String::from_utf8_lossy(&output.stdout), "0\n48000\n144000\n");
}

#[test]
fn test_cd_flag_aligns_to_sectors() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("00001.mpls");
    PlaylistBuilder::new()
        .item(0, 90_000)
        .chapter(0, 0)
        .chapter(0, 22_500)
        .write(&path);

    let output = trackscalpel(dir.path(), &["--cd", "44100", path.to_str().unwrap()]);
    assert!(output.status.success(), "{:?}", output);
    assert_eq!(String::from_utf8_lossy(&output.stdout), "0\n21756\n");

    let output = trackscalpel(
        dir.path(),
        &["--cd", "-r", "up", "44100", path.to_str().unwrap()],
    );
    assert_eq!(String::from_utf8_lossy(&output.stdout), "0\n22344\n");
}

#[test]
fn test_verbose_prints_timecodes() {
    let dir = TempDir::new().unwrap();
    let playlist = whole_seconds_playlist(dir.path());

    let output = trackscalpel(dir.path(), &["-v", "48000", &playlist]);
    assert!(output.status.success(), "{:?}", output);
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        " 1:   0:00.000000\n 2:   0:01.000000\n 3:   0:03.000000\n0\n48000\n144000\n"
    );
}

#[test]
fn test_align_and_cd_conflict() {
    let dir = TempDir::new().unwrap();
    let playlist = whole_seconds_playlist(dir.path());

    let output = trackscalpel(dir.path(), &["--cd", "-a", "100", "48000", &playlist]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_uneven_alignment_exits_with_config_code() {
    let dir = TempDir::new().unwrap();
    let playlist = whole_seconds_playlist(dir.path());

    let output = trackscalpel(dir.path(), &["-a", "7", "48000", &playlist]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("not evenly divisible"));
}

#[test]
fn test_unusable_soundfile_argument() {
    let dir = TempDir::new().unwrap();
    let playlist = whole_seconds_playlist(dir.path());

    let output = trackscalpel(dir.path(), &["missing.wav", &playlist]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_round_mode_is_parsed_case_insensitively() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("00001.mpls");
    PlaylistBuilder::new()
        .item(0, 90_000)
        .chapter(0, 0)
        .chapter(0, 22_500)
        .write(&path);
    let playlist = path.to_string_lossy().into_owned();

    let output = trackscalpel(dir.path(), &["--cd", "-r", "Nearest", "44100", &playlist]);
    assert!(output.status.success(), "{:?}", output);
    assert_eq!(String::from_utf8_lossy(&output.stdout), "0\n22344\n");

    let output = trackscalpel(dir.path(), &["--cd", "-r", "sideways", "44100", &playlist]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown rounding mode"));
}

#[test]
fn test_non_wav_input_points_at_external() {
    let dir = TempDir::new().unwrap();
    let playlist = whole_seconds_playlist(dir.path());
    let mut bytes = b"fLaC".to_vec();
    bytes.extend_from_slice(&[0u8; 60]);
    std::fs::write(dir.path().join("disc.flac"), bytes).unwrap();

    let output = trackscalpel(dir.path(), &["disc.flac", &playlist]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--external"));
}

#[test]
fn test_missing_playlist_is_fatal() {
    let dir = TempDir::new().unwrap();
    let output = trackscalpel(dir.path(), &["48000", "nope.mpls"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_splits_into_output_dir() {
    let dir = TempDir::new().unwrap();
    let playlist = dir.path().join("00001.mpls");
    chapters_at_seconds(&[0, 1], 2).write(&playlist);
    write_ramp_wav(&dir.path().join("disc.wav"), 8_000, 2, 16_000);

    let output = trackscalpel(
        dir.path(),
        &["-o", "tracks", "disc.wav", playlist.to_str().unwrap()],
    );
    assert!(output.status.success(), "{:?}", output);
    assert!(dir.path().join("tracks/01.wav").exists());
    assert!(dir.path().join("tracks/02.wav").exists());
    assert!(output.stdout.is_empty());

    // A second run skips both and warns about each
    let output = trackscalpel(
        dir.path(),
        &["-o", "tracks", "disc.wav", playlist.to_str().unwrap()],
    );
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("already exists, skipping").count(), 2, "{}", stderr);
}

#[test]
fn test_config_file_supplies_alignment() {
    let dir = TempDir::new().unwrap();
    let playlist = dir.path().join("00001.mpls");
    PlaylistBuilder::new()
        .item(0, 90_000)
        .chapter(0, 0)
        .chapter(0, 22_500)
        .write(&playlist);
    let config = dir.path().join("trackscalpel.toml");
    std::fs::write(&config, "align = 75\nround = \"nearest\"\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_trackscalpel"))
        .args(["44100", playlist.to_str().unwrap()])
        .env("TRACKSCALPEL_CONFIG", &config)
        .env_remove("RUST_LOG")
        .output()
        .unwrap();
    assert!(output.status.success(), "{:?}", output);
    assert_eq!(String::from_utf8_lossy(&output.stdout), "0\n22344\n");
}

#[test]
fn test_bad_config_file_exits_with_config_code() {
    let dir = TempDir::new().unwrap();
    let playlist = whole_seconds_playlist(dir.path());
    let config = dir.path().join("broken.toml");
    std::fs::write(&config, "round = \"sideways\"\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_trackscalpel"))
        .args(["48000", &playlist])
        .env("TRACKSCALPEL_CONFIG", &config)
        .env_remove("RUST_LOG")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}
