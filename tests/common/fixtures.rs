//! Test fixtures - in-memory archives, digests and directory snapshots.

#![allow(dead_code)]

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Build a zip whose entries all live under `root/`, the way source hosts
/// wrap archives.
pub fn wrapped_zip(root: &str, files: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    zip.add_directory(format!("{root}/"), options).unwrap();
    for (name, content) in files {
        zip.start_file(format!("{root}/{name}"), options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Header-only library archive.
pub fn library_zip() -> Vec<u8> {
    wrapped_zip(
        "flat_hash_map-abc123",
        &[
            ("flat_hash_map.hpp", "// flat_hash_map"),
            ("bytell_hash_map.hpp", "// bytell_hash_map"),
            ("unordered_map.hpp", "// unordered_map"),
        ],
    )
}

/// First internal bundle.
pub fn cppconf_zip() -> Vec<u8> {
    wrapped_zip(
        "corp-netflix-spectator-cppconf-def456",
        &[
            ("netflix_config.cc", "// common tags"),
            ("README.md", "internal config"),
        ],
    )
}

/// Second internal bundle.
pub fn extra_zip() -> Vec<u8> {
    wrapped_zip(
        "corp-extra-bundle-789abc",
        &[("extra_config.cc", "// extra"), ("BUILD", "unused")],
    )
}

/// Every regular file under `root`, keyed by relative path.
pub fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(root).unwrap().to_path_buf();
            (rel, std::fs::read(e.path()).unwrap())
        })
        .collect()
}

/// Names of entries directly under `root` (files and directories).
pub fn top_level(root: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(root)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
