//! Static build requirements
//!
//! Compiled dependencies and build settings handed to the package manager.
//! This is data, not behavior: the pipeline never reads it, and the
//! `requirements` subcommand only prints it.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirement {
    pub name: &'static str,
    pub version: &'static str,
}

impl Requirement {
    pub const fn new(name: &'static str, version: &'static str) -> Self {
        Self { name, version }
    }

    /// `name/version`, the form the package manager expects.
    pub fn reference(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }
}

pub const REQUIREMENTS: &[Requirement] = &[
    Requirement::new("abseil", "20210324.2"),
    Requirement::new("asio", "1.18.1"),
    Requirement::new("backward-cpp", "1.6"),
    Requirement::new("benchmark", "1.5.6"),
    Requirement::new("c-ares", "1.15.0"),
    Requirement::new("fmt", "7.1.3"),
    Requirement::new("gtest", "1.10.0"),
    Requirement::new("libcurl", "7.74.0"),
    Requirement::new("rapidjson", "1.1.0"),
    Requirement::new("spdlog", "1.8.0"),
    Requirement::new("tsl-hopscotch-map", "2.3.0"),
    Requirement::new("xxhash", "0.8.0"),
    Requirement::new("zlib", "1.2.11"),
];

/// Settings the package manager varies binaries on.
pub const SETTINGS: &[&str] = &["os", "compiler", "build_type", "arch"];

/// Build-system integration the package manager generates.
pub const GENERATOR: &str = "cmake";
