//! Build arguments - the flat record handed to the build engine.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::path_set::PathSet;

/// Kind of artifact a build produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BuildTargetType {
    #[default]
    Executable,
    StaticLibrary,
    DynamicLibrary,
}

/// Optimization level for the build.
///
/// The integer encoding used by build tables is `0 = None`, `1 = Speed`,
/// `2 = Size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OptimizationLevel {
    #[default]
    None,
    Speed,
    Size,
}

impl OptimizationLevel {
    pub fn from_integer(value: i64) -> Option<Self> {
        match value {
            0 => Some(OptimizationLevel::None),
            1 => Some(OptimizationLevel::Speed),
            2 => Some(OptimizationLevel::Size),
            _ => None,
        }
    }
}

impl FromStr for OptimizationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(OptimizationLevel::None),
            "speed" => Ok(OptimizationLevel::Speed),
            "size" => Ok(OptimizationLevel::Size),
            _ => Err(format!("unknown optimization level: {}", s)),
        }
    }
}

/// C++ language standard for native test builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LanguageStandard {
    Cpp11,
    Cpp14,
    Cpp17,
    Cpp20,
}

impl LanguageStandard {
    /// Integer tables use the two-digit year (`17` for C++17), not the
    /// position of the variant in this enum.
    pub fn from_integer(value: i64) -> Option<Self> {
        match value {
            11 => Some(LanguageStandard::Cpp11),
            14 => Some(LanguageStandard::Cpp14),
            17 => Some(LanguageStandard::Cpp17),
            20 => Some(LanguageStandard::Cpp20),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageStandard::Cpp11 => "c++11",
            LanguageStandard::Cpp14 => "c++14",
            LanguageStandard::Cpp17 => "c++17",
            LanguageStandard::Cpp20 => "c++20",
        }
    }
}

impl fmt::Display for LanguageStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LanguageStandard {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_lowercase().replace("cpp", "c++");
        match normalized.trim_start_matches("c++") {
            "11" => Ok(LanguageStandard::Cpp11),
            "14" => Ok(LanguageStandard::Cpp14),
            "17" => Ok(LanguageStandard::Cpp17),
            "20" => Ok(LanguageStandard::Cpp20),
            _ => Err(format!("unknown language standard: {}", s)),
        }
    }
}

/// Resolved compile/link/test configuration for one target.
///
/// Path-valued dependency sets are [`PathSet`]s and only ever grow through
/// merging. `source_files` keeps recipe order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildArguments {
    pub target_name: String,
    pub target_type: BuildTargetType,
    pub target_architecture: String,

    pub source_root_directory: PathBuf,
    pub target_root_directory: PathBuf,
    pub object_directory: PathBuf,
    pub binary_directory: PathBuf,

    pub source_files: Vec<PathBuf>,

    pub include_directories: PathSet,
    pub library_paths: PathSet,
    pub link_dependencies: PathSet,
    pub runtime_dependencies: PathSet,
    pub module_dependencies: PathSet,
    pub platform_link_dependencies: PathSet,
    pub preprocessor_definitions: BTreeSet<String>,

    pub optimization_level: OptimizationLevel,
    pub generate_source_debug_info: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_standard: Option<LanguageStandard>,
}

impl BuildArguments {
    /// Add preprocessor definitions, skipping ones already present.
    pub fn add_preprocessor_definitions(&mut self, definitions: impl IntoIterator<Item = String>) {
        self.preprocessor_definitions.extend(definitions);
    }

    /// Move object and binary output under a subdirectory of their current location.
    pub fn redirect_output(&mut self, subdirectory: &str) {
        self.object_directory = self.object_directory.join(subdirectory);
        self.binary_directory = self.binary_directory.join(subdirectory);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = BuildArguments::default();
        assert_eq!(args.optimization_level, OptimizationLevel::None);
        assert!(!args.generate_source_debug_info);
        assert!(args.language_standard.is_none());
        assert_eq!(args.target_type, BuildTargetType::Executable);
    }

    #[test]
    fn test_optimization_level_parse() {
        assert_eq!(OptimizationLevel::from_integer(0), Some(OptimizationLevel::None));
        assert_eq!(OptimizationLevel::from_integer(2), Some(OptimizationLevel::Size));
        assert_eq!(OptimizationLevel::from_integer(7), None);
        assert_eq!("Speed".parse::<OptimizationLevel>(), Ok(OptimizationLevel::Speed));
        assert!("fast".parse::<OptimizationLevel>().is_err());
    }

    #[test]
    fn test_language_standard_parse() {
        assert_eq!(LanguageStandard::from_integer(17), Some(LanguageStandard::Cpp17));
        assert_eq!(LanguageStandard::from_integer(3), None);
        assert_eq!("C++20".parse::<LanguageStandard>(), Ok(LanguageStandard::Cpp20));
        assert_eq!("cpp14".parse::<LanguageStandard>(), Ok(LanguageStandard::Cpp14));
        assert_eq!("11".parse::<LanguageStandard>(), Ok(LanguageStandard::Cpp11));
        assert!("c++98".parse::<LanguageStandard>().is_err());
    }

    #[test]
    fn test_redirect_output() {
        let mut args = BuildArguments {
            object_directory: PathBuf::from("/out/obj"),
            binary_directory: PathBuf::from("/out/bin/"),
            ..Default::default()
        };
        args.redirect_output("Test/");

        assert_eq!(args.object_directory, PathBuf::from("/out/obj/Test/"));
        assert_eq!(args.object_directory.to_string_lossy(), "/out/obj/Test/");
        assert_eq!(args.binary_directory.to_string_lossy(), "/out/bin/Test/");
    }

    #[test]
    fn test_preprocessor_definitions_deduplicate() {
        let mut args = BuildArguments::default();
        args.add_preprocessor_definitions(vec!["UNIT".to_string(), "DEBUG".to_string()]);
        args.add_preprocessor_definitions(vec!["DEBUG".to_string()]);
        assert_eq!(
            args.preprocessor_definitions.iter().collect::<Vec<_>>(),
            vec!["DEBUG", "UNIT"]
        );

        let json = serde_json::to_value(&args).unwrap();
        assert_eq!(json["preprocessor_definitions"], serde_json::json!(["DEBUG", "UNIT"]));
    }
}
