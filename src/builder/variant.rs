//! Test build variants.
//!
//! The native and managed test builds share one task. A [`TestVariant`]
//! captures what differs between them: which properties are required, how
//! the produced harness is launched, and which compilers are registered by
//! default.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::builder::compiler::{Compiler, CompilerRegistry, MsvcCompiler, RoslynCompiler};
use crate::core::arguments::BuildArguments;

/// Default location of the managed runtime launcher.
pub const DEFAULT_DOTNET_LAUNCHER: &str = "C:/Program Files/dotnet/dotnet.exe";

/// Which flavor of test build to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantKind {
    /// Directly executable harness (C++)
    #[default]
    Native,
    /// Harness run through a runtime launcher (C#)
    Managed,
}

impl VariantKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariantKind::Native => "native",
            VariantKind::Managed => "managed",
        }
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariantKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "native" | "cpp" | "c++" => Ok(VariantKind::Native),
            "managed" | "csharp" | "c#" => Ok(VariantKind::Managed),
            _ => Err(format!("unknown test variant: {} (expected native or managed)", s)),
        }
    }
}

/// How the test harness is started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launch {
    /// The target file is itself the program.
    Native,
    /// The target file is passed to a launcher program.
    Launcher {
        program: PathBuf,
        /// Whether a `<target>.runtimeconfig.json` must sit next to the binary
        runtime_config: bool,
    },
}

/// Variant policy for the test build task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestVariant {
    pub kind: VariantKind,
    pub launch: Launch,
    /// `Build.LanguageStandard` must be present
    pub requires_language_standard: bool,
}

impl TestVariant {
    pub fn native() -> Self {
        TestVariant {
            kind: VariantKind::Native,
            launch: Launch::Native,
            requires_language_standard: true,
        }
    }

    pub fn managed(launcher: impl Into<PathBuf>) -> Self {
        TestVariant {
            kind: VariantKind::Managed,
            launch: Launch::Launcher {
                program: launcher.into(),
                runtime_config: true,
            },
            requires_language_standard: false,
        }
    }

    /// Build the variant for `kind`, using `launcher` for managed builds.
    pub fn for_kind(kind: VariantKind, launcher: Option<&Path>) -> Self {
        match kind {
            VariantKind::Native => TestVariant::native(),
            VariantKind::Managed => TestVariant::managed(
                launcher
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_DOTNET_LAUNCHER)),
            ),
        }
    }

    /// Compilers registered when the caller supplies none.
    pub fn default_compilers(&self) -> CompilerRegistry {
        match self.kind {
            VariantKind::Native => CompilerRegistry::new().with("MSVC", |state| {
                Ok(Box::new(MsvcCompiler::from_active_state(state)?) as Box<dyn Compiler>)
            }),
            // Parameter tables name the toolchain family, so the managed compiler is keyed as MSVC too
            VariantKind::Managed => CompilerRegistry::new().with("MSVC", |state| {
                Ok(Box::new(RoslynCompiler::from_active_state(state)?) as Box<dyn Compiler>)
            }),
        }
    }

    /// Program and argument string that run `target_file`.
    pub fn run_command(&self, target_file: &Path) -> (PathBuf, String) {
        match &self.launch {
            Launch::Native => (target_file.to_path_buf(), String::new()),
            Launch::Launcher { program, .. } => {
                (program.clone(), target_file.to_string_lossy().into_owned())
            }
        }
    }

    /// Extra files the host runtime needs to run the harness.
    pub fn launcher_files(&self, arguments: &BuildArguments) -> Vec<PathBuf> {
        match &self.launch {
            Launch::Native => Vec::new(),
            Launch::Launcher {
                program,
                runtime_config,
            } => {
                let mut files = vec![program.clone()];
                if *runtime_config {
                    files.push(
                        arguments
                            .binary_directory
                            .join(format!("{}.runtimeconfig.json", arguments.target_name)),
                    );
                }
                files
            }
        }
    }
}
