//! Compiler abstraction and the compiler registry.
//!
//! A [`Compiler`] turns resolved [`BuildArguments`] into the operations that
//! produce the test harness. Compilers here only describe programs and the
//! files they touch; translating build options into tool flags belongs to the
//! main build task.
//!
//! Compilers are created by name through a [`CompilerRegistry`], which is
//! built once and handed to the task at construction time.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Result};

use crate::core::arguments::{BuildArguments, BuildTargetType};
use crate::core::operation::BuildOperation;
use crate::core::path_set::PathSet;
use crate::core::value::ValueTable;

/// Trait for compiler implementations.
pub trait Compiler {
    /// Name used in traces.
    fn name(&self) -> &str;

    /// File name of the artifact this compiler produces for `arguments`.
    fn target_file_name(&self, arguments: &BuildArguments) -> String;

    /// Operations that produce `target_file`, in execution order.
    fn create_operations(
        &self,
        arguments: &BuildArguments,
        target_file: &Path,
    ) -> Result<Vec<BuildOperation>>;
}

/// Creates a compiler from the active build state.
pub type CompilerFactory = Box<dyn Fn(&ValueTable) -> Result<Box<dyn Compiler>>>;

/// Named compiler factories.
#[derive(Default)]
pub struct CompilerRegistry {
    factories: BTreeMap<String, CompilerFactory>,
}

impl fmt::Debug for CompilerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilerRegistry")
            .field("compilers", &self.names())
            .finish()
    }
}

impl CompilerRegistry {
    pub fn new() -> Self {
        CompilerRegistry {
            factories: BTreeMap::new(),
        }
    }

    /// Register a factory under `name`, replacing any earlier one.
    pub fn with<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&ValueTable) -> Result<Box<dyn Compiler>> + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered compiler names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// Create the compiler registered as `name`.
    ///
    /// Returns `None` when no such compiler is registered.
    pub fn create(&self, name: &str, active_state: &ValueTable) -> Option<Result<Box<dyn Compiler>>> {
        self.factories.get(name).map(|factory| factory(active_state))
    }
}

/// Read a tool path from the active state, falling back to a bare program name.
///
/// A bare name is resolved by the host from its search path when the
/// operation runs.
fn tool_path(active_state: &ValueTable, key: &str, fallback: &str) -> Result<PathBuf> {
    match active_state.lookup(key) {
        Some(value) => match value.as_str() {
            Ok(path) => Ok(PathBuf::from(path)),
            Err(e) => bail!("`{}` must be a path string: {}", key, e),
        },
        None => {
            tracing::debug!("`{}` not set, using `{}`", key, fallback);
            Ok(PathBuf::from(fallback))
        }
    }
}

fn quote(path: &Path) -> String {
    format!("\"{}\"", path.display())
}

/// MSVC compiler for native test harnesses.
#[derive(Debug, Clone)]
pub struct MsvcCompiler {
    /// Path to cl.exe (compiler)
    pub cl: PathBuf,
    /// Path to link.exe (linker)
    pub link: PathBuf,
    /// Path to lib.exe (librarian)
    pub lib: PathBuf,
}

impl MsvcCompiler {
    pub fn new(cl: PathBuf, link: PathBuf, lib: PathBuf) -> Self {
        MsvcCompiler { cl, link, lib }
    }

    /// Create from `MSVC.ClToolPath`, `MSVC.LinkToolPath` and `MSVC.LibToolPath`.
    pub fn from_active_state(active_state: &ValueTable) -> Result<Self> {
        Ok(MsvcCompiler::new(
            tool_path(active_state, "MSVC.ClToolPath", "cl.exe")?,
            tool_path(active_state, "MSVC.LinkToolPath", "link.exe")?,
            tool_path(active_state, "MSVC.LibToolPath", "lib.exe")?,
        ))
    }

    /// Object file for `source`, always inside the object directory.
    ///
    /// Sources outside the source root keep only their normal path segments,
    /// so roots, prefixes and `..` never climb out.
    fn object_file(&self, arguments: &BuildArguments, source: &Path) -> PathBuf {
        let relative = source
            .strip_prefix(&arguments.source_root_directory)
            .unwrap_or(source);
        let contained: PathBuf = relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(segment) => Some(segment),
                _ => None,
            })
            .collect();
        arguments.object_directory.join(contained.with_extension("obj"))
    }
}

impl Compiler for MsvcCompiler {
    fn name(&self) -> &str {
        "MSVC"
    }

    fn target_file_name(&self, arguments: &BuildArguments) -> String {
        let extension = match arguments.target_type {
            BuildTargetType::Executable => "exe",
            BuildTargetType::StaticLibrary => "lib",
            BuildTargetType::DynamicLibrary => "dll",
        };
        format!("{}.{}", arguments.target_name, extension)
    }

    fn create_operations(
        &self,
        arguments: &BuildArguments,
        target_file: &Path,
    ) -> Result<Vec<BuildOperation>> {
        let mut operations = Vec::with_capacity(arguments.source_files.len() + 1);
        let mut objects = PathSet::new();

        for source in &arguments.source_files {
            let source_file = arguments.source_root_directory.join(source);
            let object_file = self.object_file(arguments, source);

            operations.push(BuildOperation::new(
                format!("Compile - {}", source.display()),
                &arguments.source_root_directory,
                &self.cl,
                format!("/nologo /c {} /Fo{}", quote(&source_file), quote(&object_file)),
                PathSet::unique([source_file]),
                PathSet::unique([object_file.clone()]),
            ));
            objects.insert(object_file);
        }

        let (program, mut link_arguments) = match arguments.target_type {
            BuildTargetType::StaticLibrary => (&self.lib, String::from("/nologo")),
            BuildTargetType::DynamicLibrary => (&self.link, String::from("/nologo /DLL")),
            BuildTargetType::Executable => (&self.link, String::from("/nologo")),
        };
        link_arguments.push_str(&format!(" /OUT:{}", quote(target_file)));

        // Link dependencies are inputs only for real links; an archive just bundles objects
        let mut inputs = objects.clone();
        for object in &objects {
            link_arguments.push_str(&format!(" {}", quote(object)));
        }
        if arguments.target_type != BuildTargetType::StaticLibrary {
            for dependency in &arguments.link_dependencies {
                link_arguments.push_str(&format!(" {}", quote(dependency)));
                inputs.insert(dependency);
            }
        }

        operations.push(BuildOperation::new(
            format!("Link - {}", arguments.target_name),
            &arguments.target_root_directory,
            program,
            link_arguments,
            inputs,
            PathSet::unique([target_file]),
        ));

        Ok(operations)
    }
}

/// Roslyn (csc) compiler for managed test harnesses.
#[derive(Debug, Clone)]
pub struct RoslynCompiler {
    /// Path to csc.exe
    pub csc: PathBuf,
}

impl RoslynCompiler {
    pub fn new(csc: PathBuf) -> Self {
        RoslynCompiler { csc }
    }

    /// Create from `Roslyn.CscToolPath`.
    pub fn from_active_state(active_state: &ValueTable) -> Result<Self> {
        Ok(RoslynCompiler::new(tool_path(
            active_state,
            "Roslyn.CscToolPath",
            "csc.exe",
        )?))
    }
}

impl Compiler for RoslynCompiler {
    fn name(&self) -> &str {
        "Roslyn"
    }

    fn target_file_name(&self, arguments: &BuildArguments) -> String {
        // Managed executables are launched through the host runtime, so they are dlls too
        format!("{}.dll", arguments.target_name)
    }

    fn create_operations(
        &self,
        arguments: &BuildArguments,
        target_file: &Path,
    ) -> Result<Vec<BuildOperation>> {
        let target_kind = match arguments.target_type {
            BuildTargetType::Executable => "exe",
            BuildTargetType::DynamicLibrary => "library",
            BuildTargetType::StaticLibrary => {
                bail!("managed builds cannot produce static libraries")
            }
        };

        let mut command = format!(
            "/nologo /noconfig /target:{} /out:{}",
            target_kind,
            quote(target_file)
        );
        let mut inputs = PathSet::new();

        for reference in &arguments.link_dependencies {
            command.push_str(&format!(" /reference:{}", quote(reference)));
            inputs.insert(reference);
        }

        for source in &arguments.source_files {
            let source_file = arguments.source_root_directory.join(source);
            command.push_str(&format!(" {}", quote(&source_file)));
            inputs.insert(source_file);
        }

        Ok(vec![BuildOperation::new(
            format!("Compile - {}", arguments.target_name),
            &arguments.source_root_directory,
            &self.csc,
            command,
            inputs,
            PathSet::unique([target_file]),
        )])
    }
}
