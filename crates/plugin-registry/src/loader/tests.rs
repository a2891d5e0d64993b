//! Unit tests for library discovery and module loading.

use std::fs;
use std::num::NonZeroU64;
use std::path::{Path, PathBuf};

use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::memory::StaticLoader;
use super::*;

#[fixture]
fn plugin_dir() -> TempDir {
    let dir = TempDir::new().expect("create temp dir");
    for name in ["libzeta.so", "libalpha.so", "beta.dylib", "gamma.dll", "notes.txt"] {
        fs::write(dir.path().join(name), b"not really a library").expect("write file");
    }
    fs::create_dir(dir.path().join("nested.so")).expect("create dir");
    dir
}

struct CountingSink {
    accepted: Vec<String>,
}

impl CreatorSink for CountingSink {
    fn register_creator(&mut self, creator: Arc<dyn PluginCreator>, namespace: &str) -> bool {
        self.accepted.push(format!("{}@{namespace}", creator.name()));
        true
    }
}

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

#[test]
fn handle_displays_token() {
    let handle = LibraryHandle::new(NonZeroU64::MIN);
    assert_eq!(handle.get(), 1);
    assert_eq!(handle.to_string(), "lib#1");
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

#[rstest]
#[case::shared_object("libfoo.so", true)]
#[case::mach_o("libfoo.dylib", true)]
#[case::windows("foo.dll", true)]
#[case::versioned_so("libfoo.so.1", false)]
#[case::static_archive("libfoo.a", false)]
#[case::no_extension("libfoo", false)]
fn recognises_dynamic_library_extensions(#[case] name: &str, #[case] expected: bool) {
    assert_eq!(is_dynamic_library(Path::new(name)), expected);
}

#[rstest]
fn discovers_libraries_sorted_and_skips_directories(plugin_dir: TempDir) {
    let found = discover_libraries(plugin_dir.path()).expect("discover");
    let names: Vec<String> = found
        .iter()
        .filter_map(|path| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["beta.dylib", "gamma.dll", "libalpha.so", "libzeta.so"]);
}

#[test]
fn discovery_of_missing_directory_fails() {
    let dir = TempDir::new().expect("create temp dir");
    let missing = dir.path().join("absent");
    assert!(discover_libraries(&missing).is_err());
}

// ---------------------------------------------------------------------------
// Dynamic loader
// ---------------------------------------------------------------------------

#[test]
fn dylib_loader_rejects_missing_path() {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("libabsent.so");
    let error = DylibLoader
        .open(&path)
        .err()
        .expect("missing library should fail");
    assert!(
        matches!(error, RegistryError::LoadFailure { .. }),
        "expected LoadFailure, got: {error}"
    );
}

#[rstest]
fn dylib_loader_rejects_non_library_file(plugin_dir: TempDir) {
    let path: PathBuf = plugin_dir.path().join("libalpha.so");
    let error = DylibLoader
        .open(&path)
        .err()
        .expect("garbage file should fail");
    assert!(
        matches!(error, RegistryError::LoadFailure { ref source, .. } if source.is_some()),
        "expected LoadFailure with loader source, got: {error}"
    );
}

// ---------------------------------------------------------------------------
// In-memory loader
// ---------------------------------------------------------------------------

#[test]
fn static_loader_registers_declared_creators() {
    let loader = StaticLoader::new();
    loader.add_module("/plugins/libact.so", "act", &[("Relu", "1"), ("Gelu", "1")]);

    let module = loader.open(Path::new("/plugins/libact.so")).expect("open");
    assert_eq!(loader.open_modules(), 1);

    let mut sink = CountingSink {
        accepted: Vec::new(),
    };
    module.register(&mut sink);
    assert_eq!(sink.accepted, vec!["Relu@act", "Gelu@act"]);

    drop(module);
    assert_eq!(loader.open_modules(), 0);
}

#[test]
fn static_loader_rejects_unknown_path() {
    let loader = StaticLoader::new();
    let error = loader
        .open(Path::new("/plugins/libnone.so"))
        .err()
        .expect("unknown module should fail");
    assert!(matches!(error, RegistryError::LoadFailure { .. }));
    assert_eq!(loader.open_modules(), 0);
}
