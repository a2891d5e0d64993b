//! Behaviour-driven tests for creator lifecycle and library loading.

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::Arc;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::loader::memory::StaticLoader;
use crate::test_support::StubCreator;
use crate::{
    BufferedErrorRecorder, CreatorIdentity, ErrorRecorder, LibraryHandle, PluginRegistry, Registry,
};

// ---------------------------------------------------------------------------
// Test world
// ---------------------------------------------------------------------------

#[derive(Default)]
struct TestWorld {
    loader: StaticLoader,
    registry: Option<Registry>,
    recorder: Option<Arc<BufferedErrorRecorder>>,
    parent: Option<Arc<Registry>>,
    registrations: Vec<bool>,
    loaded: Option<Option<LibraryHandle>>,
}

impl TestWorld {
    fn registry(&self) -> &Registry {
        self.registry.as_ref().expect("registry should be set up")
    }
}

#[fixture]
fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::default())
}

fn strip_quotes(s: &str) -> &str {
    s.trim_matches('"')
}

// ---------------------------------------------------------------------------
// Given steps
// ---------------------------------------------------------------------------

#[given("an empty registry with a buffered error recorder")]
fn given_empty_registry(world: &RefCell<TestWorld>) {
    let mut w = world.borrow_mut();
    let recorder = Arc::new(BufferedErrorRecorder::new());
    let registry = Registry::new().with_loader(w.loader.clone());
    registry.set_error_recorder(Some(recorder.clone()));
    w.registry = Some(registry);
    w.recorder = Some(recorder);
}

#[given("a library {path} providing {names} in namespace {namespace}")]
fn given_library(world: &RefCell<TestWorld>, path: String, names: String, namespace: String) {
    let w = world.borrow();
    let creators: Vec<(&str, &str)> = strip_quotes(&names)
        .split(',')
        .map(|name| (name.trim(), "1"))
        .collect();
    w.loader
        .add_module(strip_quotes(&path), strip_quotes(&namespace), &creators);
}

#[given("a parent registry holding creator {name} version {version} in namespace {namespace}")]
fn given_parent(world: &RefCell<TestWorld>, name: String, version: String, namespace: String) {
    let parent = Arc::new(Registry::new());
    let registered = parent.register_creator(
        StubCreator::shared(strip_quotes(&name), strip_quotes(&version)),
        strip_quotes(&namespace),
    );
    assert!(registered, "parent registration should succeed");
    world.borrow_mut().parent = Some(parent);
}

#[given("a child registry of that parent")]
fn given_child(world: &RefCell<TestWorld>) {
    let mut w = world.borrow_mut();
    let parent = w.parent.clone().expect("parent should be set up");
    w.registry = Some(Registry::new().with_parent(parent));
}

// ---------------------------------------------------------------------------
// When steps
// ---------------------------------------------------------------------------

#[when("creator {name} version {version} is registered in namespace {namespace}")]
fn when_register(world: &RefCell<TestWorld>, name: String, version: String, namespace: String) {
    let mut w = world.borrow_mut();
    let outcome = w.registry().register_creator(
        StubCreator::shared(strip_quotes(&name), strip_quotes(&version)),
        strip_quotes(&namespace),
    );
    w.registrations.push(outcome);
}

#[when("creator {name} version {version} is deregistered from namespace {namespace}")]
fn when_deregister(world: &RefCell<TestWorld>, name: String, version: String, namespace: String) {
    let w = world.borrow();
    let identity = CreatorIdentity::new(
        strip_quotes(&name),
        strip_quotes(&version),
        strip_quotes(&namespace),
    );
    assert!(w.registry().deregister_creator(&identity));
}

#[when("library {path} is loaded")]
fn when_load(world: &RefCell<TestWorld>, path: String) {
    let mut w = world.borrow_mut();
    let handle = w
        .registry()
        .load_library(&PathBuf::from(strip_quotes(&path)));
    w.loaded = Some(handle);
}

#[when("the loaded library is deregistered")]
fn when_deregister_library(world: &RefCell<TestWorld>) {
    let w = world.borrow();
    let handle = w.loaded.flatten().expect("a library should be loaded");
    w.registry().deregister_library(handle);
}

#[when("parent search is disabled")]
fn when_disable_parent_search(world: &RefCell<TestWorld>) {
    world.borrow().registry().set_parent_search_enabled(false);
}

// ---------------------------------------------------------------------------
// Then steps
// ---------------------------------------------------------------------------

#[then("registration {index} succeeded")]
fn then_registration_succeeded(world: &RefCell<TestWorld>, index: usize) {
    let w = world.borrow();
    let outcome = w.registrations.get(index - 1).copied();
    assert_eq!(outcome, Some(true), "registration {index} should succeed");
}

#[then("registration {index} failed")]
fn then_registration_failed(world: &RefCell<TestWorld>, index: usize) {
    let w = world.borrow();
    let outcome = w.registrations.get(index - 1).copied();
    assert_eq!(outcome, Some(false), "registration {index} should fail");
}

#[then("the registry lists {count} creator(s)")]
fn then_lists(world: &RefCell<TestWorld>, count: usize) {
    let listed = world.borrow().registry().get_plugin_creator_list().len();
    assert_eq!(listed, count, "expected {count} creators, got {listed}");
}

#[then("the recorder holds {count} error(s)")]
fn then_recorder_holds(world: &RefCell<TestWorld>, count: usize) {
    let w = world.borrow();
    let recorder = w.recorder.as_ref().expect("recorder should be set up");
    assert_eq!(recorder.num_errors(), count);
}

#[then("looking up {name} version {version} in namespace {namespace} finds nothing")]
fn then_finds_nothing(world: &RefCell<TestWorld>, name: String, version: String, namespace: String) {
    let found = world.borrow().registry().get_plugin_creator(
        strip_quotes(&name),
        strip_quotes(&version),
        strip_quotes(&namespace),
    );
    assert!(found.is_none(), "lookup should miss");
}

#[then("looking up {name} version {version} in namespace {namespace} finds a creator")]
fn then_finds_creator(world: &RefCell<TestWorld>, name: String, version: String, namespace: String) {
    let found = world.borrow().registry().get_plugin_creator(
        strip_quotes(&name),
        strip_quotes(&version),
        strip_quotes(&namespace),
    );
    let creator = found.expect("lookup should hit");
    assert_eq!(creator.name(), strip_quotes(&name));
}

#[then("the library load succeeded")]
fn then_load_succeeded(world: &RefCell<TestWorld>) {
    let loaded = world.borrow().loaded;
    assert!(matches!(loaded, Some(Some(_))), "library should load");
}

#[then("the library load failed")]
fn then_load_failed(world: &RefCell<TestWorld>) {
    let loaded = world.borrow().loaded;
    assert_eq!(loaded, Some(None), "library load should fail");
}

#[then("no library modules remain open")]
fn then_no_modules_open(world: &RefCell<TestWorld>) {
    assert_eq!(world.borrow().loader.open_modules(), 0);
}

// ---------------------------------------------------------------------------
// Scenario registration
// ---------------------------------------------------------------------------

#[scenario(
    path = "tests/features/creator_lifecycle.feature",
    name = "A duplicate identity is rejected"
)]
fn duplicate_identity_rejected(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/creator_lifecycle.feature",
    name = "A deregistered creator can no longer be found"
)]
fn deregistered_creator_not_found(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/creator_lifecycle.feature",
    name = "A child registry falls back to its parent"
)]
fn child_falls_back_to_parent(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/library_loading.feature",
    name = "A library contributes its creators"
)]
fn library_contributes_creators(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/library_loading.feature",
    name = "A conflicting library registers nothing"
)]
fn conflicting_library_registers_nothing(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/library_loading.feature",
    name = "Deregistering a library removes its creators"
)]
fn deregistering_library_removes_creators(world: RefCell<TestWorld>) {
    drop(world);
}
