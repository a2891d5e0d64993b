//! Crate-level integration and BDD tests.

use std::path::Path;
use std::sync::Arc;

use crate::loader::memory::StaticLoader;
use crate::test_support::StubCreator;
use crate::{
    BufferedErrorRecorder, ErrorCode, ErrorRecorder, FieldValue, PluginField, PluginRegistry,
    Registry,
};

mod behaviour;

#[test]
fn end_to_end_create_and_deserialize() {
    let loader = StaticLoader::new();
    loader.add_module("/plugins/libcodec.so", "codec", &[("Pack", "1")]);
    let registry = Registry::new().with_loader(loader.clone());
    assert!(registry.register_creator(StubCreator::shared("Foo", "1"), "ns"));
    let handle = registry
        .load_library(Path::new("/plugins/libcodec.so"))
        .expect("library loads");

    let creator = registry
        .get_plugin_creator("Pack", "1", "codec")
        .expect("library creator");
    let fields = [PluginField::new("payload", FieldValue::Char("abc".to_owned()))];
    let plugin = creator
        .create_plugin("pack0", &fields)
        .expect("plugin object");
    assert_eq!(plugin.plugin_type(), "Pack");
    assert_eq!(plugin.serialize(), b"abc".to_vec());

    let restored = creator
        .deserialize_plugin("pack1", &plugin.serialize())
        .expect("restored object");
    assert_eq!(restored.plugin_version(), "1");
    assert_eq!(restored.serialize(), b"abc".to_vec());

    drop(creator);
    registry.deregister_library(handle);
    assert_eq!(loader.open_modules(), 0);
    assert_eq!(registry.len(), 1);
}

#[test]
fn child_failures_reach_only_the_child_recorder() {
    let parent_recorder = Arc::new(BufferedErrorRecorder::new());
    let child_recorder = Arc::new(BufferedErrorRecorder::new());
    let parent = Arc::new(Registry::new());
    parent.set_error_recorder(Some(parent_recorder.clone()));
    let child = Registry::new().with_parent(parent.clone());
    child.set_error_recorder(Some(child_recorder.clone()));

    assert!(child.register_creator(StubCreator::shared("Foo", "1"), ""));
    assert!(!child.register_creator(StubCreator::shared("Foo", "1"), ""));

    assert_eq!(child_recorder.num_errors(), 1);
    assert_eq!(child_recorder.error_code(0), Some(ErrorCode::InvalidArgument));
    assert_eq!(parent_recorder.num_errors(), 0);
}
