//! Shared registries and descriptors for core tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::{json, Map, Value};

use capability_hub::{
    CapabilityDescriptor, CapabilityError, CapabilityRegistry, Dispatcher, ParamSpec, ParamType,
    Payload, RegistryBuilder,
};

/// Route `log` output through the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// `echo(text)` returns its argument unchanged.
pub fn echo_tool() -> CapabilityDescriptor {
    CapabilityDescriptor::tool("echo", |_, args| Ok(Payload::Text(args.str("text")?.to_string())))
        .description("Return the text unchanged")
        .param(ParamSpec::required("text", ParamType::String))
        .build()
        .expect("echo descriptor")
}

/// `add(a, b)` over numbers.
pub fn add_tool() -> CapabilityDescriptor {
    CapabilityDescriptor::tool("add", |_, args| {
        Ok(Payload::from(args.f64("a")? + args.f64("b")?))
    })
    .param(ParamSpec::required("a", ParamType::Number))
    .param(ParamSpec::required("b", ParamType::Number))
    .build()
    .expect("add descriptor")
}

/// A tool whose handler bumps `counter` each time it actually runs.
pub fn counting_tool(counter: Arc<AtomicUsize>) -> CapabilityDescriptor {
    CapabilityDescriptor::tool("count", move |_, args| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(Payload::from(args.f64("value")?))
    })
    .param(ParamSpec::required("value", ParamType::Number))
    .build()
    .expect("count descriptor")
}

pub fn panicking_tool() -> CapabilityDescriptor {
    CapabilityDescriptor::tool("explode", |_, _| -> Result<Payload, CapabilityError> {
        panic!("boom")
    })
    .build()
    .expect("explode descriptor")
}

pub fn greeting_template() -> CapabilityDescriptor {
    CapabilityDescriptor::resource_template("greeting://{name}", |_, args| {
        Ok(Payload::Text(format!("Hello, {}!", args.str("name")?)))
    })
    .mime_type("text/plain")
    .build()
    .expect("greeting template")
}

pub fn build(descriptors: Vec<CapabilityDescriptor>) -> Arc<CapabilityRegistry> {
    let mut builder = RegistryBuilder::new();
    builder.register_all(descriptors).expect("register");
    Arc::new(builder.build())
}

pub fn dispatcher(descriptors: Vec<CapabilityDescriptor>) -> Dispatcher {
    Dispatcher::new(build(descriptors))
}

/// Build an argument map from a `json!` object literal.
pub fn args(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

pub fn no_args() -> Map<String, Value> {
    args(json!({}))
}
