//! URI template parsing and first-match resolution.

mod common;

use capability_hub::{match_uri, CapabilityDescriptor, Payload, UriTemplate};

use common::fixtures::{build, greeting_template};

fn template(pattern: &str) -> CapabilityDescriptor {
    CapabilityDescriptor::resource_template(pattern, |_, _| Ok(Payload::from("x")))
        .build()
        .unwrap()
}

#[test]
fn test_extracts_single_placeholder() {
    let t = UriTemplate::parse("config://user/{user_id}").unwrap();
    let params = t.matches("config://user/alice").unwrap();
    assert_eq!(params.get("user_id").map(String::as_str), Some("alice"));
}

#[test]
fn test_extracts_multiple_placeholders() {
    let t = UriTemplate::parse("db://{table}/rows/{id}").unwrap();
    let params = t.matches("db://users/rows/17").unwrap();
    assert_eq!(params["table"], "users");
    assert_eq!(params["id"], "17");
}

#[test]
fn test_placeholder_never_spans_a_slash() {
    let t = UriTemplate::parse("config://user/{user_id}").unwrap();
    assert!(t.matches("config://user/a/b").is_none());
}

#[test]
fn test_literal_mismatch_fails() {
    let t = UriTemplate::parse("config://user/{user_id}").unwrap();
    assert!(t.matches("config://group/7").is_none());
}

#[test]
fn test_template_without_placeholders_is_rejected() {
    assert!(UriTemplate::parse("config://app").is_err());
    assert!(UriTemplate::parse("no-scheme/{x}").is_err());
}

#[test]
fn test_first_registered_template_wins() {
    let registry = build(vec![template("item://{a}"), template("item://{b}")]);

    let (descriptor, params) = match_uri(registry.all_templates(), "item://42").unwrap();
    assert_eq!(descriptor.identity(), "item://{a}");
    assert_eq!(params["a"], "42");
}

#[test]
fn test_no_template_matches() {
    let registry = build(vec![greeting_template()]);
    assert!(match_uri(registry.all_templates(), "other://x").is_none());
}
