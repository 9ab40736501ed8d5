// SPDX-License-Identifier: MIT
//! Scoped prefix resolution

use binary_infoset::{NamespaceContext, NamespaceError};

#[test]
fn test_last_declaration_in_scope_wins() {
    let mut context = NamespaceContext::new();
    context.push_context();
    context.declare_prefix("a", "http://a").unwrap();
    context.declare_prefix("a", "http://new").unwrap();

    assert_eq!(context.get_namespace_uri("a"), "http://new");
    assert_eq!(context.get_prefix("http://a"), None);
    assert_eq!(context.declared_prefixes(), vec!["a"]);
}

#[test]
fn test_shadowed_prefix_reverts_on_pop() {
    let mut context = NamespaceContext::new();
    context.push_context();
    context.declare_prefix("a", "http://a").unwrap();
    assert_eq!(context.get_prefix("http://a"), Some("a"));

    context.push_context();
    context.declare_prefix("a", "http://new").unwrap();
    assert_eq!(context.get_prefix("http://a"), None);
    assert_eq!(context.get_prefix("http://new"), Some("a"));

    context.pop_context().unwrap();
    assert_eq!(context.get_prefix("http://a"), Some("a"));
    assert_eq!(context.get_namespace_uri("a"), "http://a");
}

#[test]
fn test_prefixes_across_nested_scopes() {
    let mut context = NamespaceContext::new();
    for prefix in ["a", "b", "c"] {
        context.push_context();
        context.declare_prefix(prefix, "http://a").unwrap();
    }

    let mut prefixes = context.get_prefixes("http://a");
    prefixes.sort_unstable();
    assert_eq!(prefixes, vec!["a", "b", "c"]);
}

#[test]
fn test_hundred_scopes_popped_in_reverse() {
    let mut context = NamespaceContext::new();
    for scope in 0..100 {
        context.push_context();
        for i in 0..10 {
            context
                .declare_prefix(&format!("p{}_{}", scope, i), &format!("http://{}/{}", scope, i))
                .unwrap();
        }
    }
    assert_eq!(context.depth(), 100);

    for scope in (0..100).rev() {
        context.pop_context().unwrap();
        for i in 0..10 {
            let prefix = format!("p{}_{}", scope, i);
            let uri = format!("http://{}/{}", scope, i);
            assert_eq!(context.get_namespace_uri(&prefix), "");
            assert_eq!(context.get_prefix(&uri), None);
        }
    }
    assert_eq!(context.depth(), 0);
}

#[test]
fn test_default_bindings_survive_every_scope() {
    let mut context = NamespaceContext::new();
    for _ in 0..5 {
        context.push_context();
    }
    assert_eq!(
        context.get_namespace_uri("xml"),
        "http://www.w3.org/XML/1998/namespace"
    );
    assert_eq!(
        context.get_prefix("http://www.w3.org/2000/xmlns/"),
        Some("xmlns")
    );

    for _ in 0..5 {
        context.pop_context().unwrap();
    }
    assert!(matches!(context.pop_context(), Err(NamespaceError::NoContext)));
    assert_eq!(context.get_namespace_uri("xmlns"), "http://www.w3.org/2000/xmlns/");
}

#[test]
fn test_reserved_bindings_rejected() {
    let mut context = NamespaceContext::new();
    context.push_context();
    assert!(matches!(
        context.declare_prefix("xmlns", "http://other"),
        Err(NamespaceError::ReservedPrefix { .. })
    ));
    assert!(matches!(
        context.declare_prefix("x", "http://www.w3.org/XML/1998/namespace"),
        Err(NamespaceError::ReservedNamespace { .. })
    ));
    context
        .declare_prefix("xml", "http://www.w3.org/XML/1998/namespace")
        .unwrap();
}
