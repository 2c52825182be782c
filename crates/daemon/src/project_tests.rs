use super::*;

#[test]
fn no_project_resolver_always_returns_none() {
    let resolver = NoProjectResolver;
    assert_eq!(resolver.resolve("anything"), None);
}
