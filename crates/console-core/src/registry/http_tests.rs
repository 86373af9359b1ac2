use super::*;

#[test]
fn test_registry_new_is_empty() {
    let registry = HttpRegistry::new();
    assert!(registry.is_empty());
    assert_eq!(registry.len(), 0);
}

#[test]
fn test_trailing_slash_resolves_to_same_entry() {
    let registry = HttpRegistry::new();
    registry
        .register(HttpContract::get("/x/", "x.list"))
        .unwrap();

    let found = registry.resolve(HttpMethod::Get, "/x").unwrap();
    assert_eq!(found.service, "x.list");
    assert_eq!(found.path, "/x");
    assert!(registry.resolve(HttpMethod::Get, "/x/").is_some());
}

#[test]
fn test_conflicting_service_is_rejected() {
    let registry = HttpRegistry::new();
    registry.register(HttpContract::get("/x/", "x.list")).unwrap();

    let err = registry
        .register(HttpContract::get("/x", "y.list"))
        .unwrap_err();
    assert!(matches!(err, HttpContractError::Conflict { .. }));
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.resolve(HttpMethod::Get, "/x").unwrap().service, "x.list");
}

#[test]
fn test_same_service_reregistration_is_noop() {
    let registry = HttpRegistry::new();
    registry.register(HttpContract::get("/x", "x.list")).unwrap();
    registry.register(HttpContract::get("/x/", "x.list")).unwrap();
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_methods_are_distinct() {
    let registry = HttpRegistry::new();
    registry.register(HttpContract::get("/devices", "devices.list")).unwrap();
    registry.register(HttpContract::post("/devices", "devices.upsert")).unwrap();
    assert_eq!(registry.len(), 2);
    assert_eq!(
        registry.resolve(HttpMethod::Post, "/devices").unwrap().service,
        "devices.upsert"
    );
}

#[test]
fn test_struct_literal_path_is_normalized() {
    let registry = HttpRegistry::new();
    let contract = HttpContract {
        method: HttpMethod::Get,
        path: "logs/".to_string(),
        service: "logger.recent".to_string(),
        description: String::new(),
        owner: None,
    };
    registry.register(contract).unwrap();
    assert_eq!(registry.list()[0].path, "/logs");
}

#[test]
fn test_missing_service_rejected() {
    let registry = HttpRegistry::new();
    let err = registry.register(HttpContract::get("/x", "")).unwrap_err();
    assert!(matches!(err, HttpContractError::MissingService(_)));
}

#[test]
fn test_whitespace_path_rejected() {
    let registry = HttpRegistry::new();
    let err = registry
        .register(HttpContract::get("/bad path", "x.y"))
        .unwrap_err();
    assert!(matches!(err, HttpContractError::InvalidPath(_)));
}

#[test]
fn test_clear_owner_by_service_prefix() {
    let registry = HttpRegistry::new();
    registry
        .register_all([
            HttpContract::get("/devices", "devices.list"),
            HttpContract::get("/devices/{device_id}", "devices.get"),
            HttpContract::get("/presence", "presence.list"),
        ])
        .unwrap();

    assert_eq!(registry.clear_owner("devices"), 2);
    let remaining = registry.list();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].service, "presence.list");
}

#[test]
fn test_clear_owner_by_explicit_tag() {
    let registry = HttpRegistry::new();
    registry
        .register(HttpContract::get("/health", "http.health").with_owner("gateway"))
        .unwrap();
    assert_eq!(registry.clear_owner("http"), 0);
    assert_eq!(registry.clear_owner("gateway"), 1);
}

#[test]
fn test_list_preserves_registration_order() {
    let registry = HttpRegistry::new();
    registry.register(HttpContract::get("/b", "b.x")).unwrap();
    registry.register(HttpContract::get("/a", "a.x")).unwrap();
    let paths: Vec<String> = registry.list().into_iter().map(|c| c.path).collect();
    assert_eq!(paths, vec!["/b", "/a"]);
}

#[test]
fn test_remove_single_route() {
    let registry = HttpRegistry::new();
    registry.register(HttpContract::get("/a", "a.x")).unwrap();
    assert!(registry.remove(HttpMethod::Get, "/a/"));
    assert!(!registry.remove(HttpMethod::Get, "/a"));
    assert!(registry.is_empty());
}

#[test]
fn test_register_all_stops_at_conflict() {
    let registry = HttpRegistry::new();
    let result = registry.register_all([
        HttpContract::get("/a", "a.x"),
        HttpContract::get("/a", "b.x"),
        HttpContract::get("/c", "c.x"),
    ]);
    assert!(result.is_err());
    assert_eq!(registry.len(), 1);
}
