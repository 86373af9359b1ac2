use super::*;

use console_core::{EventBus, HttpRegistry, MemoryStorage, ModuleManager, ServiceRegistry};
use console_protocols::error::ServiceError;
use console_protocols::http::HttpMethod;
use console_protocols::storage::Storage;
use parking_lot::Mutex;
use serde_json::json;

fn context() -> (ModuleContext, Arc<ModuleManager>) {
    let manager = Arc::new(ModuleManager::new());
    let ctx = ModuleContext::new(
        AUTOMATION_MODULE,
        Value::Null,
        Arc::new(ServiceRegistry::new()),
        Arc::new(EventBus::new()),
        Arc::new(HttpRegistry::new()),
        Arc::new(MemoryStorage::new()),
        Arc::downgrade(&manager),
    );
    (ctx, manager)
}

fn lights(ctx: &ModuleContext) -> Arc<Mutex<Vec<String>>> {
    let switched = Arc::new(Mutex::new(Vec::new()));
    let sink = switched.clone();
    ctx.services
        .register_fn("lights.turn_on", move |args: ServiceArgs| {
            let sink = sink.clone();
            async move {
                let id: String = args.require("id")?;
                sink.lock().push(id);
                Ok(Value::Bool(true))
            }
        })
        .unwrap();
    switched
}

async fn call(ctx: &ModuleContext, service: &str, kwargs: Value) -> Result<Value, ServiceError> {
    ctx.services.call(service, ServiceArgs::from_value(kwargs)).await
}

fn porch_rule() -> Value {
    json!({
        "name": "porch light",
        "trigger": {"event": "presence.changed", "conditions": {"home": true}},
        "action": {"service": "lights.turn_on", "args": {"id": "porch"}},
    })
}

#[tokio::test]
async fn test_register_publishes_contracts() {
    let (ctx, _manager) = context();
    let module = AutomationModule::new(ctx.clone());
    module.register().await.unwrap();

    for name in ["list", "add", "remove", "set_enabled"] {
        assert!(ctx.services.has_service(&format!("automation.{}", name)));
    }
    assert_eq!(ctx.http.len(), 4);
    let route = ctx
        .http
        .resolve(HttpMethod::Post, "/automations/{id}/enabled")
        .unwrap();
    assert_eq!(route.service, "automation.set_enabled");
}

#[tokio::test]
async fn test_add_and_list() {
    let (ctx, _manager) = context();
    let module = AutomationModule::new(ctx.clone());
    module.register().await.unwrap();

    let added = call(&ctx, "automation.add", porch_rule()).await.unwrap();
    assert_eq!(added["name"], "porch light");
    assert_eq!(added["enabled"], true);
    assert!(added["id"].as_str().is_some_and(|id| !id.is_empty()));

    let listed = call(&ctx, "automation.list", json!({})).await.unwrap();
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
    assert_eq!(listed[0]["id"], added["id"]);
    assert_eq!(listed[0]["action"]["args"]["id"], "porch");
}

#[tokio::test]
async fn test_add_defaults_name_to_event() {
    let (ctx, _manager) = context();
    let module = AutomationModule::new(ctx.clone());
    module.register().await.unwrap();

    let added = call(
        &ctx,
        "automation.add",
        json!({
            "trigger": {"event": "device.removed"},
            "action": {"service": "logger.log"},
            "enabled": "false",
        }),
    )
    .await
    .unwrap();
    assert_eq!(added["name"], "device.removed");
    assert_eq!(added["enabled"], false);
}

#[tokio::test]
async fn test_add_rejects_bad_input() {
    let (ctx, _manager) = context();
    let module = AutomationModule::new(ctx.clone());
    module.register().await.unwrap();

    let missing_action = call(
        &ctx,
        "automation.add",
        json!({"trigger": {"event": "presence.changed"}}),
    )
    .await;
    assert!(matches!(missing_action, Err(ServiceError::InvalidArgument(_))));

    let bad_trigger = call(
        &ctx,
        "automation.add",
        json!({"trigger": 5, "action": {"service": "lights.turn_on"}}),
    )
    .await;
    assert!(matches!(bad_trigger, Err(ServiceError::InvalidArgument(_))));
}

#[tokio::test]
async fn test_rule_fires_after_start() {
    let (ctx, _manager) = context();
    let switched = lights(&ctx);
    let module = AutomationModule::new(ctx.clone());
    module.register().await.unwrap();

    // rules stored before start are picked up by start
    call(&ctx, "automation.add", porch_rule()).await.unwrap();
    ctx.events
        .publish("presence.changed", json!({"name": "alice", "home": true}))
        .await;
    assert!(switched.lock().is_empty());

    module.start().await.unwrap();
    module.start().await.unwrap();
    assert_eq!(ctx.events.subscriber_count("presence.changed"), 1);

    ctx.events
        .publish("presence.changed", json!({"name": "alice", "home": true}))
        .await;
    ctx.events
        .publish("presence.changed", json!({"name": "alice", "home": false}))
        .await;
    assert_eq!(*switched.lock(), vec!["porch".to_string()]);
}

#[tokio::test]
async fn test_set_enabled_and_remove_services() {
    let (ctx, _manager) = context();
    let switched = lights(&ctx);
    let module = AutomationModule::new(ctx.clone());
    module.register().await.unwrap();
    module.start().await.unwrap();

    let added = call(&ctx, "automation.add", porch_rule()).await.unwrap();
    let id = added["id"].clone();

    let disabled = call(
        &ctx,
        "automation.set_enabled",
        json!({"id": id, "enabled": false}),
    )
    .await
    .unwrap();
    assert_eq!(disabled["enabled"], false);
    ctx.events
        .publish("presence.changed", json!({"home": true}))
        .await;
    assert!(switched.lock().is_empty());

    let unknown = call(
        &ctx,
        "automation.set_enabled",
        json!({"id": "nope", "enabled": true}),
    )
    .await;
    assert!(matches!(unknown, Err(ServiceError::InvalidArgument(_))));

    assert_eq!(
        call(&ctx, "automation.remove", json!({"id": id})).await.unwrap(),
        json!(true)
    );
    assert_eq!(
        call(&ctx, "automation.remove", json!({"id": id})).await.unwrap(),
        json!(false)
    );
    assert_eq!(ctx.events.subscriber_count("presence.changed"), 0);
}

#[tokio::test]
async fn test_stop_withdraws_everything() {
    let (ctx, _manager) = context();
    let switched = lights(&ctx);
    let module = AutomationModule::new(ctx.clone());
    module.register().await.unwrap();
    call(&ctx, "automation.add", porch_rule()).await.unwrap();
    module.start().await.unwrap();

    module.stop().await.unwrap();
    module.stop().await.unwrap();

    assert!(!ctx.services.has_service("automation.list"));
    assert!(ctx.services.has_service("lights.turn_on"));
    assert!(ctx.http.is_empty());
    assert_eq!(ctx.events.subscriber_count("presence.changed"), 0);

    ctx.events
        .publish("presence.changed", json!({"home": true}))
        .await;
    assert!(switched.lock().is_empty());

    // rules are persisted, not owned by the running module
    let stored = ctx.storage.list_keys("automation").await.unwrap();
    assert_eq!(stored.len(), 1);
}
