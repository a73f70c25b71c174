//! Integration tests for discoveryx-client-ws

use discoveryx_client_ws::*;
use discoveryx_core::{Environment, Mode};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_settings(dir: &std::path::Path, base_url: &str) {
    std::fs::write(
        dir.join("application.toml"),
        format!(
            r#"
[discoveryx.http-client]
base-url = "{base_url}"
connect-timeout-ms = 1000
request-timeout-ms = 5000
pool-idle-timeout-ms = 10000
max-idle-connections-per-host = 4
follow-redirects = true
max-redirects = 5
compression = true
user-agent = "discoveryx-it"

[discoveryx.http-client.default-headers]
x-namespace = "default"
"#
        ),
    )
    .unwrap();
}

#[tokio::test]
async fn test_configured_client_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/services/orders"))
        .and(header("x-namespace", "default"))
        .and(header("user-agent", "discoveryx-it"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"instances": [{"port": 8080}]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    write_settings(dir.path(), &server.uri());
    let system = ActorSystem::builder("it")
        .environment(Environment::new(dir.path(), Mode::Test))
        .config_file("application.toml")
        .build()
        .unwrap();

    let client = standalone_ws_client(&system).unwrap();
    let response = client.get("/v1/services/orders").send().await.unwrap();
    let body: serde_json::Value = response.json().unwrap();
    assert_eq!(body["instances"][0]["port"], 8080);
}

#[tokio::test]
async fn test_full_client_keeps_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/session"))
        .respond_with(ResponseTemplate::new(204).insert_header("set-cookie", "dx-session=s1; Path=/"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/services"))
        .and(header("cookie", "dx-session=s1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    write_settings(dir.path(), &server.uri());
    let system = ActorSystem::builder("it")
        .environment(Environment::new(dir.path(), Mode::Test))
        .config_file("application.toml")
        .build()
        .unwrap();

    let client = ws_client(&system).unwrap();
    client.post("/v1/session").send().await.unwrap();

    let session_url = format!("{}/v1/services", server.uri());
    assert_eq!(
        client.cookies(&session_url).unwrap().as_deref(),
        Some("dx-session=s1")
    );
    let response = client.get("/v1/services").send().await.unwrap();
    assert!(response.is_success());
}

#[tokio::test]
async fn test_trust_store_resolved_against_environment_root() {
    let dir = tempfile::tempdir().unwrap();
    write_settings(dir.path(), "http://discoveryx.local:8099");

    let system = ActorSystem::builder("it")
        .environment(Environment::new(dir.path(), Mode::Prod))
        .config_file("application.toml")
        .build()
        .unwrap();
    system
        .config()
        .set("discoveryx.http-client.trust-store", "certs/ca.pem")
        .unwrap();

    match ws_client(&system) {
        Err(HttpClientError::TrustStore { path, .. }) => {
            assert_eq!(path, dir.path().join("certs/ca.pem"));
        }
        other => panic!("expected trust store error, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_injection_builds_one_client() {
    let system = ActorSystem::builder("it").build().unwrap();
    let container = Container::new();
    container.register(reqwest::Client::new());
    container.register(system.clone());
    container
        .install(&DiscoveryXWsModule, system.environment(), system.config())
        .unwrap();

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let container = container.clone();
            tokio::spawn(async move {
                let client: Arc<dyn WsClient> = if i % 2 == 0 {
                    container
                        .resolve_qualified::<dyn WsClient>(&discoveryx_qualifier())
                        .unwrap()
                } else {
                    container
                        .resolve_qualified::<dyn WsClient>(&DiscoveryXPlay::qualifier())
                        .unwrap()
                };
                Arc::as_ptr(&client) as *const () as usize
            })
        })
        .collect();

    let mut addresses = Vec::new();
    for handle in handles {
        addresses.push(handle.await.unwrap());
    }
    let concrete = container.resolve::<DiscoveryXWsClient>().unwrap();
    let expected = Arc::as_ptr(&concrete) as *const () as usize;
    assert!(addresses.iter().all(|address| *address == expected));
}

#[tokio::test]
async fn test_direct_and_injected_paths_are_independent() {
    let system = ActorSystem::builder("it").build().unwrap();
    let container = Container::new();
    container.register(reqwest::Client::new());
    container.register(system.clone());
    container
        .install(&DiscoveryXWsModule, system.environment(), system.config())
        .unwrap();

    let injected = container.resolve::<DiscoveryXWsClient>().unwrap();
    let direct = ws_client(&system).unwrap();
    assert!(!Arc::ptr_eq(injected.transport(), direct.transport()));
    assert!(injected.system().ptr_eq(direct.system()));
}
