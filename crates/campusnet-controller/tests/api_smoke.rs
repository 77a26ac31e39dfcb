#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use serde_json::{json, Value};

use campusnet_controller::app_state::AppState;
use campusnet_controller::router::build_router;
use common::{state_with, FakeNetwork, CONFIG};

async fn serve(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_router(state)).await.unwrap();
    });
    format!("http://{addr}")
}

async fn seed(http: &reqwest::Client, base: &str) {
    let r = http
        .post(format!("{base}/v1/identities"))
        .json(&json!({ "name": "Ana Torres", "id": "S1", "mac": "aa:bb:cc:dd:ee:01" }))
        .send()
        .await
        .unwrap();
    assert_eq!(r.status(), 201);

    let r = http
        .post(format!("{base}/v1/servers"))
        .json(&json!({
            "name": "SRV1",
            "ip": "10.0.0.3",
            "services": [{ "name": "web", "protocol": "TCP", "port": 80 }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(r.status(), 201);

    let r = http
        .post(format!("{base}/v1/servers/SRV1/services"))
        .json(&json!({ "name": "db", "protocol": "TCP", "port": 5432 }))
        .send()
        .await
        .unwrap();
    assert_eq!(r.status(), 201);

    let r = http
        .post(format!("{base}/v1/groups"))
        .json(&json!({
            "code": "G01",
            "name": "Networks",
            "members": ["S1"],
            "servers": [{ "name": "SRV1", "services": ["web"] }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(r.status(), 201);
}

#[tokio::test]
async fn ops_endpoints() {
    let base = serve(state_with(&FakeNetwork::campus(), CONFIG)).await;
    let http = reqwest::Client::new();

    let r = http.get(format!("{base}/healthz")).send().await.unwrap();
    assert_eq!(r.status(), 200);
    let r = http.get(format!("{base}/readyz")).send().await.unwrap();
    assert_eq!(r.text().await.unwrap(), "ready");

    let body = http
        .get(format!("{base}/metrics"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("campusnet_draining 0"));
    assert!(body.contains("campusnet_identities 0"));
}

#[tokio::test]
async fn connection_lifecycle_over_http() {
    let net = FakeNetwork::campus();
    let base = serve(state_with(&net, CONFIG)).await;
    let http = reqwest::Client::new();
    seed(&http, &base).await;

    let v: Value = http
        .get(format!("{base}/v1/authorize?identity=S1&server=SRV1&service=web"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(v["allowed"], true);
    assert_eq!(v["group"], "G01");

    let r = http
        .post(format!("{base}/v1/connections"))
        .json(&json!({ "identity": "S1", "server": "SRV1", "service": "web" }))
        .send()
        .await
        .unwrap();
    assert_eq!(r.status(), 201);
    let v: Value = r.json().await.unwrap();
    assert_eq!(v["handler"], "conn_0");

    let v: Value = http
        .get(format!("{base}/v1/connections/conn_0"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(v["client_mac"], "AA:BB:CC:DD:EE:01");
    assert_eq!(v["installed_rules"].as_array().unwrap().len(), 4);

    let v: Value = http
        .delete(format!("{base}/v1/connections/conn_0"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(v["removed"], true);

    let r = http
        .get(format!("{base}/v1/connections/conn_0"))
        .send()
        .await
        .unwrap();
    assert_eq!(r.status(), 404);
    let v: Value = r.json().await.unwrap();
    assert_eq!(v["error"], "NOT_FOUND");
}

#[tokio::test]
async fn errors_map_to_status_codes() {
    let base = serve(state_with(&FakeNetwork::campus(), CONFIG)).await;
    let http = reqwest::Client::new();
    seed(&http, &base).await;

    // duplicate identity
    let r = http
        .post(format!("{base}/v1/identities"))
        .json(&json!({ "name": "Copy", "id": "S1", "mac": "aa:bb:cc:dd:ee:99" }))
        .send()
        .await
        .unwrap();
    assert_eq!(r.status(), 409);

    // no grant for db
    let r = http
        .post(format!("{base}/v1/connections"))
        .json(&json!({ "identity": "S1", "server": "SRV1", "service": "db" }))
        .send()
        .await
        .unwrap();
    assert_eq!(r.status(), 403);
    let v: Value = r.json().await.unwrap();
    assert_eq!(v["error"], "DENIED");

    // malformed rule
    let r = http
        .post(format!("{base}/v1/groups/G01/rules"))
        .json(&json!({ "rule": "SRV1-db" }))
        .send()
        .await
        .unwrap();
    assert_eq!(r.status(), 400);

    // unknown member
    let r = http
        .put(format!("{base}/v1/groups/G01/members/ghost"))
        .send()
        .await
        .unwrap();
    assert_eq!(r.status(), 404);
}

#[tokio::test]
async fn policy_edits_take_effect() {
    let base = serve(state_with(&FakeNetwork::campus(), CONFIG)).await;
    let http = reqwest::Client::new();
    seed(&http, &base).await;

    let v: Value = http
        .post(format!("{base}/v1/groups/G01/rules"))
        .json(&json!({ "rule": "SRV1:db" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(v["changed"], true);

    let codes: Vec<String> = http
        .get(format!("{base}/v1/policies?server=SRV1&service=db"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(codes, vec!["G01".to_string()]);

    let r = http
        .put(format!("{base}/v1/groups/G01/status"))
        .json(&json!({ "status": "INACTIVE" }))
        .send()
        .await
        .unwrap();
    assert_eq!(r.status(), 204);

    let v: Value = http
        .get(format!("{base}/v1/authorize?identity=S1&server=SRV1&service=db"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(v["allowed"], false);
    assert_eq!(v["reason"], "no_grant");
}

#[tokio::test]
async fn inventory_round_trip_over_http() {
    let base = serve(state_with(&FakeNetwork::campus(), CONFIG)).await;
    let http = reqwest::Client::new();

    let doc = "identities:\n  - { name: Ana, id: S1, mac: \"aa:bb:cc:dd:ee:01\" }\nservers:\n  - { name: SRV1, ip: 10.0.0.3 }\n";
    let v: Value = http
        .put(format!("{base}/v1/inventory"))
        .body(doc)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(v["identities"], 1);
    assert_eq!(v["servers"], 1);

    let r = http.get(format!("{base}/v1/inventory")).send().await.unwrap();
    assert_eq!(r.status(), 200);
    let yaml = r.text().await.unwrap();
    assert!(yaml.contains("AA:BB:CC:DD:EE:01"));
    assert!(yaml.contains("SRV1"));

    let r = http
        .put(format!("{base}/v1/inventory"))
        .body("identities: [")
        .send()
        .await
        .unwrap();
    assert_eq!(r.status(), 400);
}
