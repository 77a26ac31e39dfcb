#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::net::Ipv4Addr;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use campusnet_controller::topology::floodlight::StaticFlowEntry;
use campusnet_controller::topology::route::hops_from_route;
use campusnet_controller::topology::{FloodlightClient, FlowProgrammer, TopologyClient};
use campusnet_core::error::CampusNetError;
use campusnet_core::flow::{
    AttachmentPoint, Hop, RuleAction, RuleDescriptor, RuleMatch, RuleRef, ETH_TYPE_ARP,
    ETH_TYPE_IPV4,
};
use campusnet_core::model::{HardwareAddress, TransportProtocol};

const SW1: &str = "00:00:00:00:00:00:00:01";
const SW2: &str = "00:00:00:00:00:00:00:02";

fn client(server: &MockServer) -> FloodlightClient {
    FloodlightClient::new(server.uri(), Duration::from_millis(500)).unwrap()
}

fn mac() -> HardwareAddress {
    HardwareAddress::parse("aa:bb:cc:dd:ee:01").unwrap()
}

fn hop_rule() -> RuleDescriptor {
    RuleDescriptor {
        switch_id: SW1.into(),
        name: format!("flow_0_{SW1}"),
        priority: 1000,
        active: true,
        matches: RuleMatch {
            eth_src: Some(mac()),
            eth_type: ETH_TYPE_IPV4,
            ipv4_dst: Some(Ipv4Addr::new(10, 0, 0, 3)),
            transport: Some(TransportProtocol::Tcp),
            dst_port: Some(80),
        },
        action: RuleAction::Output(2),
    }
}

#[tokio::test]
async fn attachment_from_device_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wm/device/"))
        .and(query_param("mac", "AA:BB:CC:DD:EE:01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "mac": ["aa:bb:cc:dd:ee:01"], "attachmentPoint": [{ "switch": SW1, "port": 3 }] }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let at = client(&server).attachment(&mac()).await.unwrap();
    assert_eq!(at, AttachmentPoint::new(SW1, 3));
}

#[tokio::test]
async fn attachment_from_wrapped_listing_with_string_port() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wm/device/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "devices": [
                { "mac": ["aa:bb:cc:dd:ee:01"], "attachmentPoint": [{ "switch": SW2, "port": "7" }] }
            ]
        })))
        .mount(&server)
        .await;

    let at = client(&server).attachment(&mac()).await.unwrap();
    assert_eq!(at, AttachmentPoint::new(SW2, 7));
}

#[tokio::test]
async fn device_without_attachment_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wm/device/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "mac": ["aa:bb:cc:dd:ee:01"], "attachmentPoint": [] }
        ])))
        .mount(&server)
        .await;

    let err = client(&server).attachment(&mac()).await.unwrap_err();
    assert_eq!(err.client_code().as_str(), "NOT_FOUND");
}

#[tokio::test]
async fn route_pairs_become_hops() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/wm/routing/routes/fast/{SW1}/3/{SW2}/1/json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "route": [
                { "switch": SW1, "port": 3 },
                { "switch": SW1, "port": 2 },
                { "switch": SW2, "port": 4 },
                { "switch": SW2, "port": 1 }
            ]
        }])))
        .mount(&server)
        .await;

    let hops = client(&server)
        .path(&AttachmentPoint::new(SW1, 3), &AttachmentPoint::new(SW2, 1))
        .await
        .unwrap();
    assert_eq!(hops, vec![Hop::new(SW1, 3, 2), Hop::new(SW2, 4, 1)]);
}

#[tokio::test]
async fn empty_route_listing_means_no_hops() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let hops = client(&server)
        .path(&AttachmentPoint::new(SW1, 3), &AttachmentPoint::new(SW2, 1))
        .await
        .unwrap();
    assert!(hops.is_empty());
}

#[test]
fn malformed_route_is_rejected() {
    let odd = [AttachmentPoint::new(SW1, 3)];
    assert!(matches!(
        hops_from_route(&odd),
        Err(CampusNetError::TopologyUnavailable(_))
    ));

    let spanning = [AttachmentPoint::new(SW1, 3), AttachmentPoint::new(SW2, 1)];
    assert!(hops_from_route(&spanning).is_err());
}

#[tokio::test]
async fn push_sends_flat_static_entry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/wm/staticflowpusher/json"))
        .and(body_partial_json(json!({
            "switch": SW1,
            "name": format!("flow_0_{SW1}"),
            "priority": "1000",
            "active": "true",
            "eth_src": "AA:BB:CC:DD:EE:01",
            "eth_type": "0x0800",
            "ipv4_dst": "10.0.0.3",
            "ip_proto": "6",
            "tcp_dst": "80",
            "actions": "output=2"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "Entry pushed" })))
        .expect(1)
        .mount(&server)
        .await;

    let r = client(&server).push(&hop_rule()).await.unwrap();
    assert_eq!(r, RuleRef { switch_id: SW1.into(), name: format!("flow_0_{SW1}") });
}

#[tokio::test]
async fn push_rejection_carries_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let err = client(&server).push(&hop_rule()).await.unwrap_err();
    assert!(matches!(err, CampusNetError::FlowRejected { status: 400, .. }));
    assert_eq!(err.client_code().as_str(), "INSTALL_FAILED");
}

#[tokio::test]
async fn delete_by_name() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/wm/staticflowpusher/json"))
        .and(body_json(json!({ "name": "arp_flow_0" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let rule = RuleRef { switch_id: SW1.into(), name: "arp_flow_0".into() };
    client(&server).delete(&rule).await.unwrap();
}

#[tokio::test]
async fn slow_authority_times_out_as_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(1500)),
        )
        .mount(&server)
        .await;

    let c = FloodlightClient::new(server.uri(), Duration::from_millis(100)).unwrap();
    let err = c.attachment(&mac()).await.unwrap_err();
    assert_eq!(err.client_code().as_str(), "TOPOLOGY_UNAVAILABLE");
}

#[tokio::test]
async fn server_error_and_garbage_are_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wm/device/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/wm/routing/routes/fast/{SW1}/3/{SW2}/1/json")))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let c = client(&server);
    let err = c.attachment(&mac()).await.unwrap_err();
    assert_eq!(err.client_code().as_str(), "TOPOLOGY_UNAVAILABLE");

    let err = c
        .path(&AttachmentPoint::new(SW1, 3), &AttachmentPoint::new(SW2, 1))
        .await
        .unwrap_err();
    assert_eq!(err.client_code().as_str(), "TOPOLOGY_UNAVAILABLE");
}

#[tokio::test]
async fn refused_connection_is_unavailable() {
    let c = FloodlightClient::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
    let err = c.attachment(&mac()).await.unwrap_err();
    assert_eq!(err.client_code().as_str(), "TOPOLOGY_UNAVAILABLE");
}

#[test]
fn broadcast_entry_floods_arp() {
    let rule = RuleDescriptor {
        switch_id: SW1.into(),
        name: "arp_flow_0".into(),
        priority: 1000,
        active: true,
        matches: RuleMatch {
            eth_type: ETH_TYPE_ARP,
            ..RuleMatch::default()
        },
        action: RuleAction::Flood,
    };
    let v = serde_json::to_value(StaticFlowEntry::from(&rule)).unwrap();
    assert_eq!(v["eth_type"], "0x0806");
    assert_eq!(v["actions"], "output=flood");
    assert!(v.get("eth_src").is_none());
    assert!(v.get("tcp_dst").is_none());
}

#[test]
fn udp_entry_uses_udp_dst() {
    let mut rule = hop_rule();
    rule.matches.transport = Some(TransportProtocol::Udp);
    rule.matches.dst_port = Some(53);
    let v = serde_json::to_value(StaticFlowEntry::from(&rule)).unwrap();
    assert_eq!(v["ip_proto"], "17");
    assert_eq!(v["udp_dst"], "53");
    assert!(v.get("tcp_dst").is_none());
}
