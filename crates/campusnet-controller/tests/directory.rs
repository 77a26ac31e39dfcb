#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::net::Ipv4Addr;

use campusnet_controller::directory::Directory;
use campusnet_controller::policy::allowlist::{collapse_rules, expand_grants, parse_rule, ServerGrant};
use campusnet_controller::policy::PolicyStore;
use campusnet_core::model::{
    AllowRule, EnrollmentGroup, GroupStatus, HardwareAddress, Identity, Server, Service,
    TransportProtocol,
};
use campusnet_core::{CampusNetError, EntityKind};

fn mac(s: &str) -> HardwareAddress {
    HardwareAddress::parse(s).unwrap()
}

#[test]
fn identity_keys_are_unique() {
    let mut dir = Directory::new();
    dir.add_identity(Identity::new("Ana", "S1", mac("aa:bb:cc:dd:ee:01"))).unwrap();

    let err = dir
        .add_identity(Identity::new("Ana again", "S1", mac("aa:bb:cc:dd:ee:02")))
        .unwrap_err();
    assert!(matches!(err, CampusNetError::DuplicateKey { kind: EntityKind::Identity, .. }));

    // same device under another id, different spelling
    let err = dir
        .add_identity(Identity::new("Clone", "S2", mac("AABBCCDDEE01")))
        .unwrap_err();
    assert_eq!(err.client_code().as_str(), "CONFLICT");
    assert_eq!(dir.identity_count(), 1);
}

#[test]
fn identity_lookup_by_mac_follows_removal() {
    let mut dir = Directory::new();
    dir.add_identity(Identity::new("Ana", "S1", mac("aa:bb:cc:dd:ee:01"))).unwrap();
    assert_eq!(dir.identity_by_mac(&mac("aa-bb-cc-dd-ee-01")).unwrap().id, "S1");

    dir.remove_identity("S1").unwrap();
    assert!(dir.identity_by_mac(&mac("aa:bb:cc:dd:ee:01")).is_err());

    // the address is free again
    dir.add_identity(Identity::new("Luis", "S2", mac("aa:bb:cc:dd:ee:01"))).unwrap();
}

#[test]
fn server_and_service_lookups() {
    let mut dir = Directory::new();
    dir.add_server(Server::new("SRV1", Ipv4Addr::new(10, 0, 0, 3))).unwrap();
    dir.add_service("SRV1", Service::new("db", TransportProtocol::Tcp, 5432).unwrap())
        .unwrap();

    let (srv, svc) = dir.service("SRV1", "db").unwrap();
    assert_eq!(srv.ip, Ipv4Addr::new(10, 0, 0, 3));
    assert_eq!((svc.protocol, svc.port), (TransportProtocol::Tcp, 5432));

    let err = dir
        .add_service("SRV1", Service::new("db", TransportProtocol::Udp, 5433).unwrap())
        .unwrap_err();
    assert!(matches!(err, CampusNetError::DuplicateService { .. }));

    let err = dir.add_service("SRV9", Service::new("x", TransportProtocol::Tcp, 1).unwrap());
    assert!(matches!(
        err,
        Err(CampusNetError::NotFound { kind: EntityKind::Server, .. })
    ));

    assert!(matches!(
        dir.add_server(Server::new("SRV1", Ipv4Addr::new(10, 0, 0, 4))),
        Err(CampusNetError::DuplicateKey { kind: EntityKind::Server, .. })
    ));

    dir.remove_server("SRV1").unwrap();
    assert_eq!(dir.server_count(), 0);
    assert!(dir.remove_server("SRV1").is_err());
}

#[test]
fn group_store_basics() {
    let mut store = PolicyStore::new();
    store
        .add_group(EnrollmentGroup::new("G01", "Networks", GroupStatus::Active))
        .unwrap();
    assert!(store
        .add_group(EnrollmentGroup::new("G01", "Dup", GroupStatus::Active))
        .is_err());
    assert!(store
        .add_group(EnrollmentGroup::new(" ", "Blank", GroupStatus::Active))
        .is_err());

    assert!(store.add_member("G01", "S1").unwrap());
    assert_eq!(store.active_groups_of("S1").count(), 1);

    store.set_status("G01", GroupStatus::Inactive).unwrap();
    assert_eq!(store.active_groups_of("S1").count(), 0);

    store.remove_group("G01").unwrap();
    assert_eq!(store.group_count(), 0);
    assert!(matches!(
        store.set_status("G01", GroupStatus::Active),
        Err(CampusNetError::NotFound { kind: EntityKind::Group, .. })
    ));
}

#[test]
fn compact_rule_syntax() {
    assert_eq!(parse_rule("SRV1:web").unwrap(), AllowRule::new("SRV1", "web"));
    assert!(parse_rule("SRV1").is_err());
    assert!(parse_rule(":web").is_err());
    assert!(parse_rule("SRV1:").is_err());
}

#[test]
fn grants_expand_and_collapse_by_server() {
    let grants = vec![
        ServerGrant { name: "SRV1".into(), services: vec!["db".into(), "web".into()] },
        ServerGrant { name: "SRV2".into(), services: vec!["ssh".into()] },
    ];
    let rules = expand_grants(&grants);
    assert_eq!(rules.len(), 3);
    assert_eq!(collapse_rules(&rules), grants);
}
