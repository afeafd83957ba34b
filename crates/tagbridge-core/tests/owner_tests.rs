#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;

use tagbridge_core::{Compound, LiveObject, OwnerKind, RawTag, TagError, VersionToken};

fn string_at(raw: &RawTag, key: &str) -> Option<String> {
    match raw.child(key) {
        Some(RawTag::String(value)) => Some(value.clone()),
        _ => None,
    }
}

#[test]
fn test_copy_owner_persists_every_mutation() {
    let ctx = common::context(VersionToken::MC1_20_R3);
    let item = Arc::new(LiveObject::item());
    let root = Compound::for_item(&ctx, item.clone()).unwrap();

    root.set_string("first", "a").unwrap();
    root.set_string("second", "b").unwrap();

    let stored = item.snapshot().unwrap();
    assert_eq!(string_at(&stored, "first"), Some("a".to_string()));
    assert_eq!(string_at(&stored, "second"), Some("b".to_string()));
    assert_eq!(root.owner_kind().unwrap(), OwnerKind::Item);
}

#[test]
fn test_item_without_data_reads_empty() {
    let ctx = common::context(VersionToken::MC1_12_R1);
    let root = Compound::for_item(&ctx, Arc::new(LiveObject::item())).unwrap();
    assert!(root.is_empty().unwrap());
    assert_eq!(root.get_string("display.Name").unwrap(), None);
}

#[test]
fn test_entity_round_trip_keeps_identity() {
    for version in [VersionToken::MC1_8_R3, VersionToken::MC1_20_R3] {
        let ctx = common::context(version);
        let entity = Arc::new(LiveObject::entity("minecraft:zombie"));
        let root = Compound::for_entity(&ctx, entity.clone()).unwrap();

        root.set_int("Health", 20).unwrap();
        root.get_compound_list("Passengers").unwrap().add_compound().unwrap();

        let stored = entity.snapshot().unwrap();
        assert_eq!(string_at(&stored, "id"), Some("minecraft:zombie".to_string()));
        assert_eq!(stored.child("Health"), Some(&RawTag::Int(20)));
    }
}

#[test]
fn test_tile_nested_writes_go_back_to_owner() {
    let ctx = common::context(VersionToken::MC1_16_R3);
    let tile = Arc::new(LiveObject::tile("minecraft:chest"));
    let root = Compound::for_tile(&ctx, tile.clone()).unwrap();
    let custom = root.add_compound("custom").unwrap();
    custom.set_bool("locked", true).unwrap();

    let reopened = Compound::for_tile(&ctx, tile).unwrap();
    assert_eq!(reopened.get_bool("custom.locked").unwrap(), Some(true));
}

#[test]
fn test_persistent_store_on_supported_host() {
    let ctx = common::context(VersionToken::MC1_20_R3);
    let store = Arc::new(LiveObject::persistent_store());
    let root = Compound::for_persistent_store(&ctx, store.clone()).unwrap();
    root.set_long("plugin.lastSeen", 42).unwrap();

    let reopened = Compound::for_persistent_store(&ctx, store).unwrap();
    assert_eq!(reopened.get_long("plugin.lastSeen").unwrap(), Some(42));
    assert_eq!(reopened.owner_kind().unwrap(), OwnerKind::PersistentStore);
}

#[test]
fn test_kind_mismatch_is_owner_error() {
    let ctx = common::context(VersionToken::MC1_20_R3);
    let err = Compound::for_tile(&ctx, Arc::new(LiveObject::item())).unwrap_err();
    assert!(matches!(
        err,
        TagError::Owner {
            owner: OwnerKind::Tile,
            ..
        }
    ));
}

#[test]
fn test_standalone_is_reference_owner() {
    let root = common::standalone();
    let child = root.add_compound("a").unwrap();
    child.set_int("x", 1).unwrap();
    assert_eq!(root.get_int("a.x").unwrap(), Some(1));
    assert_eq!(root.owner_kind().unwrap(), OwnerKind::Standalone);
}
