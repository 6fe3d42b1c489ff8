// Copyright 2025 The EMachine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Loading tagged documents through the class registry: dispatch on the
//! discriminator, family checks on nested parts, and schema errors.

use serde_json::{Value, json};

use emachine_engine::{
    AnyHole, AnyLamination, AnyMachine, AnySlot, CLASS_KEY, Entity, ErrorCode, HoleM53, LamHole,
    LamSlotWind, MachineIPMSM, SlotW26, json as entity_json, registry,
};

fn dict(value: Value) -> emachine_engine::Dict {
    match value {
        Value::Object(dict) => dict,
        other => panic!("not an object: {other}"),
    }
}

#[test]
fn tags_resolve_to_their_class() {
    for name in registry::class_names() {
        let doc = json!({ CLASS_KEY: name });
        let entity = registry::load(&dict(doc)).unwrap();
        assert_eq!(name, entity.class_name());
        let dumped = entity.as_dict();
        assert_eq!(Some(&Value::String(name.to_owned())), dumped.get(CLASS_KEY));
    }
}

#[test]
fn unknown_tag_is_an_unknown_type_error() {
    let err = entity_json::from_json(r#"{"__class__": "SlotW99", "Zs": 12}"#).unwrap_err();
    assert!(err.is_unknown_type());
    assert!(err.message().contains("SlotW99"));

    // nested tags go through the same lookup
    let err = entity_json::load_as::<LamSlotWind>(r#"{"slot": {"__class__": "NoSuchSlot"}}"#)
        .unwrap_err();
    assert!(err.is_unknown_type());
    assert!(err.message().starts_with("slot."));
}

#[test]
fn unexpected_key_names_the_key() {
    let err = entity_json::from_json(r#"{"__class__": "SlotW26", "W0": 0.01, "W9": 1}"#)
        .unwrap_err();
    assert!(err.is_schema());
    assert_eq!(ErrorCode::UnexpectedKey, err.code);
    assert!(err.message().contains("'W9'"), "{}", err.message());

    // keys of a sibling class are not accepted either
    let err = entity_json::load_as::<SlotW26>(r#"{"magnet": []}"#).unwrap_err();
    assert_eq!(ErrorCode::UnexpectedKey, err.code);
}

#[test]
fn nested_tag_outside_the_family_is_rejected() {
    let doc = json!({
        CLASS_KEY: "MachineIPMSM",
        "rotor": { CLASS_KEY: "SlotW26" },
    });
    let err = entity_json::from_json(&doc.to_string()).unwrap_err();
    assert!(err.is_schema());
    assert_eq!(ErrorCode::UnexpectedClass, err.code);
    assert!(err.message().contains("rotor"), "{}", err.message());
    assert!(err.message().contains("Lamination"), "{}", err.message());
}

#[test]
fn wrong_tag_for_a_concrete_type() {
    let err = entity_json::load_as::<SlotW26>(r#"{"__class__": "SlotMPolar"}"#).unwrap_err();
    assert_eq!(ErrorCode::ClassMismatch, err.code);
}

#[test]
fn bad_value_types_name_the_key() {
    let err = entity_json::load_as::<SlotW26>(r#"{"W0": "wide"}"#).unwrap_err();
    assert_eq!(ErrorCode::BadFieldType, err.code);
    assert!(err.message().starts_with("W0:"), "{}", err.message());
}

#[test]
fn untagged_nested_parts_take_the_family_base() {
    let lam = entity_json::load_as::<LamSlotWind>(r#"{"slot": {"Zs": 48}}"#).unwrap();
    assert!(matches!(lam.slot, AnySlot::Slot(_)));
    assert_eq!(Some(48), lam.slot.zs());
}

#[test]
fn family_load_dispatches_on_the_tag() {
    let machine = AnyMachine::from_dict(&MachineIPMSM::default().as_dict()).unwrap();
    assert_eq!("MachineIPMSM", machine.class_name());
    assert!(machine.is_synchronous());

    let lam = AnyLamination::from_dict(&dict(json!({ CLASS_KEY: "LamHole" }))).unwrap();
    assert!(matches!(lam, AnyLamination::LamHole(_)));
}

#[test]
fn has_magnet_with_one_magnet_cleared() {
    let doc = json!({
        CLASS_KEY: "LamHole",
        "hole": [{ CLASS_KEY: "HoleM53", "magnet_0": null }],
    });
    let rotor = entity_json::load_as::<LamHole>(&doc.to_string()).unwrap();
    let hole = &rotor.hole[0];
    assert!(hole.has_magnet());
    assert_eq!(1, hole.magnets().len());

    let AnyHole::HoleM53(m53) = hole else {
        panic!("expected a HoleM53, got {}", hole.class_name());
    };
    assert_eq!(None, m53.magnet_0);
    assert!(m53.magnet_1.is_some());

    let empty = HoleM53 {
        magnet_0: None,
        magnet_1: None,
        ..Default::default()
    };
    assert!(!AnyHole::from(empty).has_magnet());
}
