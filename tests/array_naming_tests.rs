use json2state::deserialize::Deserializer;
use json2state::naming::{self, EntryName};
use json2state::node::{Role, ValueType};
use json2state::path::default_forbidden_chars;
use json2state::{Json2State, Memory, MemoryStore, Mode, Options, Value};
use serde_json::json;

fn v(value: serde_json::Value) -> Value {
    Value::from(value)
}

fn segment(element: serde_json::Value, options: &Options) -> String {
    naming::entry_name(&v(element), "", 0, options).segment
}

fn child_paths(path: &str, value: serde_json::Value, options: &Options) -> Vec<String> {
    let engine = Json2State::new(MemoryStore::new());
    engine
        .deserialize(path, &v(value), options)
        .map(|n| n.children.into_iter().map(|c| c.path).collect())
        .unwrap_or_default()
}

fn forced(zero_based: bool, no_pad: bool) -> Options {
    Options {
        force_index: true,
        zero_based_array_index: zero_based,
        disable_pad_index: no_pad,
        ..Options::default()
    }
}

#[test]
fn forced_index_padding() {
    let element = v(json!({"name": "ignored"}));
    let cases = [
        (forced(false, false), "01", "12"),
        (forced(false, true), "1", "12"),
        (forced(true, false), "00", "11"),
        (forced(true, true), "0", "11"),
    ];
    for (options, first, twelfth) in cases {
        assert_eq!(naming::entry_name(&element, "", 0, &options).segment, first);
        assert_eq!(naming::entry_name(&element, "", 11, &options).segment, twelfth);
    }
    assert_eq!(
        naming::entry_name(&element, "list", 0, &forced(false, false)).segment,
        "list.01"
    );
}

#[test]
fn default_segment_is_padded_position() {
    let options = Options::default();
    assert_eq!(naming::entry_name(&v(json!(5)), "", 0, &options).segment, "01");
    assert_eq!(naming::entry_name(&v(json!(5)), "", 9, &options).segment, "10");
    assert_eq!(naming::entry_name(&v(json!(5)), "item", 2, &options).segment, "item03");
}

#[test]
fn first_string_value_names_entry() {
    assert_eq!(segment(json!({"title": "Kitchen", "on": true}), &Options::default()), "Kitchen");
    assert_eq!(segment(json!({"on": true, "title": "Kitchen"}), &Options::default()), "01");
}

#[test]
fn id_and_name_suffix_keys() {
    let options = Options::default();
    assert_eq!(segment(json!({"on": 1, "deviceId": "a.b.c"}), &options), "abc");
    assert_eq!(segment(json!({"on": 1, "roomId": 3, "deviceId": 7}), &options), "7");
    assert_eq!(segment(json!({"on": 1, "deviceId": null}), &options), "01");
    assert_eq!(
        segment(json!({"on": 1, "deviceName": "Lamp", "deviceId": 7}), &options),
        "Lamp"
    );
}

#[test]
fn well_known_keys_win_over_suffix_keys() {
    let options = Options::default();
    assert_eq!(segment(json!({"on": 1, "deviceId": 7, "id": "x.1"}), &options), "x1");
    assert_eq!(segment(json!({"on": 1, "id": 4, "name": "desk"}), &options), "desk");
    assert_eq!(
        segment(json!({"on": 1, "name": "desk", "label": "Desk lamp"}), &options),
        "Desk lamp"
    );
    assert_eq!(
        segment(json!({"on": 1, "start_date_time": "2024.01.01", "name": "desk"}), &options),
        "20240101"
    );
    assert_eq!(segment(json!({"on": 1, "id": 0}), &options), "01");
    assert_eq!(segment(json!({"on": 1, "name": ""}), &options), "01");
}

#[test]
fn preferred_flat_name() {
    let options = Options {
        prefered_array_name: Some("serial".to_string()),
        ..Options::default()
    };
    let name = naming::entry_name(&v(json!({"name": "desk", "serial": "1.2"})), "", 0, &options);
    assert_eq!(
        name,
        EntryName {
            segment: "12".to_string(),
            preferred: true
        }
    );
    let name = naming::entry_name(&v(json!({"name": "desk"})), "", 0, &options);
    assert_eq!(name.segment, "desk");
    assert!(!name.preferred);
}

#[test]
fn preferred_nested_name() {
    let options = Options {
        prefered_array_name: Some("info/model".to_string()),
        ..Options::default()
    };
    assert_eq!(
        segment(json!({"name": "x", "info": {"model": "Hue 2.0"}}), &options),
        "Hue20"
    );
    assert_eq!(segment(json!({"name": "x"}), &options), "x");
}

#[test]
fn preferred_joined_name() {
    let options = Options {
        prefered_array_name: Some("room+device".to_string()),
        ..Options::default()
    };
    assert_eq!(
        segment(json!({"room": "Living room", "device": "lamp.1"}), &options),
        "Livingroom-lamp1"
    );

    let options = Options {
        prefered_array_name: Some("room+info/device".to_string()),
        ..Options::default()
    };
    assert_eq!(
        segment(json!({"room": "hall", "info": {"device": "spot"}}), &options),
        "hall-spot"
    );
    assert_eq!(segment(json!({"room": "hall", "device": "spot"}), &options), "hall-spot");
    assert_eq!(segment(json!({"name": "x"}), &options), "x");
}

#[test]
fn forced_index_beats_preferred_name() {
    let options = Options {
        force_index: true,
        prefered_array_name: Some("serial".to_string()),
        ..Options::default()
    };
    assert_eq!(segment(json!({"serial": "abc"}), &options), "01");
}

#[test]
fn compact_pairs_become_leaves() -> Result<(), Box<dyn std::error::Error>> {
    let value = json!([
        {"key": "temp", "value": 21.5},
        {"key": "null", "value": 1},
        {"key": "hum", "value": {"raw": 40}},
        {"key": "mode", "value": null}
    ]);
    let engine = Json2State::new(MemoryStore::new());
    let node = engine
        .deserialize("dev.props", &v(value), &Options::default())
        .ok_or("missing node")?;
    assert_eq!(node.mode, Mode::Array);

    let temp = &node.children[0];
    assert_eq!(temp.path, "dev.props.temp");
    assert!(temp.is_leaf());
    assert_eq!(temp.state, Some(json!(21.5)));
    let common = temp.common.as_ref().ok_or("missing common")?;
    assert_eq!(common.name, "key value");
    assert_eq!(common.role, Role::Value);

    // Not pairs: recursed by name.
    assert_eq!(node.children[1].path, "dev.props.null");
    assert_eq!(node.children[1].mode, Mode::Create);
    assert_eq!(node.children[2].path, "dev.props.hum");
    assert_eq!(node.children[2].children.len(), 2);
    assert_eq!(node.children[3].path, "dev.props.mode");
    Ok(())
}

#[test]
fn compact_pair_writability_uses_pair_name() -> Result<(), Box<dyn std::error::Error>> {
    let options = Options {
        make_state_writable_with_ending: vec!["value".to_string()],
        ..Options::default()
    };
    let engine = Json2State::new(MemoryStore::new());
    let node = engine
        .deserialize("dev", &v(json!([{"key": "temp", "value": 21}])), &options)
        .ok_or("missing node")?;
    let temp = &node.children[0];
    assert_eq!(temp.path, "dev.temp");
    let common = temp.common.as_ref().ok_or("missing common")?;
    assert_eq!(common.name, "key value");
    assert!(common.write);
    assert_eq!(common.role, Role::Level);

    // The entry's own value does not count as the ending.
    let options = Options {
        make_state_writable_with_ending: vec!["temp".to_string()],
        ..Options::default()
    };
    let node = engine
        .deserialize("dev", &v(json!([{"key": "temp", "value": 21}])), &options)
        .ok_or("missing node")?;
    let common = node.children[0].common.as_ref().ok_or("missing common")?;
    assert!(!common.write);
    assert_eq!(common.role, Role::Value);
    Ok(())
}

#[test]
fn compact_pairs_yield_to_forced_index_and_preferred_name() {
    let value = json!([{"key": "temp", "value": 21.5}]);
    assert_eq!(
        child_paths("dev", value.clone(), &forced(false, false)),
        ["dev.01"]
    );
    let options = Options {
        prefered_array_name: Some("key".to_string()),
        ..Options::default()
    };
    let engine = Json2State::new(MemoryStore::new());
    let node = engine.deserialize("dev", &v(value), &options);
    let child = node.map(|n| n.children[0].clone());
    assert_eq!(child.as_ref().map(|c| c.path.as_str()), Some("dev.temp"));
    assert_eq!(child.map(|c| c.mode), Some(Mode::Create));
}

#[test]
fn compact_pairs_respect_redaction() -> Result<(), Box<dyn std::error::Error>> {
    let options = Options {
        remove_passwords: true,
        ..Options::default()
    };
    let engine = Json2State::new(MemoryStore::new());
    let node = engine
        .deserialize("dev", &v(json!([{"k": "password", "v": "hunter2"}])), &options)
        .ok_or("missing node")?;
    assert_eq!(node.children[0].path, "dev.password");
    assert_eq!(node.children[0].mode, Mode::SkipPassword);
    Ok(())
}

#[test]
fn null_entries_consume_no_slot() {
    let paths = child_paths(
        "list",
        json!([null, {"on": true}, null, {"on": false}]),
        &Options::default(),
    );
    assert_eq!(paths, ["list.02", "list.04"]);
}

#[test]
fn string_entries_under_a_key_name_themselves() {
    let options = Options::default();
    let memory = Memory::new();
    let forbidden = default_forbidden_chars();
    let de = Deserializer::new(&options, &memory, &forbidden);
    let items = [v(json!("kitchen")), v(json!("garage"))];
    let node = de.deserialize_array("home", "rooms", &items);
    assert_eq!(node.path, "home.rooms");
    let paths: Vec<&str> = node.children.iter().map(|c| c.path.as_str()).collect();
    assert_eq!(paths, ["home.rooms.kitchen", "home.rooms.garage"]);
    assert_eq!(node.children[0].state, Some(json!("kitchen")));
}

#[test]
fn string_entries_at_top_level_use_positions() {
    let paths = child_paths("meals", json!(["🍔", "🥗"]), &Options::default());
    assert_eq!(paths, ["meals.01", "meals.02"]);
}

#[test]
fn auto_cast_entries_are_named_after_parsing() {
    let options = Options {
        auto_cast: true,
        ..Options::default()
    };
    let paths = child_paths("list", json!([r#"{"id": "a1", "on": true}"#]), &options);
    assert_eq!(paths, ["list.a1"]);
}

#[test]
fn meals_with_forced_zero_based_unpadded_index() -> Result<(), Box<dyn std::error::Error>> {
    let engine = Json2State::new(MemoryStore::new());
    let node = engine
        .deserialize("meals", &v(json!(["🍔", "🥗"])), &forced(true, true))
        .ok_or("missing node")?;
    assert_eq!(node.mode, Mode::Array);
    assert!(node.state.is_none());
    assert_eq!(node.children.len(), 2);
    let expected = [("meals.0", "🍔"), ("meals.1", "🥗")];
    for (child, (path, state)) in node.children.iter().zip(expected) {
        assert_eq!(child.path, path);
        assert_eq!(child.state, Some(json!(state)));
        let common = child.common.as_ref().ok_or("missing common")?;
        assert_eq!(common.role, Role::Text);
        assert_eq!(common.ty, ValueType::String);
    }
    Ok(())
}

#[test]
fn arrays_within_arrays() -> Result<(), Box<dyn std::error::Error>> {
    let input = json!([
        {
            "product": "🍔",
            "willKillYouEventually": true,
            "nutritionFacts": {
                "calories": 550,
                "fat": {
                    "total": 29,
                    "amounts": [
                        {"name": "saturated", "amount": 10},
                        {"name": "trans", "amount": 1.5}
                    ]
                }
            }
        },
        {
            "product": "🥗",
            "willKillYouEventually": false,
            "nutritionFacts": {"calories": 80}
        }
    ]);
    let engine = Json2State::new(MemoryStore::new());
    let node = engine
        .deserialize("mymeals.today", &v(input.clone()), &forced(true, true))
        .ok_or("missing node")?;
    assert_eq!(node.path, "mymeals.today");
    let burger = &node.children[0];
    assert_eq!(burger.path, "mymeals.today.0");
    assert_eq!(burger.children.len(), 3);
    let amounts = node
        .find("mymeals.today.0.nutritionFacts.fat.amounts")
        .ok_or("missing amounts")?;
    assert_eq!(amounts.mode, Mode::Array);
    assert!(node.find("mymeals.today.0.nutritionFacts.fat.amounts.1.amount").is_some());
    assert_eq!(
        node.find("mymeals.today.1.willKillYouEventually")
            .and_then(|n| n.state.clone()),
        Some(json!(false))
    );

    // Without forced indexes the entries are named by content.
    let node = engine
        .deserialize("mymeals.today", &v(input), &Options::default())
        .ok_or("missing node")?;
    assert_eq!(node.children[0].path, "mymeals.today._");
    let saturated = node
        .find("mymeals.today._.nutritionFacts.fat.amounts.saturated")
        .ok_or("missing pair leaf")?;
    assert_eq!(saturated.state, Some(json!(10)));
    assert_eq!(
        saturated.common.as_ref().map(|c| c.name.as_str()),
        Some("name amount")
    );
    Ok(())
}
