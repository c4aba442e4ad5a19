//! Device Directory Tests (hearth-core)
//!
//! Exercises the full capability table: every deployed device accepts
//! its documented actions and rejects everything else.

use hearth_core::{DeviceDirectory, Error};

fn dir() -> DeviceDirectory {
    DeviceDirectory::default_home()
}

#[test]
fn test_every_deployed_action_is_valid() {
    let cases: &[(&str, &str, &[&str])] = &[
        ("livingroom", "light", &["ON", "OFF"]),
        ("livingroom", "ac", &["ON", "OFF", "SET_TEMP"]),
        ("bedroom", "main_light", &["ON", "OFF"]),
        ("bedroom", "bedside_light", &["ON", "OFF", "SET_BRIGHTNESS"]),
        ("bedroom", "ac", &["ON", "OFF", "SET_TEMP"]),
        ("kitchen", "light", &["ON", "OFF"]),
        ("kitchen", "hood", &["ON", "OFF", "SET_SPEED"]),
        ("kitchen", "oven", &["START", "STOP", "SET_MODE"]),
        ("bathroom", "light", &["ON", "OFF"]),
    ];

    let dir = dir();
    for (room, device, actions) in cases {
        for action in *actions {
            assert!(
                dir.validate(room, device, action).is_ok(),
                "{room}/{device} should accept {action}"
            );
        }
    }
}

#[test]
fn test_actions_do_not_leak_across_device_kinds() {
    let dir = dir();

    // Switches take no parameterized actions
    assert!(matches!(
        dir.validate("bathroom", "light", "SET_BRIGHTNESS"),
        Err(Error::UnsupportedAction { .. })
    ));

    // Oven uses START/STOP, not ON/OFF
    assert!(matches!(
        dir.validate("kitchen", "oven", "ON"),
        Err(Error::UnsupportedAction { .. })
    ));

    // Case matters on the wire
    assert!(matches!(
        dir.validate("livingroom", "light", "on"),
        Err(Error::UnsupportedAction { .. })
    ));
}

#[test]
fn test_unknown_room_and_device() {
    let dir = dir();

    assert_eq!(
        dir.validate("attic", "light", "ON"),
        Err(Error::UnknownRoom("attic".to_string()))
    );
    assert_eq!(
        dir.validate("kitchen", "dishwasher", "ON"),
        Err(Error::UnknownDevice {
            room: "kitchen".to_string(),
            device: "dishwasher".to_string(),
        })
    );
}

#[test]
fn test_directory_listing_is_stable() {
    let dir = dir();
    let rooms: Vec<&str> = dir.rooms().map(|(room, _)| room).collect();

    // BTreeMap ordering keeps the listing deterministic for API output
    assert_eq!(rooms, ["bathroom", "bedroom", "kitchen", "livingroom"]);
}
