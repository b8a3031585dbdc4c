//! Fuzz target: `commands::interpret`
//!
//! Drives arbitrary text bodies through the inbound command interpreter
//! and asserts that it never panics, that suppression exactly tracks
//! trigger containment, and that a start command always carries the
//! originating address unchanged.
//!
//! cargo fuzz run fuzz_command_interpret

#![no_main]

use libfuzzer_sys::fuzz_target;
use phonefinder::app::commands::{interpret, Command};

fuzz_target!(|data: &[u8]| {
    let Ok(body) = core::str::from_utf8(data) else {
        return;
    };

    let command = interpret(body, "+15550000", "whereismyphone", "stop");

    // Suppression must exactly track trigger containment.
    let triggered = body.to_ascii_lowercase().contains("whereismyphone");
    assert_eq!(command.consumes_message(), triggered);

    match command {
        Command::Start { recipient } => {
            assert_eq!(recipient, "+15550000");
            assert!(triggered);
        }
        Command::Stop => {
            assert!(triggered);
            assert!(body.to_ascii_lowercase().contains("stop"));
        }
        Command::Ignore => assert!(!triggered),
    }
});
