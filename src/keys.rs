use crate::messages::Command;
use anyhow::Result;
use evdev::{Device, EventStream, EventSummary, EventType, KeyCode};
use std::collections::HashSet;
use tokio::sync::mpsc;

const DIGIT_KEYS: [KeyCode; 9] = [
    KeyCode::KEY_1,
    KeyCode::KEY_2,
    KeyCode::KEY_3,
    KeyCode::KEY_4,
    KeyCode::KEY_5,
    KeyCode::KEY_6,
    KeyCode::KEY_7,
    KeyCode::KEY_8,
    KeyCode::KEY_9,
];

const KEYPAD_KEYS: [KeyCode; 9] = [
    KeyCode::KEY_KP1,
    KeyCode::KEY_KP2,
    KeyCode::KEY_KP3,
    KeyCode::KEY_KP4,
    KeyCode::KEY_KP5,
    KeyCode::KEY_KP6,
    KeyCode::KEY_KP7,
    KeyCode::KEY_KP8,
    KeyCode::KEY_KP9,
];

/// Map a key to a tally command: digits 1..=N vote (keypad digits alias the
/// top row), 0 records an invalid ballot, Z undoes, F finalizes. Digits past
/// the configured candidate count are unmapped.
pub fn map_key(code: KeyCode, candidate_count: usize) -> Option<Command> {
    match code {
        KeyCode::KEY_Z => Some(Command::Undo),
        KeyCode::KEY_F => Some(Command::Finalize),
        KeyCode::KEY_0 | KeyCode::KEY_KP0 => Some(Command::Invalid),
        _ => digit_index(code)
            .filter(|&index| index < candidate_count)
            .map(Command::Vote),
    }
}

fn digit_index(code: KeyCode) -> Option<usize> {
    DIGIT_KEYS
        .iter()
        .position(|&key| key == code)
        .or_else(|| KEYPAD_KEYS.iter().position(|&key| key == code))
}

/// Monitor every attached keyboard and forward mapped commands on the channel.
pub async fn monitor_keyboards(candidate_count: usize, tx: mpsc::Sender<Command>) -> Result<()> {
    let keyboards: Vec<Device> = evdev::enumerate()
        .map(|(_, device)| device)
        .filter(|device| device.supported_events().contains(EventType::KEY))
        .collect();

    if keyboards.is_empty() {
        tracing::warn!("No keyboard input devices found (is this user in the input group?)");
        return Ok(());
    }

    for device in keyboards {
        let name = device.name().unwrap_or("unknown keyboard").to_string();
        match device.into_event_stream() {
            Ok(stream) => {
                tracing::info!("Monitoring keyboard: {}", name);
                tokio::spawn(monitor_device(stream, candidate_count, tx.clone()));
            }
            Err(e) => tracing::warn!("Failed to open event stream for {}: {}", name, e),
        }
    }

    Ok(())
}

/// Forward key presses from one device.
///
/// Held keys are tracked as an explicit set so a key fires once per physical
/// press: the kernel's auto-repeat events are dropped, and a re-press only
/// counts after the matching key-up has been seen.
async fn monitor_device(
    mut stream: EventStream,
    candidate_count: usize,
    tx: mpsc::Sender<Command>,
) {
    let mut held: HashSet<KeyCode> = HashSet::new();

    loop {
        let event = match stream.next_event().await {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("Keyboard stream closed: {}", e);
                return;
            }
        };

        let EventSummary::Key(_, code, value) = event.destructure() else {
            continue;
        };

        match value {
            0 => {
                held.remove(&code);
            }
            1 => {
                if !held.insert(code) {
                    continue;
                }
                if let Some(command) = map_key(code, candidate_count) {
                    tracing::debug!("Key {:?} -> {:?}", code, command);
                    if tx.send(command).await.is_err() {
                        return;
                    }
                }
            }
            // value 2 is the kernel auto-repeat
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_vote_for_their_candidate() {
        assert_eq!(map_key(KeyCode::KEY_1, 3), Some(Command::Vote(0)));
        assert_eq!(map_key(KeyCode::KEY_3, 3), Some(Command::Vote(2)));
        assert_eq!(map_key(KeyCode::KEY_KP2, 3), Some(Command::Vote(1)));
    }

    #[test]
    fn digits_past_candidate_count_are_unmapped() {
        assert_eq!(map_key(KeyCode::KEY_3, 2), None);
        assert_eq!(map_key(KeyCode::KEY_9, 3), None);
        assert_eq!(map_key(KeyCode::KEY_KP4, 3), None);
    }

    #[test]
    fn control_keys_map_to_their_commands() {
        assert_eq!(map_key(KeyCode::KEY_0, 2), Some(Command::Invalid));
        assert_eq!(map_key(KeyCode::KEY_KP0, 2), Some(Command::Invalid));
        assert_eq!(map_key(KeyCode::KEY_Z, 2), Some(Command::Undo));
        assert_eq!(map_key(KeyCode::KEY_F, 2), Some(Command::Finalize));
    }

    #[test]
    fn unrelated_keys_are_unmapped() {
        assert_eq!(map_key(KeyCode::KEY_A, 3), None);
        assert_eq!(map_key(KeyCode::KEY_SPACE, 3), None);
        assert_eq!(map_key(KeyCode::KEY_ENTER, 3), None);
    }
}
