use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use emu8::KEY_COUNT;

/// # Keymap
/// Chip-8 input is generated with a hexadecimal keypad.
///
/// This original layout is mapped to the left 4 alphanumeric columns.
/// ```text
/// |1|2|3|C|      |1|2|3|4|
/// |4|5|6|D|  ->  |Q|W|E|R|
/// |7|8|9|E|  ->  |A|S|D|F|
/// |A|0|B|F|      |Z|X|C|V|
/// ```
pub fn keymap(key: KeyCode) -> Option<u8> {
    let c = match key {
        KeyCode::Char(c) => c.to_ascii_lowercase(),
        _ => return None,
    };
    match c {
        'x' => Some(0x0),
        '1' => Some(0x1),
        '2' => Some(0x2),
        '3' => Some(0x3),
        'q' => Some(0x4),
        'w' => Some(0x5),
        'e' => Some(0x6),
        'a' => Some(0x7),
        's' => Some(0x8),
        'd' => Some(0x9),
        'z' => Some(0xA),
        'c' => Some(0xB),
        '4' => Some(0xC),
        'r' => Some(0xD),
        'f' => Some(0xE),
        'v' => Some(0xF),
        _ => None,
    }
}

/// Terminals report key presses (and auto-repeats) but usually not releases,
/// so a key counts as held until `hold` has passed since its last press.
pub struct HeldKeys {
    last_pressed: [Option<Instant>; KEY_COUNT],
    hold: Duration,
}

impl HeldKeys {
    pub fn new(hold: Duration) -> Self {
        HeldKeys {
            last_pressed: [None; KEY_COUNT],
            hold,
        }
    }

    pub fn press(&mut self, key: u8, now: Instant) {
        self.last_pressed[key as usize & 0xF] = Some(now);
    }

    /// For terminals that do report releases.
    pub fn release(&mut self, key: u8) {
        self.last_pressed[key as usize & 0xF] = None;
    }

    pub fn snapshot(&self, now: Instant) -> [bool; KEY_COUNT] {
        let mut keys = [false; KEY_COUNT];
        for (held, pressed) in keys.iter_mut().zip(self.last_pressed.iter()) {
            *held = matches!(pressed, Some(at) if now.duration_since(*at) < self.hold);
        }
        keys
    }
}
