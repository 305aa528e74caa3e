use crate::constants::KEY_COUNT;

/// # Keypad
/// The hexadecimal keypad, one pressed/released state per key 0x0..=0xF.
///
/// The VM only ever reads it; whatever is polling the real keyboard writes it
/// between steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Keypad {
    keys: [bool; KEY_COUNT],
}

impl Keypad {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `key` as held down. Keys outside 0x0..=0xF are ignored.
    pub fn press(&mut self, key: u8) {
        if let Some(k) = self.keys.get_mut(key as usize) {
            *k = true;
        }
    }

    /// Marks `key` as released. Keys outside 0x0..=0xF are ignored.
    pub fn release(&mut self, key: u8) {
        if let Some(k) = self.keys.get_mut(key as usize) {
            *k = false;
        }
    }

    /// Replaces every key state at once.
    pub fn set_all(&mut self, keys: [bool; KEY_COUNT]) {
        self.keys = keys;
    }

    /// Only the low nibble is significant, so any register value names a key.
    pub fn is_pressed(&self, key: u8) -> bool {
        self.keys[key as usize & 0xF]
    }

    /// The lowest-numbered key currently held, if any.
    pub fn first_pressed(&self) -> Option<u8> {
        self.keys.iter().position(|&k| k).map(|k| k as u8)
    }

    pub fn clear(&mut self) {
        self.keys = [false; KEY_COUNT];
    }
}

impl From<[bool; KEY_COUNT]> for Keypad {
    fn from(keys: [bool; KEY_COUNT]) -> Self {
        Keypad { keys }
    }
}
