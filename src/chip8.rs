use std::collections::VecDeque;

use tracing::{debug, trace, warn};

use crate::constants::{KEY_COUNT, MAX_ROM_SIZE, PROGRAM_START};
use crate::error::{Chip8Error, Result};
use crate::instruction::Instruction;
use crate::keypad::Keypad;
use crate::state::{FrameBuffer, State};

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Tracks:
///  - current `state`
///  - `previous_states` for rewinding
///  - `keypad` with public interfaces for manipulating it
///
/// Supplies interfaces for:
/// - loading roms
/// - pressing and releasing keys
/// - advancing and reversing the CPU
/// - advancing its timers
/// - inspecting its frame buffer for rendering by some display
///
/// `step` and `tick_timers` are independent: whoever drives the VM decides how
/// many instructions run between two 60Hz timer ticks.
pub struct Chip8 {
    state: State,
    previous_states: VecDeque<State>,
    history_depth: usize,
    keypad: Keypad,
}

impl Chip8 {
    /// A freshly initialized VM that keeps no rewind history.
    pub fn new() -> Self {
        Self::with_history(0)
    }

    /// A freshly initialized VM that remembers up to `depth` past states.
    pub fn with_history(depth: usize) -> Self {
        Chip8 {
            state: State::new(),
            previous_states: VecDeque::with_capacity(depth),
            history_depth: depth,
            keypad: Keypad::new(),
        }
    }

    /// Puts the VM back into its power-on state, forgetting any loaded ROM.
    pub fn reset(&mut self) {
        self.state.initialize();
        self.previous_states.clear();
        self.keypad.clear();
        debug!("chip8 reset");
    }

    /// Copies `rom` into memory at 0x200.
    ///
    /// Fails without touching memory if the ROM doesn't fit in 0x200..0x1000.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<()> {
        if rom.len() > MAX_ROM_SIZE {
            return Err(Chip8Error::RomTooLarge {
                size: rom.len(),
                max: MAX_ROM_SIZE,
            });
        }
        let start = PROGRAM_START as usize;
        self.state.memory[start..start + rom.len()].copy_from_slice(rom);
        debug!(bytes = rom.len(), "loaded ROM");
        Ok(())
    }

    /// Advances the CPU by a single instruction
    /// - fetches the opcode at pc and moves pc past it
    /// - decodes and executes it
    ///
    /// An unknown opcode or a stack fault is returned to the caller; pc has
    /// still moved on, so stepping again continues with the next instruction.
    pub fn step(&mut self) -> Result<()> {
        if self.history_depth > 0 {
            self.save_state();
        }

        let pc = self.state.pc;
        let op = self.state.fetch();
        self.state.skip();
        trace!(
            "{} v{:02X?} i{:04X} pc{:04X}",
            op,
            self.state.v,
            self.state.i,
            pc
        );

        let result = match Instruction::decode(op) {
            Some(instruction) => instruction.execute(&mut self.state, &self.keypad),
            None => Err(Chip8Error::UnknownOpcode { opcode: op.0, pc }),
        };
        if let Err(err) = &result {
            warn!(%err, "step failed");
        }
        result
    }

    /// Counts both timers down by one, stopping at zero.
    /// Meant to be called at a fixed 60Hz, never from inside `step`.
    pub fn tick_timers(&mut self) {
        self.state.delay_timer = self.state.delay_timer.saturating_sub(1);
        self.state.sound_timer = self.state.sound_timer.saturating_sub(1);
    }

    /// Reverses the CPU by a single step if possible
    /// - if there are previous_states, pops the last one and restores it
    pub fn rewind(&mut self) -> bool {
        match self.previous_states.pop_front() {
            Some(state) => {
                self.state = state;
                debug!(pc = state.pc, "rewound one step");
                true
            }
            None => false,
        }
    }

    /// Puts the current state in previous_states
    /// - if there are already `history_depth` saved then the oldest is dropped
    fn save_state(&mut self) {
        if self.previous_states.len() == self.history_depth {
            self.previous_states.pop_back();
        }
        self.previous_states.push_front(self.state);
    }

    pub fn history_len(&self) -> usize {
        self.previous_states.len()
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.state.frame_buffer
    }

    /// True when the frame buffer changed since the last `take_frame`/`clear_redraw`.
    pub fn needs_redraw(&self) -> bool {
        self.state.draw_flag
    }

    pub fn clear_redraw(&mut self) {
        self.state.draw_flag = false;
    }

    /// Returns the FrameBuffer if the display should be redrawn, clearing the flag
    pub fn take_frame(&mut self) -> Option<FrameBuffer> {
        if self.state.draw_flag {
            self.state.draw_flag = false;
            Some(self.state.frame_buffer)
        } else {
            None
        }
    }

    /// Set the pressed status of key
    ///
    /// # Arguments
    /// * `key` the 4-bit index of the key that was pressed
    pub fn key_press(&mut self, key: u8) {
        self.keypad.press(key);
    }

    /// Unset the pressed status of key
    ///
    /// # Arguments
    /// * `key` the 4-bit index of the key that was released
    pub fn key_release(&mut self, key: u8) {
        self.keypad.release(key);
    }

    pub fn set_keys(&mut self, keys: [bool; KEY_COUNT]) {
        self.keypad.set_all(keys);
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    /// A buzzer should sound for as long as this holds.
    pub fn sound_active(&self) -> bool {
        self.state.sound_timer > 0
    }

    pub fn state(&self) -> &State {
        &self.state
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MEMORY_SIZE;

    fn chip8_with(program: &[u8]) -> Chip8 {
        let mut chip8 = Chip8::new();
        chip8.load_rom(program).unwrap();
        chip8
    }

    #[test]
    fn test_step_advances_pc() {
        // insert a cls opcode so the step has something to run
        let mut chip8 = chip8_with(&[0x00, 0xE0]);
        let starting_pc = chip8.state.pc;
        chip8.step().unwrap();
        assert_eq!(chip8.state.pc, starting_pc + 0x2);
    }

    #[test]
    fn test_unknown_opcode_is_reported_and_skipped() {
        let mut chip8 = chip8_with(&[0x01, 0x23, 0x61, 0x05]);
        assert_eq!(
            chip8.step(),
            Err(Chip8Error::UnknownOpcode { opcode: 0x0123, pc: 0x200 })
        );
        assert_eq!(chip8.state.pc, 0x202);
        chip8.step().unwrap();
        assert_eq!(chip8.state.v[0x1], 0x05);
    }

    #[test]
    fn test_load_rom_too_large_writes_nothing() {
        let mut chip8 = Chip8::new();
        let rom = vec![0xAB; MAX_ROM_SIZE + 1];
        assert_eq!(
            chip8.load_rom(&rom),
            Err(Chip8Error::RomTooLarge { size: MAX_ROM_SIZE + 1, max: MAX_ROM_SIZE })
        );
        assert!(chip8.state.memory[0x200..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_load_rom_fills_program_space_exactly() {
        let mut chip8 = Chip8::new();
        let rom = vec![0xAB; MAX_ROM_SIZE];
        chip8.load_rom(&rom).unwrap();
        assert_eq!(chip8.state.memory[0x1FF], 0);
        assert_eq!(chip8.state.memory[0x200], 0xAB);
        assert_eq!(chip8.state.memory[MEMORY_SIZE - 1], 0xAB);
    }

    #[test]
    fn test_tick_timers_saturates() {
        let mut chip8 = Chip8::new();
        chip8.state.delay_timer = 2;
        chip8.state.sound_timer = 1;
        assert!(chip8.sound_active());
        chip8.tick_timers();
        assert_eq!((chip8.state.delay_timer, chip8.state.sound_timer), (1, 0));
        assert!(!chip8.sound_active());
        chip8.tick_timers();
        chip8.tick_timers();
        assert_eq!((chip8.state.delay_timer, chip8.state.sound_timer), (0, 0));
    }

    #[test]
    fn test_step_never_ticks_timers() {
        let mut chip8 = chip8_with(&[0x12, 0x00]);
        chip8.state.delay_timer = 10;
        for _ in 0..100 {
            chip8.step().unwrap();
        }
        assert_eq!(chip8.state.delay_timer, 10);
    }

    #[test]
    fn test_take_frame_clears_redraw() {
        let mut chip8 = chip8_with(&[0x00, 0xE0]);
        assert!(chip8.take_frame().is_none());
        chip8.step().unwrap();
        assert!(chip8.needs_redraw());
        assert!(chip8.take_frame().is_some());
        assert!(!chip8.needs_redraw());
        assert!(chip8.take_frame().is_none());
    }

    #[test]
    fn test_chip8_saves_state() {
        let mut chip8 = Chip8::with_history(4);
        chip8.save_state();
        assert_eq!(chip8.previous_states.len(), 1);
    }

    #[test]
    fn test_chip8_drops_old_saved_states() {
        let mut chip8 = Chip8::with_history(4);
        for _ in 0..4 {
            chip8.save_state();
        }
        assert_eq!(4, chip8.previous_states.len());
        chip8.save_state();
        assert_eq!(4, chip8.previous_states.len());
    }

    #[test]
    fn test_no_history_by_default() {
        let mut chip8 = chip8_with(&[0x00, 0xE0]);
        chip8.step().unwrap();
        assert_eq!(chip8.history_len(), 0);
        assert!(!chip8.rewind());
    }

    #[test]
    fn test_rewind_restores_previous_step() {
        let mut chip8 = Chip8::with_history(8);
        chip8.load_rom(&[0x61, 0x05, 0x71, 0x01]).unwrap();
        chip8.step().unwrap();
        chip8.step().unwrap();
        assert_eq!(chip8.state.v[0x1], 0x06);
        assert!(chip8.rewind());
        assert_eq!(chip8.state.v[0x1], 0x05);
        assert_eq!(chip8.state.pc, 0x202);
        assert!(chip8.rewind());
        assert_eq!(chip8.state.pc, 0x200);
        assert!(!chip8.rewind());
    }

    #[test]
    fn test_reset_forgets_rom_keys_and_history() {
        let mut chip8 = Chip8::with_history(8);
        chip8.load_rom(&[0x61, 0x05]).unwrap();
        chip8.key_press(0x3);
        chip8.step().unwrap();
        chip8.reset();
        assert_eq!(chip8.state.pc, 0x200);
        assert_eq!(chip8.state.memory[0x200], 0);
        assert_eq!(chip8.state.v[0x1], 0);
        assert_eq!(chip8.history_len(), 0);
        assert_eq!(chip8.keypad().first_pressed(), None);
    }

    #[test]
    fn test_captures_key_presses() {
        let mut chip8 = Chip8::new();
        chip8.key_press(0xE);
        assert!(chip8.keypad().is_pressed(0xE));
        chip8.key_release(0xE);
        assert!(!chip8.keypad().is_pressed(0xE));
        let mut keys = [false; KEY_COUNT];
        keys[0x2] = true;
        chip8.set_keys(keys);
        assert_eq!(chip8.keypad().first_pressed(), Some(0x2));
    }
}
