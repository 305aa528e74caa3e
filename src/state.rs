use crate::constants::{
    DISPLAY_HEIGHT, DISPLAY_WIDTH, FLAG_REGISTER, MEMORY_SIZE, PROGRAM_START, SPRITE_SHEET,
    STACK_DEPTH,
};
use crate::opcode::Opcode;

/// The framebuffer is a linear array of pixels indexed by `x + y * DISPLAY_WIDTH`.
/// Each element is 0 (off) or 1 (on).
pub type FrameBuffer = [u8; DISPLAY_WIDTH * DISPLAY_HEIGHT];

/// A snapshot of the Chip8 internal state
///
/// ## CPU
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose registers
///     - the 16th (VF) is the flag register, clobbered by arithmetic, shifts and draws
/// - (i) a 16-bit memory address register
///
/// Counter
/// - (pc) a 16-bit program counter, starting at 0x200
///
/// Pointer
/// - (sp) the number of occupied stack slots, 0..=16
///
/// Timers
/// - 2 8-bit timers (delay & sound), counted down by an external 60Hz tick
///
/// ## Memory
/// - 16 slot stack of return addresses
/// - 4096 bytes of addressable memory; the sprite sheet lives at 0x000..0x050
/// - 64x32 frame buffer plus a flag telling a renderer it changed
#[derive(Copy, Clone)]
pub struct State {
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    pub sp: u8,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub stack: [u16; STACK_DEPTH],
    pub memory: [u8; MEMORY_SIZE],
    pub frame_buffer: FrameBuffer,
    pub draw_flag: bool,
}

impl State {
    pub fn new() -> Self {
        let mut state = State {
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START,
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            stack: [0; STACK_DEPTH],
            memory: [0; MEMORY_SIZE],
            frame_buffer: [0; DISPLAY_WIDTH * DISPLAY_HEIGHT],
            draw_flag: false,
        };
        state.initialize();
        state
    }

    /// Zeroes every region, reloads the sprite sheet and points pc at 0x200.
    pub fn initialize(&mut self) {
        self.v = [0; 16];
        self.i = 0;
        self.pc = PROGRAM_START;
        self.sp = 0;
        self.delay_timer = 0;
        self.sound_timer = 0;
        self.stack = [0; STACK_DEPTH];
        self.memory = [0; MEMORY_SIZE];
        self.memory[..SPRITE_SHEET.len()].copy_from_slice(&SPRITE_SHEET);
        self.frame_buffer = [0; DISPLAY_WIDTH * DISPLAY_HEIGHT];
        self.draw_flag = false;
    }

    /// Reads a byte; addresses past the end of memory wrap around.
    pub fn read_byte(&self, addr: u16) -> u8 {
        self.memory[addr as usize % MEMORY_SIZE]
    }

    /// Writes a byte; addresses past the end of memory wrap around.
    pub fn write_byte(&mut self, addr: u16, value: u8) {
        self.memory[addr as usize % MEMORY_SIZE] = value;
    }

    /// Gets the opcode currently pointed at by the pc.
    /// Memory is stored as bytes, but opcodes are 16 bits so we combine two subsequent bytes.
    pub fn fetch(&self) -> Opcode {
        Opcode::from_bytes(self.read_byte(self.pc), self.read_byte(self.pc.wrapping_add(1)))
    }

    /// Moves pc past the next instruction.
    pub fn skip(&mut self) {
        self.pc = self.pc.wrapping_add(2);
    }

    /// Sets VF to 1 when `flag` holds, 0 otherwise.
    pub fn set_flag(&mut self, flag: bool) {
        self.v[FLAG_REGISTER] = u8::from(flag);
    }

    /// Reads the pixel at (x, y), both already within the screen.
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.frame_buffer[x + y * DISPLAY_WIDTH]
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}
