pub use chip8::Chip8;
pub use constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH, KEY_COUNT, MAX_ROM_SIZE, TIMER_HZ};
pub use error::{Chip8Error, Result};
pub use instruction::Instruction;
pub use keypad::Keypad;
pub use opcode::Opcode;
pub use state::{FrameBuffer, State};

mod chip8;
pub mod constants;
mod error;
mod instruction;
mod keypad;
mod opcode;
mod operations;
pub mod state;
