use crate::error::Result;
use crate::keypad::Keypad;
use crate::opcode::Opcode;
use crate::operations::*;
use crate::state::State;

/// A decoded instruction with its operands pulled out of the opcode.
///
/// `x` and `y` name registers, `kk` is an immediate byte, `addr` a 12-bit
/// address and `n` a sprite height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Clear,
    Return,
    Jump { addr: u16 },
    Call { addr: u16 },
    SkipIfEqualImmediate { x: u8, kk: u8 },
    SkipIfNotEqualImmediate { x: u8, kk: u8 },
    SkipIfRegistersEqual { x: u8, y: u8 },
    LoadImmediate { x: u8, kk: u8 },
    AddImmediate { x: u8, kk: u8 },
    Copy { x: u8, y: u8 },
    Or { x: u8, y: u8 },
    And { x: u8, y: u8 },
    Xor { x: u8, y: u8 },
    Add { x: u8, y: u8 },
    SubXY { x: u8, y: u8 },
    ShiftRight { x: u8 },
    SubYX { x: u8, y: u8 },
    ShiftLeft { x: u8 },
    SkipIfRegistersNotEqual { x: u8, y: u8 },
    SetIndex { addr: u16 },
    JumpPlusV0 { addr: u16 },
    Random { x: u8, kk: u8 },
    DrawSprite { x: u8, y: u8, n: u8 },
    SkipIfKeyPressed { x: u8 },
    SkipIfKeyNotPressed { x: u8 },
    LoadDelayIntoRegister { x: u8 },
    WaitForKey { x: u8 },
    SetDelay { x: u8 },
    SetSound { x: u8 },
    AddToIndex { x: u8 },
    SpriteAddress { x: u8 },
    StoreBcd { x: u8 },
    SaveRegisters { x: u8 },
    LoadRegisters { x: u8 },
}

type Decoder = fn(Opcode) -> Instruction;

/// `(mask, pattern, decoder)` triples. An opcode selects the first entry for
/// which `opcode & mask == pattern`.
///
/// Entries are ordered from the most to the least specific mask so that a
/// fully fixed word such as 00E0 can never be claimed by a broader pattern
/// sharing its top nibble. Keep it that way when adding entries.
const DECODE_TABLE: [(u16, u16, Decoder); 34] = [
    (0xFFFF, 0x00E0, |_| Instruction::Clear),
    (0xFFFF, 0x00EE, |_| Instruction::Return),
    (0xF0FF, 0xE09E, |op| Instruction::SkipIfKeyPressed { x: op.x() }),
    (0xF0FF, 0xE0A1, |op| Instruction::SkipIfKeyNotPressed { x: op.x() }),
    (0xF0FF, 0xF007, |op| Instruction::LoadDelayIntoRegister { x: op.x() }),
    (0xF0FF, 0xF00A, |op| Instruction::WaitForKey { x: op.x() }),
    (0xF0FF, 0xF015, |op| Instruction::SetDelay { x: op.x() }),
    (0xF0FF, 0xF018, |op| Instruction::SetSound { x: op.x() }),
    (0xF0FF, 0xF01E, |op| Instruction::AddToIndex { x: op.x() }),
    (0xF0FF, 0xF029, |op| Instruction::SpriteAddress { x: op.x() }),
    (0xF0FF, 0xF033, |op| Instruction::StoreBcd { x: op.x() }),
    (0xF0FF, 0xF055, |op| Instruction::SaveRegisters { x: op.x() }),
    (0xF0FF, 0xF065, |op| Instruction::LoadRegisters { x: op.x() }),
    (0xF00F, 0x5000, |op| Instruction::SkipIfRegistersEqual { x: op.x(), y: op.y() }),
    (0xF00F, 0x8000, |op| Instruction::Copy { x: op.x(), y: op.y() }),
    (0xF00F, 0x8001, |op| Instruction::Or { x: op.x(), y: op.y() }),
    (0xF00F, 0x8002, |op| Instruction::And { x: op.x(), y: op.y() }),
    (0xF00F, 0x8003, |op| Instruction::Xor { x: op.x(), y: op.y() }),
    (0xF00F, 0x8004, |op| Instruction::Add { x: op.x(), y: op.y() }),
    (0xF00F, 0x8005, |op| Instruction::SubXY { x: op.x(), y: op.y() }),
    (0xF00F, 0x8006, |op| Instruction::ShiftRight { x: op.x() }),
    (0xF00F, 0x8007, |op| Instruction::SubYX { x: op.x(), y: op.y() }),
    (0xF00F, 0x800E, |op| Instruction::ShiftLeft { x: op.x() }),
    (0xF00F, 0x9000, |op| Instruction::SkipIfRegistersNotEqual { x: op.x(), y: op.y() }),
    (0xF000, 0x1000, |op| Instruction::Jump { addr: op.addr() }),
    (0xF000, 0x2000, |op| Instruction::Call { addr: op.addr() }),
    (0xF000, 0x3000, |op| Instruction::SkipIfEqualImmediate { x: op.x(), kk: op.kk() }),
    (0xF000, 0x4000, |op| Instruction::SkipIfNotEqualImmediate { x: op.x(), kk: op.kk() }),
    (0xF000, 0x6000, |op| Instruction::LoadImmediate { x: op.x(), kk: op.kk() }),
    (0xF000, 0x7000, |op| Instruction::AddImmediate { x: op.x(), kk: op.kk() }),
    (0xF000, 0xA000, |op| Instruction::SetIndex { addr: op.addr() }),
    (0xF000, 0xB000, |op| Instruction::JumpPlusV0 { addr: op.addr() }),
    (0xF000, 0xC000, |op| Instruction::Random { x: op.x(), kk: op.kk() }),
    (0xF000, 0xD000, |op| Instruction::DrawSprite { x: op.x(), y: op.y(), n: op.n() }),
];

impl Instruction {
    /// Selects the Instruction for a given Opcode, or None if no pattern matches.
    pub fn decode(op: Opcode) -> Option<Instruction> {
        DECODE_TABLE
            .iter()
            .find(|(mask, pattern, _)| op.matches(*mask, *pattern))
            .map(|(_, _, decoder)| decoder(op))
    }

    /// Applies the instruction to `state`.
    ///
    /// The caller has already moved pc past this instruction, so jumps, calls
    /// and skips work relative to the following one.
    pub fn execute(self, state: &mut State, keypad: &Keypad) -> Result<()> {
        match self {
            Instruction::Clear => clr(state),
            Instruction::Return => return rts(state),
            Instruction::Jump { addr } => jump(state, addr),
            Instruction::Call { addr } => return call(state, addr),
            Instruction::SkipIfEqualImmediate { x, kk } => ske(state, x, kk),
            Instruction::SkipIfNotEqualImmediate { x, kk } => skne(state, x, kk),
            Instruction::SkipIfRegistersEqual { x, y } => skre(state, x, y),
            Instruction::LoadImmediate { x, kk } => load(state, x, kk),
            Instruction::AddImmediate { x, kk } => add(state, x, kk),
            Instruction::Copy { x, y } => mv(state, x, y),
            Instruction::Or { x, y } => or(state, x, y),
            Instruction::And { x, y } => and(state, x, y),
            Instruction::Xor { x, y } => xor(state, x, y),
            Instruction::Add { x, y } => addr(state, x, y),
            Instruction::SubXY { x, y } => sub(state, x, y),
            Instruction::ShiftRight { x } => shr(state, x),
            Instruction::SubYX { x, y } => subn(state, x, y),
            Instruction::ShiftLeft { x } => shl(state, x),
            Instruction::SkipIfRegistersNotEqual { x, y } => skrne(state, x, y),
            Instruction::SetIndex { addr } => loadi(state, addr),
            Instruction::JumpPlusV0 { addr } => jumpi(state, addr),
            Instruction::Random { x, kk } => rand(state, x, kk),
            Instruction::DrawSprite { x, y, n } => draw(state, x, y, n),
            Instruction::SkipIfKeyPressed { x } => skpr(state, x, keypad),
            Instruction::SkipIfKeyNotPressed { x } => skup(state, x, keypad),
            Instruction::LoadDelayIntoRegister { x } => moved(state, x),
            Instruction::WaitForKey { x } => keyd(state, x, keypad),
            Instruction::SetDelay { x } => loads(state, x),
            Instruction::SetSound { x } => ld(state, x),
            Instruction::AddToIndex { x } => addi(state, x),
            Instruction::SpriteAddress { x } => ldspr(state, x),
            Instruction::StoreBcd { x } => bcd(state, x),
            Instruction::SaveRegisters { x } => stor(state, x),
            Instruction::LoadRegisters { x } => read(state, x),
        }
        Ok(())
    }
}
