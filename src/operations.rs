use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH, SPRITE_HEIGHT, STACK_DEPTH};
use crate::error::{Chip8Error, Result};
use crate::keypad::Keypad;
use crate::state::State;

// Every handler runs after pc has been bumped past its own instruction, so
// `state.pc - 2` is the address of the instruction being executed.

fn current_address(state: &State) -> u16 {
    state.pc.wrapping_sub(2)
}

/// clear
pub fn clr(state: &mut State) {
    state.frame_buffer = [0; DISPLAY_WIDTH * DISPLAY_HEIGHT];
    state.draw_flag = true;
}

/// PC = STACK.pop()
pub fn rts(state: &mut State) -> Result<()> {
    if state.sp == 0 {
        return Err(Chip8Error::StackUnderflow {
            pc: current_address(state),
        });
    }
    state.sp -= 1;
    state.pc = state.stack[state.sp as usize];
    Ok(())
}

/// PC = addr
pub fn jump(state: &mut State, addr: u16) {
    state.pc = addr;
}

/// STACK.push(PC); PC = addr
pub fn call(state: &mut State, addr: u16) -> Result<()> {
    if state.sp as usize >= STACK_DEPTH {
        return Err(Chip8Error::StackOverflow {
            pc: current_address(state),
            depth: state.sp as usize,
        });
    }
    state.stack[state.sp as usize] = state.pc;
    state.sp += 1;
    state.pc = addr;
    Ok(())
}

/// if Vx == kk then pc += 2
pub fn ske(state: &mut State, x: u8, kk: u8) {
    if state.v[x as usize] == kk {
        state.skip();
    }
}

/// if Vx != kk then pc += 2
pub fn skne(state: &mut State, x: u8, kk: u8) {
    if state.v[x as usize] != kk {
        state.skip();
    }
}

/// if Vx == Vy then pc += 2
pub fn skre(state: &mut State, x: u8, y: u8) {
    if state.v[x as usize] == state.v[y as usize] {
        state.skip();
    }
}

/// Vx = kk
pub fn load(state: &mut State, x: u8, kk: u8) {
    state.v[x as usize] = kk;
}

/// Vx += kk
/// Add kk to Vx; allow for overflow but implicitly drop it
pub fn add(state: &mut State, x: u8, kk: u8) {
    state.v[x as usize] = state.v[x as usize].wrapping_add(kk);
}

/// Vx = Vy
pub fn mv(state: &mut State, x: u8, y: u8) {
    state.v[x as usize] = state.v[y as usize];
}

/// Vx |= Vy
pub fn or(state: &mut State, x: u8, y: u8) {
    state.v[x as usize] |= state.v[y as usize];
}

/// Vx &= Vy
pub fn and(state: &mut State, x: u8, y: u8) {
    state.v[x as usize] &= state.v[y as usize];
}

/// Vx ^= Vy
pub fn xor(state: &mut State, x: u8, y: u8) {
    state.v[x as usize] ^= state.v[y as usize];
}

/// Vx += Vy; VF = overflow
pub fn addr(state: &mut State, x: u8, y: u8) {
    let (res, over) = state.v[x as usize].overflowing_add(state.v[y as usize]);
    state.v[x as usize] = res;
    state.set_flag(over);
}

/// Vx -= Vy; VF = Vx > Vy
pub fn sub(state: &mut State, x: u8, y: u8) {
    let (vx, vy) = (state.v[x as usize], state.v[y as usize]);
    state.v[x as usize] = vx.wrapping_sub(vy);
    state.set_flag(vx > vy);
}

/// Vx >>= 1; VF = lsb
pub fn shr(state: &mut State, x: u8) {
    let vx = state.v[x as usize];
    state.v[x as usize] = vx >> 1;
    state.set_flag(vx & 0x1 == 0x1);
}

/// Vx = Vy - Vx; VF = Vy > Vx
pub fn subn(state: &mut State, x: u8, y: u8) {
    let (vx, vy) = (state.v[x as usize], state.v[y as usize]);
    state.v[x as usize] = vy.wrapping_sub(vx);
    state.set_flag(vy > vx);
}

/// Vx <<= 1; VF = msb
pub fn shl(state: &mut State, x: u8) {
    let vx = state.v[x as usize];
    state.v[x as usize] = vx << 1;
    state.set_flag(vx & 0x80 == 0x80);
}

/// if Vx != Vy then pc +=2
pub fn skrne(state: &mut State, x: u8, y: u8) {
    if state.v[x as usize] != state.v[y as usize] {
        state.skip();
    }
}

/// I = addr
pub fn loadi(state: &mut State, addr: u16) {
    state.i = addr;
}

/// PC = addr + V0
/// The offset is applied to the jump target, never to the running pc.
pub fn jumpi(state: &mut State, addr: u16) {
    state.pc = addr + u16::from(state.v[0x0]);
}

/// Vx = rand_byte & kk
pub fn rand(state: &mut State, x: u8, kk: u8) {
    let rand_byte: u8 = rand::random();
    state.v[x as usize] = rand_byte & kk;
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs a sprite from memory i..i+n at position x, y on the FrameBuffer with wrapping.
/// Sets VF if any pixels were erased
pub fn draw(state: &mut State, x: u8, y: u8, n: u8) {
    let origin_x = state.v[x as usize] as usize;
    let origin_y = state.v[y as usize] as usize;
    let mut collision = false;

    for row in 0..n as u16 {
        let sprite_byte = state.read_byte(state.i.wrapping_add(row));
        let py = (origin_y + row as usize) % DISPLAY_HEIGHT;
        for bit in 0..8 {
            let pixel_value = (sprite_byte >> (7 - bit)) & 1;
            if pixel_value == 0 {
                continue;
            }
            let px = (origin_x + bit) % DISPLAY_WIDTH;
            let pixel = &mut state.frame_buffer[px + py * DISPLAY_WIDTH];
            collision |= *pixel == 1;
            *pixel ^= 1;
        }
    }

    state.set_flag(collision);
    state.draw_flag = true;
}

/// if Vx.pressed then pc += 2
pub fn skpr(state: &mut State, x: u8, keypad: &Keypad) {
    if keypad.is_pressed(state.v[x as usize]) {
        state.skip();
    }
}

/// if !Vx.pressed then pc += 2
pub fn skup(state: &mut State, x: u8, keypad: &Keypad) {
    if !keypad.is_pressed(state.v[x as usize]) {
        state.skip();
    }
}

/// Vx = DT
pub fn moved(state: &mut State, x: u8) {
    state.v[x as usize] = state.delay_timer;
}

/// await keypress for Vx
/// With nothing held, pc is wound back onto this instruction so the next step
/// runs it again.
pub fn keyd(state: &mut State, x: u8, keypad: &Keypad) {
    match keypad.first_pressed() {
        Some(key) => state.v[x as usize] = key,
        None => state.pc = current_address(state),
    }
}

/// DT = Vx
pub fn loads(state: &mut State, x: u8) {
    state.delay_timer = state.v[x as usize];
}

/// ST = Vx
pub fn ld(state: &mut State, x: u8) {
    state.sound_timer = state.v[x as usize];
}

/// I += Vx
pub fn addi(state: &mut State, x: u8) {
    state.i = state.i.wrapping_add(u16::from(state.v[x as usize]));
}

/// I = Vx * 5
/// Set I to the memory address of the sprite for Vx
/// See constants::SPRITE_SHEET for more details
pub fn ldspr(state: &mut State, x: u8) {
    state.i = u16::from(state.v[x as usize]) * SPRITE_HEIGHT;
}

/// mem[I..I+3] = bcd(Vx)
/// Store BCD repr of Vx in memory starting at address i
pub fn bcd(state: &mut State, x: u8) {
    for (offset, digit) in double_dabble(state.v[x as usize]).iter().enumerate() {
        state.write_byte(state.i.wrapping_add(offset as u16), *digit);
    }
}

/// mem[I..=I+x] = V0..=Vx
pub fn stor(state: &mut State, x: u8) {
    for r in 0..=x as u16 {
        state.write_byte(state.i.wrapping_add(r), state.v[r as usize]);
    }
}

/// V0..=Vx = mem[I..=I+x]
pub fn read(state: &mut State, x: u8) {
    for r in 0..=x as u16 {
        state.v[r as usize] = state.read_byte(state.i.wrapping_add(r));
    }
}

/// Splits a byte into its hundreds, tens and ones digits using shift-and-add-3.
///
/// The byte is shifted left into a 12-bit scratch area one bit at a time;
/// before each shift any BCD column holding 5 or more gets 3 added so it
/// carries into the next column on the shift.
pub fn double_dabble(value: u8) -> [u8; 3] {
    // bits 0..8 hold the input, 8..12 ones, 12..16 tens, 16..20 hundreds
    let mut scratch = u32::from(value);
    for _ in 0..8 {
        for &shift in &[8u32, 12, 16] {
            if (scratch >> shift) & 0xF >= 5 {
                scratch += 3u32 << shift;
            }
        }
        scratch <<= 1;
    }
    [
        ((scratch >> 16) & 0xF) as u8,
        ((scratch >> 12) & 0xF) as u8,
        ((scratch >> 8) & 0xF) as u8,
    ]
}
