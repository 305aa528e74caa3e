use emu8::{Chip8, Chip8Error, DISPLAY_WIDTH};

fn load(program: &[u16]) -> Chip8 {
    let rom: Vec<u8> = program.iter().flat_map(|op| op.to_be_bytes().to_vec()).collect();
    let mut chip8 = Chip8::new();
    chip8.load_rom(&rom).unwrap();
    chip8
}

fn run(chip8: &mut Chip8, steps: usize) {
    for _ in 0..steps {
        chip8.step().unwrap();
    }
}

#[test]
fn test_load_immediate_into_every_register() {
    let program: Vec<u16> = (0..16).map(|x| 0x6000 | (x << 8) | (0x10 + x)).collect();
    let mut chip8 = load(&program);
    run(&mut chip8, 16);
    for x in 0..16 {
        assert_eq!(chip8.state().v[x], 0x10 + x as u8);
    }
}

#[test]
fn test_add_wraps_then_doesnt() {
    // V1 = 250, V2 = 10, V1 += V2 twice
    let mut chip8 = load(&[0x61FA, 0x620A, 0x8124, 0x8124]);
    run(&mut chip8, 3);
    assert_eq!(chip8.state().v[0x1], 4);
    assert_eq!(chip8.state().v[0xF], 1);
    run(&mut chip8, 1);
    assert_eq!(chip8.state().v[0x1], 14);
    assert_eq!(chip8.state().v[0xF], 0);
}

#[test]
fn test_sub_borrows() {
    let mut chip8 = load(&[0x6105, 0x620A, 0x8125]);
    run(&mut chip8, 3);
    assert_eq!(chip8.state().v[0x1], 251);
    assert_eq!(chip8.state().v[0xF], 0);
}

#[test]
fn test_seventeenth_call_overflows() {
    // 0x200: CALL 0x200 forever
    let mut chip8 = load(&[0x2200]);
    run(&mut chip8, 16);
    assert_eq!(chip8.state().sp, 16);
    assert_eq!(
        chip8.step(),
        Err(Chip8Error::StackOverflow { pc: 0x200, depth: 16 })
    );
    assert_eq!(chip8.state().sp, 16);
}

#[test]
fn test_return_on_empty_stack_underflows() {
    let mut chip8 = load(&[0x00EE]);
    assert_eq!(chip8.step(), Err(Chip8Error::StackUnderflow { pc: 0x200 }));
}

#[test]
fn test_call_and_return() {
    // 0x200: CALL 0x206; 0x202: V1 = 1; 0x204: JP 0x204; 0x206: V2 = 2; 0x208: RET
    let mut chip8 = load(&[0x2206, 0x6101, 0x1204, 0x6202, 0x00EE]);
    run(&mut chip8, 3);
    assert_eq!(chip8.state().pc, 0x202);
    assert_eq!(chip8.state().sp, 0);
    run(&mut chip8, 1);
    assert_eq!(chip8.state().v[0x1], 1);
    assert_eq!(chip8.state().v[0x2], 2);
}

#[test]
fn test_sprite_wraps_to_left_edge() {
    // I = 0x300 (holds 0xFF), V0 = 60, draw one row at (V0, V1)
    let mut rom: Vec<u8> = [0xA300u16, 0x603C, 0xD011]
        .iter()
        .flat_map(|op| op.to_be_bytes().to_vec())
        .collect();
    // 0x200 + 0x100 = 0x300
    rom.resize(0x100, 0);
    rom.push(0xFF);
    let mut chip8 = Chip8::new();
    chip8.load_rom(&rom).unwrap();
    run(&mut chip8, 3);

    let frame = chip8.take_frame().expect("draw sets the redraw flag");
    assert_eq!(frame[60..64], [1, 1, 1, 1]);
    assert_eq!(frame[0..4], [1, 1, 1, 1]);
    assert!(frame[4..60].iter().all(|&p| p == 0));
    assert!(frame[DISPLAY_WIDTH..].iter().all(|&p| p == 0));
}

#[test]
fn test_drawing_twice_erases_and_collides() {
    // V0 = 7, I = glyph for 7, draw it, draw it again
    let mut chip8 = load(&[0x6007, 0xF029, 0xD005, 0xD005]);
    run(&mut chip8, 3);
    assert_eq!(chip8.state().v[0xF], 0);
    assert!(chip8.frame_buffer().iter().any(|&p| p == 1));
    run(&mut chip8, 1);
    assert_eq!(chip8.state().v[0xF], 1);
    assert!(chip8.frame_buffer().iter().all(|&p| p == 0));
}

#[test]
fn test_store_bcd() {
    // V3 = 157, I = 0x400, BCD V3
    let mut chip8 = load(&[0x639D, 0xA400, 0xF333]);
    run(&mut chip8, 3);
    assert_eq!(chip8.state().memory[0x400..0x403], [1, 5, 7]);
}

#[test]
fn test_save_then_load_registers_round_trips() {
    // V0..V3 = 11, 22, 33, 44; I = 0x500; save; clear V0..V3; load
    let mut chip8 = load(&[
        0x600B, 0x6116, 0x6221, 0x632C, 0xA500, 0xF355, 0x6000, 0x6100, 0x6200, 0x6300,
        0xF365,
    ]);
    run(&mut chip8, 10);
    assert_eq!(chip8.state().v[..4], [0, 0, 0, 0]);
    run(&mut chip8, 1);
    assert_eq!(chip8.state().v[..4], [11, 22, 33, 44]);
}

#[test]
fn test_wait_for_key_stalls_until_pressed() {
    let mut chip8 = load(&[0xF50A, 0x6101]);
    for _ in 0..10 {
        chip8.step().unwrap();
        assert_eq!(chip8.state().pc, 0x200);
    }
    chip8.key_press(0x9);
    chip8.step().unwrap();
    assert_eq!(chip8.state().v[0x5], 0x9);
    assert_eq!(chip8.state().pc, 0x202);
}

#[test]
fn test_timers_only_move_on_tick() {
    // V1 = 3; DT = V1; ST = V1; V2 = DT
    let mut chip8 = load(&[0x6103, 0xF115, 0xF118, 0xF207]);
    run(&mut chip8, 3);
    chip8.tick_timers();
    run(&mut chip8, 1);
    assert_eq!(chip8.state().v[0x2], 2);
    for _ in 0..5 {
        chip8.tick_timers();
    }
    assert_eq!(chip8.state().delay_timer, 0);
    assert_eq!(chip8.state().sound_timer, 0);
}

#[test]
fn test_jump_plus_v0() {
    let mut chip8 = load(&[0x6004, 0xB300]);
    run(&mut chip8, 2);
    assert_eq!(chip8.state().pc, 0x304);
}
