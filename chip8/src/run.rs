use std::fs;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use tracing::info;

use emu8::Chip8;

use crate::config::Config;
use crate::display::Display;
use crate::keymap::{keymap, HeldKeys};

pub fn run(config: &Config) -> anyhow::Result<()> {
    // Load ROM
    let rom = fs::read(&config.rom)
        .with_context(|| format!("unable to read ROM {}", config.rom.display()))?;
    let mut chip8 = Chip8::with_history(config.rewind_depth);
    chip8
        .load_rom(&rom)
        .with_context(|| format!("unable to load ROM {}", config.rom.display()))?;
    info!(rom = %config.rom.display(), bytes = rom.len(), "successfully loaded ROM");

    let mut display = Display::new().context("unable to set up the terminal")?;
    let mut held_keys = HeldKeys::new(config.key_hold);

    // Set initial timing
    let cycle_time = config.cycle_time();
    let tick_time = config.tick_time();
    let mut last_cycle = Instant::now();
    let mut last_tick = last_cycle;

    // Whether or not the configured clock speed should be respected
    let mut fast_forward = false;
    let mut faults: u64 = 0;

    'event: loop {
        let now = Instant::now();

        // Handle input
        while event::poll(Duration::ZERO)? {
            let (code, kind) = match event::read()? {
                Event::Key(KeyEvent { code, kind, .. }) => (code, kind),
                _ => continue,
            };
            match (code, keymap(code), kind) {
                (_, Some(key), KeyEventKind::Release) => held_keys.release(key),
                (_, Some(key), _) => held_keys.press(key, now),
                (_, _, KeyEventKind::Release) => continue,
                (KeyCode::Esc, ..) => break 'event,
                (KeyCode::Char(' '), ..) => fast_forward = !fast_forward,
                (KeyCode::Backspace, ..) => {
                    // Roughly one timer tick's worth of instructions per press
                    for _ in 0..config.steps_per_tick() {
                        if !chip8.rewind() {
                            break;
                        }
                    }
                    display.render(chip8.frame_buffer(), &status(&chip8, fast_forward, faults))?;
                }
                _ => continue,
            }
        }
        chip8.set_keys(held_keys.snapshot(now));

        // Timers run off the wall clock, independent of the instruction rate
        while now.duration_since(last_tick) >= tick_time {
            chip8.tick_timers();
            last_tick += tick_time;
        }

        // Update state
        if let Err(err) = chip8.step() {
            faults += 1;
            if config.halt_on_error {
                return Err(err).context("halting on emulation fault");
            }
        }

        // If the draw flag is set, unset it and render the current frame
        if let Some(frame) = chip8.take_frame() {
            display.render(&frame, &status(&chip8, fast_forward, faults))?;
        }

        // Handle timing
        let elapsed_cycle_time = last_cycle.elapsed();
        if !fast_forward && cycle_time > elapsed_cycle_time {
            std::thread::sleep(cycle_time - elapsed_cycle_time);
        }
        last_cycle = Instant::now();
    }

    info!(faults, "quit");
    Ok(())
}

fn status(chip8: &Chip8, fast_forward: bool, faults: u64) -> String {
    format!(
        "pc {:04X}  {}  {}  faults {}  [esc] quit [space] fast-forward [backspace] rewind",
        chip8.state().pc,
        if fast_forward { ">>" } else { "  " },
        if chip8.sound_active() { "BEEP" } else { "    " },
        faults
    )
}
