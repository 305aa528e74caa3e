use std::io::{self, Stdout, Write};

use crossterm::{cursor, execute, queue, style, terminal};
use emu8::{FrameBuffer, DISPLAY_HEIGHT, DISPLAY_WIDTH};

/// # Display
/// The Chip-8 display is composed of 64x32 black/white pixels.
/// In a terminal each character cell shows two pixels stacked vertically, so
/// the screen takes 64 columns by 16 lines.
/// The display only gets a call to `render` when the Chip-8 FrameBuffer is updated.
pub struct Display {
    out: Stdout,
}

impl Display {
    /// Switches the terminal to raw mode on the alternate screen.
    /// Both are undone when the display is dropped.
    pub fn new() -> io::Result<Self> {
        let mut out = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            out,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All)
        )?;
        Ok(Display { out })
    }

    /// Formats a Chip-8 FrameBuffer as lines of half-block characters.
    ///
    /// Line `r` carries pixel rows `2r` (upper half) and `2r + 1` (lower half).
    pub fn frame_to_lines(frame: &FrameBuffer) -> Vec<String> {
        (0..DISPLAY_HEIGHT / 2)
            .map(|line| {
                let top = &frame[2 * line * DISPLAY_WIDTH..][..DISPLAY_WIDTH];
                let bottom = &frame[(2 * line + 1) * DISPLAY_WIDTH..][..DISPLAY_WIDTH];
                top.iter()
                    .zip(bottom.iter())
                    .map(|(&upper, &lower)| match (upper, lower) {
                        (0, 0) => ' ',
                        (_, 0) => '▀',
                        (0, _) => '▄',
                        _ => '█',
                    })
                    .collect::<String>()
            })
            .collect()
    }

    /// Draws the whole frame, then a status line underneath it.
    pub fn render(&mut self, frame: &FrameBuffer, status: &str) -> io::Result<()> {
        for (row, line) in Display::frame_to_lines(frame).iter().enumerate() {
            queue!(self.out, cursor::MoveTo(0, row as u16), style::Print(line))?;
        }
        queue!(
            self.out,
            cursor::MoveTo(0, (DISPLAY_HEIGHT / 2) as u16),
            terminal::Clear(terminal::ClearType::CurrentLine),
            style::Print(status)
        )?;
        self.out.flush()
    }
}

impl Drop for Display {
    fn drop(&mut self) {
        let _ = execute!(self.out, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}
