use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{poll, read, Event, KeyCode},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{
        disable_raw_mode, enable_raw_mode, size, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use std::io::{self, stdout, Write};
use std::time::Duration;

/// Cell-buffer terminal abstraction for rendering.
pub struct Terminal {
    width: u16,
    height: u16,
    buffer: Vec<Cell>,
    alternate_screen: bool,
}

/// A single cell in the back buffer.
#[derive(Clone, Copy, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
}

impl Default for Cell {
    fn default() -> Self {
        Self { ch: ' ', fg: None }
    }
}

impl Terminal {
    /// Initialize the terminal. With `alternate_screen`, enters raw mode
    /// and hides the cursor until dropped.
    pub fn new(alternate_screen: bool) -> io::Result<Self> {
        let (width, height) = size()?;

        if alternate_screen {
            enable_raw_mode()?;
            execute!(stdout(), EnterAlternateScreen, Hide)?;
        }

        Ok(Self {
            width,
            height,
            buffer: vec![Cell::default(); width as usize * height as usize],
            alternate_screen,
        })
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Resize the back buffer, discarding its contents.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.buffer = vec![Cell::default(); width as usize * height as usize];
    }

    /// Clear the back buffer.
    pub fn clear(&mut self) {
        for cell in &mut self.buffer {
            *cell = Cell::default();
        }
    }

    /// Clear the actual terminal.
    pub fn clear_screen(&self) -> io::Result<()> {
        execute!(stdout(), Clear(ClearType::All))?;
        Ok(())
    }

    /// Set a character at position with optional color. Out-of-bounds
    /// positions are ignored.
    pub fn set(&mut self, x: i32, y: i32, ch: char, fg: Option<Color>) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            self.buffer[y as usize * self.width as usize + x as usize] = Cell { ch, fg };
        }
    }

    /// Set a string starting at position.
    pub fn set_str(&mut self, x: i32, y: i32, s: &str, fg: Option<Color>) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i as i32, y, ch, fg);
        }
    }

    /// Render the back buffer to the screen.
    pub fn present(&self) -> io::Result<()> {
        let mut out = stdout();
        let mut current_fg: Option<Color> = None;

        for y in 0..self.height {
            queue!(out, MoveTo(0, y))?;
            for x in 0..self.width {
                let cell = self.buffer[y as usize * self.width as usize + x as usize];
                if cell.fg != current_fg {
                    match cell.fg {
                        Some(color) => queue!(out, SetForegroundColor(color))?,
                        None => queue!(out, ResetColor)?,
                    }
                    current_fg = cell.fg;
                }
                queue!(out, Print(cell.ch))?;
            }
        }

        queue!(out, ResetColor)?;
        out.flush()?;
        Ok(())
    }

    /// Wait for a keypress with timeout.
    pub fn wait_key(&self, timeout_ms: u64) -> io::Result<Option<KeyCode>> {
        if poll(Duration::from_millis(timeout_ms))? {
            if let Event::Key(key_event) = read()? {
                return Ok(Some(key_event.code));
            }
        }
        Ok(None)
    }

    pub fn sleep(&self, seconds: f32) {
        std::thread::sleep(Duration::from_secs_f32(seconds));
    }

    /// Print the back buffer to stdout with ANSI colors (print mode).
    pub fn print_to_stdout(&self) {
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = self.buffer[y as usize * self.width as usize + x as usize];
                if cell.ch == ' ' {
                    print!(" ");
                    continue;
                }

                match cell.fg {
                    Some(Color::Rgb { r, g, b }) => print!("\x1b[38;2;{};{};{}m", r, g, b),
                    Some(Color::AnsiValue(v)) => print!("\x1b[38;5;{}m", v),
                    Some(Color::Black) => print!("\x1b[30m"),
                    Some(Color::DarkRed) => print!("\x1b[31m"),
                    Some(Color::DarkGreen) => print!("\x1b[32m"),
                    Some(Color::DarkYellow) => print!("\x1b[33m"),
                    Some(Color::DarkBlue) => print!("\x1b[34m"),
                    Some(Color::DarkMagenta) => print!("\x1b[35m"),
                    Some(Color::DarkCyan) => print!("\x1b[36m"),
                    Some(Color::Grey) => print!("\x1b[37m"),
                    Some(Color::DarkGrey) => print!("\x1b[90m"),
                    Some(Color::Red) => print!("\x1b[91m"),
                    Some(Color::Green) => print!("\x1b[92m"),
                    Some(Color::Yellow) => print!("\x1b[93m"),
                    Some(Color::Blue) => print!("\x1b[94m"),
                    Some(Color::Magenta) => print!("\x1b[95m"),
                    Some(Color::Cyan) => print!("\x1b[96m"),
                    Some(Color::White) => print!("\x1b[97m"),
                    _ => {}
                }

                print!("{}\x1b[0m", cell.ch);
            }
            println!();
        }
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.alternate_screen {
            let _ = execute!(stdout(), Show, LeaveAlternateScreen);
            let _ = disable_raw_mode();
        }
    }
}
