use crate::TermInt;
use std::{io::{Stdout, Write, stdout}, time::Duration};

use crossterm::{cursor, execute, queue, style, terminal, Result};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyEvent, read, poll};
use tracing::warn;

pub type TermCoords = (TermInt, TermInt);

pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    screen: Vec<char>,
    current_msg: Option<Message>,
    active: bool,
}

struct Message {
    top_left: TermCoords,
    width: TermInt,
    height: TermInt,
}

impl TermManager {
    pub fn new() -> Result<Self> {
        let (width, height) = terminal::size()?;
        let stdout = stdout();
        let screen = vec![' '; width as usize * height as usize];
        Ok(TermManager { width, height, stdout, screen, current_msg: None, active: false })
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen)?;
        self.active = true;
        terminal::enable_raw_mode()?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking)
    }

    /// Gives the terminal back to the shell. Safe to call more than once.
    pub fn restore(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }

        self.active = false;
        terminal::disable_raw_mode()?;
        execute!(self.stdout, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)
    }

    pub fn read_key_blocking(&self) -> Result<KeyEvent> {
        loop {
            if let Event::Key(ev) = read()? {
                return Ok(ev);
            }
        }
    }

    pub fn read_key_events_queue(&self) -> Result<Vec<KeyEvent>> {
        let mut events = vec![];

        while poll(Duration::from_millis(1))? {
            if let Event::Key(ev) = read()? {
                events.push(ev);
            }
        }

        Ok(events)
    }

    pub fn get_terminal_size(&self) -> TermCoords {
        (self.width, self.height)
    }

    /// Frames the area `(0, 0)..size`, with `title` set into the top edge.
    pub fn draw_borders(&mut self, size: TermCoords, title: &str) -> Result<()> {
        let (width, height) = size;
        let end_x = width - 1;
        let end_y = height - 1;

        for x in 0..width {
            let ch = if x == 0 || x == end_x {'+'} else {'-'};
            self.print_at((x, 0), ch)?;
            self.print_at((x, end_y), ch)?;
        }

        for y in 1..end_y {
            self.print_at((0, y), '|')?;
            self.print_at((end_x, y), '|')?;
        }

        self.print_str_at((2, 0), title)?;
        self.flush()
    }

    pub fn show_message(&mut self, lines: &[&str]) -> Result<()> {
        if self.has_message() {
            self.hide_message()?;
        }

        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (lines.iter().map(|x| x.chars().count()).max().unwrap_or(0) + 2) as TermInt;
        let center = (self.width / 2, self.height / 2);
        let top_left = (center.0.saturating_sub(msg_width / 2), center.1.saturating_sub(msg_height / 2));

        // Print the top and bottom empty lines
        for y in [top_left.1, top_left.1 + msg_height - 1].iter() {
            for x_diff in 0..msg_width {
                self.print_at_no_save((top_left.0 + x_diff, *y), ' ')?;
            }
        }

        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as TermInt + 1;
            for (x_diff, ch) in padded_line.chars().enumerate() {
                self.print_at_no_save((top_left.0 + x_diff as TermInt, y), ch)?;
            }
        }

        self.current_msg = Some(Message::new(msg_width, msg_height, top_left));
        self.flush()
    }

    pub fn hide_message(&mut self) -> Result<()> {
        let msg = match self.current_msg.take() {
            Some(msg) => msg,
            None => return Ok(()),
        };
        let top_left = msg.top_left();

        // Restore the content from the screen buffer
        for y_diff in 0..msg.height() {
            for x_diff in 0..msg.width() {
                let (x, y) = (top_left.0 + x_diff, top_left.1 + y_diff);
                if let Some(ch) = self.buffered(x, y) {
                    self.print_at_no_save((x, y), ch)?;
                }
            }
        }

        self.flush()
    }

    pub fn print_at(&mut self, pos: TermCoords, ch: char) -> Result<()> {
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch))?;
        if let Some(slot) = self.slot(pos.0, pos.1) {
            self.screen[slot] = ch;
        }
        Ok(())
    }

    pub fn print_str_at(&mut self, pos: TermCoords, text: &str) -> Result<()> {
        for (i, ch) in text.chars().enumerate() {
            self.print_at((pos.0 + i as TermInt, pos.1), ch)?;
        }
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All))?;
        self.screen = vec![' '; self.width as usize * self.height as usize];
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.stdout.flush()?;
        Ok(())
    }

    pub fn has_message(&self) -> bool {
        self.current_msg.is_some()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn slot(&self, x: TermInt, y: TermInt) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(self.width as usize * y as usize + x as usize)
        } else {
            None
        }
    }

    fn buffered(&self, x: TermInt, y: TermInt) -> Option<char> {
        self.slot(x, y).map(|slot| self.screen[slot])
    }

    fn print_at_no_save(&mut self, pos: TermCoords, ch: char) -> Result<()> {
        // Messages are drawn over the buffer so hiding them can restore it
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::Print(ch))
    }
}

impl Drop for TermManager {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            warn!(%err, "failed to restore terminal");
        }
    }
}

impl Message {
    pub fn new(width: TermInt, height: TermInt, top_left: TermCoords) -> Self {
        Message { width, height, top_left }
    }

    pub fn width(&self) -> TermInt {
        self.width
    }

    pub fn height(&self) -> TermInt {
        self.height
    }

    pub fn top_left(&self) -> TermCoords {
        self.top_left
    }
}
