//! Crossterm backend that paints kitty sprites on top of each frame.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use crossterm::{cursor::MoveTo, queue, style::Print};
use ratatui::backend::{Backend, ClearType, CrosstermBackend, WindowSize};
use ratatui::buffer::Cell;
use ratatui::layout::{Position, Size};

/// Deletes every image placed by a previous frame.
const DELETE_ALL: &str = "\x1b_Ga=d,d=a\x1b\\";

#[derive(Default, Debug, Clone)]
pub struct SpriteSlot {
    placement: Option<((u16, u16), String)>,
}

impl SpriteSlot {
    pub fn set(&mut self, x: u16, y: u16, data: String) {
        self.placement = Some(((x, y), data));
    }

    pub fn clear(&mut self) {
        self.placement = None;
    }

    pub fn placement(&self) -> Option<((u16, u16), String)> {
        self.placement.clone()
    }
}

static SLOT: OnceLock<Arc<Mutex<SpriteSlot>>> = OnceLock::new();

pub fn sprite_slot() -> Arc<Mutex<SpriteSlot>> {
    SLOT.get_or_init(|| Arc::new(Mutex::new(SpriteSlot::default())))
        .clone()
}

pub fn update_sprite(x: u16, y: u16, data: String) {
    let slot = sprite_slot();
    lock(&slot).set(x, y, data);
}

pub fn clear_sprite() {
    let slot = sprite_slot();
    lock(&slot).clear();
}

fn lock(slot: &Mutex<SpriteSlot>) -> MutexGuard<'_, SpriteSlot> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Clone)]
pub struct SpriteBackend<W: Write> {
    inner: CrosstermBackend<W>,
    slot: Arc<Mutex<SpriteSlot>>,
    had_sprite: bool,
}

impl<W: Write> SpriteBackend<W> {
    pub fn new(writer: W, slot: Arc<Mutex<SpriteSlot>>) -> Self {
        Self {
            inner: CrosstermBackend::new(writer),
            slot,
            had_sprite: false,
        }
    }
}

impl<W: Write> Backend for SpriteBackend<W> {
    fn draw<'a, I>(&mut self, content: I) -> io::Result<()>
    where
        I: Iterator<Item = (u16, u16, &'a Cell)>,
    {
        self.inner.draw(content)?;
        let placement = lock(&self.slot).placement();
        if self.had_sprite {
            queue!(self.inner, Print(DELETE_ALL))?;
        }
        let Some(((x, y), data)) = placement else {
            self.had_sprite = false;
            return Ok(());
        };
        queue!(self.inner, MoveTo(x, y), Print(data))?;
        self.had_sprite = true;
        Ok(())
    }

    fn append_lines(&mut self, n: u16) -> io::Result<()> {
        self.inner.append_lines(n)
    }

    fn hide_cursor(&mut self) -> io::Result<()> {
        self.inner.hide_cursor()
    }

    fn show_cursor(&mut self) -> io::Result<()> {
        self.inner.show_cursor()
    }

    fn get_cursor_position(&mut self) -> io::Result<Position> {
        self.inner.get_cursor_position()
    }

    fn set_cursor_position<P: Into<Position>>(&mut self, position: P) -> io::Result<()> {
        self.inner.set_cursor_position(position)
    }

    fn clear(&mut self) -> io::Result<()> {
        self.inner.clear()
    }

    fn clear_region(&mut self, clear_type: ClearType) -> io::Result<()> {
        self.inner.clear_region(clear_type)
    }

    fn size(&self) -> io::Result<Size> {
        self.inner.size()
    }

    fn window_size(&mut self) -> io::Result<WindowSize> {
        self.inner.window_size()
    }

    fn flush(&mut self) -> io::Result<()> {
        Backend::flush(&mut self.inner)
    }
}

impl<W: Write> Write for SpriteBackend<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(&mut self.inner)
    }
}
