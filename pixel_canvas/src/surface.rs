// ===============================================================================
// DISPLAY SURFACE
// ===============================================================================
// Text console and grid painter on top of any embedded-graphics draw target.
// Text works like a serial terminal on the panel: a cursor that advances glyph
// by glyph, wraps at the right edge and moves down one line on newline.
// ===============================================================================

use core::fmt::Debug;

use embedded_graphics::{
    mono_font::{
        ascii::{FONT_10X20, FONT_6X10},
        MonoFont, MonoTextStyle,
    },
    pixelcolor::Rgb565,
    prelude::*,
    text::{Baseline, Text},
};
use log::*;

use crate::grid::GridCell;

/// Color the panel is cleared to.
pub const BACKGROUND: Rgb565 = Rgb565::BLACK;

/// Text color after a clear.
pub const DEFAULT_TEXT_COLOR: Rgb565 = Rgb565::WHITE;

/// Text scale, 1 or 2 like the size argument of classic TFT libraries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextSize {
    #[default]
    Small,
    Large,
}

impl TextSize {
    pub fn font(self) -> &'static MonoFont<'static> {
        match self {
            TextSize::Small => &FONT_6X10,
            TextSize::Large => &FONT_10X20,
        }
    }

    /// Horizontal cursor advance per glyph.
    fn advance(self) -> u32 {
        let font = self.font();
        font.character_size.width + font.character_spacing
    }

    fn line_height(self) -> u32 {
        self.font().character_size.height
    }
}

/// The panel together with its text state.
pub struct DisplaySurface<D> {
    target: D,
    cursor: Point,
    text_size: TextSize,
    text_color: Rgb565,
}

impl<D> DisplaySurface<D>
where
    D: DrawTarget<Color = Rgb565>,
    D::Error: Debug,
{
    /// Wraps an initialized display. The panel content is left untouched
    /// until the first [`DisplaySurface::clear`].
    pub fn new(target: D) -> Self {
        Self {
            target,
            cursor: Point::zero(),
            text_size: TextSize::default(),
            text_color: DEFAULT_TEXT_COLOR,
        }
    }

    /// Fills the panel with the background and resets cursor, size and color.
    pub fn clear(&mut self) {
        if let Err(e) = self.target.clear(BACKGROUND) {
            warn!("Display clear failed: {:?}", e);
        }
        self.cursor = Point::zero();
        self.text_size = TextSize::default();
        self.text_color = DEFAULT_TEXT_COLOR;
    }

    pub fn set_text_size(&mut self, size: TextSize) {
        self.text_size = size;
    }

    pub fn set_text_color(&mut self, color: Rgb565) {
        self.text_color = color;
    }

    pub fn cursor(&self) -> Point {
        self.cursor
    }

    pub fn text_size(&self) -> TextSize {
        self.text_size
    }

    pub fn text_color(&self) -> Rgb565 {
        self.text_color
    }

    /// Renders `text` at the cursor and leaves the cursor behind the last glyph.
    pub fn print(&mut self, text: &str) {
        for c in text.chars() {
            self.write_char(c);
        }
    }

    /// [`DisplaySurface::print`] followed by a newline.
    pub fn println(&mut self, text: &str) {
        self.print(text);
        self.newline();
    }

    /// Prints one line of text with the given size and color.
    pub fn print_line(&mut self, text: &str, size: TextSize, color: Rgb565) {
        self.set_text_size(size);
        self.set_text_color(color);
        self.println(text);
    }

    /// Fills the 8x8 block of `cell` with `color`.
    pub fn paint_cell(&mut self, cell: GridCell, color: Rgb565) {
        if let Err(e) = self.target.fill_solid(&cell.bounds(), color) {
            warn!("Painting cell {} failed: {:?}", cell, e);
        }
    }

    pub fn into_inner(self) -> D {
        self.target
    }

    fn newline(&mut self) {
        self.cursor.x = 0;
        self.cursor.y += self.text_size.line_height() as i32;
    }

    fn write_char(&mut self, c: char) {
        match c {
            '\n' => self.newline(),
            '\r' => {}
            _ => {
                let advance = self.text_size.advance();
                let width = self.target.bounding_box().size.width;
                if self.cursor.x > 0 && self.cursor.x as u32 + advance > width {
                    self.newline();
                }

                let mut buf = [0u8; 4];
                let glyph = c.encode_utf8(&mut buf);
                let style = MonoTextStyle::new(self.text_size.font(), self.text_color);
                let text = Text::with_baseline(glyph, self.cursor, style, Baseline::Top);
                if let Err(e) = text.draw(&mut self.target) {
                    warn!("Drawing text failed: {:?}", e);
                }
                self.cursor.x += advance as i32;
            }
        }
    }
}
