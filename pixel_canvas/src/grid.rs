//! The 16x16 drawing grid of the control page.
//!
//! Every cell is an 8x8 block of pixels, so the grid covers the whole
//! 128x128 panel. A cell is selected in the `/draw` form by a checkbox named
//! `"{column}-{row}"`.

use core::fmt;

use embedded_graphics::{pixelcolor::Rgb565, prelude::*, primitives::Rectangle};

/// Number of cells along each side of the grid.
pub const GRID_SIZE: u8 = 16;

/// Edge length of one cell in pixels.
pub const CELL_SIZE: u32 = 8;

/// Form field holding the color code of a `/draw` request.
pub const COLOR_FIELD: &str = "textColor";

/// One cell of the grid. Both coordinates are always in `[0, GRID_SIZE)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    column: u8,
    row: u8,
}

impl GridCell {
    /// Returns `None` when either coordinate is outside the grid.
    pub fn new(column: u8, row: u8) -> Option<Self> {
        (column < GRID_SIZE && row < GRID_SIZE).then_some(Self { column, row })
    }

    /// All cells in row-major order: row 0 columns 0..16, then row 1, ...
    pub fn all() -> impl Iterator<Item = GridCell> {
        (0..GRID_SIZE).flat_map(|row| (0..GRID_SIZE).map(move |column| GridCell { column, row }))
    }

    /// Top left pixel of the cell.
    pub fn origin(self) -> Point {
        Point::new(
            i32::from(self.column) * CELL_SIZE as i32,
            i32::from(self.row) * CELL_SIZE as i32,
        )
    }

    /// The pixel rectangle covered by the cell.
    pub fn bounds(self) -> Rectangle {
        Rectangle::new(self.origin(), Size::new_equal(CELL_SIZE))
    }

    /// Name of the checkbox selecting this cell.
    pub fn field_name(self) -> String {
        field_name(self.row, self.column)
    }

    /// Inverse of [`GridCell::field_name`]. Only canonical names are
    /// accepted, so `"05-3"` or `"+5-3"` do not alias `"5-3"`.
    pub fn from_field_name(name: &str) -> Option<Self> {
        let (column, row) = name.split_once('-')?;
        let cell = Self::new(column.parse().ok()?, row.parse().ok()?)?;
        (cell.field_name() == name).then_some(cell)
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Form field name of the cell at `(row, column)`: column first, then row.
pub fn field_name(row: u8, column: u8) -> String {
    format!("{}-{}", column, row)
}

/// Paint color picked in the `/draw` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSelection {
    Red,
    Green,
    Blue,
    #[default]
    White,
}

impl ColorSelection {
    /// Options of the color selector, in code order.
    pub const ALL: [ColorSelection; 4] = [
        ColorSelection::Red,
        ColorSelection::Green,
        ColorSelection::Blue,
        ColorSelection::White,
    ];

    /// Decodes the numeric color code. Anything but `0..=3` is white.
    pub fn from_code(code: &str) -> Self {
        match code.trim().parse::<i64>() {
            Ok(0) => ColorSelection::Red,
            Ok(1) => ColorSelection::Green,
            Ok(2) => ColorSelection::Blue,
            _ => ColorSelection::White,
        }
    }

    /// Decodes the optional `textColor` field.
    pub fn from_field(value: Option<&str>) -> Self {
        value.map(Self::from_code).unwrap_or_default()
    }

    pub fn code(self) -> u8 {
        match self {
            ColorSelection::Red => 0,
            ColorSelection::Green => 1,
            ColorSelection::Blue => 2,
            ColorSelection::White => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ColorSelection::Red => "Red",
            ColorSelection::Green => "Green",
            ColorSelection::Blue => "Blue",
            ColorSelection::White => "White",
        }
    }

    pub fn rgb565(self) -> Rgb565 {
        match self {
            ColorSelection::Red => Rgb565::RED,
            ColorSelection::Green => Rgb565::GREEN,
            ColorSelection::Blue => Rgb565::BLUE,
            ColorSelection::White => Rgb565::WHITE,
        }
    }
}

impl From<ColorSelection> for Rgb565 {
    fn from(selection: ColorSelection) -> Self {
        selection.rgb565()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_cell_range() {
        assert!(GridCell::new(0, 0).is_some());
        assert!(GridCell::new(15, 15).is_some());
        assert!(GridCell::new(16, 0).is_none());
        assert!(GridCell::new(0, 16).is_none());
    }

    #[test]
    fn test_cell_bounds() {
        let cell = GridCell::new(3, 5).unwrap();
        assert_eq!(cell.origin(), Point::new(24, 40));
        assert_eq!(cell.bounds().size, Size::new(8, 8));
        assert_eq!(
            GridCell::new(15, 15).unwrap().bounds().bottom_right(),
            Some(Point::new(127, 127))
        );
    }

    #[test]
    fn test_all_is_row_major() {
        let cells: Vec<GridCell> = GridCell::all().collect();
        assert_eq!(cells.len(), 256);
        assert_eq!(cells[0], GridCell::new(0, 0).unwrap());
        assert_eq!(cells[1], GridCell::new(1, 0).unwrap());
        assert_eq!(cells[16], GridCell::new(0, 1).unwrap());
        assert_eq!(cells[255], GridCell::new(15, 15).unwrap());
    }

    #[test]
    fn test_field_name_puts_column_first() {
        assert_eq!(field_name(0, 5), "5-0");
        assert_eq!(GridCell::new(12, 3).unwrap().field_name(), "12-3");
    }

    #[test]
    fn test_field_names_are_bijective() {
        let names: HashSet<String> = GridCell::all().map(GridCell::field_name).collect();
        assert_eq!(names.len(), 256);

        for cell in GridCell::all() {
            assert_eq!(GridCell::from_field_name(&cell.field_name()), Some(cell));
        }
        for name in &names {
            let cell = GridCell::from_field_name(name).unwrap();
            assert_eq!(&cell.field_name(), name);
        }
    }

    #[test]
    fn test_from_field_name_rejects_junk() {
        for name in ["", "5", "5-", "-5", "16-0", "0-16", "05-3", "+5-3", "a-b", "1-2-3"] {
            assert_eq!(GridCell::from_field_name(name), None, "{name:?}");
        }
    }

    #[test]
    fn test_color_codes() {
        assert_eq!(ColorSelection::from_code("0"), ColorSelection::Red);
        assert_eq!(ColorSelection::from_code("1"), ColorSelection::Green);
        assert_eq!(ColorSelection::from_code("2"), ColorSelection::Blue);
        assert_eq!(ColorSelection::from_code("3"), ColorSelection::White);
        assert_eq!(ColorSelection::from_code("9"), ColorSelection::White);
        assert_eq!(ColorSelection::from_code("-1"), ColorSelection::White);
        assert_eq!(ColorSelection::from_code("blue"), ColorSelection::White);
        assert_eq!(ColorSelection::from_field(None), ColorSelection::White);
        assert_eq!(ColorSelection::from_field(Some("2")), ColorSelection::Blue);
    }

    #[test]
    fn test_color_code_round_trip() {
        for color in ColorSelection::ALL {
            assert_eq!(ColorSelection::from_code(&color.code().to_string()), color);
        }
        assert_eq!(Rgb565::from(ColorSelection::Blue), Rgb565::BLUE);
    }
}
