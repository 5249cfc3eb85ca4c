//! Result types for table extraction.

use crate::processors::BoundingBox;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A single table cell with its grid position, pixel bounds and text.
///
/// Groups everything known about one cell so callers never juggle parallel
/// vectors: where the cell sits in the matrix, where it was cropped from,
/// and what the recognition capability read out of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    /// Zero-based row index in the table matrix.
    pub row: usize,
    /// Zero-based column index within the row.
    pub col: usize,
    /// Pixel bounds of the cell in the input image, before crop padding.
    pub bounds: BoundingBox,
    /// Assembled cell text. Empty when nothing was recognized.
    pub text: String,
}

impl Cell {
    /// Creates a cell with empty text at the given matrix position.
    pub fn new(row: usize, col: usize, bounds: BoundingBox) -> Self {
        Self {
            row,
            col,
            bounds,
            text: String::new(),
        }
    }

    /// Returns true if any text was assembled for this cell.
    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }
}

/// The extracted table: rows of cells in reading order.
///
/// Rows may have differing lengths; the matrix stays ragged until
/// serialization, which right-pads short rows with empty fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    /// Cell rows, top-to-bottom; cells within a row run left-to-right.
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Creates a table from pre-built rows.
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row. Zero for an empty table.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Total number of cells across all rows.
    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Returns true if the table holds no cells.
    pub fn is_empty(&self) -> bool {
        self.cell_count() == 0
    }

    /// Looks up a cell by matrix position.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row)?.get(col)
    }

    /// Cell texts as a ragged matrix of string slices, in reading order.
    pub fn text_rows(&self) -> Vec<Vec<&str>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.text.as_str()).collect())
            .collect()
    }

    /// Number of cells with non-empty text.
    pub fn recognized_cell_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.iter())
            .filter(|cell| cell.has_text())
            .count()
    }
}

/// Result of one table extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableExtraction {
    /// The input image the table was extracted from.
    #[serde(skip)]
    pub input_img: Arc<RgbImage>,
    /// Name of the grid detection strategy that produced the table.
    pub strategy: Arc<str>,
    /// The extracted cell matrix.
    pub table: Table,
}

impl TableExtraction {
    /// Renders the table to a CSV string (see [`crate::export::csv_out`]).
    pub fn to_csv_string(&self) -> crate::core::OcrResult<String> {
        crate::export::csv_out::table_to_csv_string(&self.table)
    }
}

impl fmt::Display for TableExtraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Image dimensions: [{}, {}]",
            self.input_img.width(),
            self.input_img.height()
        )?;
        writeln!(f, "Strategy: {}", self.strategy)?;
        writeln!(
            f,
            "Table: {} rows x {} columns ({} cells, {} with text)",
            self.table.row_count(),
            self.table.column_count(),
            self.table.cell_count(),
            self.table.recognized_cell_count()
        )?;

        for (row_index, row) in self.table.rows.iter().enumerate() {
            write!(f, "  Row {row_index}: ")?;
            for (col_index, cell) in row.iter().enumerate() {
                if col_index > 0 {
                    write!(f, " | ")?;
                }
                if cell.has_text() {
                    write!(f, "'{}'", cell.text)?;
                } else {
                    write!(f, "[empty]")?;
                }
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(row: usize, col: usize, text: &str) -> Cell {
        let bounds = BoundingBox::new(col as f32 * 50.0, row as f32 * 30.0, 50.0, 30.0);
        Cell {
            row,
            col,
            bounds,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_table_counts() {
        let table = Table::new(vec![
            vec![cell(0, 0, "a"), cell(0, 1, "b"), cell(0, 2, "")],
            vec![cell(1, 0, "c"), cell(1, 1, "d")],
        ]);

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.cell_count(), 5);
        assert_eq!(table.recognized_cell_count(), 4);
        assert!(!table.is_empty());
    }

    #[test]
    fn test_empty_table() {
        let table = Table::default();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 0);
        assert!(table.is_empty());
        assert!(table.text_rows().is_empty());
    }

    #[test]
    fn test_cell_lookup() {
        let table = Table::new(vec![vec![cell(0, 0, "x")]]);
        assert_eq!(table.cell(0, 0).map(|c| c.text.as_str()), Some("x"));
        assert!(table.cell(0, 1).is_none());
        assert!(table.cell(3, 0).is_none());
    }

    #[test]
    fn test_text_rows_preserve_raggedness() {
        let table = Table::new(vec![
            vec![cell(0, 0, "a"), cell(0, 1, "b")],
            vec![cell(1, 0, "c")],
        ]);
        assert_eq!(table.text_rows(), vec![vec!["a", "b"], vec!["c"]]);
    }

    #[test]
    fn test_display_lists_rows() {
        let extraction = TableExtraction {
            input_img: Arc::new(RgbImage::new(10, 10)),
            strategy: Arc::from("ruling-line"),
            table: Table::new(vec![vec![cell(0, 0, "total"), cell(0, 1, "")]]),
        };
        let rendered = extraction.to_string();
        assert!(rendered.contains("Strategy: ruling-line"));
        assert!(rendered.contains("'total'"));
        assert!(rendered.contains("[empty]"));
    }
}
