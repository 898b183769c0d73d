//! ASCII grid loading.
//!
//! The accepted layout is the classic Arc/Info exchange grid: a block of
//! `key value` header lines (keys case-insensitive, any whitespace) followed by
//! `nrows` lines of `ncols` whitespace separated numbers, northernmost row
//! first.

use std::fs;
use std::path::Path;

use haz_core::errors::{ErrorInfo, HazError};
use tracing::debug;

/// Georeferencing header of a grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridHeader {
    /// Number of columns.
    pub ncols: usize,
    /// Number of rows.
    pub nrows: usize,
    /// Western edge of the grid.
    pub xllcorner: f64,
    /// Southern edge of the grid.
    pub yllcorner: f64,
    /// Side length of a square cell.
    pub cellsize: f64,
    /// Sentinel marking cells without a measurement.
    pub nodata_value: Option<f64>,
}

/// An immutable raster loaded into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct AsciiGrid {
    header: GridHeader,
    cells: Vec<f64>,
}

fn format_error(code: &str, message: impl Into<String>, source: &str, line: usize) -> HazError {
    HazError::Format(
        ErrorInfo::new(code, message)
            .with_context("path", source)
            .with_context("line", line.to_string()),
    )
}

#[derive(Default)]
struct RawHeader {
    ncols: Option<usize>,
    nrows: Option<usize>,
    x: Option<(f64, bool)>,
    y: Option<(f64, bool)>,
    cellsize: Option<f64>,
    nodata: Option<f64>,
}

impl RawHeader {
    fn set(&mut self, key: &str, value: &str, source: &str, line: usize) -> Result<(), HazError> {
        let duplicate = || {
            format_error(
                "raster.duplicate_header",
                format!("header key '{key}' appears twice"),
                source,
                line,
            )
        };
        let number = || {
            value.parse::<f64>().map_err(|_| {
                format_error(
                    "raster.header_value",
                    format!("header value '{value}' for '{key}' is not a number"),
                    source,
                    line,
                )
            })
        };
        let count = || {
            value
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    format_error(
                        "raster.header_value",
                        format!("'{key}' must be a positive integer, found '{value}'"),
                        source,
                        line,
                    )
                })
        };

        match key.to_ascii_lowercase().as_str() {
            "ncols" if self.ncols.is_some() => return Err(duplicate()),
            "ncols" => self.ncols = Some(count()?),
            "nrows" if self.nrows.is_some() => return Err(duplicate()),
            "nrows" => self.nrows = Some(count()?),
            "xllcorner" | "xllcenter" if self.x.is_some() => return Err(duplicate()),
            "xllcorner" => self.x = Some((number()?, false)),
            "xllcenter" => self.x = Some((number()?, true)),
            "yllcorner" | "yllcenter" if self.y.is_some() => return Err(duplicate()),
            "yllcorner" => self.y = Some((number()?, false)),
            "yllcenter" => self.y = Some((number()?, true)),
            "cellsize" if self.cellsize.is_some() => return Err(duplicate()),
            "cellsize" => {
                let size = number()?;
                if !(size > 0.0 && size.is_finite()) {
                    return Err(format_error(
                        "raster.header_value",
                        format!("cellsize must be positive, found '{value}'"),
                        source,
                        line,
                    ));
                }
                self.cellsize = Some(size);
            }
            "nodata_value" if self.nodata.is_some() => return Err(duplicate()),
            "nodata_value" => self.nodata = Some(number()?),
            _ => {
                return Err(format_error(
                    "raster.unknown_header",
                    format!("unknown header key '{key}'"),
                    source,
                    line,
                ))
            }
        }
        Ok(())
    }

    fn finish(self, source: &str, line: usize) -> Result<GridHeader, HazError> {
        let missing = |key: &str| {
            format_error(
                "raster.missing_header",
                format!("header key '{key}' is missing"),
                source,
                line,
            )
        };
        let ncols = self.ncols.ok_or_else(|| missing("ncols"))?;
        let nrows = self.nrows.ok_or_else(|| missing("nrows"))?;
        if ncols.checked_mul(nrows).is_none() {
            return Err(format_error(
                "raster.header_value",
                format!("{ncols} x {nrows} cells cannot be addressed"),
                source,
                line,
            ));
        }
        let cellsize = self.cellsize.ok_or_else(|| missing("cellsize"))?;
        let (x, x_center) = self.x.ok_or_else(|| missing("xllcorner"))?;
        let (y, y_center) = self.y.ok_or_else(|| missing("yllcorner"))?;
        let half = cellsize / 2.0;
        Ok(GridHeader {
            ncols,
            nrows,
            xllcorner: if x_center { x - half } else { x },
            yllcorner: if y_center { y - half } else { y },
            cellsize,
            nodata_value: self.nodata,
        })
    }
}

/// Header lines open with a key; `nan` and `inf` open data rows.
fn starts_with_key(line: &str) -> bool {
    line.split_whitespace().next().map_or(false, |token| {
        token.starts_with(|c: char| c.is_ascii_alphabetic()) && token.parse::<f64>().is_err()
    })
}

impl AsciiGrid {
    /// Builds a grid from a header and row-major cells, north row first.
    pub fn new(header: GridHeader, cells: Vec<f64>) -> Result<Self, HazError> {
        let expected = header
            .ncols
            .checked_mul(header.nrows)
            .filter(|n| *n > 0 && header.cellsize > 0.0);
        let Some(expected) = expected else {
            return Err(HazError::Format(
                ErrorInfo::new("raster.header_value", "grid dimensions must be positive and addressable")
                    .with_context("ncols", header.ncols.to_string())
                    .with_context("nrows", header.nrows.to_string())
                    .with_context("cellsize", header.cellsize.to_string()),
            ));
        };
        if cells.len() != expected {
            return Err(HazError::Format(
                ErrorInfo::new("raster.cell_count", "cell count does not match the header")
                    .with_context("expected", expected.to_string())
                    .with_context("found", cells.len().to_string()),
            ));
        }
        Ok(Self { header, cells })
    }

    /// Reads and parses the grid stored at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, HazError> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).map_err(|err| HazError::io("raster.open", path, err))?;
        let grid = Self::parse(&text, &path.display().to_string())?;
        debug!(
            path = %path.display(),
            ncols = grid.header.ncols,
            nrows = grid.header.nrows,
            "loaded raster"
        );
        Ok(grid)
    }

    /// Parses grid text. `source` names the input in error context.
    pub fn parse(text: &str, source: &str) -> Result<Self, HazError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line))
            .filter(|(_, line)| !line.trim().is_empty())
            .peekable();

        let mut raw = RawHeader::default();
        let mut last_line = 0;
        while let Some((number, line)) = lines.next_if(|(_, line)| starts_with_key(line)) {
            last_line = number;
            let mut tokens = line.split_whitespace();
            let key = tokens.next().unwrap_or_default();
            let value = match (tokens.next(), tokens.next()) {
                (Some(value), None) => value,
                _ => {
                    return Err(format_error(
                        "raster.header_line",
                        "header lines must hold exactly one key and one value",
                        source,
                        number,
                    ))
                }
            };
            raw.set(key, value, source, number)?;
        }
        let header = raw.finish(source, last_line)?;

        let mut cells = Vec::new();
        let mut rows = 0;
        for (number, line) in lines {
            rows += 1;
            if rows > header.nrows {
                return Err(format_error(
                    "raster.row_count",
                    format!("more than the {} rows declared in the header", header.nrows),
                    source,
                    number,
                ));
            }
            let before = cells.len();
            for token in line.split_whitespace() {
                let value = token.parse::<f64>().map_err(|_| {
                    format_error(
                        "raster.cell_value",
                        format!("cell value '{token}' is not a number"),
                        source,
                        number,
                    )
                })?;
                cells.push(value);
            }
            let width = cells.len() - before;
            if width != header.ncols {
                return Err(format_error(
                    "raster.row_width",
                    format!("row holds {width} values, header declares {}", header.ncols),
                    source,
                    number,
                ));
            }
        }
        if rows != header.nrows {
            return Err(format_error(
                "raster.row_count",
                format!("found {rows} rows, header declares {}", header.nrows),
                source,
                last_line,
            ));
        }
        Self::new(header, cells)
    }

    /// The grid header, with centre-registered origins converted to corners.
    pub fn header(&self) -> &GridHeader {
        &self.header
    }

    /// Raw value of cell (`row`, `col`), row 0 being the north edge.
    pub fn cell(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.header.nrows && col < self.header.ncols {
            Some(self.cells[row * self.header.ncols + col])
        } else {
            None
        }
    }

    /// Returns the value of the cell containing (`lon`, `lat`), or `NaN` when
    /// the point lies outside the grid or on a no-data cell.
    ///
    /// Cell indices come from flooring, so a point on a shared edge belongs to
    /// the cell east of a vertical edge and south of a horizontal one.
    pub fn sample(&self, lon: f64, lat: f64) -> f64 {
        let h = &self.header;
        let col = ((lon - h.xllcorner) / h.cellsize).floor();
        let top = h.yllcorner + h.nrows as f64 * h.cellsize;
        let row = ((top - lat) / h.cellsize).floor();
        if !(col >= 0.0 && col < h.ncols as f64 && row >= 0.0 && row < h.nrows as f64) {
            return f64::NAN;
        }
        let value = self.cells[row as usize * h.ncols + col as usize];
        match h.nodata_value {
            Some(nodata) if value == nodata => f64::NAN,
            _ => value,
        }
    }

    /// Samples every (`lon[i]`, `lat[i]`) pair.
    pub fn sample_points(&self, lon: &[f64], lat: &[f64]) -> Result<Vec<f64>, HazError> {
        check_coordinates(lon, lat)?;
        Ok(lon
            .iter()
            .zip(lat)
            .map(|(&x, &y)| self.sample(x, y))
            .collect())
    }
}

pub(crate) fn check_coordinates(lon: &[f64], lat: &[f64]) -> Result<(), HazError> {
    if lon.len() == lat.len() {
        return Ok(());
    }
    Err(HazError::DataIntegrity(
        ErrorInfo::new("raster.coordinate_mismatch", "longitude and latitude lengths differ")
            .with_context("longitude", lon.len().to_string())
            .with_context("latitude", lat.len().to_string()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centre_registration_shifts_origin() {
        let text = "ncols 2\nnrows 1\nxllcenter 0.5\nyllcenter 10.5\ncellsize 1\n7 8\n";
        let grid = AsciiGrid::parse(text, "inline").expect("parse");
        assert_eq!(grid.header().xllcorner, 0.0);
        assert_eq!(grid.header().yllcorner, 10.0);
        assert_eq!(grid.header().nodata_value, None);
        assert_eq!(grid.sample(1.5, 10.5), 8.0);
    }

    #[test]
    fn header_keys_are_case_insensitive() {
        let text = "NCOLS 1\nNROWS 1\nXLLCORNER 0\nYLLCORNER 0\nCELLSIZE 2\nnodata_VALUE -1\n-1\n";
        let grid = AsciiGrid::parse(text, "inline").expect("parse");
        assert_eq!(grid.header().cellsize, 2.0);
        assert!(grid.sample(1.0, 1.0).is_nan());
    }

    #[test]
    fn cell_accessor_is_bounds_checked() {
        let header = GridHeader {
            ncols: 2,
            nrows: 1,
            xllcorner: 0.0,
            yllcorner: 0.0,
            cellsize: 1.0,
            nodata_value: None,
        };
        let grid = AsciiGrid::new(header, vec![1.0, 2.0]).expect("grid");
        assert_eq!(grid.cell(0, 1), Some(2.0));
        assert_eq!(grid.cell(1, 0), None);
    }
}
