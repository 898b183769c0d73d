use haz_raster::{AsciiGrid, GridHeader};
use proptest::prelude::*;

fn grid_strategy() -> impl Strategy<Value = AsciiGrid> {
    (1usize..8, 1usize..8, -180.0f64..180.0, -90.0f64..90.0, 0.01f64..10.0).prop_flat_map(
        |(ncols, nrows, x, y, cellsize)| {
            prop::collection::vec(-1.0e4f64..1.0e4, ncols * nrows).prop_map(move |cells| {
                let header = GridHeader {
                    ncols,
                    nrows,
                    xllcorner: x,
                    yllcorner: y,
                    cellsize,
                    nodata_value: Some(-9999.5),
                };
                AsciiGrid::new(header, cells).unwrap()
            })
        },
    )
}

proptest! {
    #[test]
    fn points_strictly_inside_a_cell_return_it(
        grid in grid_strategy(),
        pick in (0usize..64, 0usize..64),
        offset in (0.05f64..0.95, 0.05f64..0.95),
    ) {
        let h = *grid.header();
        let row = pick.0 % h.nrows;
        let col = pick.1 % h.ncols;
        let lon = h.xllcorner + (col as f64 + offset.0) * h.cellsize;
        let lat = h.yllcorner + h.nrows as f64 * h.cellsize - (row as f64 + offset.1) * h.cellsize;
        prop_assert_eq!(grid.sample(lon, lat), grid.cell(row, col).unwrap());
    }

    #[test]
    fn points_beyond_the_extent_have_no_value(
        grid in grid_strategy(),
        along in 0.0f64..1.0,
        gap in 0.001f64..50.0,
        side in 0usize..4,
    ) {
        let h = *grid.header();
        let width = h.ncols as f64 * h.cellsize;
        let height = h.nrows as f64 * h.cellsize;
        let (lon, lat) = match side {
            0 => (h.xllcorner - gap * h.cellsize, h.yllcorner + along * height),
            1 => (h.xllcorner + width + gap * h.cellsize, h.yllcorner + along * height),
            2 => (h.xllcorner + along * width, h.yllcorner - gap * h.cellsize),
            _ => (h.xllcorner + along * width, h.yllcorner + height + gap * h.cellsize),
        };
        prop_assert!(grid.sample(lon, lat).is_nan());
    }
}
