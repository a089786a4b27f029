//! Forecast export.
//!
//! Shapes a succeeded forecast into its downloadable tail-window CSV:
//! columns `ds,yhat,yhat_lower,yhat_upper`, one row per forecast day, file
//! named `{keyword}_forecast.csv`. Chart rendering is left to the display
//! front end, which consumes the full [`ForecastTable`] directly.

use crate::error::Result;
use crate::forecast::{ForecastRow, ForecastTable};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name for a keyword's downloadable forecast.
pub fn forecast_file_name(keyword: &str) -> String {
    format!("{}_forecast.csv", keyword)
}

/// Write forecast rows as CSV with the `ds,yhat,yhat_lower,yhat_upper`
/// header.
pub fn write_forecast_csv<W: Write>(writer: W, rows: &[ForecastRow]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Serialize forecast rows to CSV bytes, ready to hand to a download button.
pub fn forecast_csv_bytes(rows: &[ForecastRow]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_forecast_csv(&mut buffer, rows)?;
    Ok(buffer)
}

/// Write the future window of a keyword's forecast into `dir` as
/// `{keyword}_forecast.csv` and return the file path.
pub fn export_future_window(
    dir: &Path,
    keyword: &str,
    table: &ForecastTable,
    horizon_days: u32,
) -> Result<PathBuf> {
    let path = dir.join(forecast_file_name(keyword));
    let file = std::fs::File::create(&path)?;
    let window = table.future_window(horizon_days);
    write_forecast_csv(file, window)?;

    debug!(keyword = %keyword, path = %path.display(), rows = window.len(), "forecast exported");
    Ok(path)
}
