use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, Writer};
use std::fs::File;
use std::path::Path;
use tracing::info;

/// A whole delimited-text table held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Column names, from the header row of the file.
    pub headers: Vec<String>,
    /// Each data row, as a Vec of Strings (one per field), in file order.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Read `path` as comma-delimited text with a header row.
    /// Every data row must have the same field count as the header.
    #[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)
            .with_context(|| format!("failed to open source file {}", path.as_ref().display()))?;
        let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(file);

        let headers: Vec<String> = rdr
            .headers()
            .with_context(|| {
                format!("failed to read header row of {}", path.as_ref().display())
            })?
            .iter()
            .map(str::to_string)
            .collect();
        if headers.is_empty() {
            bail!("{} is empty: no header row", path.as_ref().display());
        }

        let mut rows: Vec<Vec<String>> = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let record = result.with_context(|| {
                format!(
                    "CSV parse error in {} at data row {}",
                    path.as_ref().display(),
                    idx + 1
                )
            })?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        info!(rows = rows.len(), columns = headers.len(), "loaded table");
        Ok(Table { headers, rows })
    }

    /// Remove the column at index 0, keeping the remaining columns and every
    /// cell value in their original order. Purely positional: the first
    /// column goes no matter what it is named or contains.
    ///
    /// A table with fewer than two columns is rejected: dropping the only
    /// column would leave a zero-column table, which the output format
    /// cannot represent.
    pub fn drop_first_column(self) -> Result<Self> {
        if self.headers.len() < 2 {
            bail!(
                "table has {} column(s); need at least 2 to drop the first",
                self.headers.len()
            );
        }

        let headers: Vec<String> = self.headers.into_iter().skip(1).collect();
        let rows: Vec<Vec<String>> = self
            .rows
            .into_iter()
            .map(|row| row.into_iter().skip(1).collect())
            .collect();

        Ok(Table { headers, rows })
    }

    /// Write the table to `path` (created or truncated): header row first,
    /// then one comma-delimited record per line. No row-index column is
    /// added.
    #[tracing::instrument(level = "info", skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(&path).with_context(|| {
            format!(
                "failed to create destination file {}",
                path.as_ref().display()
            )
        })?;
        let mut wtr = Writer::from_writer(file);

        wtr.write_record(&self.headers).context("writing header row")?;
        for (idx, row) in self.rows.iter().enumerate() {
            wtr.write_record(row)
                .with_context(|| format!("writing data row {}", idx + 1))?;
        }
        wtr.flush().with_context(|| {
            format!("flushing destination file {}", path.as_ref().display())
        })?;

        info!(rows = self.rows.len(), columns = self.headers.len(), "saved table");
        Ok(())
    }
}
