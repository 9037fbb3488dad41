use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, StringRecord, Writer};
use std::fs::File;
use std::path::Path;
use tracing::info;

/// Copy `input` to `output`, dropping field 0 of every record. Holds one
/// record in memory at a time, so arbitrarily large files pass through
/// without buffering the whole table.
///
/// The destination is only created once the source has been opened and its
/// header validated, so a bad source leaves no file behind. Returns the
/// number of data rows written.
#[tracing::instrument(
    level = "info",
    skip(input, output),
    fields(input = %input.as_ref().display(), output = %output.as_ref().display())
)]
pub fn drop_first_field<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<u64> {
    let file = File::open(&input)
        .with_context(|| format!("failed to open source file {}", input.as_ref().display()))?;
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(file);

    let headers = rdr
        .headers()
        .with_context(|| format!("failed to read header row of {}", input.as_ref().display()))?
        .clone();
    if headers.len() < 2 {
        bail!(
            "table has {} column(s); need at least 2 to drop the first",
            headers.len()
        );
    }

    let out = File::create(&output).with_context(|| {
        format!(
            "failed to create destination file {}",
            output.as_ref().display()
        )
    })?;
    let mut wtr = Writer::from_writer(out);

    wtr.write_record(headers.iter().skip(1))
        .context("writing header row")?;

    let mut written: u64 = 0;
    let mut record = StringRecord::new();
    loop {
        let more = rdr.read_record(&mut record).with_context(|| {
            format!(
                "CSV parse error in {} at data row {}",
                input.as_ref().display(),
                written + 1
            )
        })?;
        if !more {
            break;
        }
        wtr.write_record(record.iter().skip(1))
            .with_context(|| format!("writing data row {}", written + 1))?;
        written += 1;
    }
    wtr.flush().with_context(|| {
        format!(
            "flushing destination file {}",
            output.as_ref().display()
        )
    })?;

    info!(rows = written, "streamed table");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Table;
    use anyhow::Result;
    use std::fs;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,deindex=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    fn write_sample(content: &str) -> Result<NamedTempFile> {
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(content.as_bytes())?;
        Ok(tmp)
    }

    #[test]
    fn streams_the_reference_example() -> Result<()> {
        init_test_logging();
        let src = write_sample("A,B,C\n1,2,3\n4,5,6\n")?;
        let out_dir = TempDir::new()?;
        let out_path = out_dir.path().join("out.csv");

        let rows = drop_first_field(src.path(), &out_path)?;

        assert_eq!(rows, 2);
        assert_eq!(fs::read_to_string(&out_path)?, "B,C\n2,3\n5,6\n");
        Ok(())
    }

    #[test]
    fn matches_the_in_memory_path_byte_for_byte() -> Result<()> {
        init_test_logging();
        let src = write_sample(
            "idx,name,comment\n0,alpha,\"one, two\"\n1,beta,plain\n2,gamma,\"quoted \"\"inner\"\"\"\n",
        )?;
        let out_dir = TempDir::new()?;
        let streamed = out_dir.path().join("streamed.csv");
        let buffered = out_dir.path().join("buffered.csv");

        drop_first_field(src.path(), &streamed)?;
        Table::load(src.path())?.drop_first_column()?.save(&buffered)?;

        assert_eq!(fs::read(&streamed)?, fs::read(&buffered)?);
        Ok(())
    }

    #[test]
    fn missing_source_creates_no_destination() {
        init_test_logging();
        let out_dir = TempDir::new().unwrap();
        let out_path = out_dir.path().join("out.csv");

        let err = drop_first_field("no/such/file.csv", &out_path).unwrap_err();
        assert!(err.to_string().contains("no/such/file.csv"));
        assert!(!out_path.exists());
    }

    #[test]
    fn single_column_source_creates_no_destination() -> Result<()> {
        init_test_logging();
        let src = write_sample("A\n1\n")?;
        let out_dir = TempDir::new()?;
        let out_path = out_dir.path().join("out.csv");

        assert!(drop_first_field(src.path(), &out_path).is_err());
        assert!(!out_path.exists());
        Ok(())
    }

    #[test]
    fn missing_destination_directory_is_an_io_error() -> Result<()> {
        init_test_logging();
        let src = write_sample("A,B\n1,2\n")?;
        let out_dir = TempDir::new()?;
        let out_path = out_dir.path().join("nested/does/not/exist/out.csv");

        let err = drop_first_field(src.path(), &out_path).unwrap_err();
        assert!(err.to_string().contains("destination"));
        Ok(())
    }
}
