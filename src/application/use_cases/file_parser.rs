use std::fs::File;
use std::io::{Read, Seek};

use tracing::info;

use crate::domain::error::Result;
use crate::domain::table::DataFrame;
use crate::infrastructure::archive::ZipStreamReader;
use crate::infrastructure::csv::CsvParser;

/// Loads archive entries as tables.
pub struct FileParser<'a, R = File> {
    reader: &'a mut ZipStreamReader<R>,
}

impl<'a, R: Read + Seek> FileParser<'a, R> {
    pub fn new(reader: &'a mut ZipStreamReader<R>) -> Self {
        Self { reader }
    }

    /// Parse the named entry as delimited text. `.tsv` and `.tab` entries are
    /// tab separated; anything else has its delimiter detected.
    pub fn load(&mut self, name: &str) -> Result<DataFrame> {
        let bytes = self.reader.read_entry(name)?;
        let frame = Self::parser_for(name).parse_bytes(&bytes)?;

        info!(
            entry = name,
            rows = frame.num_rows(),
            columns = frame.num_columns(),
            "Loaded table from archive"
        );
        Ok(frame)
    }

    fn parser_for(name: &str) -> CsvParser {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".tsv") || lower.ends_with(".tab") {
            CsvParser::new().with_delimiter(b'\t')
        } else {
            CsvParser::new()
        }
    }
}
