// ============================================================
// CSV PARSER
// ============================================================
// Parse delimited text into a DataFrame with encoding and delimiter detection

use csv::{ReaderBuilder, Trim};
use tracing::debug;

use crate::domain::error::{AppError, Result};
use crate::domain::table::DataFrame;

/// CSV parser with encoding detection
pub struct CsvParser {
    /// Delimiter character (`None`: detect from content)
    delimiter: Option<u8>,

    /// Whether to trim whitespace from values
    trim: bool,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self {
            delimiter: None,
            trim: true,
        }
    }
}

impl CsvParser {
    /// Create a new CSV parser with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Set whether to trim whitespace
    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// Decode raw bytes and parse them
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<DataFrame> {
        let content = Self::decode(bytes);
        self.parse_content(&content)
    }

    /// Parse CSV content from string. The first record is the header.
    pub fn parse_content(&self, content: &str) -> Result<DataFrame> {
        let delimiter = self
            .delimiter
            .unwrap_or_else(|| Self::detect_delimiter(content));

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(if self.trim { Trim::All } else { Trim::None })
            .flexible(false)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| AppError::ParseError(format!("Failed to read CSV headers: {}", e)))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        if headers.is_empty() {
            return Err(AppError::ParseError("No columns to parse".to_string()));
        }

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::ParseError(format!("Failed to parse CSV row {}: {}", index + 1, e))
            })?;
            rows.push(record.iter().map(|v| v.to_string()).collect());
        }

        debug!(
            delimiter = %(delimiter as char).escape_default(),
            columns = headers.len(),
            rows = rows.len(),
            "Parsed CSV content"
        );

        DataFrame::new(headers, rows)
    }

    /// Decode as UTF-8 (BOM aware), falling back to Windows-1252
    pub fn decode(bytes: &[u8]) -> String {
        let (content, _, had_errors) = encoding_rs::UTF_8.decode(bytes);
        if !had_errors {
            return content.into_owned();
        }

        let (content, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
        content.into_owned()
    }

    /// Detect delimiter from content (comma, semicolon, tab, pipe)
    pub fn detect_delimiter(content: &str) -> u8 {
        let candidates = [b',', b';', b'\t', b'|'];
        let sample_lines: Vec<_> = content.lines().take(10).collect();

        let mut best_delimiter = b',';
        let mut best_score = 0.0f32;

        if sample_lines.is_empty() {
            return best_delimiter;
        }

        for &delimiter in &candidates {
            let field_counts: Vec<usize> = sample_lines
                .iter()
                .map(|line| line.bytes().filter(|&b| b == delimiter).count())
                .collect();

            // Score by consistency (low standard deviation) and frequency
            let avg = field_counts.iter().sum::<usize>() as f32 / field_counts.len() as f32;
            let variance = field_counts
                .iter()
                .map(|&x| (x as f32 - avg).powi(2))
                .sum::<f32>()
                / field_counts.len() as f32;

            let score = avg / (1.0 + variance.sqrt());

            if score > best_score {
                best_score = score;
                best_delimiter = delimiter;
            }
        }

        best_delimiter
    }
}
