//! CSV import/export of games, badges and badge grants.
//!
//! Club members edit these files in spreadsheet tools that save either
//! UTF-8 or the legacy Korean code page, so uploads are decoded by trying
//! each known encoding in turn and downloads are always CP949.

pub mod export;
pub mod import;

use encoding_rs::{EncoderResult, EUC_KR};
use std::collections::HashMap;

use crate::error::TransferError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Lines inspected when guessing the delimiter
const SNIFF_LINES: usize = 5;

/// Text encodings accepted for uploads, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8Bom,
    Utf8,
    /// Unified Hangul Code, a superset of EUC-KR
    Cp949,
}

impl TextEncoding {
    pub const ATTEMPTS: [TextEncoding; 3] = [Self::Utf8Bom, Self::Utf8, Self::Cp949];

    fn decode(self, raw: &[u8]) -> Option<String> {
        match self {
            Self::Utf8Bom => raw
                .strip_prefix(UTF8_BOM)
                .and_then(|rest| std::str::from_utf8(rest).ok())
                .map(str::to_owned),
            Self::Utf8 => std::str::from_utf8(raw).ok().map(str::to_owned),
            Self::Cp949 => EUC_KR
                .decode_without_bom_handling_and_without_replacement(raw)
                .map(|text| text.into_owned()),
        }
    }
}

/// Decode an uploaded file, reporting which encoding matched.
pub fn decode_text(raw: &[u8]) -> Result<(String, TextEncoding), TransferError> {
    TextEncoding::ATTEMPTS
        .into_iter()
        .find_map(|encoding| encoding.decode(raw).map(|text| (text, encoding)))
        .ok_or(TransferError::UnknownEncoding)
}

/// Encode text as CP949, writing `?` for characters the code page lacks.
pub fn encode_cp949(text: &str) -> Vec<u8> {
    let mut encoder = EUC_KR.new_encoder();
    let mut out = Vec::with_capacity(text.len());
    let mut rest = text;
    loop {
        let room = encoder
            .max_buffer_length_from_utf8_without_replacement(rest.len())
            .unwrap_or(rest.len() * 2 + 16);
        let start = out.len();
        out.resize(start + room, 0);
        let (result, read, written) =
            encoder.encode_from_utf8_without_replacement(rest, &mut out[start..], true);
        out.truncate(start + written);
        rest = &rest[read..];
        match result {
            EncoderResult::InputEmpty => return out,
            EncoderResult::Unmappable(_) => out.push(b'?'),
            EncoderResult::OutputFull => {}
        }
    }
}

/// Pick `,` or `;` from the first lines of a document.
///
/// A candidate qualifies when it appears the same, non-zero number of times
/// on every sampled line; the most frequent qualifying candidate wins and
/// `,` is the fallback.
pub fn sniff_delimiter(text: &str) -> u8 {
    let sample: Vec<&str> = text
        .lines()
        .take(SNIFF_LINES)
        .filter(|line| !line.trim().is_empty())
        .collect();

    let consistent_count = |delimiter: char| -> Option<usize> {
        let mut counts = sample.iter().map(|line| line.matches(delimiter).count());
        let first = counts.next()?;
        (first > 0 && counts.all(|c| c == first)).then_some(first)
    };

    match (consistent_count(','), consistent_count(';')) {
        (Some(comma), Some(semicolon)) if semicolon > comma => b';',
        (None, Some(_)) => b';',
        _ => b',',
    }
}

/// One data row keyed by header name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvRow {
    fields: HashMap<String, String>,
}

impl CsvRow {
    /// Value of the first alias present with a non-empty value.
    pub fn pick(&self, aliases: &[&str]) -> Option<&str> {
        aliases
            .iter()
            .filter_map(|alias| self.fields.get(*alias))
            .map(String::as_str)
            .find(|value| !value.is_empty())
    }

    /// Like [`pick`](Self::pick) but trimmed, empty when absent.
    pub fn pick_trimmed(&self, aliases: &[&str]) -> &str {
        self.pick(aliases).map(str::trim).unwrap_or("")
    }

    /// Numeric value truncated toward zero, so `"25000.7"` reads as 25000.
    /// Missing or unparsable values read as 0.
    pub fn pick_int(&self, aliases: &[&str]) -> i64 {
        self.pick(aliases)
            .and_then(|value| value.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite())
            .map(|value| value.trunc() as i64)
            .unwrap_or(0)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for CsvRow {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// Parse a decoded document into header-keyed rows.
pub fn read_rows(text: &str) -> Result<Vec<CsvRow>, TransferError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(text))
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let fields = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect();
        rows.push(CsvRow { fields });
    }
    Ok(rows)
}

/// Decode and parse an upload in one step.
pub fn read_upload(raw: &[u8]) -> Result<Vec<CsvRow>, TransferError> {
    let (text, encoding) = decode_text(raw)?;
    tracing::debug!("Upload decoded as {:?}", encoding);
    read_rows(&text)
}
