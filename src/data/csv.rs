//! Label-first CSV ingestion.
//!
//! Supported format:
//! - one record per line: an integer class label followed by `n_features`
//!   comma-separated intensities
//! - optional header row (skipped when the first line, ignoring a UTF-8 BOM
//!   and leading whitespace, does not start with a digit)
//! - intensities must be finite and within `[0, scale]`; they are divided by
//!   `scale` (255 for 8-bit pixels)
//! - labels are one-hot encoded into a column of length `n_classes`

use std::path::Path;

use crate::data::Dataset;
use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CsvFormat {
    pub n_classes: usize,
    pub n_features: usize,
    /// Divisor applied to every feature value.
    pub scale: f64,
    /// Stop after this many records.
    pub max_samples: Option<usize>,
}

impl CsvFormat {
    /// 28×28 grayscale digits, ten classes.
    pub fn mnist() -> CsvFormat {
        CsvFormat { n_classes: 10, n_features: 784, scale: 255.0, max_samples: None }
    }

    pub fn with_max_samples(mut self, max_samples: usize) -> CsvFormat {
        self.max_samples = Some(max_samples);
        self
    }
}

pub fn load_labelled_csv<P: AsRef<Path>>(path: P, format: CsvFormat) -> Result<Dataset> {
    let text = std::fs::read_to_string(path.as_ref())?;
    let data = parse_labelled_csv(&text, format)?;
    log::info!("loaded {} samples from {}", data.len(), path.as_ref().display());
    Ok(data)
}

/// Parses CSV text into a [`Dataset`]. Blank lines are skipped; any other
/// malformed record fails the whole parse.
pub fn parse_labelled_csv(text: &str, format: CsvFormat) -> Result<Dataset> {
    if format.n_classes == 0
        || format.n_features == 0
        || !(format.scale.is_finite() && format.scale > 0.0)
    {
        return Err(NnError::InvalidConfig(format!("unusable CSV format {format:?}")));
    }

    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let has_header = text
        .lines()
        .next()
        .and_then(|first| first.trim_start().chars().next())
        .is_some_and(|c| !c.is_ascii_digit());
    let limit = format.max_samples.unwrap_or(usize::MAX);
    let mut data = Dataset::default();

    for (idx, line) in text.lines().enumerate().skip(usize::from(has_header)) {
        if data.len() >= limit {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (input, label) = parse_record(line, idx + 1, &format)?;
        data.inputs.push(input);
        data.labels.push(label);
    }

    Ok(data)
}

fn parse_record(line: &str, line_no: usize, format: &CsvFormat) -> Result<(Matrix, Matrix)> {
    let cells: Vec<&str> = line.split(',').map(str::trim).collect();
    if cells.len() != format.n_features + 1 {
        return Err(NnError::parse(
            line_no,
            format!("expected {} columns, got {}", format.n_features + 1, cells.len()),
        ));
    }

    let class: usize = cells[0].parse().map_err(|_| {
        NnError::parse(line_no, format!("label {:?} is not a non-negative integer", cells[0]))
    })?;
    if class >= format.n_classes {
        return Err(NnError::parse(
            line_no,
            format!("label {class} >= n_classes {}", format.n_classes),
        ));
    }
    let mut label = Matrix::zeros(format.n_classes, 1);
    label[(class, 0)] = 1.0;

    let mut input = Matrix::zeros(format.n_features, 1);
    for (i, cell) in cells[1..].iter().enumerate() {
        let value: f64 = cell
            .parse()
            .map_err(|_| NnError::parse(line_no, format!("{cell:?} is not a valid number")))?;
        if !value.is_finite() || value < 0.0 || value > format.scale {
            return Err(NnError::parse(
                line_no,
                format!("value {cell:?} is outside [0, {}]", format.scale),
            ));
        }
        input[(i, 0)] = value / format.scale;
    }

    Ok((input, label))
}
