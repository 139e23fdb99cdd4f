pub mod csv;

use crate::error::{NnError, Result};
use crate::math::matrix::Matrix;

pub use csv::{load_labelled_csv, parse_labelled_csv, CsvFormat};

/// Paired network inputs and one-hot labels, both as column vectors.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub inputs: Vec<Matrix>,
    pub labels: Vec<Matrix>,
}

impl Dataset {
    /// Builds a dataset from plain rows; each row becomes a column vector.
    pub fn from_rows(inputs: &[Vec<f64>], labels: &[Vec<f64>]) -> Result<Dataset> {
        if inputs.len() != labels.len() {
            return Err(NnError::SizeMismatch { inputs: inputs.len(), labels: labels.len() });
        }
        Ok(Dataset {
            inputs: inputs.iter().map(|r| Matrix::column(r)).collect::<Result<_>>()?,
            labels: labels.iter().map(|r| Matrix::column(r)).collect::<Result<_>>()?,
        })
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

/// The XOR truth table with one-hot labels over two classes.
pub fn builtin_xor() -> Dataset {
    let inputs = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
    let classes = [0, 1, 1, 0];
    let mut data = Dataset::default();
    for (input, class) in inputs.iter().zip(classes) {
        let mut column = Matrix::zeros(2, 1);
        column[(0, 0)] = input[0];
        column[(1, 0)] = input[1];
        let mut one_hot = Matrix::zeros(2, 1);
        one_hot[(class, 0)] = 1.0;
        data.inputs.push(column);
        data.labels.push(one_hot);
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_builds_column_vectors() {
        let data = Dataset::from_rows(&[vec![0.5, 1.0], vec![0.0, 0.25]], &[vec![1.0, 0.0], vec![0.0, 1.0]])
            .unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.inputs[1].shape(), (2, 1));
        assert_eq!(data.inputs[1].as_slice(), &[0.0, 0.25]);
        assert_eq!(data.labels[1].argmax(), 1);
    }

    #[test]
    fn from_rows_rejects_bad_input() {
        assert!(matches!(
            Dataset::from_rows(&[vec![1.0]], &[]),
            Err(NnError::SizeMismatch { inputs: 1, labels: 0 })
        ));
        assert!(matches!(
            Dataset::from_rows(&[vec![]], &[vec![1.0]]),
            Err(NnError::InvalidShape(_))
        ));
    }

    #[test]
    fn xor_table_is_one_hot() {
        let data = builtin_xor();
        assert_eq!(data.len(), 4);
        let classes: Vec<usize> = data.labels.iter().map(Matrix::argmax).collect();
        assert_eq!(classes, vec![0, 1, 1, 0]);
    }
}
