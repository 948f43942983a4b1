//! Fixed-width tensor encodings for classifier inputs and targets

use ndarray::{Array1, Array2, Array3, Axis};
use std::collections::HashMap;

/// Amino-acid alphabet; the column of a residue is its index here
pub const AMINO_ACIDS: &str = "ARNDCEQGHILKMFPSTWYV";

/// Number of columns in a one-hot row
pub const ALPHABET_SIZE: usize = 20;

/// Sequence length the training pipelines pad to
pub const DEFAULT_MAX_LENGTH: usize = 500;

fn residue_index(residue: char) -> Option<usize> {
    AMINO_ACIDS.find(residue)
}

/// One row per residue, a single 1.0 in the residue's column
///
/// Letters outside [`AMINO_ACIDS`] (ambiguity codes, lowercase, gaps) leave
/// the row all zeros.
pub fn one_hot(sequence: &str) -> Array2<f32> {
    let residues: Vec<char> = sequence.chars().collect();
    let mut encoded = Array2::<f32>::zeros((residues.len(), ALPHABET_SIZE));

    for (row, &residue) in residues.iter().enumerate() {
        if let Some(col) = residue_index(residue) {
            encoded[[row, col]] = 1.0;
        }
    }

    encoded
}

/// [`one_hot`] truncated or zero-padded to exactly `max_len` rows
pub fn one_hot_padded(sequence: &str, max_len: usize) -> Array2<f32> {
    let mut encoded = Array2::<f32>::zeros((max_len, ALPHABET_SIZE));

    for (row, residue) in sequence.chars().take(max_len).enumerate() {
        if let Some(col) = residue_index(residue) {
            encoded[[row, col]] = 1.0;
        }
    }

    encoded
}

/// Stack padded encodings into a `(batch, max_len, 20)` tensor
pub fn one_hot_batch<S: AsRef<str>>(sequences: &[S], max_len: usize) -> Array3<f32> {
    let mut batch = Array3::<f32>::zeros((sequences.len(), max_len, ALPHABET_SIZE));

    for (mut slot, sequence) in batch.axis_iter_mut(Axis(0)).zip(sequences) {
        slot.assign(&one_hot_padded(sequence.as_ref(), max_len));
    }

    batch
}

/// 1.0 at the vocabulary position of every term present; unknown terms are ignored
pub fn multi_hot<S: AsRef<str>>(terms: &[S], vocabulary: &[S]) -> Array1<f32> {
    let positions = vocabulary_positions(vocabulary);
    let mut encoded = Array1::<f32>::zeros(vocabulary.len());

    for term in terms {
        if let Some(&col) = positions.get(term.as_ref()) {
            encoded[col] = 1.0;
        }
    }

    encoded
}

/// One [`multi_hot`] row per label set, shape `(label_sets, vocabulary)`
pub fn multi_hot_batch<S: AsRef<str>>(label_sets: &[Vec<S>], vocabulary: &[S]) -> Array2<f32> {
    let positions = vocabulary_positions(vocabulary);
    let mut encoded = Array2::<f32>::zeros((label_sets.len(), vocabulary.len()));

    for (row, terms) in label_sets.iter().enumerate() {
        for term in terms {
            if let Some(&col) = positions.get(term.as_ref()) {
                encoded[[row, col]] = 1.0;
            }
        }
    }

    encoded
}

fn vocabulary_positions<S: AsRef<str>>(vocabulary: &[S]) -> HashMap<&str, usize> {
    vocabulary
        .iter()
        .enumerate()
        .map(|(i, term)| (term.as_ref(), i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alphabet_size() {
        assert_eq!(AMINO_ACIDS.chars().count(), ALPHABET_SIZE);
    }

    #[test]
    fn test_one_hot() {
        let encoded = one_hot("ARV");
        assert_eq!(encoded.shape(), &[3, 20]);
        assert_eq!(encoded[[0, 0]], 1.0);
        assert_eq!(encoded[[1, 1]], 1.0);
        assert_eq!(encoded[[2, 19]], 1.0);
        assert_eq!(encoded.sum(), 3.0);
    }

    #[test]
    fn test_unknown_residue_is_zero_row() {
        let encoded = one_hot("AXa");
        assert_eq!(encoded.row(1).sum(), 0.0);
        assert_eq!(encoded.row(2).sum(), 0.0);
        assert_eq!(encoded.sum(), 1.0);
    }

    #[test]
    fn test_one_hot_padded() {
        let padded = one_hot_padded("MKV", 5);
        assert_eq!(padded.shape(), &[5, 20]);
        assert_eq!(padded.sum(), 3.0);
        assert_eq!(padded.row(4).sum(), 0.0);

        let truncated = one_hot_padded("MKVLA", 2);
        assert_eq!(truncated.shape(), &[2, 20]);
        assert_eq!(truncated, one_hot("MK"));
    }

    #[test]
    fn test_one_hot_batch() {
        let batch = one_hot_batch(&["MK", "A"], 3);
        assert_eq!(batch.shape(), &[2, 3, 20]);
        assert_eq!(batch.index_axis(Axis(0), 1), one_hot_padded("A", 3));
    }

    #[test]
    fn test_multi_hot() {
        let vocabulary = ["GO:1", "GO:2", "GO:3"];
        let encoded = multi_hot(&["GO:3", "GO:9", "GO:1"], &vocabulary);
        assert_eq!(encoded.to_vec(), vec![1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_multi_hot_batch() {
        let vocabulary = vec!["GO:1".to_string(), "GO:2".to_string()];
        let sets = vec![vec!["GO:2".to_string()], vec![]];
        let encoded = multi_hot_batch(&sets, &vocabulary);
        assert_eq!(encoded.shape(), &[2, 2]);
        assert_eq!(encoded.row(0).to_vec(), vec![0.0, 1.0]);
        assert_eq!(encoded.row(1).sum(), 0.0);
    }
}
