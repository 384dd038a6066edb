use crate::table;
use std::path::Path;

/// Lazy sequence of fixed-size location lists taken from one table column.
///
/// The column is loaded into memory up front and handed out in slices of at
/// most `chunk_size` cells. If the table cannot be read the sequence yields a
/// single empty chunk, so a bad input degrades to a run with zero results.
#[derive(Debug)]
pub struct ChunkedReader {
    cells: std::vec::IntoIter<String>,
    chunk_size: usize,
    fallback_pending: bool,
}

impl ChunkedReader {
    /// Chunk an in-memory column. A `chunk_size` of 0 is treated as 1.
    pub fn from_column(column: Vec<String>, chunk_size: usize) -> Self {
        Self {
            cells: column.into_iter(),
            chunk_size: chunk_size.max(1),
            fallback_pending: false,
        }
    }

    /// Read column `column` of the table at `path` and chunk it
    pub fn open(path: &Path, column: usize, chunk_size: usize) -> Self {
        match table::read_column(path, column) {
            Ok(cells) => {
                log::info!(
                    "Loaded {} locations from column {} of {}",
                    cells.len(),
                    column,
                    path.display()
                );
                Self::from_column(cells, chunk_size)
            }
            Err(e) => {
                log::error!("Failed to read {}: {}", path.display(), e);
                Self {
                    cells: Vec::new().into_iter(),
                    chunk_size: chunk_size.max(1),
                    fallback_pending: true,
                }
            }
        }
    }
}

impl Iterator for ChunkedReader {
    type Item = Vec<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.fallback_pending {
            self.fallback_pending = false;
            return Some(Vec::new());
        }

        let chunk: Vec<String> = self.cells.by_ref().take(self.chunk_size).collect();
        if chunk.is_empty() {
            None
        } else {
            Some(chunk)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn column(len: usize) -> Vec<String> {
        (0..len).map(|i| format!("{},{}", i, i)).collect()
    }

    #[test]
    fn test_chunk_count_and_sizes() {
        for (len, size) in [(0, 3), (1, 3), (3, 3), (7, 3), (1000, 1000), (1001, 1000)] {
            let chunks: Vec<_> = ChunkedReader::from_column(column(len), size).collect();

            assert_eq!(chunks.len(), len.div_ceil(size), "len={} size={}", len, size);
            if let Some((last, full)) = chunks.split_last() {
                assert!(full.iter().all(|c| c.len() == size));
                assert!(!last.is_empty() && last.len() <= size);
            }
        }
    }

    #[test]
    fn test_concatenation_reproduces_column() {
        let original = column(10);
        let rebuilt: Vec<String> = ChunkedReader::from_column(original.clone(), 4)
            .flatten()
            .collect();
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn test_chunk_size_one() {
        let chunks: Vec<_> =
            ChunkedReader::from_column(vec!["1,1".to_string(), "2,2".to_string()], 1).collect();
        assert_eq!(chunks, vec![vec!["1,1".to_string()], vec!["2,2".to_string()]]);
    }

    #[test]
    fn test_zero_chunk_size_is_clamped() {
        let chunks: Vec<_> = ChunkedReader::from_column(column(2), 0).collect();
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn test_open_reads_column() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("points.tsv");
        fs::write(&path, "name\tlocation\na\t1,1\nb\t2,2\nc\t3,3\n").unwrap();

        let chunks: Vec<_> = ChunkedReader::open(&path, 1, 2).collect();
        assert_eq!(
            chunks,
            vec![
                vec!["1,1".to_string(), "2,2".to_string()],
                vec!["3,3".to_string()],
            ]
        );
    }

    #[test]
    fn test_header_only_table_yields_no_chunks() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("points.csv");
        fs::write(&path, "location\n").unwrap();

        assert_eq!(ChunkedReader::open(&path, 0, 10).count(), 0);
    }

    #[test]
    fn test_unreadable_table_yields_one_empty_chunk() {
        let temp_dir = TempDir::new().unwrap();

        let missing = temp_dir.path().join("missing.csv");
        let chunks: Vec<_> = ChunkedReader::open(&missing, 0, 10).collect();
        assert_eq!(chunks, vec![Vec::<String>::new()]);

        let narrow = temp_dir.path().join("narrow.csv");
        fs::write(&narrow, "a\n1\n").unwrap();
        let chunks: Vec<_> = ChunkedReader::open(&narrow, 3, 10).collect();
        assert_eq!(chunks, vec![Vec::<String>::new()]);
    }

    #[test]
    fn test_unquoted_delimiter_in_cell_is_not_split() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("points.csv");
        fs::write(&path, "id,location\na,116.40,39.90\n").unwrap();

        // Reading "116.40" alone would geocode the wrong value
        let chunks: Vec<_> = ChunkedReader::open(&path, 1, 10).collect();
        assert_eq!(chunks, vec![Vec::<String>::new()]);
    }
}
