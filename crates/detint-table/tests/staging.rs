//! Integration tests staging rows per event and writing them as a table.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use detint_table::growth::LinearGrowth;
use detint_table::{Branch, BufferError, TableWriter};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Hit {
    event: u64,
    particle: u32,
    energy: f64,
}

#[test]
fn staged_events_produce_one_line_per_row() {
    let mut branch = Branch::new("hits");
    let mut table = TableWriter::new(Vec::new());

    for event in 0..3_u64 {
        for particle in 0..u32::try_from(event).unwrap() {
            branch
                .new_entry(Hit {
                    event,
                    particle,
                    energy: 0.25,
                })
                .unwrap();
        }
        table.flush_branch(&mut branch).unwrap();
    }

    assert_eq!(table.rows_written(), 3);
    let bytes = table.finish().unwrap();
    let hits: Vec<Hit> = bytes
        .split(|b| *b == b'\n')
        .filter(|line| !line.is_empty())
        .map(|line| serde_json::from_slice(line).unwrap())
        .collect();
    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0].event, 1);
    assert_eq!((hits[2].event, hits[2].particle), (2, 1));
}

#[test]
fn custom_growth_policy_is_honoured() {
    let mut branch = Branch::with_policy("hits", LinearGrowth { step: 4 });
    for particle in 0..6 {
        branch
            .new_entry(Hit {
                event: 0,
                particle,
                energy: 1.0,
            })
            .unwrap();
    }
    assert_eq!(branch.capacity(), 9);
}

#[test]
fn failed_write_keeps_staged_rows() {
    struct Broken;

    impl std::io::Write for Broken {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let mut branch = Branch::new("hits");
    branch
        .new_entry(Hit {
            event: 0,
            particle: 0,
            energy: 1.0,
        })
        .unwrap();
    let mut table = TableWriter::new(Broken);
    let err = table.flush_branch(&mut branch).unwrap_err();
    assert!(matches!(err, BufferError::Io { .. } | BufferError::Serialize { .. }));
    assert_eq!(branch.len(), 1);
}
