//! Text edits against an immutable original source.
//!
//! Edits are recorded, validated against each other as they arrive, and only
//! composed into output text by [`SpliceBuffer::finish`].

use crate::error::{Result, ShakeError};
use crate::span::Span;
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

#[derive(Debug)]
pub struct SpliceBuffer<'s> {
    original: &'s str,
    /// Sorted, pairwise non-overlapping (touching is allowed).
    removals: Vec<Span>,
    insertions: BTreeMap<u32, VecDeque<String>>,
}

impl<'s> SpliceBuffer<'s> {
    pub fn new(original: &'s str) -> Self {
        SpliceBuffer {
            original,
            removals: Vec::new(),
            insertions: BTreeMap::new(),
        }
    }

    pub fn original(&self) -> &'s str {
        self.original
    }

    pub fn edit_count(&self) -> usize {
        self.removals.len() + self.insertions.values().map(VecDeque::len).sum::<usize>()
    }

    fn len(&self) -> u32 {
        self.original.len() as u32
    }

    fn check_range(&self, start: u32, end: u32) -> Result<()> {
        if start > end {
            return Err(ShakeError::InvertedRange { start, end });
        }
        if end > self.len() {
            return Err(ShakeError::EditOutOfBounds {
                start,
                end,
                len: self.len(),
            });
        }
        Ok(())
    }

    fn removal_containing(&self, offset: u32) -> Option<Span> {
        let index = self.removals.partition_point(|r| r.end <= offset);
        self.removals
            .get(index)
            .copied()
            .filter(|r| r.strictly_contains(offset))
    }

    /// Removes `[start, end)`. Removing an empty range is a no-op.
    pub fn remove(&mut self, start: u32, end: u32) -> Result<()> {
        self.check_range(start, end)?;
        let span = Span::new(start, end);
        if span.is_empty() {
            return Ok(());
        }
        let index = self.removals.partition_point(|r| r.end <= start);
        if let Some(existing) = self.removals.get(index) {
            if existing.overlaps(&span) {
                return Err(ShakeError::OverlappingEdit {
                    first: *existing,
                    second: span,
                });
            }
        }
        if let Some((&offset, _)) = self.insertions.range(start + 1..end).next() {
            return Err(ShakeError::InsertInsideRemoved {
                offset,
                removed: span,
            });
        }
        self.removals.insert(index, span);
        Ok(())
    }

    fn check_insert(&self, offset: u32) -> Result<()> {
        self.check_range(offset, offset)?;
        if let Some(removed) = self.removal_containing(offset) {
            return Err(ShakeError::InsertInsideRemoved { offset, removed });
        }
        Ok(())
    }

    /// Inserts `text` at `offset`, before anything already inserted there.
    pub fn insert_at(&mut self, offset: u32, text: impl Into<String>) -> Result<()> {
        self.check_insert(offset)?;
        self.insertions.entry(offset).or_default().push_front(text.into());
        Ok(())
    }

    /// Inserts `text` at `offset`, after anything already inserted there.
    pub fn append_at(&mut self, offset: u32, text: impl Into<String>) -> Result<()> {
        self.check_insert(offset)?;
        self.insertions.entry(offset).or_default().push_back(text.into());
        Ok(())
    }

    /// Replaces `[start, end)` with `text`.
    pub fn overwrite(&mut self, start: u32, end: u32, text: impl Into<String>) -> Result<()> {
        self.remove(start, end)?;
        self.append_at(start, text)
    }

    /// Composes the output text and its position map.
    pub fn finish(self) -> RenderedText {
        let mut composer = Composer {
            original: self.original,
            out: String::with_capacity(self.original.len()),
            positions: PositionMap::default(),
            insertions: self.insertions.into_iter().peekable(),
        };
        let mut cursor = 0;
        for removal in &self.removals {
            composer.emit_kept(cursor, removal.start);
            cursor = removal.end;
        }
        composer.emit_kept(cursor, self.original.len() as u32);
        RenderedText {
            code: composer.out,
            positions: composer.positions,
        }
    }
}

struct Composer<'s> {
    original: &'s str,
    out: String,
    positions: PositionMap,
    insertions: std::iter::Peekable<std::collections::btree_map::IntoIter<u32, VecDeque<String>>>,
}

impl Composer<'_> {
    /// Copies `[from, to)` and every insertion at offsets in `[from, to]`.
    fn emit_kept(&mut self, from: u32, to: u32) {
        let mut pos = from;
        while let Some((offset, _)) = self.insertions.peek() {
            if *offset > to {
                break;
            }
            let Some((offset, texts)) = self.insertions.next() else {
                break;
            };
            let offset = offset.max(pos);
            self.copy(pos, offset);
            pos = offset;
            for text in texts {
                self.out.push_str(&text);
            }
        }
        self.copy(pos, to);
    }

    fn copy(&mut self, from: u32, to: u32) {
        if from >= to {
            return;
        }
        self.positions.push(self.out.len() as u32, from, to - from);
        self.out
            .push_str(&self.original[from as usize..to as usize]);
    }
}

/// A run of output text copied verbatim from the original.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MappedChunk {
    pub generated: u32,
    pub original: u32,
    pub len: u32,
}

/// Maps offsets of the rendered text back into the original source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PositionMap {
    chunks: Vec<MappedChunk>,
}

impl PositionMap {
    fn push(&mut self, generated: u32, original: u32, len: u32) {
        if let Some(last) = self.chunks.last_mut() {
            if last.generated + last.len == generated && last.original + last.len == original {
                last.len += len;
                return;
            }
        }
        self.chunks.push(MappedChunk {
            generated,
            original,
            len,
        });
    }

    pub fn chunks(&self) -> &[MappedChunk] {
        &self.chunks
    }

    /// The original offset of a generated offset, if it lies in copied text.
    pub fn original_offset(&self, generated: u32) -> Option<u32> {
        let index = self.chunks.partition_point(|c| c.generated + c.len <= generated);
        let chunk = self.chunks.get(index)?;
        (chunk.generated <= generated).then(|| chunk.original + (generated - chunk.generated))
    }
}

#[derive(Debug, Clone)]
pub struct RenderedText {
    pub code: String,
    pub positions: PositionMap,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untouched_source_round_trips() {
        let buffer = SpliceBuffer::new("let a = 1;");
        let rendered = buffer.finish();
        assert_eq!(rendered.code, "let a = 1;");
        assert_eq!(rendered.positions.chunks().len(), 1);
    }

    #[test]
    fn test_remove_and_insert() {
        let mut buffer = SpliceBuffer::new("let x = compute();");
        buffer.remove(0, 8).unwrap();
        buffer.append_at(18, " // kept").unwrap();
        assert_eq!(buffer.finish().code, "compute(); // kept");
    }

    #[test]
    fn test_touching_removals_are_allowed() {
        let mut buffer = SpliceBuffer::new("abcdef");
        buffer.remove(0, 2).unwrap();
        buffer.remove(2, 4).unwrap();
        buffer.append_at(2, "-").unwrap();
        assert_eq!(buffer.finish().code, "-ef");
    }

    #[test]
    fn test_overlapping_removal_is_an_error() {
        let mut buffer = SpliceBuffer::new("abcdef");
        buffer.remove(1, 4).unwrap();
        let err = buffer.remove(3, 5).unwrap_err();
        assert_eq!(
            err,
            ShakeError::OverlappingEdit {
                first: Span::new(1, 4),
                second: Span::new(3, 5)
            }
        );
    }

    #[test]
    fn test_insert_inside_removal_is_an_error() {
        let mut buffer = SpliceBuffer::new("abcdef");
        buffer.remove(1, 4).unwrap();
        assert!(matches!(
            buffer.insert_at(2, "x"),
            Err(ShakeError::InsertInsideRemoved { offset: 2, .. })
        ));
        // ...and the other way round
        let mut buffer = SpliceBuffer::new("abcdef");
        buffer.append_at(2, "x").unwrap();
        assert!(buffer.remove(1, 4).is_err());
    }

    #[test]
    fn test_out_of_bounds_and_inverted() {
        let mut buffer = SpliceBuffer::new("abc");
        assert!(matches!(
            buffer.remove(1, 9),
            Err(ShakeError::EditOutOfBounds { len: 3, .. })
        ));
        assert_eq!(
            buffer.remove(2, 1),
            Err(ShakeError::InvertedRange { start: 2, end: 1 })
        );
    }

    #[test]
    fn test_insert_order_at_same_offset() {
        let mut buffer = SpliceBuffer::new("ab");
        buffer.append_at(1, "2").unwrap();
        buffer.append_at(1, "3").unwrap();
        buffer.insert_at(1, "1").unwrap();
        assert_eq!(buffer.finish().code, "a123b");
    }

    #[test]
    fn test_overwrite() {
        let mut buffer = SpliceBuffer::new("let Foo = 1;");
        buffer.overwrite(4, 7, "Foo$1").unwrap();
        assert_eq!(buffer.finish().code, "let Foo$1 = 1;");
    }

    #[test]
    fn test_position_map() {
        let mut buffer = SpliceBuffer::new("let x = f();");
        buffer.remove(0, 8).unwrap();
        let rendered = buffer.finish();
        assert_eq!(rendered.code, "f();");
        assert_eq!(rendered.positions.original_offset(0), Some(8));
        assert_eq!(rendered.positions.original_offset(3), Some(11));
        assert_eq!(rendered.positions.original_offset(4), None);
    }

    #[test]
    fn test_inserted_text_is_unmapped() {
        let mut buffer = SpliceBuffer::new("ab");
        buffer.append_at(1, "XY").unwrap();
        let rendered = buffer.finish();
        assert_eq!(rendered.code, "aXYb");
        assert_eq!(rendered.positions.original_offset(0), Some(0));
        assert_eq!(rendered.positions.original_offset(1), None);
        assert_eq!(rendered.positions.original_offset(3), Some(1));
    }
}
