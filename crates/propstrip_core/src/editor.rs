use log::trace;
use oxc_span::Span;
use sourcemap::{SourceMap, SourceMapBuilder};
use thiserror::Error;

use crate::types::TransformOutput;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("invalid removal range [{start},{end}) in a source of {len} bytes")]
    InvalidRange { start: u32, end: u32, len: u32 },

    #[error("overlapping removal ranges: [{a_start},{a_end}) overlaps [{b_start},{b_end})")]
    OverlappingRanges { a_start: u32, a_end: u32, b_start: u32, b_end: u32 },
}

/// Accumulates removal ranges against one original source and renders the
/// edited text, plus a position map when requested.
///
/// Every range references the original text, so the order in which removals
/// are recorded is irrelevant. When source maps are requested, both endpoints
/// of each removal are registered as map-relevant locations.
pub struct Editor<'a> {
    source: &'a str,
    source_map: bool,
    removals: Vec<Span>,
    locations: Vec<u32>,
}

/// One span of kept text: `[src_start, src_end)` in the original,
/// starting at `out_start` in the output.
struct Chunk {
    src_start: u32,
    src_end: u32,
    out_start: u32,
}

impl<'a> Editor<'a> {
    pub fn new(source: &'a str, source_map: bool) -> Self {
        Self { source, source_map, removals: Vec::new(), locations: Vec::new() }
    }

    /// Mark `[span.start, span.end)` of the original text for deletion.
    pub fn remove(&mut self, span: Span) {
        trace!("Removing byte range [{},{})", span.start, span.end);
        if self.source_map {
            self.locations.push(span.start);
            self.locations.push(span.end);
        }
        self.removals.push(span);
    }

    /// Render the edited text and, when requested, the position map.
    /// `source_name` labels the original in the map.
    pub fn finish(mut self, source_name: &str) -> Result<TransformOutput, EditError> {
        let len = self.source.len() as u32;
        for span in &self.removals {
            if span.start > span.end || span.end > len {
                return Err(EditError::InvalidRange { start: span.start, end: span.end, len });
            }
        }

        self.removals.sort_unstable_by_key(|span| (span.start, span.end));
        self.removals.dedup();
        for pair in self.removals.windows(2) {
            if pair[1].start < pair[0].end {
                return Err(EditError::OverlappingRanges {
                    a_start: pair[0].start,
                    a_end: pair[0].end,
                    b_start: pair[1].start,
                    b_end: pair[1].end,
                });
            }
        }

        let mut code = String::with_capacity(self.source.len());
        let mut chunks: Vec<Chunk> = Vec::with_capacity(self.removals.len() + 1);
        let mut cursor = 0u32;
        for span in &self.removals {
            if span.start > cursor {
                chunks.push(Chunk {
                    src_start: cursor,
                    src_end: span.start,
                    out_start: code.len() as u32,
                });
                code.push_str(&self.source[cursor as usize..span.start as usize]);
            }
            cursor = span.end;
        }
        if cursor < len {
            chunks.push(Chunk { src_start: cursor, src_end: len, out_start: code.len() as u32 });
            code.push_str(&self.source[cursor as usize..]);
        }

        let map = self.source_map.then(|| self.render_map(&chunks, &code, source_name));
        Ok(TransformOutput { code, map })
    }

    fn render_map(&self, chunks: &[Chunk], code: &str, source_name: &str) -> SourceMap {
        let mut builder = SourceMapBuilder::new(None);
        let src_id = builder.add_source(source_name);
        builder.set_source_contents(src_id, Some(self.source));

        let src_lines = line_starts(self.source);
        let out_lines = line_starts(code);

        let mut marks = self.locations.clone();
        marks.sort_unstable();
        marks.dedup();

        // Kept text shifts only at chunk boundaries and newlines, so a token
        // at each of those points makes the map exact at every output offset.
        for chunk in chunks {
            let mut offsets = vec![chunk.src_start];
            for &mark in &marks {
                if mark > chunk.src_start && mark < chunk.src_end {
                    offsets.push(mark);
                }
            }
            let text = &self.source[chunk.src_start as usize..chunk.src_end as usize];
            for (i, byte) in text.bytes().enumerate() {
                if byte == b'\n' {
                    let line_start = chunk.src_start + i as u32 + 1;
                    if line_start < chunk.src_end {
                        offsets.push(line_start);
                    }
                }
            }
            offsets.sort_unstable();
            offsets.dedup();

            for &offset in &offsets {
                let (src_line, src_col) = position(self.source, &src_lines, offset);
                let out_offset = chunk.out_start + (offset - chunk.src_start);
                let (dst_line, dst_col) = position(code, &out_lines, out_offset);
                builder.add_raw(dst_line, dst_col, src_line, src_col, Some(src_id), None, false);
            }
        }

        builder.into_sourcemap()
    }
}

/// Byte offsets at which each line starts.
fn line_starts(text: &str) -> Vec<u32> {
    let mut starts = vec![0u32];
    for (i, byte) in text.bytes().enumerate() {
        if byte == b'\n' {
            starts.push(i as u32 + 1);
        }
    }
    starts
}

/// Zero-based line and UTF-16 column of a byte offset.
fn position(text: &str, starts: &[u32], offset: u32) -> (u32, u32) {
    let line = starts.partition_point(|&start| start <= offset) - 1;
    let line_start = starts[line];
    let col = text[line_start as usize..offset as usize].encode_utf16().count() as u32;
    (line as u32, col)
}
