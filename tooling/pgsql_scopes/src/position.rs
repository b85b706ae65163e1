//! Map line-relative columns to offsets in the joined code text.

use std::ops::Range;

use pgsql_textmate::LINE_SEPARATOR;

/// Start offset of each code line within the text formed by joining the
/// lines with [`LINE_SEPARATOR`].
///
/// This must agree with how the code was joined for tokenization; token
/// offsets are compared against these ranges directly.
///
/// ```
/// use pgsql_scopes::position::LineOffsets;
///
/// let offsets = LineOffsets::build(&["AAA", "BBBB"]);
/// assert_eq!(offsets.as_slice(), &[0, 4]);
/// assert_eq!(offsets.absolute(1, &(1..3)), Some(5..7));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LineOffsets {
    starts: Vec<usize>,
}

impl LineOffsets {
    pub fn build<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut starts = Vec::with_capacity(lines.len());
        let mut offset = 0;
        for line in lines {
            starts.push(offset);
            offset += line.as_ref().len() + LINE_SEPARATOR.len();
        }
        LineOffsets { starts }
    }

    /// Offset of the 0-based `line`, `None` past the last line.
    #[inline]
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.starts.get(line).copied()
    }

    /// `columns` of `line` as an absolute range.
    pub fn absolute(&self, line: usize, columns: &Range<usize>) -> Option<Range<usize>> {
        let start = self.line_start(line)?;
        Some(start + columns.start..start + columns.end)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.starts
    }
}
