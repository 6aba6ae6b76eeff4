//! Just enough SQL lexing to tell code apart from the text SQLite never interprets as code.
//!
//! Quoted strings, quoted identifiers and comments are opaque: the path shorthand isn't translated inside them, and a
//! `?` inside them isn't a parameter.  An unterminated quote or block comment runs to the end of the text.

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Span<'a> {
    Code(&'a str),
    Opaque(&'a str),
}

/// Splits SQL text into [Span]s.  Concatenating the spans gives back the input.
pub(crate) struct Spans<'a> {
    text: &'a str,
    pos: usize,
}

pub(crate) fn spans(text: &str) -> Spans<'_> {
    Spans { text, pos: 0 }
}

/// Where the opaque run starting at `start` ends, or `None` if nothing opaque starts there.
///
/// All delimiters are ASCII, so byte offsets always land on character boundaries.
fn opaque_end(bytes: &[u8], start: usize) -> Option<usize> {
    match (bytes[start], bytes.get(start + 1)) {
        (q @ (b'\'' | b'"'), _) => {
            // A doubled quote is an escaped quote and doesn't close.
            let mut i = start + 1;
            while i < bytes.len() {
                if bytes[i] == q {
                    if bytes.get(i + 1) == Some(&q) {
                        i += 2;
                        continue;
                    }
                    return Some(i + 1);
                }
                i += 1;
            }
            Some(bytes.len())
        }
        (b'-', Some(b'-')) => Some(
            bytes[start..]
                .iter()
                .position(|&b| b == b'\n')
                .map(|p| start + p + 1)
                .unwrap_or(bytes.len()),
        ),
        (b'/', Some(b'*')) => Some(
            bytes[start + 2..]
                .windows(2)
                .position(|w| w == b"*/")
                .map(|p| start + 2 + p + 2)
                .unwrap_or(bytes.len()),
        ),
        _ => None,
    }
}

impl<'a> Iterator for Spans<'a> {
    type Item = Span<'a>;

    fn next(&mut self) -> Option<Span<'a>> {
        let bytes = self.text.as_bytes();
        let start = self.pos;
        if start >= bytes.len() {
            return None;
        }

        if let Some(end) = opaque_end(bytes, start) {
            self.pos = end;
            return Some(Span::Opaque(&self.text[start..end]));
        }

        let mut end = start + 1;
        while end < bytes.len() && opaque_end(bytes, end).is_none() {
            end += 1;
        }
        self.pos = end;
        Some(Span::Code(&self.text[start..end]))
    }
}

/// How many parameters SQLite would bind in `text`: each `?`, plus `:name`, `@name` and `$name` outside opaque spans.
pub(crate) fn parameter_count(text: &str) -> usize {
    spans(text)
        .filter_map(|s| match s {
            Span::Code(c) => Some(c),
            Span::Opaque(_) => None,
        })
        .map(|code| {
            let bytes = code.as_bytes();
            bytes
                .iter()
                .enumerate()
                .filter(|&(i, &b)| match b {
                    b'?' => true,
                    b':' | b'@' | b'$' => bytes
                        .get(i + 1)
                        .map_or(false, |n| n.is_ascii_alphanumeric() || *n == b'_'),
                    _ => false,
                })
                .count()
        })
        .sum()
}
