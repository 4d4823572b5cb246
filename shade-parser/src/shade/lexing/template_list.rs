//! Template list disambiguation
//!
//!     A `<` right after an identifier is either the start of a template list (`vec3<f32>`,
//!     `array<f32, 4>`) or a less-than comparison (`a < b`). The grammar cannot tell them
//!     apart, so the tokenizer decides up front with a forward scan over the raw source,
//!     starting just after the `<`:
//!
//!         - `(` and `[` are pushed on a nesting stack, `)` and `]` must pop their opener.
//!           A closer with an empty or mismatched stack fails the scan.
//!         - `;`, `:`, `{`, `}` and a plain `=` at empty stack fail the scan: none of them can
//!           appear inside a template list.
//!         - `&&` and `||` at empty stack fail the scan: a short-circuit operator at the
//!           outer level proves the `<` was a comparison.
//!         - A `>` inside brackets belongs to a nested expression and is ignored.
//!         - An identifier followed by `<` at empty stack opens a nested candidate; the next
//!           `>` at empty stack closes it. This is what lets `array<vec2<f32>>` work.
//!         - With no nested candidate open, a `>` followed by `=` or `>` is part of `>=`,
//!           `>>` or `>>=` and is skipped. Any other `>` is the matching close.
//!
//!     "Identifier followed by `<`" allows whitespace in between, using the same whitespace
//!     set the tokenizer skips.
//!
//!     Only a successful scan turns the `<` into a template-list start. The scan also
//!     returns the nested pairs it discovered so the tokenizer does not have to repeat the
//!     work (and could not: from the inner `<` alone, `f32>>` looks like a shift).

/// Result of a successful scan: byte offsets of the `<` and its matching `>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateListScan {
    pub start: usize,
    pub end: usize,
    /// Nested template lists found inside this one, as `(start, end)` byte offsets.
    pub nested: Vec<(usize, usize)>,
}

/// Scan forward from the `<` at byte offset `start`.
///
/// Returns `None` when the `<` is a comparison operator.
pub fn discover(source: &str, start: usize, whitespace: &[char]) -> Option<TemplateListScan> {
    let bytes = source.as_bytes();
    if bytes.get(start) != Some(&b'<') {
        return None;
    }

    let mut brackets: Vec<u8> = Vec::new();
    let mut pending: Vec<usize> = Vec::new();
    let mut nested = Vec::new();
    let mut i = start + 1;

    while i < bytes.len() {
        let current = bytes[i];
        let next = bytes.get(i + 1).copied();

        match current {
            b'/' if next == Some(b'/') => {
                i = source[i..].find('\n').map_or(bytes.len(), |end| i + end);
            }
            b'/' if next == Some(b'*') => {
                i = i + 2 + source[i + 2..].find("*/")? + 2;
            }
            b'"' => {
                i = skip_string(bytes, i)?;
            }
            b'(' | b'[' => {
                brackets.push(current);
                i += 1;
            }
            b')' | b']' => {
                let opener = if current == b')' { b'(' } else { b'[' };
                if brackets.pop() != Some(opener) {
                    return None;
                }
                i += 1;
            }
            b';' | b':' | b'{' | b'}' if brackets.is_empty() => return None,
            b'&' | b'|' if next == Some(current) => {
                if brackets.is_empty() {
                    return None;
                }
                i += 2;
            }
            b'=' => {
                if next == Some(b'=') {
                    i += 2;
                } else if brackets.is_empty() {
                    return None;
                } else {
                    i += 1;
                }
            }
            b'!' if next == Some(b'=') => i += 2,
            b'-' if next == Some(b'>') => i += 2,
            b'<' => {
                if next == Some(b'<') || next == Some(b'=') {
                    i += 2;
                    if next == Some(b'<') && bytes.get(i) == Some(&b'=') {
                        i += 1;
                    }
                    continue;
                }
                if brackets.is_empty() && follows_identifier(source, i, whitespace) {
                    pending.push(i);
                }
                i += 1;
            }
            b'>' => {
                if !brackets.is_empty() {
                    i += 1;
                    continue;
                }
                if let Some(open) = pending.pop() {
                    nested.push((open, i));
                    i += 1;
                    continue;
                }
                match next {
                    Some(b'=') => i += 2,
                    Some(b'>') => {
                        i += 2;
                        if bytes.get(i) == Some(&b'=') {
                            i += 1;
                        }
                    }
                    _ => {
                        return Some(TemplateListScan {
                            start,
                            end: i,
                            nested,
                        })
                    }
                }
            }
            _ => i += 1,
        }
    }

    None
}

/// Whether the byte at `index` is preceded by an identifier, skipping `whitespace`.
pub fn follows_identifier(source: &str, index: usize, whitespace: &[char]) -> bool {
    let before = source[..index].trim_end_matches(|c: char| whitespace.contains(&c));
    let bytes = before.as_bytes();
    let end = bytes.len();
    let mut begin = end;
    while begin > 0 && (bytes[begin - 1].is_ascii_alphanumeric() || bytes[begin - 1] == b'_') {
        begin -= 1;
    }
    begin < end && (bytes[begin].is_ascii_alphabetic() || bytes[begin] == b'_')
}

fn skip_string(bytes: &[u8], open: usize) -> Option<usize> {
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i + 1),
            b'\n' => return None,
            _ => i += 1,
        }
    }
    None
}
