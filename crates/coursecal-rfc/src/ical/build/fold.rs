//! Content line folding for iCalendar (RFC 5545 §3.1).

/// Maximum line length in octets (not including CRLF).
const MAX_LINE_OCTETS: usize = 75;

/// Folds a content line to comply with the 75-octet limit and terminates it
/// with CRLF.
///
/// Continuation lines start with a single space, which counts towards their
/// limit. Multi-byte UTF-8 sequences are never split.
#[must_use]
pub fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return format!("{line}\r\n");
    }

    let mut folded = String::with_capacity(line.len() + (line.len() / MAX_LINE_OCTETS + 1) * 3);
    let mut rest = line;
    let mut budget = MAX_LINE_OCTETS;

    while !rest.is_empty() {
        if rest.len() <= budget {
            folded.push_str(rest);
            folded.push_str("\r\n");
            break;
        }

        let mut end = budget;
        while end > 0 && !rest.is_char_boundary(end) {
            end -= 1;
        }
        if end == 0 {
            // A single character wider than the budget still has to go somewhere.
            end = rest
                .char_indices()
                .nth(1)
                .map_or(rest.len(), |(idx, _)| idx);
        }

        let (head, tail) = rest.split_at(end);
        folded.push_str(head);
        folded.push_str("\r\n ");
        rest = tail;
        budget = MAX_LINE_OCTETS - 1;
    }

    folded
}
