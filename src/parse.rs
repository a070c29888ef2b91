//! Cell-text normalization.
//!
//! All matchers follow a leftmost-match policy: when a cell holds several
//! numbers, the first one wins. Only the ASCII `$ , . % + -` family is
//! understood.

/// Collapse whitespace runs to single spaces and trim.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Leftmost `[-+]?\d+(\.\d+)?%`, returned exactly as written, or `""`.
pub fn parse_percent(text: &str) -> String {
    let bytes = text.as_bytes();
    for start in 0..bytes.len() {
        if let Some(end) = match_number(bytes, start) {
            if bytes.get(end) == Some(&b'%') {
                return text[start..=end].to_string();
            }
        }
    }
    String::new()
}

/// Leftmost `$`-prefixed amount with whitespace removed. Text without one is
/// returned trimmed but otherwise untouched.
pub fn parse_price(text: &str) -> String {
    let bytes = text.as_bytes();
    for (start, _) in text.match_indices('$') {
        let mut pos = start + 1;
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if !bytes.get(pos).is_some_and(u8::is_ascii_digit) {
            continue;
        }

        let mut amount = String::from("$");
        while let Some(&b) = bytes.get(pos) {
            if b.is_ascii_digit() || b == b',' {
                amount.push(b as char);
                pos += 1;
            } else if b.is_ascii_whitespace() && next_is_digit_after_space(bytes, pos) {
                pos += 1;
            } else {
                break;
            }
        }
        if bytes.get(pos) == Some(&b'.') && bytes.get(pos + 1).is_some_and(u8::is_ascii_digit) {
            amount.push('.');
            pos += 1;
            while let Some(&b) = bytes.get(pos) {
                if !b.is_ascii_digit() {
                    break;
                }
                amount.push(b as char);
                pos += 1;
            }
        }
        return amount;
    }
    text.trim().to_string()
}

/// Leftmost signed decimal as a float. Only for ordering, never for display.
pub fn parse_numeric(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    (0..bytes.len()).find_map(|start| {
        match_number(bytes, start).and_then(|end| text[start..end].parse::<f64>().ok())
    })
}

/// Matches `[-+]?\d+(\.\d+)?` anchored at `start`; returns the end offset.
fn match_number(bytes: &[u8], start: usize) -> Option<usize> {
    let mut pos = start;
    if matches!(bytes.get(pos), Some(b'-' | b'+')) {
        pos += 1;
    }
    let digits = pos;
    while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
        pos += 1;
    }
    if pos == digits {
        return None;
    }
    if bytes.get(pos) == Some(&b'.') && bytes.get(pos + 1).is_some_and(u8::is_ascii_digit) {
        pos += 1;
        while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
            pos += 1;
        }
    }
    Some(pos)
}

// "$ 1 234" style spacing inside an amount
fn next_is_digit_after_space(bytes: &[u8], mut pos: usize) -> bool {
    while bytes.get(pos).is_some_and(u8::is_ascii_whitespace) {
        pos += 1;
    }
    bytes.get(pos).is_some_and(u8::is_ascii_digit)
}
