pub const COMMENT_CHAR: char = ';';
pub const BLANKS: &str = " \t\r\n";

/// Split `s` on any of `delims`, dropping empty pieces.
pub fn split<'a>(s: &'a str, delims: &str) -> Vec<&'a str> {
    s.split(|c: char| delims.contains(c))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Strip every leading and trailing char found in `charset`.
pub fn trim<'a>(s: &'a str, charset: &str) -> &'a str {
    s.trim_matches(|c: char| charset.contains(c))
}

/// Strip the comment and surrounding blanks from a raw source line.
///
/// A `;` inside a string literal does not start a comment.
pub fn clean(raw: &str) -> &str {
    let mut in_string = false;
    let mut end = raw.len();
    for (idx, c) in raw.char_indices() {
        match c {
            '"' => in_string = !in_string,
            COMMENT_CHAR if !in_string => {
                end = idx;
                break;
            }
            _ => {}
        }
    }
    trim(&raw[..end], BLANKS)
}

/// Split off the first blank-delimited word: `("mov", "r1, r2")`.
pub fn head(s: &str) -> (&str, &str) {
    let s = trim(s, BLANKS);
    match s.find(|c: char| BLANKS.contains(c)) {
        Some(idx) => (&s[..idx], trim(&s[idx..], BLANKS)),
        None => (s, ""),
    }
}
