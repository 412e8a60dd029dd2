//! Tokenizer for comma separated modem replies, e.g. `+CSQ: 15,99` or
//! `+UMNOPROF: 100`.
//!
//! All functions take the raw line as bytes. A NUL byte is treated as the end
//! of the line, so fixed buffers carrying a terminator can be passed as-is.
//! Columns are 1-indexed, and commas inside a double-quoted span do not
//! start a new column.

use heapless::Vec;

/// Cut `buf` at its first NUL byte, if any.
pub(crate) fn until_nul(buf: &[u8]) -> &[u8] {
    match buf.iter().position(|&b| b == 0) {
        Some(end) => &buf[..end],
        None => buf,
    }
}

/// Check whether `line` starts with `prefix`, ignoring any leading bytes
/// with value <= 32 (spaces and control characters).
///
/// A line without a single visible byte never matches, not even an empty
/// prefix. Any other line matches the empty prefix.
pub fn starts_with(prefix: &[u8], line: &[u8]) -> bool {
    let line = until_nul(line);
    let prefix = until_nul(prefix);

    match line.iter().position(|&b| b > b' ') {
        Some(start) => line[start..].starts_with(prefix),
        None => false,
    }
}

/// Extract the integer in `column`.
///
/// Only ASCII digits of the column are accumulated, anything else is
/// skipped, as is everything between double quotes. A `-` seen before the
/// first digit of the column negates the value. Returns 0 when the column
/// does not exist or holds no digits.
///
/// The accumulation wraps on `i32` overflow instead of failing.
pub fn extract_int(column: usize, line: &[u8]) -> i32 {
    let mut value: i32 = 0;
    let mut current = 1;
    let mut quoted = false;
    let mut negate = false;
    let mut seen_digit = false;

    for &b in until_nul(line) {
        match b {
            b',' if !quoted => {
                current += 1;
                if current > column {
                    break;
                }
                negate = false;
                seen_digit = false;
            }
            b'"' => quoted = !quoted,
            _ if quoted || current != column => {}
            b'-' if !seen_digit => negate = true,
            b'0'..=b'9' => {
                let digit = i32::from(b - b'0');
                value = value.wrapping_mul(10);
                value = if negate {
                    value.wrapping_sub(digit)
                } else {
                    value.wrapping_add(digit)
                };
                seen_digit = true;
            }
            _ => {}
        }
    }

    value
}

/// Borrow the content between the double quotes of `column`.
///
/// Returns `None` when the column holds no quoted span. An opening quote
/// without its closing quote yields everything up to the end of the line.
pub fn quoted_field(column: usize, line: &[u8]) -> Option<&[u8]> {
    let line = until_nul(line);
    let mut current = 1;
    let mut quoted = false;
    let mut start = None;

    for (i, &b) in line.iter().enumerate() {
        match b {
            b',' if !quoted => {
                current += 1;
                if current > column {
                    break;
                }
            }
            b'"' => {
                quoted = !quoted;
                if quoted {
                    if current == column {
                        start = Some(i + 1);
                    }
                } else if let Some(start) = start {
                    return Some(&line[start..i]);
                }
            }
            _ => {}
        }
    }

    start.map(|start| &line[start..])
}

/// Copy the quoted content of `column` into a buffer of capacity `N`.
///
/// Content longer than `N` is truncated, and still reported as found.
pub fn extract_substring<const N: usize>(column: usize, line: &[u8]) -> Option<Vec<u8, N>> {
    quoted_field(column, line).map(|field| {
        let mut out = Vec::new();
        // Capacity is checked right above, so this cannot fail.
        let _ = out.extend_from_slice(&field[..field.len().min(N)]);
        out
    })
}

/// Strip a `+CMD:` style information prefix, returning the parameter list.
///
/// Lines without a `:` are returned unchanged.
pub fn parameters(line: &[u8]) -> &[u8] {
    let line = until_nul(line);
    match line.iter().position(|&b| b == b':') {
        Some(colon) if line.first() == Some(&b'+') => &line[colon + 1..],
        _ => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_skips_leading_whitespace() {
        assert!(starts_with(b"OK", b"OK"));
        assert!(starts_with(b"OK", b"\r\n  OK"));
        assert!(starts_with(b"OK", b"OKAY"));
        assert!(!starts_with(b"OK", b"O"));
        assert!(!starts_with(b"OK", b"NO CARRIER"));
        assert!(!starts_with(b"OK", b" xOK"));
    }

    #[test]
    fn empty_prefix_needs_visible_byte() {
        assert!(starts_with(b"", b"+CSQ: 1,2"));
        assert!(!starts_with(b"", b""));
        assert!(!starts_with(b"", b" \r\n"));
        assert!(!starts_with(b"OK", b"\0OK"));
    }

    #[test]
    fn prefix_stops_at_nul() {
        let mut buf = [0u8; 16];
        buf[..6].copy_from_slice(b"+CSQ: ");
        assert!(starts_with(b"+CSQ\0garbage", &buf));
        assert!(!starts_with(b"+CSQ: 1", &buf));
    }

    #[test]
    fn int_by_column() {
        assert_eq!(extract_int(2, b"1,42,3"), 42);
        assert_eq!(extract_int(1, b"1,42,3"), 1);
        assert_eq!(extract_int(3, b"1,42,3"), 3);
        assert_eq!(extract_int(2, b"1,-7,3"), -7);
        assert_eq!(extract_int(1, b"+CSQ: 15,99"), 15);
        assert_eq!(extract_int(2, b"+CSQ: 15,99"), 99);
    }

    #[test]
    fn int_missing_column_is_zero() {
        assert_eq!(extract_int(4, b"1,42,3"), 0);
        assert_eq!(extract_int(0, b"1,42,3"), 0);
        assert_eq!(extract_int(2, b"1,,3"), 0);
        assert_eq!(extract_int(1, b""), 0);
    }

    #[test]
    fn int_ignores_quoted_commas_and_digits() {
        assert_eq!(extract_int(2, b"\"a,1\",5"), 5);
        assert_eq!(extract_int(1, b"\"12\"7"), 7);
        assert_eq!(extract_int(3, b"0,\"x,y,z\",9"), 9);
    }

    #[test]
    fn int_minus_only_before_digits() {
        assert_eq!(extract_int(1, b"5-3"), 53);
        assert_eq!(extract_int(1, b" - 12"), -12);
        assert_eq!(extract_int(2, b"-1,2"), 2);
    }

    #[test]
    fn int_wraps_on_overflow() {
        assert_eq!(
            extract_int(1, b"4294967297"),
            4_294_967_297_i64 as i32
        );
    }

    #[test]
    fn substring_by_column() {
        let line = b"\"a\",\"b,c\",\"d\"";
        let field: Vec<u8, 16> = extract_substring(2, line).unwrap();
        assert_eq!(&field[..], b"b,c");
        assert_eq!(quoted_field(1, line), Some(&b"a"[..]));
        assert_eq!(quoted_field(3, line), Some(&b"d"[..]));
    }

    #[test]
    fn substring_missing() {
        assert_eq!(extract_substring::<16>(5, b"1,2,3"), None);
        assert_eq!(quoted_field(2, b"1,2,3"), None);
        assert_eq!(quoted_field(1, b"1,\"x\""), None);
    }

    #[test]
    fn substring_empty_and_unterminated() {
        assert_eq!(quoted_field(1, b"\"\",1"), Some(&b""[..]));
        assert_eq!(quoted_field(2, b"1,\"open"), Some(&b"open"[..]));
    }

    #[test]
    fn substring_truncates_to_capacity() {
        let field: Vec<u8, 4> = extract_substring(1, b"\"abcdefgh\"").unwrap();
        assert_eq!(&field[..], b"abcd");
    }

    #[test]
    fn parameters_strip_information_prefix() {
        assert_eq!(parameters(b"+CSQ: 15,99"), b" 15,99");
        assert_eq!(parameters(b"15,99"), b"15,99");
        assert_eq!(parameters(b"ATI: x"), b"ATI: x");
    }
}
