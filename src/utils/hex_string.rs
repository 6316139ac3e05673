use log::trace;

/// Reads bytes written as hex digits, e.g. `"4D 5A 90 00"`.
///
/// Whitespace anywhere is ignored, the rest is read two characters at a time. A pair that is
/// not two hex digits is dropped on its own without affecting its neighbours, and so is a
/// trailing lone digit.
pub fn parse_hex_string(text: &str) -> Vec<u8> {
    let digits: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
    let mut bytes = Vec::with_capacity(digits.len() / 2);

    for pair in digits.chunks(2) {
        match pair {
            [hi, lo] => match (hi.to_digit(16), lo.to_digit(16)) {
                // both digits are < 16
                (Some(hi), Some(lo)) => bytes.push(((hi << 4) | lo) as u8),
                _ => trace!("dropping malformed hex pair `{}{}`", hi, lo),
            },
            [odd] => trace!("dropping trailing hex digit `{}`", odd),
            _ => {}
        }
    }

    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_whitespace_is_ignored() {
        assert_eq!(parse_hex_string("4d 5A\n90\t00"), vec![0x4D, 0x5A, 0x90, 0x00]);
    }

    #[test]
    fn test_malformed_pairs_are_dropped_individually() {
        assert_eq!(parse_hex_string("01 zz 02 g3 03"), vec![0x01, 0x02, 0x03]);
    }

    #[test]
    fn test_trailing_odd_digit_is_dropped() {
        assert_eq!(parse_hex_string("0102f"), vec![0x01, 0x02]);
        assert_eq!(parse_hex_string(""), Vec::<u8>::new());
    }
}
