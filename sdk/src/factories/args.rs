//! `@`-separated hex payload encoding used by built-in functions and contract calls.

/// Minimal big-endian hex of an unsigned integer; zero encodes as `"00"`.
pub fn encode_unsigned(value: u128) -> String {
    if value == 0 {
        return "00".to_string();
    }
    let bytes = value.to_be_bytes();
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len().saturating_sub(1));
    hex::encode(&bytes[first..])
}

pub fn encode_str(value: &str) -> String {
    hex::encode(value.as_bytes())
}

/// Booleans travel as the hex of their literal names.
pub fn encode_bool(value: bool) -> String {
    encode_str(if value { "true" } else { "false" })
}

/// Join a function name (or other leading token) with its encoded arguments.
pub fn build_data<I, S>(head: &str, args: I) -> Vec<u8>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut data = head.to_string();
    for arg in args {
        data.push('@');
        data.push_str(arg.as_ref());
    }
    data.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_unsigned() {
        assert_eq!(encode_unsigned(0), "00");
        assert_eq!(encode_unsigned(1), "01");
        assert_eq!(encode_unsigned(255), "ff");
        assert_eq!(encode_unsigned(256), "0100");
        assert_eq!(encode_unsigned(1_000_000), "0f4240");
    }

    #[test]
    fn test_build_data() {
        assert_eq!(build_data("add", ["01", "02"]), b"add@01@02".to_vec());
        assert_eq!(build_data("claim", Vec::<String>::new()), b"claim".to_vec());
        assert_eq!(encode_bool(true), "74727565");
        assert_eq!(encode_str("ABC"), "414243");
    }
}
