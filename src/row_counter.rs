use crate::error::ReportError;
use std::io::BufRead;

/// Lines in one `read_until(b'\n')` chunk. `\n`, `\r\n` and a lone `\r` each end a line,
/// and trailing bytes with no terminator (only possible at end of stream) form a last line.
fn lines_in_chunk(chunk: &[u8]) -> u64 {
    let mut lines = 0;
    for (i, &b) in chunk.iter().enumerate() {
        match b {
            b'\n' => lines += 1,
            b'\r' if chunk.get(i + 1) != Some(&b'\n') => lines += 1,
            _ => {}
        }
    }
    if chunk.last().is_some_and(|&b| b != b'\n' && b != b'\r') {
        lines += 1;
    }
    lines
}

/// Counts data records in a log: every line except the header. `name` is only used in errors.
pub fn count_records<R: BufRead>(mut reader: R, name: &str) -> Result<u64, ReportError> {
    let mut lines: u64 = 0;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| ReportError::Transport(format!("reading {name}: {e}")))?;
        if read == 0 {
            break;
        }
        if std::str::from_utf8(&buf).is_err() {
            return Err(ReportError::Encoding(name.to_string()));
        }
        lines += lines_in_chunk(&buf);
    }

    lines
        .checked_sub(1)
        .ok_or_else(|| ReportError::RecordCountUnderflow(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::{Cursor, Read};

    #[test]
    fn test_header_only_is_zero() {
        assert_eq!(count_records(Cursor::new("a,b,c\n"), "h.csv").unwrap(), 0);
        assert_eq!(count_records(Cursor::new("a,b,c"), "h.csv").unwrap(), 0);
    }

    #[test]
    fn test_counts_lines_minus_header() {
        let mut text = String::from("id,value\n");
        for i in 0..10 {
            text.push_str(&format!("{i},x\n"));
        }
        assert_eq!(count_records(Cursor::new(text), "log.csv").unwrap(), 10);
    }

    #[test]
    fn test_last_line_without_newline_counts() {
        let text = "h\r\n1\r\n2";
        assert_eq!(count_records(Cursor::new(text), "log.csv").unwrap(), 2);
    }

    #[test]
    fn test_bare_carriage_returns_end_lines() {
        assert_eq!(count_records(Cursor::new("h\r1\r2\r"), "mac.csv").unwrap(), 2);
        assert_eq!(count_records(Cursor::new("h\r1\r2"), "mac.csv").unwrap(), 2);
    }

    #[test]
    fn test_mixed_line_endings() {
        let text = "h\r1\n2\r\n3";
        assert_eq!(count_records(Cursor::new(text), "mixed.csv").unwrap(), 3);
        assert_eq!(count_records(Cursor::new("\r"), "cr.csv").unwrap(), 0);
    }

    #[test]
    fn test_empty_stream_underflows() {
        let err = count_records(Cursor::new(""), "empty.csv").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RecordCountUnderflow);
        assert!(err.to_string().contains("empty.csv"));
    }

    #[test]
    fn test_invalid_utf8_is_an_error() {
        let bytes: Vec<u8> = b"header\nok\n\xff\xfe bad\n".to_vec();
        let err = count_records(Cursor::new(bytes), "bad.csv").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encoding);
    }

    #[test]
    fn test_multibyte_utf8_is_accepted() {
        let text = "nom,ville\nJosé,Zürich\n李,北京\n";
        assert_eq!(count_records(Cursor::new(text), "utf8.csv").unwrap(), 2);
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"))
        }
    }

    #[test]
    fn test_read_failure_is_transport() {
        let reader = std::io::BufReader::new(FailingReader);
        let err = count_records(reader, "gone.csv").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
