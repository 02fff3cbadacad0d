//! Record reading: newline-delimited lines or fixed-size binary blocks.

use std::io::{self, BufRead, Read};

/// How the input stream is cut into records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordMode {
    /// Newline-terminated records; the terminator is kept in the buffer
    /// so the preprocessor can decide whether to trim it.
    Line,
    /// Fixed-size records of `record_size` octets; a short final block is
    /// still a record.
    Binary { record_size: usize },
}

/// Pulls one record at a time from a buffered input stream.
///
/// Records are raw bytes — line mode does not assume UTF-8.
#[derive(Debug)]
pub struct RecordReader<R> {
    input: R,
    mode: RecordMode,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(input: R, mode: RecordMode) -> Self {
        Self { input, mode }
    }

    /// Read the next record into `buf`, replacing its contents.
    ///
    /// Returns the number of octets read; 0 means end of input. An error
    /// mid-stream is returned as-is — the caller decides whether to report
    /// what has been accumulated so far.
    pub fn next_record(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
        buf.clear();
        match self.mode {
            RecordMode::Line => self.input.read_until(b'\n', buf),
            RecordMode::Binary { record_size } => {
                let mut limited = self.input.by_ref().take(record_size as u64);
                limited.read_to_end(buf)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn drain(mut reader: RecordReader<Cursor<&[u8]>>) -> Vec<Vec<u8>> {
        let mut records = Vec::new();
        let mut buf = Vec::new();
        while reader.next_record(&mut buf).unwrap() > 0 {
            records.push(buf.clone());
        }
        records
    }

    #[test]
    fn line_mode_keeps_terminators() {
        let reader = RecordReader::new(Cursor::new(&b"ab\ncd\r\n"[..]), RecordMode::Line);
        let records = drain(reader);
        assert_eq!(records, vec![b"ab\n".to_vec(), b"cd\r\n".to_vec()]);
    }

    #[test]
    fn line_mode_final_line_without_newline() {
        let reader = RecordReader::new(Cursor::new(&b"ab\ncd"[..]), RecordMode::Line);
        let records = drain(reader);
        assert_eq!(records, vec![b"ab\n".to_vec(), b"cd".to_vec()]);
    }

    #[test]
    fn line_mode_is_byte_clean() {
        let reader = RecordReader::new(Cursor::new(&b"\xff\x00\n"[..]), RecordMode::Line);
        let records = drain(reader);
        assert_eq!(records, vec![b"\xff\x00\n".to_vec()]);
    }

    #[test]
    fn binary_mode_cuts_fixed_blocks() {
        let reader = RecordReader::new(
            Cursor::new(&b"abcdefgh"[..]),
            RecordMode::Binary { record_size: 3 },
        );
        let records = drain(reader);
        assert_eq!(
            records,
            vec![b"abc".to_vec(), b"def".to_vec(), b"gh".to_vec()],
            "short final block is still a record"
        );
    }

    #[test]
    fn empty_input_is_eof() {
        let mut reader = RecordReader::new(Cursor::new(&b""[..]), RecordMode::Line);
        let mut buf = Vec::new();
        assert_eq!(reader.next_record(&mut buf).unwrap(), 0);
    }
}
