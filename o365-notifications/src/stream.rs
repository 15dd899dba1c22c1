//! Incremental decoding of streamed JSON notification arrays.
//!
//! The notification endpoint answers with one long JSON array that stays
//! open while the server appends objects to it. Waiting for the closing
//! bracket would mean waiting for the connection to die, so this module
//! reconstructs each element as soon as its final byte arrives: bytes are
//! scanned one at a time, brace depth decides where an object ends, and a
//! completed object is parsed and emitted before the next byte is looked
//! at.
//!
//! Brace counting is blind to string literals; the notification payloads
//! never put `{` or `}` inside string values.

use std::io::{ErrorKind, Read};

use serde_json::Value;

use crate::error::StreamError;

/// Default read buffer size for [`ObjectStream`].
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// What the scanner decided after consuming one byte.
#[derive(Debug, PartialEq, Eq)]
pub enum ScanStep {
    /// Byte consumed, no complete object yet
    Pending,
    /// The byte completed an object; its raw bytes
    Object(Vec<u8>),
    /// The array (or the useful part of this read pass) ended
    End,
}

/// Byte-at-a-time scanner for one streamed JSON array.
///
/// State machine:
/// - bytes before the opening `[` are transport artifacts and are skipped;
/// - between elements, `{` opens an object while commas and whitespace
///   separate elements; `]` or any unexpected byte ends the pass;
/// - inside an object every byte is buffered, `{`/`}` adjust the depth, and
///   the `}` that returns to depth zero completes the object.
///
/// Feeding the same bytes one at a time or in bulk produces identical
/// output; chunk boundaries carry no meaning.
#[derive(Debug, Default)]
pub struct ObjectScanner {
    in_array: bool,
    depth: usize,
    buf: Vec<u8>,
}

impl ObjectScanner {
    /// Create a scanner in its initial state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one byte and report what it completed.
    pub fn push(&mut self, byte: u8) -> ScanStep {
        if !self.in_array {
            if byte == b'[' {
                self.in_array = true;
            }
            return ScanStep::Pending;
        }

        if self.depth == 0 {
            return match byte {
                b'{' => {
                    self.depth = 1;
                    self.buf.clear();
                    self.buf.push(byte);
                    ScanStep::Pending
                }
                b',' | b' ' | b'\t' | b'\r' | b'\n' => ScanStep::Pending,
                b']' => ScanStep::End,
                // Unexpected byte between elements; treat the pass as done
                _ => ScanStep::End,
            };
        }

        self.buf.push(byte);
        match byte {
            b'{' => self.depth += 1,
            b'}' => {
                self.depth -= 1;
                if self.depth == 0 {
                    return ScanStep::Object(std::mem::take(&mut self.buf));
                }
            }
            _ => {}
        }
        ScanStep::Pending
    }
}

/// Iterator over the objects of a streamed JSON array.
///
/// Reads the response body in chunks, scans byte by byte, and yields each
/// completed element as a parsed [`Value`]. An element that is not valid
/// JSON yields one `Err` and the stream continues with the next element;
/// read faults end the stream after yielding their error.
pub struct ObjectStream<R: Read> {
    reader: R,
    scanner: ObjectScanner,
    chunk: Vec<u8>,
    filled: usize,
    pos: usize,
    finished: bool,
}

impl<R: Read> ObjectStream<R> {
    /// Wrap a response body, reading [`DEFAULT_CHUNK_SIZE`] bytes at a time.
    pub fn new(reader: R) -> Self {
        Self::with_chunk_size(reader, DEFAULT_CHUNK_SIZE)
    }

    /// Wrap a response body with an explicit read buffer size.
    pub fn with_chunk_size(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            scanner: ObjectScanner::new(),
            chunk: vec![0; chunk_size.max(1)],
            filled: 0,
            pos: 0,
            finished: false,
        }
    }
}

impl<R: Read> Iterator for ObjectStream<R> {
    type Item = Result<Value, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            while self.pos < self.filled {
                let byte = self.chunk[self.pos];
                self.pos += 1;
                match self.scanner.push(byte) {
                    ScanStep::Pending => {}
                    ScanStep::Object(bytes) => {
                        return Some(serde_json::from_slice(&bytes).map_err(StreamError::Json));
                    }
                    ScanStep::End => {
                        self.finished = true;
                        return None;
                    }
                }
            }

            match self.reader.read(&mut self.chunk) {
                // End of body; a partially buffered object never completed
                Ok(0) => {
                    self.finished = true;
                    return None;
                }
                Ok(filled) => {
                    self.filled = filled;
                    self.pos = 0;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(read_error(e)));
                }
            }
        }
    }
}

/// Map a body read failure to its stream error.
///
/// An abruptly closed connection surfaces as `Interrupted`, which the
/// channel treats like an ordinary end of the read pass.
fn read_error(e: std::io::Error) -> StreamError {
    match e.kind() {
        ErrorKind::UnexpectedEof
        | ErrorKind::ConnectionReset
        | ErrorKind::ConnectionAborted
        | ErrorKind::BrokenPipe => StreamError::Interrupted(e.to_string()),
        _ => StreamError::Io(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;
    use std::io::{self, Cursor};

    /// Reader that serves its bytes, then fails with the given error kind.
    struct FailingReader {
        data: Cursor<Vec<u8>>,
        kind: Option<ErrorKind>,
    }

    impl FailingReader {
        fn new(data: &str, kind: ErrorKind) -> Self {
            Self {
                data: Cursor::new(data.as_bytes().to_vec()),
                kind: Some(kind),
            }
        }
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let filled = self.data.read(buf)?;
            if filled == 0 {
                if let Some(kind) = self.kind.take() {
                    return Err(io::Error::new(kind, "connection lost"));
                }
            }
            Ok(filled)
        }
    }

    fn decode_all(body: &str, chunk_size: usize) -> Vec<Value> {
        ObjectStream::with_chunk_size(Cursor::new(body.to_string()), chunk_size)
            .map(|item| item.expect("stream item"))
            .collect()
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    #[case(7)]
    #[case(64)]
    fn test_chunk_boundaries_do_not_matter(#[case] chunk_size: usize) {
        let body = r#"[{"a":1},{"b":{"c":2}},]"#;
        let values = decode_all(body, chunk_size);
        assert_eq!(values, vec![json!({"a": 1}), json!({"b": {"c": 2}})]);
    }

    #[test]
    fn test_object_emitted_without_closing_bracket() {
        // The array never closes; the element is still emitted at its `}`
        let values = decode_all(r#"[{"a":1}"#, DEFAULT_CHUNK_SIZE);
        assert_eq!(values, vec![json!({"a": 1})]);
    }

    #[test]
    fn test_scanner_emits_at_final_brace() {
        let mut scanner = ObjectScanner::new();
        let body = br#"[{"a":1}"#;

        for &byte in &body[..body.len() - 1] {
            assert_eq!(scanner.push(byte), ScanStep::Pending);
        }
        match scanner.push(b'}') {
            ScanStep::Object(bytes) => assert_eq!(bytes, br#"{"a":1}"#.to_vec()),
            other => panic!("Expected Object, got {:?}", other),
        }
    }

    #[test]
    fn test_bytes_before_array_are_skipped() {
        let values = decode_all("\r\n \t[{\"a\":1}]", DEFAULT_CHUNK_SIZE);
        assert_eq!(values, vec![json!({"a": 1})]);
    }

    #[test]
    fn test_bytes_after_closing_bracket_are_ignored() {
        let values = decode_all(r#"[{"a":1}]{"b":2}"#, DEFAULT_CHUNK_SIZE);
        assert_eq!(values, vec![json!({"a": 1})]);
    }

    #[test]
    fn test_whitespace_between_elements() {
        let values = decode_all("[ {\"a\":1} ,\r\n {\"b\":2} ]", DEFAULT_CHUNK_SIZE);
        assert_eq!(values, vec![json!({"a": 1}), json!({"b": 2})]);
    }

    #[test]
    fn test_invalid_element_does_not_stop_the_stream() {
        let stream = ObjectStream::new(Cursor::new(r#"[{"a":},{"b":2}]"#.to_string()));
        let items: Vec<_> = stream.collect();

        assert_eq!(items.len(), 2);
        match &items[0] {
            Err(StreamError::Json(_)) => {}
            other => panic!("Expected Json error, got {:?}", other),
        }
        assert_eq!(items[1].as_ref().unwrap(), &json!({"b": 2}));
    }

    #[test]
    fn test_empty_body_yields_nothing() {
        assert!(decode_all("", DEFAULT_CHUNK_SIZE).is_empty());
        assert!(decode_all("[]", DEFAULT_CHUNK_SIZE).is_empty());
    }

    #[test]
    fn test_partial_object_at_end_of_body_is_dropped() {
        let values = decode_all(r#"[{"a":1},{"b":"#, DEFAULT_CHUNK_SIZE);
        assert_eq!(values, vec![json!({"a": 1})]);
    }

    #[rstest]
    #[case(ErrorKind::UnexpectedEof)]
    #[case(ErrorKind::ConnectionReset)]
    #[case(ErrorKind::ConnectionAborted)]
    #[case(ErrorKind::BrokenPipe)]
    fn test_abrupt_close_surfaces_as_interrupted(#[case] kind: ErrorKind) {
        let reader = FailingReader::new(r#"[{"a":1},{"b":"#, kind);
        let mut stream = ObjectStream::new(reader);

        assert_eq!(stream.next().unwrap().unwrap(), json!({"a": 1}));
        match stream.next() {
            Some(Err(StreamError::Interrupted(_))) => {}
            other => panic!("Expected Interrupted, got {:?}", other),
        }
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_other_read_faults_are_io_errors() {
        let reader = FailingReader::new(r#"[{"a":1},"#, ErrorKind::PermissionDenied);
        let mut stream = ObjectStream::new(reader);

        assert_eq!(stream.next().unwrap().unwrap(), json!({"a": 1}));
        match stream.next() {
            Some(Err(StreamError::Io(_))) => {}
            other => panic!("Expected Io, got {:?}", other),
        }
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_stray_byte_between_elements_ends_the_pass() {
        let values = decode_all(r#"[{"a":1}x{"b":2}]"#, DEFAULT_CHUNK_SIZE);
        assert_eq!(values, vec![json!({"a": 1})]);
    }

    #[test]
    fn test_nested_objects_are_one_element() {
        let body = r#"[{"outer":{"mid":{"inner":1}},"next":2}]"#;
        let values = decode_all(body, 1);
        assert_eq!(values, vec![json!({"outer": {"mid": {"inner": 1}}, "next": 2})]);
    }
}
