use super::*;

/// Reader handing out at most `step` bytes per call, failing on demand.
struct Trickle {
    data: Vec<u8>,
    pos: usize,
    step: usize,
    interrupt_once: bool,
    fail_at: Option<usize>,
}

impl Trickle {
    fn new(data: &[u8], step: usize) -> Self {
        Self {
            data: data.to_vec(),
            pos: 0,
            step,
            interrupt_once: false,
            fail_at: None,
        }
    }
}

impl Read for Trickle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.interrupt_once {
            self.interrupt_once = false;
            return Err(io::ErrorKind::Interrupted.into());
        }
        if self.fail_at.is_some_and(|at| self.pos >= at) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        }
        let n = self.step.min(buf.len()).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

#[test]
fn ensure_reads_until_window_is_full() {
    let mut raw = RawInput::new(Box::new(Trickle::new(b"abcdef", 1)));
    raw.ensure(4).unwrap();
    assert_eq!(raw.available(), b"abcd");
    raw.consume(3);
    raw.ensure(10).unwrap();
    assert_eq!(raw.available(), b"def");
    assert!(raw.is_eof());
    raw.consume(3);
    assert!(raw.at_end());
}

#[test]
fn read_more_adds_a_byte() {
    let mut raw = RawInput::new(Box::new(Trickle::new(b"xy", 1)));
    raw.read_more().unwrap();
    assert_eq!(raw.available(), b"x");
    raw.read_more().unwrap();
    assert_eq!(raw.available(), b"xy");
    raw.read_more().unwrap();
    assert!(raw.is_eof());
}

#[test]
fn bom_is_skipped_even_when_split() {
    let mut raw = RawInput::new(Box::new(Trickle::new(b"\xEF\xBB\xBFid", 1)));
    raw.ensure(4).unwrap();
    assert_eq!(raw.available(), b"id");
    let mut short = RawInput::new(Box::new(Trickle::new(b"\xEF\xBB", 8)));
    short.ensure(4).unwrap();
    assert_eq!(short.available(), b"\xEF\xBB");
}

#[test]
fn interrupted_reads_are_retried() {
    let mut src = Trickle::new(b"ok", 8);
    src.interrupt_once = true;
    let mut raw = RawInput::new(Box::new(src));
    raw.ensure(2).unwrap();
    assert_eq!(raw.available(), b"ok");
}

#[test]
fn read_errors_propagate_and_keep_buffer() {
    let mut src = Trickle::new(b"abcdef", 2);
    src.fail_at = Some(2);
    let mut raw = RawInput::new(Box::new(src));
    let err = raw.ensure(4).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    assert_eq!(raw.available(), b"ab");
}

#[test]
fn in_memory_input_is_at_eof() {
    let raw = RawInput::from_bytes(b"text".to_vec());
    assert!(raw.is_eof());
    assert_eq!(raw.available(), b"text");
}
