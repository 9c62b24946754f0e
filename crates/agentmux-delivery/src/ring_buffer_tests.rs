use super::RingBuffer;
use regex::Regex;

#[test]
fn push_accumulates_until_capacity_then_drops_oldest() {
    let mut buf = RingBuffer::new(4);
    buf.push(b"ab");
    buf.push(b"cd");
    assert_eq!(buf.contents(), "abcd");
    buf.push(b"ef");
    assert_eq!(buf.contents(), "cdef");
}

#[test]
fn offset_is_monotonic_and_survives_eviction() {
    let mut buf = RingBuffer::new(4);
    buf.push(b"ab");
    let offset_a = buf.offset();
    buf.push(b"cdefgh");
    let offset_b = buf.offset();
    assert!(offset_b > offset_a);
    // "ab" has been evicted; since(offset_a) degrades to remaining content.
    assert_eq!(buf.since(offset_a), "efgh");
}

#[test]
fn since_returns_only_bytes_at_or_after_offset() {
    let mut buf = RingBuffer::new(64);
    buf.push(b"hello ");
    let offset = buf.offset();
    buf.push(b"world");
    assert_eq!(buf.since(offset), "world");
    assert_eq!(buf.since(0), "hello world");
}

#[test]
fn is_match_checks_full_contents() {
    let mut buf = RingBuffer::new(64);
    buf.push(b"thinking...");
    let re = Regex::new("(?i)thinking").unwrap();
    assert!(buf.is_match(&re));
}
