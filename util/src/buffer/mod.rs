
use bytes::BufMut;

/// Number of bytes needed to pad `len` up to the next multiple of 4.
pub fn get_padding_size(len: usize) -> usize {
    if len % 4 == 0 {
        0
    } else {
        4 - (len % 4)
    }
}

/// Rounds `len` up to the next multiple of 4.
pub fn align_to_4(len: usize) -> usize {
    len + get_padding_size(len)
}

/// Writes `len` zero bytes, except the last which carries the padding count (RFC 3550 5.1).
pub fn put_padding(mut buf: &mut [u8], len: usize) {
    if len == 0 {
        return;
    }
    for i in 0..len {
        if i == len - 1 {
            buf.put_u8(len as u8);
        } else {
            buf.put_u8(0);
        }
    }
}

/// Compares two byte regions, tracing the first differing offset.
pub fn are_buffers_equal(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        log::debug!(
            "are_buffers_equal: length mismatch {} != {}",
            a.len(),
            b.len()
        );
        return false;
    }

    match a.iter().zip(b.iter()).position(|(x, y)| x != y) {
        Some(i) => {
            log::debug!(
                "are_buffers_equal: mismatch at byte {}: {:#04x} != {:#04x}",
                i,
                a[i],
                b[i]
            );
            false
        }
        None => true,
    }
}

/// Decodes UTF-8, replacing invalid sequences.
pub fn bytes_to_string(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

pub fn string_to_bytes(s: &str) -> Vec<u8> {
    s.as_bytes().to_vec()
}
