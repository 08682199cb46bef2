//! The fixture byte pattern: the byte at offset `i` is `i mod 256`.

/// Length of one full cycle of the pattern.
pub const PATTERN_PERIOD: u64 = 256;

#[inline]
pub fn pattern_byte(offset: u64) -> u8 {
    (offset % PATTERN_PERIOD) as u8
}

/// Fills `buf` with the pattern as it appears starting at `start_offset`.
pub fn fill_pattern(buf: &mut [u8], start_offset: u64) {
    for (i, byte) in buf.iter_mut().enumerate() {
        *byte = pattern_byte(start_offset + i as u64);
    }
}

/// First byte of `chunk` that deviates from the pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    pub offset: u64,
    pub expected: u8,
    pub found: u8,
}

/// Checks `chunk`, which was read from `start_offset`, against the pattern.
pub fn first_mismatch(start_offset: u64, chunk: &[u8]) -> Option<Mismatch> {
    chunk
        .iter()
        .enumerate()
        .find_map(|(i, &found)| {
            let offset = start_offset + i as u64;
            let expected = pattern_byte(offset);
            (found != expected).then_some(Mismatch {
                offset,
                expected,
                found,
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_wraps_every_period() {
        assert_eq!(pattern_byte(0), 0);
        assert_eq!(pattern_byte(255), 255);
        assert_eq!(pattern_byte(256), 0);
        assert_eq!(pattern_byte(1_394_606_079), 255);
    }

    #[test]
    fn fill_respects_start_offset() {
        let mut buf = [0u8; 4];
        fill_pattern(&mut buf, 254);
        assert_eq!(buf, [254, 255, 0, 1]);
    }

    #[test]
    fn mismatch_reports_absolute_offset() {
        let mut buf = vec![0u8; 300];
        fill_pattern(&mut buf, 512);
        assert_eq!(first_mismatch(512, &buf), None);

        buf[260] = 7;
        assert_eq!(
            first_mismatch(512, &buf),
            Some(Mismatch {
                offset: 772,
                expected: 4,
                found: 7
            })
        );
    }
}
