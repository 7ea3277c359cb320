/// Offset of the phred scores stored in fastq quality strings.
pub const PHRED_OFFSET: u8 = 33;

/// Mean read quality as the phred value of the mean error probability.
///
/// Averaging phred scores directly overestimates the quality of a read, so
/// every score is converted to an error probability first:
/// `-10 * log10(mean(10^(-q/10)))`. Returns `None` for an empty read.
pub fn ave_qual(quals: &[u8]) -> Option<f64> {
    mean_phred(quals.iter().copied())
}

/// Same as [`ave_qual`] for an ASCII phred+33 quality string.
pub fn ave_qual_ascii(qual: &[u8]) -> Option<f64> {
    mean_phred(qual.iter().map(|&c| c.saturating_sub(PHRED_OFFSET)))
}

fn mean_phred(quals: impl ExactSizeIterator<Item = u8>) -> Option<f64> {
    let n = quals.len();
    if n == 0 {
        return None;
    }
    let error_sum: f64 = quals.map(error_probability).sum();
    Some(-10.0 * (error_sum / n as f64).log10())
}

fn error_probability(q: u8) -> f64 {
    10f64.powf(f64::from(q) / -10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_ave_qual_uniform() {
        assert!(close(ave_qual(&[20, 20, 20]).unwrap(), 20.0));
        assert!(close(ave_qual(&[7]).unwrap(), 7.0));
    }

    #[test]
    fn test_ave_qual_is_dominated_by_errors() {
        // 10 and 30 average to 15 in probability space, not to 20
        let q = ave_qual(&[10, 30]).unwrap();
        let expected = -10.0 * ((0.1 + 0.001) / 2.0f64).log10();
        assert!(close(q, expected));
        assert!(q < 20.0);
    }

    #[test]
    fn test_ave_qual_empty() {
        assert_eq!(ave_qual(&[]), None);
        assert_eq!(ave_qual_ascii(b""), None);
    }

    #[test]
    fn test_ave_qual_ascii() {
        // '5' is phred 20 in phred+33
        assert!(close(ave_qual_ascii(b"5555").unwrap(), 20.0));
        assert!(close(
            ave_qual_ascii(b"+?").unwrap(),
            ave_qual(&[10, 30]).unwrap()
        ));
        // bytes below the offset clamp to phred 0
        assert!(close(ave_qual_ascii(b" !").unwrap(), 0.0));
    }
}
