use proptest::prelude::*;
use daqsweep::sweep::{classify, size_in_megabytes};
use daqsweep::types::Disposition;

proptest! {
    // Whole-megabyte thresholds: a file is archived exactly when it has at
    // least one byte more than the threshold.
    #[test]
    fn archive_iff_strictly_above_threshold(
        threshold in 0u64..100_000,
        offset in -1_000_000i64..=1_000_000,
    ) {
        let boundary = threshold * 1_000_000;
        let bytes = (boundary as i64 + offset).max(0) as u64;
        let expected = if bytes > boundary {
            Disposition::Archive
        } else {
            Disposition::Delete
        };
        prop_assert_eq!(classify(bytes, threshold as f64), expected);
    }

    #[test]
    fn classification_is_monotonic_in_size(
        a in 0u64..(1 << 40),
        b in 0u64..(1 << 40),
        threshold in 0.0f64..1_000_000.0,
    ) {
        let (small, large) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(size_in_megabytes(small) <= size_in_megabytes(large));
        if classify(small, threshold) == Disposition::Archive {
            prop_assert_eq!(classify(large, threshold), Disposition::Archive);
        }
    }
}
