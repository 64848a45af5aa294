//! The packed long array codec used by chunk block and biome storage.
//!
//! Entries of `bits_per_entry` bits are packed little-end-first into 64 bit
//! words. Two layouts exist: the dense layout lets entries straddle word
//! boundaries; the padded layout fits `64 / bits_per_entry` whole entries
//! per word and leaves the remaining high bits unused.

use lodestone_common::error::{LodestoneError, Result};

fn check_bits(bits_per_entry: u8) -> Result<usize> {
    if !(1..=64).contains(&bits_per_entry) {
        return Err(LodestoneError::InvalidArgument(format!(
            "bits_per_entry must be between 1 and 64, got {}",
            bits_per_entry
        )));
    }
    Ok(bits_per_entry as usize)
}

fn entry_mask(bits: usize) -> u64 {
    if bits == 64 {
        u64::MAX
    } else {
        (1 << bits) - 1
    }
}

/// The number of words holding `size` entries in the given layout.
pub fn encoded_word_count(size: usize, bits_per_entry: u8, dense: bool) -> Result<usize> {
    let bits = check_bits(bits_per_entry)?;
    Ok(if dense {
        (size * bits + 63) / 64
    } else {
        let entries_per_word = 64 / bits;
        (size + entries_per_word - 1) / entries_per_word
    })
}

/// Unpack `size` entries from a packed long array.
///
/// Fails if `data` is not exactly the length the layout requires.
pub fn decode_long_array(
    data: &[i64],
    size: usize,
    bits_per_entry: u8,
    dense: bool,
) -> Result<Vec<u64>> {
    let bits = check_bits(bits_per_entry)?;
    let expected = encoded_word_count(size, bits_per_entry, dense)?;
    if data.len() != expected {
        return Err(LodestoneError::InvalidArgument(format!(
            "expected {} longs for {} entries of {} bits, got {}",
            expected,
            size,
            bits,
            data.len()
        )));
    }
    let mask = entry_mask(bits);
    let mut out = Vec::with_capacity(size);
    if dense {
        for i in 0..size {
            let bit = i * bits;
            let word = bit / 64;
            let offset = bit % 64;
            let mut value = (data[word] as u64) >> offset;
            if offset + bits > 64 {
                value |= (data[word + 1] as u64) << (64 - offset);
            }
            out.push(value & mask);
        }
    } else {
        let entries_per_word = 64 / bits;
        for i in 0..size {
            let word = i / entries_per_word;
            let offset = (i % entries_per_word) * bits;
            out.push(((data[word] as u64) >> offset) & mask);
        }
    }
    Ok(out)
}

/// Pack entries into a long array.
///
/// Entries wider than `bits_per_entry` are masked down without error.
pub fn encode_long_array(entries: &[u64], bits_per_entry: u8, dense: bool) -> Result<Vec<i64>> {
    let bits = check_bits(bits_per_entry)?;
    let words = encoded_word_count(entries.len(), bits_per_entry, dense)?;
    let mask = entry_mask(bits);
    let mut out = vec![0u64; words];
    if dense {
        for (i, &entry) in entries.iter().enumerate() {
            let entry = entry & mask;
            let bit = i * bits;
            let word = bit / 64;
            let offset = bit % 64;
            out[word] |= entry << offset;
            if offset + bits > 64 {
                out[word + 1] |= entry >> (64 - offset);
            }
        }
    } else {
        let entries_per_word = 64 / bits;
        for (i, &entry) in entries.iter().enumerate() {
            let word = i / entries_per_word;
            let offset = (i % entries_per_word) * bits;
            out[word] |= (entry & mask) << offset;
        }
    }
    Ok(out.into_iter().map(|word| word as i64).collect())
}

/// The entry width needed to store `max_value`, at least `min_bits` wide.
pub fn required_bits(max_value: u64, min_bits: u8) -> u8 {
    let bits = (64 - max_value.leading_zeros()) as u8;
    bits.max(min_bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_padded_decode() {
        assert_eq!(
            decode_long_array(&[0x3210], 4, 4, false).unwrap(),
            vec![0, 1, 2, 3]
        );
        // 3 bit entries leave the top bit of each word unused.
        let entries: Vec<u64> = (0..21).map(|i| i % 8).collect();
        let packed = encode_long_array(&entries, 3, false).unwrap();
        assert_eq!(packed.len(), 1);
        assert_eq!(decode_long_array(&packed, 21, 3, false).unwrap(), entries);
    }

    #[test]
    fn test_dense_entries_straddle_words() {
        let entries: Vec<u64> = (0..13).map(|i| i % 32).collect();
        let packed = encode_long_array(&entries, 5, true).unwrap();
        // 13 entries of 5 bits span two words in the dense layout.
        assert_eq!(packed.len(), 2);
        assert_eq!(decode_long_array(&packed, 13, 5, true).unwrap(), entries);
    }

    #[test]
    fn test_dense_and_padded_word_counts_differ() {
        // 64 entries of 5 bits: dense packs 320 bits into 5 words, padded
        // fits 12 entries per word and needs 6.
        assert_eq!(encoded_word_count(64, 5, true).unwrap(), 5);
        assert_eq!(encoded_word_count(64, 5, false).unwrap(), 6);
    }

    #[test]
    fn test_decode_validates_word_count() {
        assert_matches!(
            decode_long_array(&[0, 0], 4, 4, false),
            Err(LodestoneError::InvalidArgument(_))
        );
        assert_matches!(
            decode_long_array(&[], 4, 4, false),
            Err(LodestoneError::InvalidArgument(_))
        );
    }

    #[test]
    fn test_bits_per_entry_bounds() {
        assert_matches!(
            decode_long_array(&[0], 1, 0, false),
            Err(LodestoneError::InvalidArgument(_))
        );
        assert_matches!(
            decode_long_array(&[0], 1, 65, false),
            Err(LodestoneError::InvalidArgument(_))
        );
        assert_eq!(
            decode_long_array(&[-1], 1, 64, true).unwrap(),
            vec![u64::MAX]
        );
    }

    #[test]
    fn test_encode_masks_oversized_entries() {
        let packed = encode_long_array(&[0x1F], 4, false).unwrap();
        assert_eq!(decode_long_array(&packed, 1, 4, false).unwrap(), vec![0xF]);
    }

    #[test]
    fn test_required_bits() {
        assert_eq!(required_bits(0, 4), 4);
        assert_eq!(required_bits(15, 4), 4);
        assert_eq!(required_bits(16, 4), 5);
        assert_eq!(required_bits(0, 1), 1);
        assert_eq!(required_bits(1, 1), 1);
        assert_eq!(required_bits(2, 1), 2);
        assert_eq!(required_bits(u64::MAX, 1), 64);
    }
}
