// Pattern Transforms - Rotation, degree-to-MIDI mapping and chord voicing
// All helpers are pure; randomness is decided by the caller

use crate::styles::{Scale, REST};

/// Cyclically shift a fixed-length pattern: `out[i] = pattern[(i + shift) mod len]`
///
/// Density is preserved; negative shifts rotate the other way.
pub fn rotate<T: Copy, const N: usize>(pattern: &[T; N], shift: i32) -> [T; N] {
    let mut out = *pattern;
    if N == 0 {
        return out;
    }
    let shift = shift.rem_euclid(N as i32) as usize;
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = pattern[(i + shift) % N];
    }
    out
}

/// Map a scale degree to an (unclamped) MIDI note
///
/// `midi = root + chord_interval + scale[degree mod 7] + 12 * floor(degree / 7)`.
/// The rest sentinel (and any negative degree) maps to `None` and must be skipped.
pub fn degree_to_midi(root: i32, scale: Scale, degree: i8, chord_interval: i32) -> Option<i32> {
    if degree <= REST {
        return None;
    }
    let intervals = scale.intervals();
    let len = intervals.len() as i32;
    let degree = degree as i32;
    let octave = degree.div_euclid(len);
    let index = degree.rem_euclid(len) as usize;
    Some(root + chord_interval + intervals[index] + 12 * octave)
}

/// Fold a MIDI value into [0, 127] by whole octaves
///
/// Returns the folded note and whether folding was needed.
pub fn clamp_midi(note: i32) -> (u8, bool) {
    if (0..=127).contains(&note) {
        return (note as u8, false);
    }
    let mut folded = note;
    while folded > 127 {
        folded -= 12;
    }
    while folded < 0 {
        folded += 12;
    }
    (folded as u8, true)
}

/// Voice a chord around `root`, optionally lifting the lowest tone an octave
///
/// Returns sorted MIDI notes and whether any note needed folding.
pub fn voice_chord(root: i32, intervals: &[i32], invert: bool) -> (Vec<u8>, bool) {
    let lowest = intervals.iter().copied().min();
    let mut inverted = false;
    let mut folded_any = false;

    let mut notes: Vec<u8> = intervals
        .iter()
        .map(|&interval| {
            let mut note = root + interval;
            if invert && !inverted && Some(interval) == lowest {
                note += 12;
                inverted = true;
            }
            let (note, folded) = clamp_midi(note);
            folded_any |= folded;
            note
        })
        .collect();

    notes.sort_unstable();
    notes.dedup();
    (notes, folded_any)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate() {
        let pattern = [1, 2, 3, 4];
        assert_eq!(rotate(&pattern, 0), [1, 2, 3, 4]);
        assert_eq!(rotate(&pattern, 1), [2, 3, 4, 1]);
        assert_eq!(rotate(&pattern, 5), [2, 3, 4, 1]);
        assert_eq!(rotate(&pattern, -1), [4, 1, 2, 3]);
    }

    #[test]
    fn test_rotate_preserves_density() {
        let lane = [true, false, false, true, false, false, true, false];
        for shift in 0..8 {
            let rotated = rotate(&lane, shift);
            assert_eq!(
                rotated.iter().filter(|&&b| b).count(),
                lane.iter().filter(|&&b| b).count()
            );
        }
    }

    #[test]
    fn test_degree_to_midi_minor() {
        // A minor, root A3 = 57
        assert_eq!(degree_to_midi(57, Scale::Minor, 0, 0), Some(57));
        assert_eq!(degree_to_midi(57, Scale::Minor, 2, 0), Some(60)); // C
        assert_eq!(degree_to_midi(57, Scale::Minor, 4, 0), Some(64)); // E
    }

    #[test]
    fn test_degree_octave_wraps() {
        // Degree 7 is the root one octave up, degree 9 the third one octave up
        assert_eq!(degree_to_midi(60, Scale::Major, 7, 0), Some(72));
        assert_eq!(degree_to_midi(60, Scale::Major, 9, 0), Some(76));
    }

    #[test]
    fn test_rest_is_never_mapped() {
        assert_eq!(degree_to_midi(60, Scale::Major, REST, 0), None);
        assert_eq!(degree_to_midi(60, Scale::Major, -5, 12), None);
    }

    #[test]
    fn test_chord_interval_offsets() {
        assert_eq!(degree_to_midi(48, Scale::Minor, 0, 5), Some(53));
    }

    #[test]
    fn test_clamp_midi_folds_by_octave() {
        assert_eq!(clamp_midi(64), (64, false));
        assert_eq!(clamp_midi(130), (118, true));
        assert_eq!(clamp_midi(-3), (9, true));
        assert_eq!(clamp_midi(127), (127, false));
    }

    #[test]
    fn test_voice_chord_root_position() {
        let (notes, folded) = voice_chord(60, &[0, 4, 7], false);
        assert_eq!(notes, vec![60, 64, 67]);
        assert!(!folded);
    }

    #[test]
    fn test_voice_chord_inverted() {
        let (notes, _) = voice_chord(60, &[0, 4, 7], true);
        assert_eq!(notes, vec![64, 67, 72]);
    }

    #[test]
    fn test_voice_chord_folds_extremes() {
        let (notes, folded) = voice_chord(125, &[0, 4, 7], false);
        assert!(folded);
        assert!(notes.iter().all(|&n| n <= 127));
    }
}
