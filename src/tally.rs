/// Glyphs of the tally-mark display font: 'e' is a closed group of five,
/// 'a'..'d' are one to four strokes.
const FIVE_GROUP: char = 'e';
const REMAINDER_GLYPHS: [char; 4] = ['a', 'b', 'c', 'd'];

/// Encode a count for the tally-mark font: one 'e' per full group of five,
/// then the remainder glyph. `tally_marks(0)` is the empty string.
pub fn tally_marks(n: u64) -> String {
    let groups = (n / 5) as usize;
    let remainder = (n % 5) as usize;

    let mut out = String::with_capacity(groups + 1);
    for _ in 0..groups {
        out.push(FIVE_GROUP);
    }
    if remainder > 0 {
        out.push(REMAINDER_GLYPHS[remainder - 1]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_counts_under_five() {
        assert_eq!(tally_marks(0), "");
        assert_eq!(tally_marks(1), "a");
        assert_eq!(tally_marks(2), "b");
        assert_eq!(tally_marks(3), "c");
        assert_eq!(tally_marks(4), "d");
    }

    #[test]
    fn groups_fives() {
        assert_eq!(tally_marks(5), "e");
        assert_eq!(tally_marks(7), "eb");
        assert_eq!(tally_marks(10), "ee");
        assert_eq!(tally_marks(23), "eeeec");
    }

    #[test]
    fn shape_holds_for_all_small_counts() {
        for n in 0..200u64 {
            let marks = tally_marks(n);
            let groups = marks.chars().filter(|&c| c == FIVE_GROUP).count();
            assert_eq!(groups as u64, n / 5);
            // At most one trailing remainder glyph.
            assert!(marks.len() as u64 <= n / 5 + 1);
            if n >= 5 {
                // Strictly longer than the same residue one group earlier.
                assert!(marks.len() > tally_marks(n - 5).len());
            }
        }
    }
}
