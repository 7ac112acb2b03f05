//! Caption segmentation: chunk the narration text into word-groups and give
//! each a duration proportional to its word count, so the cues stay in step
//! with the narration regardless of group sizes.

use crate::model::CaptionCue;

/// Split `text` into timed caption cues over a `master`-second timeline.
///
/// Words are grouped `words_per_group` at a time (the last group takes the
/// remainder); each group lasts `group_len * (master / total_words)` and
/// starts where the previous one ended, which keeps the cues contiguous by
/// construction. Each group is bisected into two display lines at `len / 2`
/// (display only, no timing effect) and uppercased. Empty or whitespace-only
/// text yields no cues.
pub fn segment(text: &str, master: f64, words_per_group: usize, anchor_frac: f64) -> Vec<CaptionCue> {
    if master <= 0.0 || words_per_group == 0 {
        return Vec::new();
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    let time_per_word = master / words.len() as f64;
    let mut cues = Vec::with_capacity(words.len().div_ceil(words_per_group));
    let mut start = 0.0_f64;

    for group in words.chunks(words_per_group) {
        let mid = group.len() / 2;
        let line1 = group[..mid].join(" ").to_uppercase();
        let line2 = group[mid..].join(" ").to_uppercase();
        let duration = group.len() as f64 * time_per_word;

        cues.push(CaptionCue {
            line1,
            line2,
            start,
            duration,
            anchor_frac,
        });
        start += duration;
    }

    cues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn empty_text_yields_no_cues() {
        assert!(segment("", 30.0, 6, 0.4).is_empty());
        assert!(segment("   \n\t ", 30.0, 6, 0.4).is_empty());
    }

    #[test]
    fn forty_two_words_over_27_4s_gives_seven_equal_cues() {
        let cues = segment(&words(42), 27.4, 6, 0.4);
        assert_eq!(cues.len(), 7);
        let per_cue = 27.4 / 42.0 * 6.0;
        for cue in &cues {
            assert!((cue.duration - per_cue).abs() < 1e-9);
        }
    }

    #[test]
    fn cue_durations_sum_to_master() {
        for (n, wpg) in [(42, 6), (5, 6), (13, 4), (1, 1), (100, 7)] {
            let cues = segment(&words(n), 27.4, wpg, 0.4);
            let total: f64 = cues.iter().map(|c| c.duration).sum();
            // Tolerance: below one word's nominal duration.
            assert!((total - 27.4).abs() < 27.4 / n as f64);
        }
    }

    #[test]
    fn cues_are_contiguous_and_sorted() {
        let cues = segment(&words(25), 30.0, 6, 0.4);
        let mut expected = 0.0;
        for cue in &cues {
            assert!((cue.start - expected).abs() < 1e-9);
            expected = cue.start + cue.duration;
        }
    }

    #[test]
    fn last_group_takes_remainder_with_proportional_duration() {
        // 8 words, groups of 6 -> 6 + 2.
        let cues = segment(&words(8), 16.0, 6, 0.4);
        assert_eq!(cues.len(), 2);
        assert!((cues[0].duration - 12.0).abs() < 1e-9);
        assert!((cues[1].duration - 4.0).abs() < 1e-9);
    }

    #[test]
    fn lines_bisect_at_midpoint_first_half_shorter_on_odd() {
        let cues = segment("one two three four five", 10.0, 6, 0.4);
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].line1, "ONE TWO");
        assert_eq!(cues[0].line2, "THREE FOUR FIVE");
    }

    #[test]
    fn single_word_group_puts_text_on_second_line() {
        let cues = segment("hello", 3.0, 6, 0.4);
        assert_eq!(cues[0].line1, "");
        assert_eq!(cues[0].line2, "HELLO");
    }

    #[test]
    fn text_is_uppercased_for_display() {
        let cues = segment("quiet words here now", 8.0, 4, 0.4);
        assert_eq!(cues[0].line1, "QUIET WORDS");
        assert_eq!(cues[0].line2, "HERE NOW");
    }

    #[test]
    fn anchor_is_carried_through() {
        let cues = segment(&words(6), 6.0, 6, 0.35);
        assert!((cues[0].anchor_frac - 0.35).abs() < 1e-12);
    }
}
