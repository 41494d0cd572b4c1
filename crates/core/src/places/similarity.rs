//! Gestalt (Ratcliff/Obershelp) string similarity.
//!
//! The ratio is `2 * M / T` where `M` counts characters in matching blocks
//! found by repeatedly taking the longest common substring and recursing on
//! both sides of it, and `T` is the combined length of both inputs.

/// Similarity in `0.0..=1.0`. Two empty strings are identical.
pub fn ratio(left: &str, right: &str) -> f64 {
    let left = left.chars().collect::<Vec<_>>();
    let right = right.chars().collect::<Vec<_>>();
    let total = left.len() + right.len();
    if total == 0 {
        return 1.0;
    }
    let matched = matching_characters(&left, &right);
    2.0 * matched as f64 / total as f64
}

fn matching_characters(left: &[char], right: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, left.len(), 0, right.len())];

    while let Some((left_lo, left_hi, right_lo, right_hi)) = pending.pop() {
        let (left_start, right_start, size) =
            longest_match(left, right, left_lo, left_hi, right_lo, right_hi);
        if size == 0 {
            continue;
        }
        matched += size;
        if left_lo < left_start && right_lo < right_start {
            pending.push((left_lo, left_start, right_lo, right_start));
        }
        if left_start + size < left_hi && right_start + size < right_hi {
            pending.push((left_start + size, left_hi, right_start + size, right_hi));
        }
    }

    matched
}

/// Longest common block inside the given windows. Among equally long blocks
/// the one starting earliest in `left`, then earliest in `right`, wins.
fn longest_match(
    left: &[char],
    right: &[char],
    left_lo: usize,
    left_hi: usize,
    right_lo: usize,
    right_hi: usize,
) -> (usize, usize, usize) {
    let width = right_hi - right_lo;
    let mut best = (left_lo, right_lo, 0);
    let mut previous = vec![0usize; width + 1];
    let mut current = vec![0usize; width + 1];

    for i in left_lo..left_hi {
        for j in right_lo..right_hi {
            let column = j - right_lo + 1;
            current[column] =
                if left[i] == right[j] { previous[column - 1] + 1 } else { 0 };
            let run = current[column];
            if run > best.2 {
                best = (i + 1 - run, j + 1 - run, run);
            }
        }
        std::mem::swap(&mut previous, &mut current);
        current.iter_mut().for_each(|cell| *cell = 0);
    }

    best
}
