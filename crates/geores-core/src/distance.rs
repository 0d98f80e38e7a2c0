// crates/geores-core/src/distance.rs

//! Damerau-Levenshtein edit distance.
//!
//! This is the *unrestricted* variant: a substring may be edited more than
//! once, so `distance("xyz", "zx") == 2` (the optimal-string-alignment
//! variant would report 3). Strings are compared by Unicode scalar value.

use std::collections::HashMap;

/// True Damerau-Levenshtein distance between `a` and `b`.
///
/// Substitution, insertion, deletion and transposition of adjacent
/// characters each cost 1.
///
/// ```rust
/// use geores_core::distance::damerau_levenshtein;
///
/// assert_eq!(damerau_levenshtein("xy", "yx"), 1);
/// assert_eq!(damerau_levenshtein("xyz", "zx"), 2);
/// assert_eq!(damerau_levenshtein("", "y"), 1);
/// ```
pub fn damerau_levenshtein(a: &str, b: &str) -> usize {
    let s1: Vec<char> = a.chars().collect();
    let s2: Vec<char> = b.chars().collect();
    let (n, m) = (s1.len(), s2.len());

    if n == 0 {
        return m;
    }
    if m == 0 {
        return n;
    }

    // (n + 2) x (m + 2) table; row/column 0 hold the "infinity" bound
    let bound = n + m;
    let mut matrix = vec![vec![0usize; m + 2]; n + 2];
    matrix[0][0] = bound;
    for i in 0..=n {
        matrix[i + 1][1] = i;
        matrix[i + 1][0] = bound;
    }
    for j in 0..=m {
        matrix[1][j + 1] = j;
        matrix[0][j + 1] = bound;
    }

    // last row in which each character was seen in `a`
    let mut last_row: HashMap<char, usize> = HashMap::new();

    for i in 1..=n {
        let mut last_match_col = 0;
        for j in 1..=m {
            let i1 = last_row.get(&s2[j - 1]).copied().unwrap_or(0);
            let j1 = last_match_col;

            let cost = if s1[i - 1] == s2[j - 1] {
                last_match_col = j;
                matrix[i][j]
            } else {
                matrix[i][j].min(matrix[i + 1][j]).min(matrix[i][j + 1]) + 1
            };

            let transposition = matrix[i1][j1] + (i - i1 - 1) + 1 + (j - j1 - 1);
            matrix[i + 1][j + 1] = cost.min(transposition);
        }
        last_row.insert(s1[i - 1], i);
    }

    matrix[n + 1][m + 1]
}

/// [`damerau_levenshtein`] after lowercasing both inputs.
pub fn damerau_levenshtein_ci(a: &str, b: &str) -> usize {
    damerau_levenshtein(&a.to_lowercase(), &b.to_lowercase())
}

/// Returns `true` when `damerau_levenshtein(a, b) < 2`, without building the table.
///
/// Walks both strings until the first mismatch and then checks whether a
/// single transposition, insertion, deletion or substitution realigns the
/// remainders.
pub fn is_edit_distance_1(a: &str, b: &str) -> bool {
    let s1: Vec<char> = a.chars().collect();
    let s2: Vec<char> = b.chars().collect();

    if s1.is_empty() {
        return s2.len() <= 1;
    }
    if s2.is_empty() {
        return s1.len() <= 1;
    }
    if s1.len().abs_diff(s2.len()) > 1 {
        return false;
    }

    // reads past the end yield `None`, which only ever equals another `None`
    let at = |s: &[char], idx: usize| s.get(idx).copied();
    let rest = |s: &'_ [char], idx: usize| -> Vec<char> { s.get(idx..).unwrap_or(&[]).to_vec() };

    let mut offset1 = 0;
    let mut offset2 = 0;
    let mut i = 0;

    while at(&s1, i + offset1).is_some() || at(&s2, i + offset2).is_some() {
        if at(&s1, i + offset1) != at(&s2, i + offset2) {
            if at(&s1, i + offset1) == at(&s2, i + offset2 + 1)
                && at(&s1, i + offset1 + 1) == at(&s2, i + offset2)
                && rest(&s1, i + offset1 + 2) == rest(&s2, i + offset2 + 2)
            {
                // transposition
                i += 2;
            } else if rest(&s1, i + offset1) == rest(&s2, i + offset2 + 1) {
                // insertion
                offset2 += 1;
            } else if rest(&s1, i + offset1 + 1) == rest(&s2, i + offset2) {
                // deletion
                offset1 += 1;
            } else if rest(&s1, i + offset1 + 1) == rest(&s2, i + offset2 + 1) {
                // substitution
                i += 1;
            } else {
                return false;
            }
        }
        i += 1;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::distributions::Alphanumeric;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn distance_covers_each_edit_operation() {
        assert_eq!(damerau_levenshtein("", ""), 0);
        assert_eq!(damerau_levenshtein("", "y"), 1);
        assert_eq!(damerau_levenshtein("x", ""), 1);
        assert_eq!(damerau_levenshtein("x", "x"), 0);
        assert_eq!(damerau_levenshtein("x", "y"), 1);
        assert_eq!(damerau_levenshtein("xy", "x"), 1);
        assert_eq!(damerau_levenshtein("x", "xy"), 1);
        assert_eq!(damerau_levenshtein("xy", "yx"), 1);
        assert_eq!(damerau_levenshtein("xyz", "yzx"), 2);
        assert_eq!(damerau_levenshtein("xyz", "zx"), 2);
        assert_eq!(damerau_levenshtein("ca", "abc"), 2);
    }

    #[test]
    fn case_insensitive_distance_ignores_case() {
        let a = "Berico Technologies";
        let b = "BERICO TECHNOLOGIES";
        let c = "bErIcO tEcHnOlOgIeS";
        assert_eq!(damerau_levenshtein_ci(a, b), 0);
        assert_eq!(damerau_levenshtein_ci(a, c), 0);
        assert_eq!(damerau_levenshtein_ci(b, c), 0);
    }

    #[test]
    fn distance_agrees_with_strsim() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2_000 {
            let a = random_word(&mut rng, 12);
            let b = random_word(&mut rng, 12);
            assert_eq!(
                damerau_levenshtein(&a, &b),
                strsim::damerau_levenshtein(&a, &b),
                "{a} vs {b}"
            );
            assert_eq!(damerau_levenshtein(&a, &b), damerau_levenshtein(&b, &a));
            assert_eq!(damerau_levenshtein(&a, &a), 0);
        }
    }

    #[test]
    fn edit_distance_1_cases() {
        let yes = [
            ("", ""),
            ("", "y"),
            ("x", ""),
            ("x", "x"),
            ("Berico Technologies", "Berico Technologies"),
            ("x", "y"),
            ("xzxcvbnm", "yzxcvbnm"),
            ("zxcvbnmxzxcvbnm", "zxcvbnmyzxcvbnm"),
            ("zxcvbnmx", "zxcvbnmy"),
            ("x", "xy"),
            ("xzxcvbnm", "xyzxcvbnm"),
            ("zxcvbnmxzxcvbnm", "zxcvbnmxyzxcvbnm"),
            ("zxcvbnmx", "zxcvbnmxy"),
            ("xy", "x"),
            ("xyzxcvbnm", "xzxcvbnm"),
            ("zxcvbnmxyzxcvbnm", "zxcvbnmxzxcvbnm"),
            ("zxcvbnmxy", "zxcvbnmx"),
            ("xy", "yx"),
            ("xyzxcvbnm", "yxzxcvbnm"),
            ("zxcvbnmxyzxcvbnm", "zxcvbnmyxzxcvbnm"),
            ("zxcvbnmxy", "zxcvbnmyx"),
        ];
        for (a, b) in yes {
            assert!(is_edit_distance_1(a, b), "expected distance < 2: {a:?} vs {b:?}");
        }

        let no = [
            ("", "xyz"),
            ("xyz", ""),
            ("xyz", "yzx"),
            ("xyzzxcvbnm", "yzxzxcvbnm"),
            ("zxcvbnmxyzzxcvbnm", "zxcvbnmyzxzxcvbnm"),
            ("zxcvbnmxyz", "zxcvbnmyzx"),
            ("xyz", "zx"),
            ("xyzzxcvbnm", "zxzxcvbnm"),
            ("zxcvbnmxyzzxcvbnm", "zxcvbnmzxzxcvbnm"),
            ("zxcvbnmxyz", "zxcvbnmzx"),
            ("xy", "ab"),
            ("xyzxcvbnm", "abzxcvbnm"),
            ("zxcvbnmxyzxcvbnm", "zxcvbnmabzxcvbnm"),
            ("zxcvbnmxy", "zxcvbnmab"),
            ("xzxcvbnmy", "azxcvbnmb"),
            ("aaaaabbbbbx", "aaaabbbbby"),
            ("aaaaabbbbb", "aaaababbbby"),
        ];
        for (a, b) in no {
            assert!(!is_edit_distance_1(a, b), "expected distance >= 2: {a:?} vs {b:?}");
        }
    }

    #[test]
    fn edit_distance_1_is_consistent_with_full_algorithm() {
        let mut rng = StdRng::seed_from_u64(1_729);
        for _ in 0..20_000 {
            let a = random_word(&mut rng, 26);
            let b = mutate(&mut rng, &a, 10);
            let expected = damerau_levenshtein(&a, &b) < 2;
            assert_eq!(is_edit_distance_1(&a, &b), expected, "{a} vs {b}");
        }
    }

    fn random_word(rng: &mut StdRng, max_len: usize) -> String {
        let len = rng.gen_range(0..=max_len);
        rng.sample_iter(&Alphanumeric)
            .take(len)
            .map(|c| char::from(c).to_ascii_lowercase())
            .collect()
    }

    /// Randomly transposes, substitutes, inserts or deletes roughly one in
    /// `factor` characters.
    fn mutate(rng: &mut StdRng, s: &str, factor: u32) -> String {
        let mut chars: Vec<char> = s.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            if rng.gen_ratio(1, factor) {
                match rng.gen_range(0..4) {
                    0 if i + 1 < chars.len() => chars.swap(i, i + 1),
                    1 => chars[i] = rng.gen_range('a'..='z'),
                    2 => chars.insert(i, rng.gen_range('a'..='z')),
                    _ => {
                        chars.remove(i);
                        continue;
                    }
                }
            }
            i += 1;
        }
        chars.into_iter().collect()
    }
}
