//! Shell-style glob matching for flag keys.
//!
//! # Responsibilities
//! - Match a key against a glob pattern (`*`, `?`, `[...]`)
//! - Anchor the match at both ends (full-key match, not substring)
//!
//! # Design Decisions
//! - `*` matches any run of characters, including none
//! - Character classes support `!`/`^` negation and `a-z` ranges; a `]`
//!   first in the class is literal; an unterminated class matches `[`
//!   literally
//! - Iterative two-pointer matching with single-star backtracking,
//!   O(len(key) * len(pattern)) worst case, no regex

/// Returns true if `key` matches `pattern` in its entirety.
pub fn matches(pattern: &str, key: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let key: Vec<char> = key.chars().collect();

    let mut p = 0;
    let mut k = 0;
    // Position to resume from when a literal mismatch forces backtracking.
    let mut star: Option<(usize, usize)> = None;

    while k < key.len() {
        if p < pattern.len() {
            match pattern[p] {
                '*' => {
                    star = Some((p, k));
                    p += 1;
                    continue;
                }
                '?' => {
                    p += 1;
                    k += 1;
                    continue;
                }
                '[' => match match_class(&pattern, p, key[k]) {
                    Some((true, next)) => {
                        p = next;
                        k += 1;
                        continue;
                    }
                    Some((false, _)) => {}
                    None => {
                        // Unterminated class: treat the bracket literally.
                        if key[k] == '[' {
                            p += 1;
                            k += 1;
                            continue;
                        }
                    }
                },
                literal if literal == key[k] => {
                    p += 1;
                    k += 1;
                    continue;
                }
                _ => {}
            }
        }

        match star {
            Some((star_p, star_k)) => {
                // Let the last star absorb one more key character.
                p = star_p + 1;
                k = star_k + 1;
                star = Some((star_p, star_k + 1));
            }
            None => return false,
        }
    }

    // Key exhausted: remaining pattern must be all stars.
    while p < pattern.len() && pattern[p] == '*' {
        p += 1;
    }
    p == pattern.len()
}

/// Matches `candidate` against the class starting at `pattern[start]` (a
/// `[`). Returns `(matched, index past the closing bracket)`, or `None` if
/// the class never closes.
fn match_class(pattern: &[char], start: usize, candidate: char) -> Option<(bool, usize)> {
    let mut i = start + 1;
    let negated = matches!(pattern.get(i), Some(&'!') | Some(&'^'));
    if negated {
        i += 1;
    }

    let mut matched = false;
    let mut first = true;
    loop {
        let current = *pattern.get(i)?;
        if current == ']' && !first {
            break;
        }
        first = false;

        let range_end = if pattern.get(i + 1) == Some(&'-') {
            pattern.get(i + 2).filter(|&&end| end != ']')
        } else {
            None
        };
        match range_end {
            Some(&end) => {
                if current <= candidate && candidate <= end {
                    matched = true;
                }
                i += 3;
            }
            None => {
                if current == candidate {
                    matched = true;
                }
                i += 1;
            }
        }
    }

    Some((matched != negated, i + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_patterns_match_exactly() {
        assert!(matches("bool-flag", "bool-flag"));
        assert!(!matches("bool-flag", "bool-flag-2"));
        assert!(!matches("bool-flag-2", "bool-flag"));
    }

    #[test]
    fn star_matches_any_run_including_empty() {
        assert!(matches("bool*", "bool-flag"));
        assert!(matches("bool*", "bool"));
        assert!(matches("*flag", "bool-flag"));
        assert!(matches("*", ""));
        assert!(matches("b*l*g", "bool-flag"));
        assert!(!matches("bool*", "str-flag"));
    }

    #[test]
    fn match_is_anchored_both_ends() {
        assert!(!matches("flag", "bool-flag"));
        assert!(!matches("bool", "bool-flag"));
    }

    #[test]
    fn question_mark_matches_exactly_one_character() {
        assert!(matches("flag-?", "flag-1"));
        assert!(!matches("flag-?", "flag-"));
        assert!(!matches("flag-?", "flag-12"));
    }

    #[test]
    fn character_classes() {
        assert!(matches("flag-[abc]", "flag-b"));
        assert!(!matches("flag-[abc]", "flag-d"));
        assert!(matches("flag-[0-9]", "flag-7"));
        assert!(!matches("flag-[0-9]", "flag-x"));
        assert!(matches("flag-[!0-9]", "flag-x"));
        assert!(!matches("flag-[!0-9]", "flag-3"));
    }

    #[test]
    fn leading_bracket_close_is_literal_inside_class() {
        assert!(matches("flag[]]", "flag]"));
        assert!(matches("flag[]x]", "flagx"));
    }

    #[test]
    fn unterminated_class_is_a_literal_bracket() {
        assert!(matches("flag[", "flag["));
        assert!(!matches("flag[", "flaga"));
    }

    #[test]
    fn empty_pattern_only_matches_empty_key() {
        assert!(matches("", ""));
        assert!(!matches("", "flag"));
    }

    #[test]
    fn star_backtracks_across_repeated_runs() {
        assert!(matches("*-flag", "flag-flag-flag"));
        assert!(matches("a*a*a", "aaaa"));
        assert!(!matches("a*a*a", "aa"));
    }
}
