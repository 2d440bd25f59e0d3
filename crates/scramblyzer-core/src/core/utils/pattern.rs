/// Name pattern used by atom selection queries.
///
/// Patterns without wildcards are compared exactly. `*` matches any run of
/// characters (including none) and `?` matches exactly one character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamePattern {
    Exact(String),
    Glob(String),
}

impl NamePattern {
    pub fn new(pattern: &str) -> Self {
        if pattern.contains(['*', '?']) {
            NamePattern::Glob(pattern.to_string())
        } else {
            NamePattern::Exact(pattern.to_string())
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        match self {
            NamePattern::Exact(pattern) => pattern == text,
            NamePattern::Glob(pattern) => glob_match(pattern, text),
        }
    }
}

fn glob_match(pattern: &str, text: &str) -> bool {
    let pat: Vec<char> = pattern.chars().collect();
    let txt: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while ti < txt.len() {
        if pi < pat.len() && (pat[pi] == '?' || pat[pi] == txt[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < pat.len() && pat[pi] == '*' {
            backtrack = Some((pi, ti));
            pi += 1;
        } else if let Some((star_pi, star_ti)) = backtrack {
            pi = star_pi + 1;
            ti = star_ti + 1;
            backtrack = Some((star_pi, star_ti + 1));
        } else {
            return false;
        }
    }
    pat[pi..].iter().all(|&c| c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_pattern_requires_full_match() {
        let pattern = NamePattern::new("PO4");
        assert!(matches!(pattern, NamePattern::Exact(_)));
        assert!(pattern.matches("PO4"));
        assert!(!pattern.matches("PO41"));
        assert!(!pattern.matches("po4"));
    }

    #[test]
    fn star_matches_any_suffix_or_infix() {
        let pattern = NamePattern::new("PO*");
        assert!(pattern.matches("PO4"));
        assert!(pattern.matches("PO"));
        assert!(pattern.matches("POPC"));
        assert!(!pattern.matches("DPPC"));

        let infix = NamePattern::new("D*PC");
        assert!(infix.matches("DPPC"));
        assert!(infix.matches("DOPC"));
        assert!(infix.matches("DPC"));
        assert!(!infix.matches("DPPE"));
    }

    #[test]
    fn question_mark_matches_exactly_one_character() {
        let pattern = NamePattern::new("C?A");
        assert!(pattern.matches("C1A"));
        assert!(!pattern.matches("CA"));
        assert!(!pattern.matches("C12A"));
    }

    #[test]
    fn lone_star_matches_everything() {
        let pattern = NamePattern::new("*");
        assert!(pattern.matches(""));
        assert!(pattern.matches("anything"));
    }
}
