//! Single-line pattern recognisers.
//!
//! Each record kind has an ordered rule table. Rules are tried top to bottom and the first
//! one that returns a step wins, so table order is precedence.

pub mod news;
pub mod social;

/// Footer lines written by the digest generator, e.g. `*🦐 Generated by ...*`.
const FOOTER_PREFIXES: &[&str] = &["*🦐", "*("];
const FOOTER_MARK: char = '🦐';

/// One line of a sub-block plus the lines that follow it in the same sub-block.
#[derive(Debug, Clone, Copy)]
pub struct Line<'a> {
    pub raw: &'a str,
    pub text: &'a str,
    pub following: &'a [&'a str],
}

impl<'a> Line<'a> {
    pub fn new(raw: &'a str, following: &'a [&'a str]) -> Self {
        Self {
            raw,
            text: raw.trim(),
            following,
        }
    }

    /// Next non-blank line, trimmed.
    pub fn next_non_empty(&self) -> Option<&'a str> {
        self.following.iter().map(|l| l.trim()).find(|l| !l.is_empty())
    }

    pub fn is_indented(&self) -> bool {
        self.raw.starts_with("  ") || self.raw.starts_with('\t')
    }
}

/// A named classifier. `open` is the record currently being accumulated, if any.
pub struct Rule<D, S> {
    pub name: &'static str,
    pub classify: fn(&Line<'_>, Option<&D>) -> Option<S>,
}

/// Run `rules` in order; returns the winning rule's name and step.
pub fn first_match<D, S>(
    rules: &[Rule<D, S>],
    line: &Line<'_>,
    open: Option<&D>,
) -> Option<(&'static str, S)> {
    rules
        .iter()
        .find_map(|rule| (rule.classify)(line, open).map(|step| (rule.name, step)))
}

/// `*Generated by 小虾 🦐*`: a single-star italic line carrying the generator mark.
fn is_signed_footer(text: &str) -> bool {
    text.len() > 2
        && text.starts_with('*')
        && text.ends_with('*')
        && !text.starts_with("**")
        && text.contains(FOOTER_MARK)
}

/// Blank lines, `---` separators, `>` quotes and generator footers.
pub fn is_noise(text: &str) -> bool {
    text.is_empty()
        || text == "---"
        || text.starts_with('>')
        || FOOTER_PREFIXES.iter().any(|p| text.starts_with(p))
        || is_signed_footer(text)
}
