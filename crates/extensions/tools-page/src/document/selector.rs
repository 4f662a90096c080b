//! CSS selector subset used by [`MemoryDocument`](super::MemoryDocument).
//!
//! Supported: type and universal selectors, `#id`, `.class`, attribute
//! selectors (`[a]`, `[a=v]`, `[a~=v]`, `[a^=v]`, `[a$=v]`, `[a*=v]`),
//! descendant and child (`>`) combinators, and comma-separated lists.
//! Anything else is rejected as an invalid selector.

use pagehands_protocols::error::DocumentError;

/// Tree access the matcher needs.
pub trait SelectorTree {
    fn tag(&self, node: usize) -> &str;

    fn attr(&self, node: usize, name: &str) -> Option<&str>;

    fn parent_element(&self, node: usize) -> Option<usize>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList {
    selectors: Vec<Complex>,
}

#[derive(Debug, Clone, PartialEq)]
struct Complex {
    /// Rightmost compound first; each carries the combinator linking it to the
    /// compound on its left.
    parts: Vec<(Compound, Combinator)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Combinator {
    Descendant,
    Child,
    None,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrSelector>,
}

#[derive(Debug, Clone, PartialEq)]
struct AttrSelector {
    name: String,
    test: Option<(AttrOp, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum AttrOp {
    Equals,
    Includes,
    Prefix,
    Suffix,
    Substring,
}

impl SelectorList {
    pub fn parse(input: &str) -> Result<Self, DocumentError> {
        let invalid = || DocumentError::InvalidSelector(input.to_string());
        let mut selectors = Vec::new();
        for part in split_top_level(input) {
            let complex = parse_complex(part.trim()).ok_or_else(invalid)?;
            selectors.push(complex);
        }
        if selectors.is_empty() {
            return Err(invalid());
        }
        Ok(Self { selectors })
    }

    pub fn matches<T: SelectorTree>(&self, tree: &T, node: usize) -> bool {
        self.selectors.iter().any(|s| s.matches(tree, node))
    }
}

impl Complex {
    fn matches<T: SelectorTree>(&self, tree: &T, node: usize) -> bool {
        match_from(&self.parts, tree, node)
    }
}

fn match_from<T: SelectorTree>(parts: &[(Compound, Combinator)], tree: &T, node: usize) -> bool {
    let Some(((compound, combinator), rest)) = parts.split_first() else {
        return true;
    };
    if !compound.matches(tree, node) {
        return false;
    }
    match combinator {
        Combinator::None => true,
        Combinator::Child => tree
            .parent_element(node)
            .is_some_and(|parent| match_from(rest, tree, parent)),
        Combinator::Descendant => {
            let mut current = tree.parent_element(node);
            while let Some(ancestor) = current {
                if match_from(rest, tree, ancestor) {
                    return true;
                }
                current = tree.parent_element(ancestor);
            }
            false
        }
    }
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attrs.is_empty()
    }

    fn matches<T: SelectorTree>(&self, tree: &T, node: usize) -> bool {
        if let Some(tag) = &self.tag {
            if tag != "*" && !tree.tag(node).eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if tree.attr(node, "id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let classes = tree.attr(node, "class").unwrap_or("");
            if !self
                .classes
                .iter()
                .all(|c| classes.split_whitespace().any(|have| have == c))
            {
                return false;
            }
        }
        self.attrs.iter().all(|a| a.matches(tree.attr(node, &a.name)))
    }
}

impl AttrSelector {
    fn matches(&self, value: Option<&str>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match &self.test {
            None => true,
            Some((AttrOp::Equals, expected)) => value == expected,
            Some((AttrOp::Includes, expected)) => value.split_whitespace().any(|w| w == expected),
            Some((AttrOp::Prefix, expected)) => !expected.is_empty() && value.starts_with(expected.as_str()),
            Some((AttrOp::Suffix, expected)) => !expected.is_empty() && value.ends_with(expected.as_str()),
            Some((AttrOp::Substring, expected)) => !expected.is_empty() && value.contains(expected.as_str()),
        }
    }
}

/// Split on commas outside brackets and quotes.
fn split_top_level(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn parse_complex(input: &str) -> Option<Complex> {
    if input.is_empty() {
        return None;
    }
    let chars: Vec<char> = input.chars().collect();
    let mut pos = 0;
    // Left-to-right list of (combinator before, compound).
    let mut sequence: Vec<(Combinator, Compound)> = Vec::new();
    let mut pending = Combinator::None;

    while pos < chars.len() {
        let mut saw_space = false;
        while pos < chars.len() && chars[pos].is_whitespace() {
            pos += 1;
            saw_space = true;
        }
        if pos >= chars.len() {
            break;
        }
        if chars[pos] == '>' {
            if sequence.is_empty() || pending == Combinator::Child {
                return None;
            }
            pending = Combinator::Child;
            pos += 1;
            continue;
        }
        if !sequence.is_empty() && pending == Combinator::None {
            if !saw_space {
                return None;
            }
            pending = Combinator::Descendant;
        }
        let compound = parse_compound(&chars, &mut pos)?;
        sequence.push((pending, compound));
        pending = Combinator::None;
    }

    if sequence.is_empty() || pending != Combinator::None {
        return None;
    }

    // Reverse so the rightmost compound comes first; each compound carries the
    // combinator that links it to the one on its left.
    let mut parts = Vec::with_capacity(sequence.len());
    for i in (0..sequence.len()).rev() {
        let combinator = if i == 0 { Combinator::None } else { sequence[i].0 };
        parts.push((sequence[i].1.clone(), combinator));
    }
    Some(Complex { parts })
}

fn parse_compound(chars: &[char], pos: &mut usize) -> Option<Compound> {
    let mut compound = Compound::default();

    if chars.get(*pos) == Some(&'*') {
        compound.tag = Some("*".to_string());
        *pos += 1;
    } else if chars.get(*pos).is_some_and(|c| is_ident_char(*c)) {
        compound.tag = Some(read_ident(chars, pos)?.to_ascii_lowercase());
    }

    while let Some(&c) = chars.get(*pos) {
        match c {
            '#' => {
                *pos += 1;
                compound.id = Some(read_ident(chars, pos)?);
            }
            '.' => {
                *pos += 1;
                compound.classes.push(read_ident(chars, pos)?);
            }
            '[' => {
                *pos += 1;
                compound.attrs.push(parse_attr(chars, pos)?);
            }
            c if c.is_whitespace() || c == '>' => break,
            _ => return None,
        }
    }

    if compound.is_empty() { None } else { Some(compound) }
}

fn parse_attr(chars: &[char], pos: &mut usize) -> Option<AttrSelector> {
    skip_ws(chars, pos);
    let name = read_ident(chars, pos)?.to_ascii_lowercase();
    skip_ws(chars, pos);

    let op = match chars.get(*pos)? {
        ']' => {
            *pos += 1;
            return Some(AttrSelector { name, test: None });
        }
        '=' => {
            *pos += 1;
            AttrOp::Equals
        }
        c @ ('~' | '^' | '$' | '*') => {
            let op = match c {
                '~' => AttrOp::Includes,
                '^' => AttrOp::Prefix,
                '$' => AttrOp::Suffix,
                _ => AttrOp::Substring,
            };
            *pos += 1;
            if chars.get(*pos) != Some(&'=') {
                return None;
            }
            *pos += 1;
            op
        }
        _ => return None,
    };

    skip_ws(chars, pos);
    let value = match chars.get(*pos)? {
        q @ ('"' | '\'') => {
            let quote = *q;
            *pos += 1;
            let start = *pos;
            while chars.get(*pos).is_some_and(|c| *c != quote) {
                *pos += 1;
            }
            chars.get(*pos)?;
            let value: String = chars[start..*pos].iter().collect();
            *pos += 1;
            value
        }
        _ => read_ident(chars, pos)?,
    };
    skip_ws(chars, pos);
    if chars.get(*pos) != Some(&']') {
        return None;
    }
    *pos += 1;
    Some(AttrSelector {
        name,
        test: Some((op, value)),
    })
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn read_ident(chars: &[char], pos: &mut usize) -> Option<String> {
    let start = *pos;
    while chars.get(*pos).is_some_and(|c| is_ident_char(*c)) {
        *pos += 1;
    }
    if *pos == start {
        None
    } else {
        Some(chars[start..*pos].iter().collect())
    }
}

fn skip_ws(chars: &[char], pos: &mut usize) {
    while chars.get(*pos).is_some_and(|c| c.is_whitespace()) {
        *pos += 1;
    }
}

#[cfg(test)]
#[path = "selector_tests.rs"]
mod tests;
