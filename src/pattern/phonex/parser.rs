use std::str::FromStr;

use crate::error::PatternError;
use crate::ipa::element::{Phone, PhoneticElement, SyllableConstituent};
use crate::ipa::features::{Feature, FeatureSet};
use crate::ipa::parser::{is_diacritic, TIE_BARS};

/// Predicate over a single phone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhoneMatcher {
    Any,
    Consonant,
    Vowel,
    Glide,
    /// Consonant or vowel.
    Segment,
    Features {
        include: FeatureSet,
        exclude: FeatureSet,
    },
    /// Compares against the phone with diacritics removed.
    Base(String),
    /// Compares against the full phone text.
    Exact(String),
    Class {
        negated: bool,
        members: Vec<PhoneMatcher>,
    },
    Constituent(Box<PhoneMatcher>, SyllableConstituent),
}

impl PhoneMatcher {
    pub fn matches(&self, phone: &Phone) -> bool {
        match self {
            Self::Any => true,
            Self::Consonant => phone.is_consonant() && !phone.is_glide(),
            Self::Vowel => phone.is_vowel(),
            Self::Glide => phone.is_glide(),
            Self::Segment => phone.is_consonant() || phone.is_vowel(),
            Self::Features { include, exclude } => {
                phone.features().contains_all(include)
                    && !exclude.iter().any(|f| phone.features().contains(f))
            }
            Self::Base(glyph) => phone.base() == glyph,
            Self::Exact(text) => phone.text() == text,
            Self::Class { negated, members } => members.iter().any(|m| m.matches(phone)) != *negated,
            Self::Constituent(inner, constituent) => {
                phone.constituent() == *constituent && inner.matches(phone)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementMatcher {
    Phone(PhoneMatcher),
    WordBoundary,
}

impl ElementMatcher {
    pub fn matches(&self, element: &PhoneticElement) -> bool {
        match (self, element) {
            (Self::Phone(m), PhoneticElement::Phone(p)) => m.matches(p),
            (Self::WordBoundary, PhoneticElement::WordBoundary) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(ElementMatcher),
    /// Alternatives, each a sequence.
    Alt(Vec<Vec<Node>>),
    Repeat {
        node: Box<Node>,
        min: usize,
        max: Option<usize>,
    },
    Start,
    End,
}

/// Parse a full phonex expression. Errors carry character offsets.
pub fn parse(expression: &str) -> Result<Node, PatternError> {
    let mut parser = Parser::new(expression);
    let branches = parser.alternation()?;
    if let Some(c) = parser.peek() {
        return Err(PatternError::at(parser.pos, format!("unexpected '{c}'")));
    }
    if branches.iter().all(Vec::is_empty) {
        return Err(PatternError::new("empty phonex expression"));
    }
    Ok(Node::Alt(branches))
}

/// Parse a single phone matcher such as `\c`, `{vowel,-round}` or `[td]:O`.
pub fn parse_element(expression: &str) -> Result<PhoneMatcher, PatternError> {
    let mut parser = Parser::new(expression.trim());
    let matcher = parser.phone_element()?;
    match parser.peek() {
        Some(c) => Err(PatternError::at(parser.pos, format!("unexpected '{c}'"))),
        None => Ok(matcher),
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(expression: &str) -> Self {
        Self {
            chars: expression.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        self.pos += usize::from(c.is_some());
        c
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn alternation(&mut self) -> Result<Vec<Vec<Node>>, PatternError> {
        let mut branches = vec![self.sequence()?];
        while self.peek() == Some('|') {
            self.pos += 1;
            branches.push(self.sequence()?);
        }
        Ok(branches)
    }

    fn sequence(&mut self) -> Result<Vec<Node>, PatternError> {
        let mut nodes = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None | Some('|') | Some(')') => return Ok(nodes),
                Some(c @ ('?' | '*' | '+')) => {
                    return Err(PatternError::at(self.pos, format!("nothing to repeat before '{c}'")))
                }
                Some(_) => {
                    let atom = self.atom()?;
                    nodes.push(self.quantified(atom));
                }
            }
        }
    }

    fn quantified(&mut self, node: Node) -> Node {
        let (min, max) = match self.peek() {
            Some('?') => (0, Some(1)),
            Some('*') => (0, None),
            Some('+') => (1, None),
            _ => return node,
        };
        self.pos += 1;
        Node::Repeat {
            node: Box::new(node),
            min,
            max,
        }
    }

    fn atom(&mut self) -> Result<Node, PatternError> {
        match self.peek() {
            Some('(') => {
                let open = self.pos;
                self.pos += 1;
                let branches = self.alternation()?;
                if self.bump() != Some(')') {
                    return Err(PatternError::at(open, "unclosed group"));
                }
                if branches.iter().all(Vec::is_empty) {
                    return Err(PatternError::at(open, "empty group"));
                }
                Ok(Node::Alt(branches))
            }
            Some('^') => {
                self.pos += 1;
                Ok(Node::Start)
            }
            Some('$') => {
                self.pos += 1;
                Ok(Node::End)
            }
            Some('\\') if self.chars.get(self.pos + 1) == Some(&'b') => {
                self.pos += 2;
                Ok(Node::Element(ElementMatcher::WordBoundary))
            }
            _ => Ok(Node::Element(ElementMatcher::Phone(self.phone_element()?))),
        }
    }

    fn phone_element(&mut self) -> Result<PhoneMatcher, PatternError> {
        let base = self.base_matcher()?;
        if self.peek() != Some(':') {
            return Ok(base);
        }
        let at = self.pos;
        self.pos += 1;
        let constituent = self
            .bump()
            .and_then(SyllableConstituent::from_id_char)
            .ok_or_else(|| PatternError::at(at, "expected syllable constituent after ':'"))?;
        Ok(PhoneMatcher::Constituent(Box::new(base), constituent))
    }

    fn base_matcher(&mut self) -> Result<PhoneMatcher, PatternError> {
        let at = self.pos;
        let c = self
            .bump()
            .ok_or_else(|| PatternError::at(at, "expected phone matcher"))?;
        match c {
            '.' => Ok(PhoneMatcher::Any),
            '\\' => match self.bump() {
                Some('c') => Ok(PhoneMatcher::Consonant),
                Some('v') => Ok(PhoneMatcher::Vowel),
                Some('g') => Ok(PhoneMatcher::Glide),
                Some('w') => Ok(PhoneMatcher::Segment),
                Some(e) if e.is_ascii_alphanumeric() => {
                    Err(PatternError::at(at, format!("unknown escape '\\{e}'")))
                }
                Some(e) => Ok(PhoneMatcher::Base(e.to_string())),
                None => Err(PatternError::at(at, "dangling escape")),
            },
            '{' => self.feature_set(at),
            '[' => self.class(at),
            '(' | ')' | '|' | '?' | '*' | '+' | ']' | '}' | '^' | '$' | ':' => {
                Err(PatternError::at(at, format!("unexpected '{c}'")))
            }
            c if is_diacritic(c) => Err(PatternError::at(at, "diacritic without base glyph")),
            c => Ok(self.glyph(c)),
        }
    }

    fn glyph(&mut self, first: char) -> PhoneMatcher {
        let mut base = first.to_string();
        let mut text = base.clone();
        while let Some(c) = self.peek() {
            if TIE_BARS.contains(&c) {
                if let Some(next) = self.chars.get(self.pos + 1).copied() {
                    base.push(c);
                    base.push(next);
                    text.push(c);
                    text.push(next);
                    self.pos += 2;
                    continue;
                }
                break;
            }
            if !is_diacritic(c) {
                break;
            }
            text.push(c);
            self.pos += 1;
        }
        if text == base {
            PhoneMatcher::Base(base)
        } else {
            PhoneMatcher::Exact(text)
        }
    }

    fn feature_set(&mut self, open: usize) -> Result<PhoneMatcher, PatternError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c != '}') {
            self.pos += 1;
        }
        if self.bump() != Some('}') {
            return Err(PatternError::at(open, "unclosed feature set"));
        }
        let body: String = self.chars[start..self.pos - 1].iter().collect();

        let mut include = FeatureSet::new();
        let mut exclude = FeatureSet::new();
        for name in body.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            let (negated, name) = match name.strip_prefix('-') {
                Some(rest) => (true, rest.trim()),
                None => (false, name),
            };
            let feature = Feature::from_str(name).map_err(|e| PatternError::at(open, e))?;
            if negated {
                exclude.insert(feature);
            } else {
                include.insert(feature);
            }
        }
        if include.is_empty() && exclude.is_empty() {
            return Err(PatternError::at(open, "empty feature set"));
        }
        Ok(PhoneMatcher::Features { include, exclude })
    }

    fn class(&mut self, open: usize) -> Result<PhoneMatcher, PatternError> {
        let negated = self.peek() == Some('^');
        if negated {
            self.pos += 1;
        }
        let mut members = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(PatternError::at(open, "unclosed class")),
                Some(']') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => members.push(self.phone_element()?),
            }
        }
        if members.is_empty() {
            return Err(PatternError::at(open, "empty class"));
        }
        Ok(PhoneMatcher::Class { negated, members })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quantified_groups_and_alternation() {
        let node = parse("(\\c|{nasal})+\\v$").unwrap();
        let Node::Alt(branches) = node else {
            panic!("expected top-level alternation");
        };
        assert_eq!(branches.len(), 1);
        assert_eq!(branches[0].len(), 3);
        assert!(matches!(branches[0][0], Node::Repeat { min: 1, max: None, .. }));
        assert_eq!(branches[0][2], Node::End);
    }

    #[test]
    fn error_offsets_are_character_indices() {
        assert_eq!(parse("ˈa)").unwrap_err().offset, Some(2));
        assert_eq!(parse("\\c(\\v").unwrap_err().offset, Some(2));
        assert_eq!(parse("*a").unwrap_err().offset, Some(0));
        assert_eq!(parse("a{bogus}").unwrap_err().offset, Some(1));
        assert_eq!(parse("\\q").unwrap_err().offset, Some(0));
        assert!(parse("").is_err());
    }

    #[test]
    fn single_element_with_constituent() {
        let m = parse_element("[td]:O").unwrap();
        assert!(matches!(m, PhoneMatcher::Constituent(_, SyllableConstituent::Onset)));
        assert!(parse_element("\\c\\v").is_err());
        assert_eq!(
            parse_element("tʰ").unwrap(),
            PhoneMatcher::Exact("tʰ".to_string())
        );
    }
}
