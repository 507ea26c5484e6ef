use std::fmt;
use std::ops::Range;

use super::element::{Phone, PhoneticElement};
use super::features::builtin_table;
use super::parser::IpaParser;
use crate::error::QueryError;

/// Ordered sequence of phonetic elements for one group or word.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Transcription {
    elements: Vec<PhoneticElement>,
}

impl Transcription {
    pub fn new(elements: Vec<PhoneticElement>) -> Self {
        Self { elements }
    }

    /// Parse with the builtin feature table.
    pub fn parse(text: &str) -> Result<Self, QueryError> {
        IpaParser::new(builtin_table()).parse(text)
    }

    pub fn elements(&self) -> &[PhoneticElement] {
        &self.elements
    }

    pub(crate) fn elements_mut(&mut self) -> &mut [PhoneticElement] {
        &mut self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PhoneticElement> {
        self.elements.get(index)
    }

    pub fn phone(&self, index: usize) -> Option<&Phone> {
        self.elements.get(index).and_then(PhoneticElement::as_phone)
    }

    /// Phones paired with their element index.
    pub fn phones(&self) -> impl Iterator<Item = (usize, &Phone)> + '_ {
        self.elements
            .iter()
            .enumerate()
            .filter_map(|(i, el)| el.as_phone().map(|p| (i, p)))
    }

    pub fn phone_count(&self) -> usize {
        self.phones().count()
    }

    /// Copy of the elements in `range`, clamped to the transcription bounds.
    pub fn subsection(&self, range: Range<usize>) -> Self {
        let end = range.end.min(self.elements.len());
        let start = range.start.min(end);
        Self::new(self.elements[start..end].to_vec())
    }

    /// Byte offset in the rendered string at which element `index` begins.
    ///
    /// Indices past the end map to the rendered length.
    pub fn string_index_of_element(&self, index: usize) -> usize {
        self.elements
            .iter()
            .take(index)
            .map(|el| el.to_string().len())
            .sum()
    }

    /// Rendered byte range covering the elements in `range`.
    pub fn string_range(&self, range: Range<usize>) -> Range<usize> {
        let start = self.string_index_of_element(range.start);
        let end = self.string_index_of_element(range.end.max(range.start));
        start..end
    }

    /// Element ranges of the words, split on word boundaries and pauses.
    pub fn word_ranges(&self) -> Vec<Range<usize>> {
        let mut words = Vec::new();
        let mut start = 0;
        for (i, el) in self.elements.iter().enumerate() {
            if el.is_word_break() {
                if i > start {
                    words.push(start..i);
                }
                start = i + 1;
            }
        }
        if self.elements.len() > start {
            words.push(start..self.elements.len());
        }
        words
    }

    /// Drop stress markers, syllable boundaries and pauses.
    pub fn remove_punctuation(&self, keep_word_boundaries: bool) -> Self {
        let elements = self
            .elements
            .iter()
            .filter(|el| match el {
                PhoneticElement::Phone(_) => true,
                PhoneticElement::WordBoundary => keep_word_boundaries,
                _ => false,
            })
            .cloned()
            .collect();
        Self::new(elements)
    }

    pub fn strip_diacritics(&self) -> Self {
        let elements = self
            .elements
            .iter()
            .map(|el| match el {
                PhoneticElement::Phone(phone) => PhoneticElement::Phone(phone.without_diacritics()),
                other => other.clone(),
            })
            .collect();
        Self::new(elements)
    }
}

impl fmt::Display for Transcription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for el in &self.elements {
            el.fmt(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_index_tracks_multibyte_glyphs() {
        let t = Transcription::parse("ˈkæt").unwrap();
        assert_eq!(t.len(), 4);
        assert_eq!(t.string_index_of_element(0), 0);
        // 'ˈ' and 'æ' are two bytes each in UTF-8.
        assert_eq!(t.string_index_of_element(1), 2);
        assert_eq!(t.string_index_of_element(3), 5);
        assert_eq!(t.string_index_of_element(4), t.to_string().len());
        assert_eq!(t.string_range(1..3), 2..5);
    }

    #[test]
    fn word_ranges_split_on_boundaries() {
        let t = Transcription::parse("ə kæt (.) sæt").unwrap();
        let words = t.word_ranges();
        assert_eq!(words.len(), 3);
        assert_eq!(t.subsection(words[1].clone()).to_string(), "kæt");
        assert_eq!(t.subsection(words[2].clone()).to_string(), "sæt");
    }

    #[test]
    fn subsection_is_clamped() {
        let t = Transcription::parse("pat").unwrap();
        assert_eq!(t.subsection(1..10).to_string(), "at");
        assert!(t.subsection(5..10).is_empty());
    }

    #[test]
    fn punctuation_and_diacritics_can_be_removed() {
        let t = Transcription::parse("ˈpʰa.ta tʰa").unwrap();
        assert_eq!(t.remove_punctuation(true).to_string(), "pʰata tʰa");
        assert_eq!(t.remove_punctuation(false).to_string(), "pʰatatʰa");
        assert_eq!(t.strip_diacritics().to_string(), "ˈpa.ta ta");
    }
}
