use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::element::{PhoneticElement, StressType, SyllableConstituent};
use super::features::Feature;
use super::transcription::Transcription;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyllableStress {
    Primary,
    Secondary,
    Unstressed,
}

impl SyllableStress {
    pub fn symbol(self) -> char {
        match self {
            Self::Primary => '1',
            Self::Secondary => '2',
            Self::Unstressed => 'U',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Primary => "Primary",
            Self::Secondary => "Secondary",
            Self::Unstressed => "Unstressed",
        }
    }
}

impl From<StressType> for SyllableStress {
    fn from(stress: StressType) -> Self {
        match stress {
            StressType::Primary => Self::Primary,
            StressType::Secondary => Self::Secondary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Syllable {
    /// Element range, including a leading stress marker when present.
    pub range: Range<usize>,
    pub stress: SyllableStress,
    pub word_index: usize,
}

struct Pending {
    start: usize,
    end: usize,
    stress: SyllableStress,
    has_phone: bool,
    has_nucleus: bool,
    after_nucleus: bool,
}

impl Pending {
    fn new(start: usize, stress: SyllableStress) -> Self {
        Self {
            start,
            end: start,
            stress,
            has_phone: false,
            has_nucleus: false,
            after_nucleus: false,
        }
    }
}

impl Transcription {
    /// Split into syllables.
    ///
    /// A syllable ends at a syllable boundary, stress marker, word
    /// boundary or pause, and before a syllable-initial constituent or a
    /// new nucleus once a nucleus has been seen.
    pub fn syllables(&self) -> Vec<Syllable> {
        let mut out = Vec::new();
        let mut pending: Option<Pending> = None;
        let mut word_index = 0;
        let mut word_has_content = false;

        let mut flush = |pending: &mut Option<Pending>, word_index: usize| {
            if let Some(p) = pending.take() {
                if p.has_phone {
                    out.push(Syllable {
                        range: p.start..p.end,
                        stress: p.stress,
                        word_index,
                    });
                }
            }
        };

        for (i, el) in self.elements().iter().enumerate() {
            match el {
                PhoneticElement::WordBoundary | PhoneticElement::Pause(_) => {
                    flush(&mut pending, word_index);
                    if word_has_content {
                        word_index += 1;
                        word_has_content = false;
                    }
                }
                PhoneticElement::SyllableBoundary => {
                    flush(&mut pending, word_index);
                    word_has_content = true;
                }
                PhoneticElement::StressMarker(stress) => {
                    flush(&mut pending, word_index);
                    pending = Some(Pending::new(i, (*stress).into()));
                    word_has_content = true;
                }
                PhoneticElement::Phone(phone) => {
                    let constituent = phone.constituent();
                    let breaks = pending.as_ref().is_some_and(|p| {
                        p.has_nucleus
                            && (constituent.starts_syllable()
                                || (constituent == SyllableConstituent::Nucleus && !p.after_nucleus))
                    });
                    if breaks {
                        flush(&mut pending, word_index);
                    }
                    let p = pending.get_or_insert_with(|| Pending::new(i, SyllableStress::Unstressed));
                    p.end = i + 1;
                    p.has_phone = true;
                    p.after_nucleus = constituent == SyllableConstituent::Nucleus;
                    p.has_nucleus |= p.after_nucleus;
                    word_has_content = true;
                }
            }
        }
        flush(&mut pending, word_index);
        out
    }

    /// Per-syllable stress symbols, `-` between syllables and a space between words.
    pub fn stress_pattern(&self) -> String {
        let mut out = String::new();
        let mut last_word = None;
        for syllable in self.syllables() {
            match last_word {
                Some(word) if word == syllable.word_index => out.push('-'),
                Some(_) => out.push(' '),
                None => {}
            }
            out.push(syllable.stress.symbol());
            last_word = Some(syllable.word_index);
        }
        out
    }

    /// Rendering with `:X` constituent ids after each phone.
    ///
    /// Adjacent nuclei in one syllable are marked as diphthong members (`D`).
    pub fn syllabified(&self) -> String {
        let mut diphthong = vec![false; self.len()];
        for syllable in self.syllables() {
            let nuclei: Vec<usize> = syllable
                .range
                .clone()
                .filter(|i| {
                    self.phone(*i)
                        .is_some_and(|p| p.constituent() == SyllableConstituent::Nucleus)
                })
                .collect();
            for pair in nuclei.windows(2) {
                if pair[1] == pair[0] + 1 {
                    diphthong[pair[0]] = true;
                    diphthong[pair[1]] = true;
                }
            }
        }

        let mut out = String::new();
        for (i, el) in self.elements().iter().enumerate() {
            out.push_str(&el.to_string());
            if let Some(phone) = el.as_phone() {
                out.push(':');
                out.push(if diphthong[i] {
                    'D'
                } else {
                    phone.constituent().id_char()
                });
            }
        }
        out
    }
}

/// Default constituent assignment for transcriptions without `:X` annotations.
///
/// Vowels are nuclei; consonants before the first vowel of a word are
/// onsets and after the last are codas. Medial clusters split at an
/// explicit boundary when present, otherwise the final consonant (or an
/// obstruent plus liquid/glide pair) becomes the next onset.
pub(crate) fn assign_constituents(elements: &mut [PhoneticElement]) {
    let mut start = 0;
    for i in 0..=elements.len() {
        if i == elements.len() || elements[i].is_word_break() {
            assign_word(&mut elements[start..i]);
            start = i + 1;
        }
    }
}

fn assign_word(word: &mut [PhoneticElement]) {
    let vowels: Vec<usize> = word
        .iter()
        .enumerate()
        .filter(|(_, el)| el.as_phone().is_some_and(|p| p.is_vowel()))
        .map(|(i, _)| i)
        .collect();
    let (Some(&first), Some(&last)) = (vowels.first(), vowels.last()) else {
        return;
    };

    let mut roles = vec![None; word.len()];
    for &v in &vowels {
        roles[v] = Some(SyllableConstituent::Nucleus);
    }
    for (i, el) in word.iter().enumerate() {
        if el.is_phone() && roles[i].is_none() && (i < first || i > last) {
            roles[i] = Some(if i < first {
                SyllableConstituent::Onset
            } else {
                SyllableConstituent::Coda
            });
        }
    }

    for pair in vowels.windows(2) {
        let (left, right) = (pair[0], pair[1]);
        let cluster: Vec<usize> = (left + 1..right).filter(|i| word[*i].is_phone()).collect();
        if cluster.is_empty() {
            continue;
        }
        let explicit_break = (left + 1..right).find(|i| word[*i].is_transparent());
        let onset_from = match explicit_break {
            Some(b) => b,
            None => {
                let n = cluster.len();
                let rising = n >= 2 && {
                    let first = word[cluster[n - 2]].as_phone();
                    let second = word[cluster[n - 1]].as_phone();
                    first.is_some_and(|p| p.features().contains(Feature::Obstruent))
                        && second.is_some_and(|p| {
                            let f = p.features();
                            f.contains(Feature::Lateral) || f.contains(Feature::Rhotic) || p.is_glide()
                        })
                };
                cluster[if rising { n - 2 } else { n - 1 }]
            }
        };
        for &c in &cluster {
            roles[c] = Some(if c >= onset_from {
                SyllableConstituent::Onset
            } else {
                SyllableConstituent::Coda
            });
        }
    }

    for (el, role) in word.iter_mut().zip(roles) {
        if let (PhoneticElement::Phone(phone), Some(role)) = (el, role) {
            phone.set_constituent(role);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipa::element::SyllableConstituent as SC;

    fn roles(t: &Transcription) -> String {
        t.phones().map(|(_, p)| p.constituent().id_char()).collect()
    }

    #[test]
    fn medial_consonant_becomes_onset() {
        let t = Transcription::parse("bʌtə").unwrap();
        assert_eq!(roles(&t), "ONON");
        let syllables = t.syllables();
        assert_eq!(syllables.len(), 2);
        assert_eq!(syllables[1].range, 2..4);
    }

    #[test]
    fn obstruent_liquid_cluster_stays_together() {
        let t = Transcription::parse("əpli").unwrap();
        assert_eq!(roles(&t), "NOON");
        let t = Transcription::parse("æsk").unwrap();
        assert_eq!(roles(&t), "NCC");
    }

    #[test]
    fn explicit_boundary_splits_cluster() {
        let t = Transcription::parse("kæm.pɪŋ").unwrap();
        assert_eq!(roles(&t), "ONCONC");
        assert_eq!(t.syllables().len(), 2);
    }

    #[test]
    fn stress_markers_start_syllables() {
        let t = Transcription::parse("ˌbʌˈtə kæt").unwrap();
        let syllables = t.syllables();
        assert_eq!(syllables.len(), 3);
        assert_eq!(syllables[0].stress, SyllableStress::Secondary);
        assert_eq!(syllables[1].stress, SyllableStress::Primary);
        assert_eq!(syllables[1].range, 3..6);
        assert_eq!(syllables[2].word_index, 1);
        assert_eq!(t.stress_pattern(), "2-1 U");
    }

    #[test]
    fn syllabified_marks_diphthongs() {
        let t = Transcription::parse("bɑɪ").unwrap();
        assert_eq!(t.syllabified(), "b:Oɑ:Dɪ:D");
        assert_eq!(t.syllables().len(), 1);
        assert_eq!(t.phone(0).unwrap().constituent(), SC::Onset);
    }
}
