//! Phonetic transcription model: elements, parsing, syllables and alignment.

pub mod alignment;
pub mod cover;
pub mod element;
pub mod features;
pub mod parser;
pub mod syllables;
pub mod transcription;

pub use alignment::{AlignedPair, PhoneAlignment};
pub use cover::SymbolMap;
pub use element::{PauseLength, Phone, PhoneticElement, StressType, SyllableConstituent};
pub use features::{Feature, FeatureSet, FeatureTable};
pub use parser::IpaParser;
pub use syllables::{Syllable, SyllableStress};
pub use transcription::Transcription;
