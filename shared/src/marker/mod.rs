pub mod keys;
mod marker_value;
mod vocabulary;

pub use marker_value::MarkerValue;
pub use vocabulary::{
    MarkerVocabulary, RecognizedMarker, VocabularyError, CURRENT_VOCABULARY_VERSION,
};
