//! Text cleaning for Russian support queries.

mod glossary;
mod morph;
mod normalizer;
mod stopwords;

pub use glossary::Glossary;
pub use morph::{Morphology, RussianMorph};
pub use normalizer::QueryNormalizer;
pub use stopwords::{StopwordClass, StopwordClasses};
