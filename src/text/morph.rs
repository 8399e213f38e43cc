//! Word normalization for stopword matching.
//!
//! Stopword filtering has to match inflected Russian forms ("менеджера",
//! "подскажите") against their dictionary entries. A Snowball stem is a
//! good-enough canonical form for most of the vocabulary; the handful of
//! suppletive and highly irregular forms that stem differently from their
//! infinitive get mapped through an explicit table first.

use std::collections::HashMap;

use rust_stemmers::{Algorithm, Stemmer};

/// Maps a single lowercase token to a canonical form.
///
/// Two tokens that are inflections of the same word must map to the same
/// string; the string itself carries no other meaning.
pub trait Morphology: Send + Sync {
    fn normal_form(&self, token: &str) -> String;
}

/// Irregular forms whose stem does not line up with their base word's stem.
const IRREGULAR_FORMS: &[(&str, &str)] = &[
    ("подскажи", "подсказать"),
    ("подскажите", "подсказать"),
    ("подскажете", "подсказать"),
    ("хочу", "хотеть"),
    ("хочешь", "хотеть"),
    ("хочет", "хотеть"),
    ("хотим", "хотеть"),
    ("хотите", "хотеть"),
    ("хотят", "хотеть"),
    ("помоги", "помогать"),
    ("помогите", "помогать"),
    ("помочь", "помогать"),
    ("прошу", "просить"),
    ("требуется", "требовать"),
    ("требуются", "требовать"),
    ("нужен", "нужно"),
    ("мне", "я"),
    ("мной", "я"),
    ("мною", "я"),
];

/// Snowball-based normalizer for Russian with an irregular-forms table.
pub struct RussianMorph {
    stemmer: Stemmer,
    irregular: HashMap<&'static str, &'static str>,
}

impl RussianMorph {
    pub fn new() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::Russian),
            irregular: IRREGULAR_FORMS.iter().copied().collect(),
        }
    }
}

impl Default for RussianMorph {
    fn default() -> Self {
        Self::new()
    }
}

impl Morphology for RussianMorph {
    fn normal_form(&self, token: &str) -> String {
        let base = self.irregular.get(token).copied().unwrap_or(token);
        self.stemmer.stem(base).into_owned()
    }
}
