//! Stopword classes removed from user queries.
//!
//! Queries arrive wrapped in conversational noise (greetings, politeness
//! formulas, self-introductions, generic request verbs) that carries no
//! retrieval signal and drags embedding similarity toward other noisy
//! queries. Each class below lists dictionary forms; matching happens on
//! normal forms so that inflections are caught too.

use std::collections::HashSet;

use super::morph::Morphology;

const GREETING_WORDS: &[&str] = &[
    "здравствуйте",
    "здравствуй",
    "привет",
    "приветствую",
    "добрый",
    "день",
    "утро",
    "вечер",
    "ночь",
    "дд",
];

const POLITE_WORDS: &[&str] = &[
    "пожалуйста",
    "пож",
    "будь",
    "добрый",
    "спасибо",
    "благодарю",
    "прошу",
    "спс",
    "плиз",
    "плз",
];

const SELF_INTRO_WORDS: &[&str] = &["я", "меня", "зовут", "будучи", "являюсь"];

const QUESTION_WORDS: &[&str] = &["как", "где", "какой"];

const REQUEST_VERBS: &[&str] = &[
    "хотеть",
    "просить",
    "помогать",
    "надо",
    "нужно",
    "требовать",
    "просьба",
    "возможность",
    "необходимо",
    "подсказать",
];

const ROLE_WORDS: &[&str] = &[
    "bp",
    "менеджер",
    "руководитель",
    "работник",
    "начальник",
    "администратор",
    "должность",
];

const PROFANITY_WORDS: &[&str] = &[
    "блять",
    "бля",
    "сука",
    "пиздец",
    "хуй",
    "нахуй",
    "хрен",
    "нахрен",
    "хуйня",
    "пизда",
    "ебать",
    "ебанина",
    "заебал",
    "заебало",
];

/// Which class a stopword belongs to. Only used for logging; membership in
/// any class removes the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopwordClass {
    Greeting,
    Politeness,
    SelfIntro,
    Question,
    RequestVerb,
    Role,
    Profanity,
}

/// All stopword classes, pre-normalized for membership tests.
pub struct StopwordClasses {
    greetings: HashSet<String>,
    politeness: HashSet<String>,
    self_intro: HashSet<String>,
    question_words: HashSet<String>,
    request_verbs: HashSet<String>,
    roles: HashSet<String>,
    profanity: HashSet<String>,
}

impl StopwordClasses {
    /// Build the classes, running every dictionary entry through the same
    /// normalizer that will be applied to query tokens.
    pub fn new(morph: &dyn Morphology) -> Self {
        let normalize =
            |words: &[&str]| words.iter().map(|w| morph.normal_form(w)).collect::<HashSet<_>>();

        Self {
            greetings: normalize(GREETING_WORDS),
            politeness: normalize(POLITE_WORDS),
            self_intro: normalize(SELF_INTRO_WORDS),
            question_words: normalize(QUESTION_WORDS),
            request_verbs: normalize(REQUEST_VERBS),
            roles: normalize(ROLE_WORDS),
            profanity: normalize(PROFANITY_WORDS),
        }
    }

    /// Class of an already-normalized form, if it is a stopword at all.
    pub fn class_of(&self, normal_form: &str) -> Option<StopwordClass> {
        if self.greetings.contains(normal_form) {
            Some(StopwordClass::Greeting)
        } else if self.politeness.contains(normal_form) {
            Some(StopwordClass::Politeness)
        } else if self.self_intro.contains(normal_form) {
            Some(StopwordClass::SelfIntro)
        } else if self.question_words.contains(normal_form) {
            Some(StopwordClass::Question)
        } else if self.request_verbs.contains(normal_form) {
            Some(StopwordClass::RequestVerb)
        } else if self.profanity.contains(normal_form) {
            Some(StopwordClass::Profanity)
        } else if self.roles.contains(normal_form) {
            Some(StopwordClass::Role)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::morph::RussianMorph;

    fn classes() -> (RussianMorph, StopwordClasses) {
        let morph = RussianMorph::new();
        let classes = StopwordClasses::new(&morph);
        (morph, classes)
    }

    #[test]
    fn classifies_dictionary_forms() {
        let (morph, classes) = classes();
        assert_eq!(
            classes.class_of(&morph.normal_form("привет")),
            Some(StopwordClass::Greeting)
        );
        assert_eq!(
            classes.class_of(&morph.normal_form("спс")),
            Some(StopwordClass::Politeness)
        );
        assert_eq!(
            classes.class_of(&morph.normal_form("как")),
            Some(StopwordClass::Question)
        );
        assert_eq!(
            classes.class_of(&morph.normal_form("bp")),
            Some(StopwordClass::Role)
        );
    }

    #[test]
    fn classifies_inflected_forms() {
        let (morph, classes) = classes();
        assert_eq!(
            classes.class_of(&morph.normal_form("менеджера")),
            Some(StopwordClass::Role)
        );
        assert_eq!(
            classes.class_of(&morph.normal_form("подскажите")),
            Some(StopwordClass::RequestVerb)
        );
        assert_eq!(
            classes.class_of(&morph.normal_form("хочу")),
            Some(StopwordClass::RequestVerb)
        );
    }

    #[test]
    fn content_words_are_not_stopwords() {
        let (morph, classes) = classes();
        assert_eq!(classes.class_of(&morph.normal_form("отпуск")), None);
        assert_eq!(classes.class_of(&morph.normal_form("зарплата")), None);
        assert_eq!(classes.class_of(&morph.normal_form("оформить")), None);
    }
}
