//! Query cleaning pipeline.
//!
//! Raw chat messages are noisy: greetings, politeness formulas, employee
//! numbers, masked contact data, internal abbreviations. Retrieval works on
//! a cleaned form of the query, produced here in a fixed order:
//!
//! 1. lowercase and trim
//! 2. mask e-mail addresses as `MAIL`
//! 3. mask links as `LINK`
//! 4. mask the UI's phone placeholder as `PHONE`
//! 5. strip employee-number phrases
//! 6. collapse whitespace
//! 7. expand glossary abbreviations
//! 8. split on punctuation and whitespace
//! 9. drop stopword tokens (matched on normal forms)
//! 10. re-join with single spaces
//!
//! The mask tokens stay uppercase so they cannot collide with real words.

use std::sync::Arc;

use regex::Regex;

use super::glossary::Glossary;
use super::morph::{Morphology, RussianMorph};
use super::stopwords::StopwordClasses;

pub struct QueryNormalizer {
    email: Regex,
    link: Regex,
    phone: Regex,
    employee_ids: [Regex; 3],
    delimiters: Regex,
    glossary: Glossary,
    stopwords: StopwordClasses,
    morph: Arc<dyn Morphology>,
}

impl QueryNormalizer {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_morph(Arc::new(RussianMorph::new()))
    }

    pub fn with_morph(morph: Arc<dyn Morphology>) -> anyhow::Result<Self> {
        let stopwords = StopwordClasses::new(morph.as_ref());
        Ok(Self {
            email: Regex::new(r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+")?,
            link: Regex::new(r"https?://[^\s]+|www\.[^\s]+")?,
            phone: Regex::new(r"\+7 \(xxx\) xxx xx xx")?,
            employee_ids: [
                Regex::new(r"табельный номер \d+")?,
                Regex::new(r"тн \d+")?,
                Regex::new(r"№ \d+")?,
            ],
            delimiters: Regex::new(r"[.,!?;:()\[\]{}/-]")?,
            glossary: Glossary::new()?,
            stopwords,
            morph,
        })
    }

    /// Clean one raw query. The result may be empty when the query carried
    /// no content words at all.
    pub fn normalize(&self, raw: &str) -> String {
        let mut text = raw.to_lowercase().trim().to_string();

        text = self.email.replace_all(&text, "MAIL").into_owned();
        text = self.link.replace_all(&text, "LINK").into_owned();
        text = self.phone.replace_all(&text, "PHONE").into_owned();
        for pattern in &self.employee_ids {
            text = pattern.replace_all(&text, "").into_owned();
        }

        let text = collapse_whitespace(&text);
        let text = self.glossary.expand(&text);

        let kept: Vec<&str> = self
            .tokenize(&text)
            .into_iter()
            .filter(|token| !self.is_stopword(token))
            .collect();

        kept.join(" ")
    }

    fn tokenize<'a>(&self, text: &'a str) -> Vec<&'a str> {
        self.delimiters
            .split(text)
            .flat_map(str::split_whitespace)
            .collect()
    }

    fn is_stopword(&self, token: &str) -> bool {
        let normal = self.morph.normal_form(token);
        self.stopwords.class_of(&normal).is_some()
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> QueryNormalizer {
        QueryNormalizer::new().unwrap()
    }

    #[test]
    fn cleans_a_typical_support_query() {
        let n = normalizer();
        assert_eq!(
            n.normalize("Привет, подскажите как оформить зп за январь? тн 12345"),
            "оформить заработная плата за январь"
        );
    }

    #[test]
    fn masks_email_addresses() {
        let n = normalizer();
        let cleaned = n.normalize("напишите на support@example.com");
        assert!(cleaned.contains("MAIL"));
        assert!(!cleaned.contains("example.com"));
        assert!(!cleaned.contains('@'));
    }

    #[test]
    fn masks_links_before_tokenization() {
        let n = normalizer();
        // The slash in a URL would otherwise be split as a delimiter.
        assert_eq!(
            n.normalize("инструкция тут https://wiki.corp/page"),
            "инструкция тут LINK"
        );
        assert_eq!(n.normalize("см. www.example.com/faq"), "см LINK");
    }

    #[test]
    fn masks_the_phone_placeholder() {
        let n = normalizer();
        assert_eq!(
            n.normalize("перезвоните на +7 (xxx) xxx xx xx"),
            "перезвоните на PHONE"
        );
    }

    #[test]
    fn strips_employee_numbers() {
        let n = normalizer();
        assert_eq!(n.normalize("мой табельный номер 445566"), "мой");
        assert_eq!(n.normalize("тн 9 не работает"), "не работает");
        assert_eq!(n.normalize("заявление № 123 потерялось"), "заявление потерялось");
    }

    #[test]
    fn expands_abbreviations_as_whole_words() {
        let n = normalizer();
        assert_eq!(n.normalize("лк"), "личный кабинет");
        assert_eq!(n.normalize("блкй"), "блкй");
    }

    #[test]
    fn drops_greetings_and_question_words() {
        let n = normalizer();
        assert_eq!(n.normalize("привет как дела"), "дела");
        assert_eq!(n.normalize("Здравствуйте! Добрый день!"), "");
    }

    #[test]
    fn drops_inflected_role_words() {
        let n = normalizer();
        assert_eq!(n.normalize("менеджера интересует график"), "интересует график");
    }

    #[test]
    fn drops_profanity() {
        let n = normalizer();
        assert_eq!(n.normalize("где бля моя зарплата"), "моя зарплата");
    }

    #[test]
    fn empty_and_punctuation_only_input_comes_out_empty() {
        let n = normalizer();
        assert_eq!(n.normalize(""), "");
        assert_eq!(n.normalize("   "), "");
        assert_eq!(n.normalize("?!..,"), "");
    }

    #[test]
    fn cleaning_is_idempotent_for_already_clean_text() {
        let n = normalizer();
        for query in [
            "оформить заработная плата за январь",
            "оформить отпуск в сентябре",
        ] {
            let once = n.normalize(query);
            assert_eq!(n.normalize(&once), once);
        }
    }
}
