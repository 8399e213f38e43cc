//! Internal-jargon glossary.
//!
//! Queries are full of HR shorthand ("зп", "тк", "лк") while the indexed
//! corpus spells things out. Expanding abbreviations before embedding pulls
//! both onto the same vocabulary. Expansion is whole-word and
//! case-insensitive, applied in declaration order; an expansion may itself
//! contain words that a later entry matches, which is accepted.

use std::collections::HashMap;

use regex::Regex;

/// Abbreviation -> full form, in application order.
const STANDARD_ENTRIES: &[(&str, &str)] = &[
    ("лк", "личный кабинет"),
    ("бир", "беременность и роды"),
    ("зп", "заработная плата"),
    ("ндфл", "налог на доходы физических лиц"),
    ("стд", "срочный трудовой договор"),
    ("тк", "трудовой договор"),
    ("ао", "авансовый отчет"),
    ("sla", "сроки"),
    ("эцп", "электронная цифровая подпись"),
    ("кр", "кадровый резерв"),
    ("сфр", "социальный фонд россии"),
    ("мчд", "машиночитаемая доверенность"),
    ("дк", "директор кластера"),
    ("тел", "телефон"),
    ("адм", "административный кадровый резерв"),
    ("мс", "мастер-система"),
    ("орг", "организационная структура"),
    ("дмп", "директор магазина по продажам"),
    ("комп", "компьютер"),
    ("атз", "администратор торгового зала"),
    ("дм", "директор магазина"),
    ("мп", "мобильное приложение"),
    ("уз", "учетная запись"),
    ("чаэс", "чернобыльская атомная электростанция"),
    ("мкс", "местность, приравненная к районам крайнего севера"),
    ("ркс", "район крайнего севера"),
    ("нрд", "ненормированный рабочий день"),
    ("доп", "дополнительный"),
    ("гос", "государственный"),
    ("lk", "личный кабинет"),
    ("бл", "больничный лист"),
    ("ду", "дежурный управляющий"),
    ("лтз", "администратор торгового зала"),
    ("тех", "технический"),
    ("сот", "система оценок труда"),
    ("асуз", "автоматизированная система учёта и записи"),
    ("скилаз", "система для автоматизации найма и развития талантов"),
    ("skillz", "система для автоматизации найма и развития талантов"),
    ("скиллаз", "система для автоматизации найма и развития талантов"),
    ("skillaz", "система для автоматизации найма и развития талантов"),
    ("здм", "заместитель директора магазина"),
    ("эп", "электронная подпись"),
    ("пк", "персональный консультант"),
    ("пб", "платежная база"),
    ("сф", "система финансов"),
    ("трв", "табель рабочего времени"),
    ("есп", "единая система приемки"),
    ("рц", "распределительный центр"),
    ("бс", "больничный лист"),
    ("скд", "система корпоративных документов"),
    ("sap", "корпоративная система для управления ресурсами и бизнес-процессами"),
    ("сб", "социальная безопасность"),
    ("атп", "автотранспортное предприятие"),
    ("ур", "удаленная работа"),
    ("дс", "дополнительное соглашение"),
    ("уд", "удаленный"),
    ("укэп", "усиленная квалифицированная электронная подпись"),
    ("унэп", "усиленная неквалифицированна электронная подпись"),
    ("фл", "физическое лицо"),
    ("юл", "юридическое лицо"),
    ("sed", "система электронного документооборота"),
    ("мед", "медицинский"),
    ("дмс", "добровольное медицинское страхование"),
];

pub struct Glossary {
    entries: Vec<(Regex, String)>,
}

impl Glossary {
    pub fn new() -> anyhow::Result<Self> {
        Self::from_entries(STANDARD_ENTRIES)
    }

    /// Build from `(abbreviation, full form)` pairs. A repeated abbreviation
    /// keeps its first position but takes the later expansion.
    pub fn from_entries(entries: &[(&str, &str)]) -> anyhow::Result<Self> {
        let mut positions: HashMap<&str, usize> = HashMap::new();
        let mut ordered: Vec<(&str, &str)> = Vec::with_capacity(entries.len());
        for &(abbreviation, full_form) in entries {
            match positions.get(abbreviation) {
                Some(&idx) => {
                    tracing::warn!(
                        "Duplicate glossary key '{}', the later expansion wins",
                        abbreviation
                    );
                    ordered[idx].1 = full_form;
                }
                None => {
                    positions.insert(abbreviation, ordered.len());
                    ordered.push((abbreviation, full_form));
                }
            }
        }

        let mut compiled = Vec::with_capacity(ordered.len());
        for (abbreviation, full_form) in ordered {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(abbreviation));
            compiled.push((Regex::new(&pattern)?, full_form.to_string()));
        }
        Ok(Self { entries: compiled })
    }

    /// Expand every known abbreviation in `text`.
    pub fn expand(&self, text: &str) -> String {
        let mut expanded = text.to_string();
        for (pattern, full_form) in &self.entries {
            expanded = pattern.replace_all(&expanded, full_form.as_str()).into_owned();
        }
        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_whole_words_only() {
        let glossary = Glossary::new().unwrap();
        assert_eq!(glossary.expand("зп"), "заработная плата");
        assert_eq!(glossary.expand("озп не трогаем"), "озп не трогаем");
        assert_eq!(
            glossary.expand("вопрос про зп и лк"),
            "вопрос про заработная плата и личный кабинет"
        );
    }

    #[test]
    fn punctuation_counts_as_a_boundary() {
        let glossary = Glossary::new().unwrap();
        assert_eq!(
            glossary.expand("по тк, пожалуйста"),
            "по трудовой договор, пожалуйста"
        );
    }

    #[test]
    fn matching_ignores_case() {
        let glossary = Glossary::new().unwrap();
        assert_eq!(glossary.expand("Зп"), "заработная плата");
        assert_eq!(glossary.expand("SAP доступ"), glossary.expand("sap доступ"));
    }

    #[test]
    fn latin_keys_expand_too() {
        let glossary = Glossary::new().unwrap();
        assert_eq!(glossary.expand("lk"), "личный кабинет");
        assert_eq!(
            glossary.expand("доступ к skillaz"),
            "доступ к система для автоматизации найма и развития талантов"
        );
    }

    #[test]
    fn later_duplicate_key_wins() {
        let glossary =
            Glossary::from_entries(&[("аб", "первая форма"), ("аб", "вторая форма")]).unwrap();
        assert_eq!(glossary.expand("аб"), "вторая форма");
    }
}
