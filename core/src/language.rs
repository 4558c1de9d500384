//! Language codes and formality settings accepted by the DeepL API.
//!
//! # Design
//! `Language` is a closed enum: only codes DeepL documents are
//! representable, so an unsupported code is rejected while parsing instead of
//! by the server. The wire form is the upper-case code (`"DE"`, `"EN-GB"`),
//! which is also how the enum serializes.
//!
//! Detected source languages come from the server and are not limited to
//! the codes DeepL accepts as input, so they decode into `DetectedLanguage`,
//! which keeps codes outside `Language` as raw strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Returned when a string is not one of the supported language codes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown language code: {0:?}")]
pub struct UnknownLanguage(pub String);

macro_rules! languages {
    ($($(#[$doc:meta])* $variant:ident => $code:literal,)+) => {
        /// A language supported by the translation endpoints.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Language {
            $($(#[$doc])* $variant,)+
        }

        impl Language {
            /// Every supported language, in wire-code order.
            pub const ALL: &'static [Language] = &[$(Language::$variant,)+];

            /// The code sent on the wire.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Language::$variant => $code,)+
                }
            }
        }

        impl FromStr for Language {
            type Err = UnknownLanguage;

            /// Codes are matched ASCII case-insensitively.
            fn from_str(code: &str) -> Result<Self, Self::Err> {
                $(
                    if code.eq_ignore_ascii_case($code) {
                        return Ok(Language::$variant);
                    }
                )+
                Err(UnknownLanguage(code.to_string()))
            }
        }
    };
}

languages! {
    /// Bulgarian
    Bg => "BG",
    /// Czech
    Cs => "CS",
    /// Danish
    Da => "DA",
    /// German
    De => "DE",
    /// Greek
    El => "EL",
    /// English (unspecified variant)
    En => "EN",
    /// English (British)
    EnGb => "EN-GB",
    /// English (American)
    EnUs => "EN-US",
    /// Spanish
    Es => "ES",
    /// Estonian
    Et => "ET",
    /// Finnish
    Fi => "FI",
    /// French
    Fr => "FR",
    /// Hungarian
    Hu => "HU",
    /// Indonesian
    Id => "ID",
    /// Italian
    It => "IT",
    /// Japanese
    Ja => "JA",
    /// Lithuanian
    Lt => "LT",
    /// Latvian
    Lv => "LV",
    /// Dutch
    Nl => "NL",
    /// Polish
    Pl => "PL",
    /// Portuguese (all varieties mixed)
    Pt => "PT",
    /// Portuguese (Brazilian)
    PtBr => "PT-BR",
    /// Portuguese (European)
    PtPt => "PT-PT",
    /// Romanian
    Ro => "RO",
    /// Russian
    Ru => "RU",
    /// Slovak
    Sk => "SK",
    /// Slovenian
    Sl => "SL",
    /// Swedish
    Sv => "SV",
    /// Turkish
    Tr => "TR",
    /// Ukrainian
    Uk => "UK",
    /// Chinese
    Zh => "ZH",
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        code.parse().map_err(serde::de::Error::custom)
    }
}

/// Source language reported by the server for a translated segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DetectedLanguage {
    Known(Language),
    /// A code outside `Language`, kept as the server sent it.
    Other(String),
}

impl DetectedLanguage {
    pub fn as_str(&self) -> &str {
        match self {
            DetectedLanguage::Known(lang) => lang.as_str(),
            DetectedLanguage::Other(code) => code,
        }
    }

    pub fn language(&self) -> Option<Language> {
        match self {
            DetectedLanguage::Known(lang) => Some(*lang),
            DetectedLanguage::Other(_) => None,
        }
    }
}

impl From<Language> for DetectedLanguage {
    fn from(lang: Language) -> Self {
        DetectedLanguage::Known(lang)
    }
}

impl From<String> for DetectedLanguage {
    fn from(code: String) -> Self {
        match code.parse() {
            Ok(lang) => DetectedLanguage::Known(lang),
            Err(UnknownLanguage(code)) => DetectedLanguage::Other(code),
        }
    }
}

impl PartialEq<Language> for DetectedLanguage {
    fn eq(&self, other: &Language) -> bool {
        self.language() == Some(*other)
    }
}

impl fmt::Display for DetectedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DetectedLanguage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DetectedLanguage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(DetectedLanguage::from)
    }
}

/// Whether a translation should lean towards formal or informal language.
///
/// Only honoured by the server for a subset of target languages (DE, FR, IT,
/// ES, NL, PL, PT-PT, PT-BR, RU); others ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Formality {
    #[default]
    Default,
    More,
    Less,
}

impl Formality {
    pub fn as_str(self) -> &'static str {
        match self {
            Formality::Default => "default",
            Formality::More => "more",
            Formality::Less => "less",
        }
    }
}

impl fmt::Display for Formality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_language_roundtrips_through_its_wire_code() {
        for &lang in Language::ALL {
            assert_eq!(lang.as_str().parse::<Language>(), Ok(lang), "{lang}");
        }
    }

    #[test]
    fn wire_codes_are_unique() {
        let mut codes: Vec<&str> = Language::ALL.iter().map(|l| l.as_str()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), Language::ALL.len());
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("de".parse::<Language>(), Ok(Language::De));
        assert_eq!("pt-br".parse::<Language>(), Ok(Language::PtBr));
    }

    #[test]
    fn parse_empty_code_fails() {
        let err = "".parse::<Language>().unwrap_err();
        assert_eq!(err, UnknownLanguage(String::new()));
    }

    #[test]
    fn parse_unsupported_code_fails() {
        let err = "XX".parse::<Language>().unwrap_err();
        assert_eq!(err.0, "XX");
        assert_eq!(err.to_string(), "unknown language code: \"XX\"");
    }

    #[test]
    fn language_serializes_as_wire_code() {
        assert_eq!(serde_json::to_string(&Language::EnGb).unwrap(), r#""EN-GB""#);
        let lang: Language = serde_json::from_str(r#""JA""#).unwrap();
        assert_eq!(lang, Language::Ja);
    }

    #[test]
    fn deserializing_unknown_language_fails() {
        assert!(serde_json::from_str::<Language>(r#""KLINGON""#).is_err());
    }

    #[test]
    fn detected_language_keeps_codes_outside_the_enum() {
        let known: DetectedLanguage = serde_json::from_str(r#""de""#).unwrap();
        assert_eq!(known, DetectedLanguage::Known(Language::De));
        assert_eq!(known, Language::De);
        assert_eq!(known.to_string(), "DE");

        let other: DetectedLanguage = serde_json::from_str(r#""KO""#).unwrap();
        assert_eq!(other, DetectedLanguage::Other("KO".to_string()));
        assert_eq!(other.language(), None);
        assert_eq!(serde_json::to_string(&other).unwrap(), r#""KO""#);
    }

    #[test]
    fn formality_wire_values_are_distinct() {
        assert_eq!(Formality::Default.as_str(), "default");
        assert_eq!(Formality::More.as_str(), "more");
        assert_eq!(Formality::Less.as_str(), "less");
    }
}
