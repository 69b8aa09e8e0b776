use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CURRENCY: &str = "EUR";
pub const DEFAULT_LOCALE: &str = "es-ES";

/// Every amount is printed with two decimals, whatever the currency.
pub const AMOUNT_PRECISION: u8 = 2;

const NBSP: char = '\u{a0}';
const NARROW_NBSP: char = '\u{202f}';

/// ISO 4217 currency representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SymbolPosition {
    Prefix,
    Suffix,
}

/// Locale-aware number and symbol conventions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocaleConfig {
    pub language_tag: String,
    pub decimal_separator: char,
    pub grouping_separator: char,
    /// Integer digits required before grouping kicks in (Spanish skips `1.234`).
    pub min_grouping_digits: usize,
    pub symbol_position: SymbolPosition,
    pub symbol_spaced: bool,
}

impl LocaleConfig {
    fn preset(
        tag: &str,
        decimal_separator: char,
        grouping_separator: char,
        min_grouping_digits: usize,
        symbol_position: SymbolPosition,
        symbol_spaced: bool,
    ) -> Self {
        Self {
            language_tag: tag.into(),
            decimal_separator,
            grouping_separator,
            min_grouping_digits,
            symbol_position,
            symbol_spaced,
        }
    }

    /// Resolves a BCP 47 tag, falling back to the language and then to `en-US`.
    pub fn for_tag(tag: &str) -> Self {
        let wanted = tag.trim().replace('_', "-").to_ascii_lowercase();
        if let Some(found) = PRESETS.get(wanted.as_str()) {
            return found.clone();
        }
        let language = primary_language(&wanted);
        PRESETS
            .values()
            .filter(|preset| primary_language(&preset.language_tag) == language)
            .min_by(|a, b| a.language_tag.cmp(&b.language_tag))
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self::preset("en-US", '.', ',', 1, SymbolPosition::Prefix, false)
    }
}

static PRESETS: Lazy<HashMap<String, LocaleConfig>> = Lazy::new(|| {
    use SymbolPosition::{Prefix, Suffix};
    [
        LocaleConfig::preset("es-ES", ',', '.', 2, Suffix, true),
        LocaleConfig::preset("de-DE", ',', '.', 1, Suffix, true),
        LocaleConfig::preset("fr-FR", ',', NARROW_NBSP, 1, Suffix, true),
        LocaleConfig::preset("it-IT", ',', '.', 1, Suffix, true),
        LocaleConfig::preset("pt-BR", ',', '.', 1, Prefix, true),
        LocaleConfig::preset("en-GB", '.', ',', 1, Prefix, false),
        LocaleConfig::default(),
    ]
    .into_iter()
    .map(|preset| (preset.language_tag.to_ascii_lowercase(), preset))
    .collect()
});

/// Lowercased language subtag of a locale tag (`es-ES` → `es`).
pub fn primary_language(tag: &str) -> String {
    tag.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

pub fn symbol_for(code: &str) -> String {
    match code {
        "USD" => "$".into(),
        "EUR" => "€".into(),
        "GBP" => "£".into(),
        "JPY" => "¥".into(),
        "MXN" => "MX$".into(),
        "CHF" => "CHF".into(),
        _ => code.into(),
    }
}

pub fn format_number(locale: &LocaleConfig, value: f64, precision: u8) -> String {
    let body = format!("{:.*}", precision as usize, value);
    let (int_part, fraction) = match body.split_once('.') {
        Some((int_part, fraction)) => (int_part, Some(fraction)),
        None => (body.as_str(), None),
    };
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", int_part),
    };
    let grouped = if digits.len() > 3 && digits.len() >= 3 + locale.min_grouping_digits {
        group_digits(digits, locale.grouping_separator)
    } else {
        digits.to_string()
    };
    match fraction {
        Some(fraction) => format!("{sign}{grouped}{}{fraction}", locale.decimal_separator),
        None => format!("{sign}{grouped}"),
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}

/// Formats amounts in one fixed currency following a viewer locale.
#[derive(Debug, Clone)]
pub struct CurrencyFormatter {
    code: CurrencyCode,
    locale: LocaleConfig,
}

impl CurrencyFormatter {
    pub fn new(code: CurrencyCode, locale_tag: &str) -> Self {
        Self {
            code,
            locale: LocaleConfig::for_tag(locale_tag),
        }
    }

    pub fn for_locale(locale_tag: &str) -> Self {
        Self::new(CurrencyCode::default(), locale_tag)
    }

    pub fn code(&self) -> &CurrencyCode {
        &self.code
    }

    pub fn locale(&self) -> &LocaleConfig {
        &self.locale
    }

    /// Non-finite amounts are rendered as zero.
    pub fn format(&self, amount: f64) -> String {
        let amount = if amount.is_finite() { amount } else { 0.0 };
        let body = format_number(&self.locale, amount.abs(), AMOUNT_PRECISION);
        let negative = amount < 0.0 && body.chars().any(|ch| ch.is_ascii_digit() && ch != '0');
        let sign = if negative { "-" } else { "" };
        let symbol = symbol_for(self.code.as_str());
        let gap = if self.locale.symbol_spaced {
            NBSP.to_string()
        } else {
            String::new()
        };
        match self.locale.symbol_position {
            SymbolPosition::Prefix => format!("{sign}{symbol}{gap}{body}"),
            SymbolPosition::Suffix => format!("{sign}{body}{gap}{symbol}"),
        }
    }

    pub fn format_opt(&self, amount: Option<f64>) -> String {
        self.format(amount.unwrap_or(0.0))
    }
}

impl Default for CurrencyFormatter {
    fn default() -> Self {
        Self::for_locale(DEFAULT_LOCALE)
    }
}

/// One-shot formatting in the default currency.
pub fn format_currency(amount: f64, locale_tag: &str) -> String {
    CurrencyFormatter::for_locale(locale_tag).format(amount)
}
