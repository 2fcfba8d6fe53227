//! Card decks and the vote arithmetic built on top of them.
//!
//! A room is created with a [`CardConfig`] — either one of the preset
//! decks or a custom deck parsed from user input. The deck decides
//! which vote values are legal and how numeric votes average out.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

// ---------------------------------------------------------------------------
// Card / CardPreset / CardConfig
// ---------------------------------------------------------------------------

/// A single card in a deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Display value, e.g. `"5"`, `"XL"`, `"?"`.
    pub value: String,
    /// Value used for averaging. For non-numeric cards this is either 0
    /// or an ordering weight (T-shirt sizes) that is never averaged.
    pub numeric_value: i64,
    /// Whether this card participates in the numeric mean.
    pub is_numeric: bool,
}

impl Card {
    fn numeric(value: &str, numeric_value: i64) -> Self {
        Self {
            value: value.to_string(),
            numeric_value,
            is_numeric: true,
        }
    }

    fn symbolic(value: &str, weight: i64) -> Self {
        Self {
            value: value.to_string(),
            numeric_value: weight,
            is_numeric: false,
        }
    }
}

/// The predefined deck families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardPreset {
    Fibonacci,
    ModifiedFibonacci,
    TShirt,
    PowersOfTwo,
    Linear,
    Custom,
}

impl Default for CardPreset {
    fn default() -> Self {
        Self::Fibonacci
    }
}

/// The deck a room plays with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardConfig {
    pub preset: CardPreset,
    pub cards: Vec<Card>,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self::preset(CardPreset::Fibonacci)
    }
}

impl CardConfig {
    /// Builds the deck for a preset. `Custom` yields the default
    /// Fibonacci deck; custom decks come from [`CardConfig::custom`].
    pub fn preset(preset: CardPreset) -> Self {
        let cards = match preset {
            CardPreset::Fibonacci | CardPreset::Custom => fibonacci_cards(),
            CardPreset::ModifiedFibonacci => modified_fibonacci_cards(),
            CardPreset::TShirt => tshirt_cards(),
            CardPreset::PowersOfTwo => powers_of_two_cards(),
            CardPreset::Linear => linear_cards(),
        };
        Self { preset, cards }
    }

    /// Parses a comma-separated deck string into a custom config.
    ///
    /// Values are trimmed, control characters are stripped, duplicates
    /// are dropped, and the result must hold 2 to 15 cards of at most
    /// 10 characters each. A value that parses as an integer (leading
    /// minus allowed) becomes a numeric card.
    pub fn custom(input: &str) -> Result<Self, DomainError> {
        if input.trim().is_empty() {
            return Err(DomainError::EmptyCustomCards);
        }

        let mut cards: Vec<Card> = Vec::new();
        for part in input.split(',') {
            let value: String = part
                .trim()
                .chars()
                .filter(|c| !is_stripped_control(*c))
                .collect();
            if value.is_empty() {
                continue;
            }
            if value.chars().count() > 10 {
                return Err(DomainError::CardValueTooLong(value));
            }
            if cards.iter().any(|c| c.value == value) {
                continue;
            }
            let card = match parse_numeric_value(&value) {
                Some(n) => Card::numeric(&value, n),
                None => Card::symbolic(&value, 0),
            };
            cards.push(card);
        }

        if cards.len() < 2 {
            return Err(DomainError::TooFewCards(cards.len()));
        }
        if cards.len() > 15 {
            return Err(DomainError::TooManyCards(cards.len()));
        }

        Ok(Self {
            preset: CardPreset::Custom,
            cards,
        })
    }

    /// Looks up the card with the given display value.
    pub fn card(&self, value: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.value == value)
    }

    /// Rejects values that are not in this deck.
    pub fn validate_value(&self, value: &str) -> Result<(), DomainError> {
        if self.card(value).is_some() {
            Ok(())
        } else {
            Err(DomainError::InvalidCardValue(value.to_string()))
        }
    }

    /// Mean of the numeric cards among the given vote values.
    ///
    /// Non-numeric votes ("?", "☕", T-shirt sizes) are skipped.
    /// Returns `None` when no vote maps to a numeric card.
    pub fn numeric_mean<'a, I>(&self, values: I) -> Option<f64>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut sum = 0.0;
        let mut count = 0u32;
        for value in values {
            if let Some(card) = self.card(value) {
                if card.is_numeric {
                    sum += card.numeric_value as f64;
                    count += 1;
                }
            }
        }
        if count == 0 {
            None
        } else {
            Some(sum / f64::from(count))
        }
    }

    /// The numeric card whose value is closest to `mean`.
    ///
    /// A tie (mean exactly between two cards) resolves to the card with
    /// the lower numeric value.
    pub fn nearest_card(&self, mean: f64) -> Option<&Card> {
        let mut best: Option<&Card> = None;
        let mut best_diff = f64::INFINITY;
        for card in self.cards.iter().filter(|c| c.is_numeric) {
            let diff = (mean - card.numeric_value as f64).abs();
            let closer = diff < best_diff
                || (diff == best_diff
                    && best.is_some_and(|b| card.numeric_value < b.numeric_value));
            if closer {
                best_diff = diff;
                best = Some(card);
            }
        }
        best
    }
}

// ---------------------------------------------------------------------------
// Preset decks
// ---------------------------------------------------------------------------

const QUESTION: &str = "?";
const COFFEE: &str = "\u{2615}";

fn fibonacci_cards() -> Vec<Card> {
    let mut cards: Vec<Card> = [1, 2, 3, 5, 8, 13, 21]
        .iter()
        .map(|n| Card::numeric(&n.to_string(), *n))
        .collect();
    cards.push(Card::symbolic(QUESTION, 0));
    cards.push(Card::symbolic(COFFEE, 0));
    cards
}

fn modified_fibonacci_cards() -> Vec<Card> {
    let mut cards: Vec<Card> = [0, 1, 2, 3, 5, 8, 13, 20, 40, 100]
        .iter()
        .map(|n| Card::numeric(&n.to_string(), *n))
        .collect();
    cards.push(Card::symbolic(QUESTION, 0));
    cards.push(Card::symbolic(COFFEE, 0));
    cards
}

fn tshirt_cards() -> Vec<Card> {
    // Sizes carry ordering weights but never enter the numeric mean.
    let mut cards = vec![
        Card::symbolic("XS", 1),
        Card::symbolic("S", 2),
        Card::symbolic("M", 3),
        Card::symbolic("L", 5),
        Card::symbolic("XL", 8),
    ];
    cards.push(Card::symbolic(QUESTION, 0));
    cards.push(Card::symbolic(COFFEE, 0));
    cards
}

fn powers_of_two_cards() -> Vec<Card> {
    let mut cards: Vec<Card> = [1, 2, 4, 8, 16, 32]
        .iter()
        .map(|n| Card::numeric(&n.to_string(), *n))
        .collect();
    cards.push(Card::symbolic(QUESTION, 0));
    cards.push(Card::symbolic(COFFEE, 0));
    cards
}

fn linear_cards() -> Vec<Card> {
    let mut cards: Vec<Card> = (1..=10)
        .map(|n| Card::numeric(&n.to_string(), n))
        .collect();
    cards.push(Card::symbolic(QUESTION, 0));
    cards.push(Card::symbolic(COFFEE, 0));
    cards
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

/// Control characters removed from custom card values. Tab, LF and CR
/// survive only long enough to be trimmed off the ends.
fn is_stripped_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}' | '\u{7F}')
}

/// Parses an optionally-negative integer. Anything else, including
/// the special "?" and coffee cards, is non-numeric.
fn parse_numeric_value(value: &str) -> Option<i64> {
    if value == QUESTION || value == COFFEE {
        return None;
    }
    let digits = value.strip_prefix('-').unwrap_or(value);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    value.parse::<i64>().ok()
}

// ---------------------------------------------------------------------------
// Vote arithmetic over plain values
// ---------------------------------------------------------------------------

/// The most common value among `values`, which must already be in the
/// room's deterministic vote order. The first value to reach the
/// winning count wins a tie.
pub fn mode_value<'a, I>(values: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let values: Vec<&str> = values.into_iter().collect();
    if values.is_empty() {
        return None;
    }
    let mut best: Option<&str> = None;
    let mut best_count = 0usize;
    for (i, value) in values.iter().enumerate() {
        if values[..i].contains(value) {
            continue; // counted already at first occurrence
        }
        let count = values[i..].iter().filter(|&&v| v == *value).count();
        if count > best_count {
            best_count = count;
            best = Some(value);
        }
    }
    best.map(str::to_string)
}

/// Whether all cast values agree. Textual comparison, so two "?" votes
/// are consensus. An empty round never is.
pub fn has_consensus<'a, I>(values: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    let mut iter = values.into_iter();
    let Some(first) = iter.next() else {
        return false;
    };
    iter.all(|v| v == first)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_fibonacci_card_values() {
        let config = CardConfig::default();
        let values: Vec<&str> = config.cards.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, ["1", "2", "3", "5", "8", "13", "21", "?", "☕"]);
        assert!(config.card("13").unwrap().is_numeric);
        assert!(!config.card("?").unwrap().is_numeric);
    }

    #[test]
    fn test_preset_tshirt_cards_are_non_numeric() {
        let config = CardConfig::preset(CardPreset::TShirt);
        assert!(config.cards.iter().all(|c| !c.is_numeric));
        assert_eq!(config.card("XL").unwrap().numeric_value, 8);
        assert_eq!(config.numeric_mean(["M", "L"]), None);
    }

    #[test]
    fn test_preset_modified_fibonacci_includes_zero_and_hundred() {
        let config = CardConfig::preset(CardPreset::ModifiedFibonacci);
        assert!(config.validate_value("0").is_ok());
        assert!(config.validate_value("100").is_ok());
        assert_eq!(config.cards.len(), 12);
    }

    #[test]
    fn test_custom_trims_dedupes_and_parses_numerics() {
        let config = CardConfig::custom(" 1 , 2, 2 , abc , -3 ").unwrap();
        let values: Vec<&str> = config.cards.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, ["1", "2", "abc", "-3"]);
        assert_eq!(config.preset, CardPreset::Custom);
        assert_eq!(config.card("-3").unwrap().numeric_value, -3);
        assert!(config.card("-3").unwrap().is_numeric);
        assert!(!config.card("abc").unwrap().is_numeric);
    }

    #[test]
    fn test_custom_strips_control_characters() {
        let config = CardConfig::custom("a\u{01}b, 2").unwrap();
        assert_eq!(config.cards[0].value, "ab");
    }

    #[test]
    fn test_custom_empty_input_rejected() {
        assert_eq!(CardConfig::custom("   "), Err(DomainError::EmptyCustomCards));
    }

    #[test]
    fn test_custom_too_few_cards_rejected() {
        assert_eq!(
            CardConfig::custom("5, 5, 5"),
            Err(DomainError::TooFewCards(1))
        );
    }

    #[test]
    fn test_custom_too_many_cards_rejected() {
        let input = (1..=16).map(|n| n.to_string()).collect::<Vec<_>>().join(",");
        assert_eq!(CardConfig::custom(&input), Err(DomainError::TooManyCards(16)));
    }

    #[test]
    fn test_custom_long_value_rejected() {
        assert_eq!(
            CardConfig::custom("1, abcdefghijk"),
            Err(DomainError::CardValueTooLong("abcdefghijk".to_string()))
        );
    }

    #[test]
    fn test_validate_value_unknown_card_rejected() {
        let config = CardConfig::default();
        assert_eq!(
            config.validate_value("4"),
            Err(DomainError::InvalidCardValue("4".to_string()))
        );
    }

    #[test]
    fn test_numeric_mean_skips_non_numeric_votes() {
        let config = CardConfig::default();
        assert_eq!(config.numeric_mean(["5", "5", "8"]), Some(6.0));
        assert_eq!(config.numeric_mean(["?", "☕"]), None);
        assert_eq!(config.numeric_mean([]), None);
    }

    #[test]
    fn test_nearest_card_picks_closest_value() {
        let config = CardConfig::default();
        assert_eq!(config.nearest_card(6.0).unwrap().value, "5");
        assert_eq!(config.nearest_card(11.0).unwrap().value, "13");
    }

    #[test]
    fn test_nearest_card_tie_breaks_to_lower_value() {
        // 1.5 is exactly between 1 and 2.
        let config = CardConfig::default();
        assert_eq!(config.nearest_card(1.5).unwrap().value, "1");
    }

    #[test]
    fn test_mode_value_tie_breaks_to_first_occurrence() {
        assert_eq!(mode_value(["5", "5", "8"]), Some("5".to_string()));
        assert_eq!(mode_value(["8", "5", "5", "8"]), Some("8".to_string()));
        assert_eq!(mode_value([]), None);
    }

    #[test]
    fn test_has_consensus_is_textual() {
        assert!(has_consensus(["?", "?"]));
        assert!(has_consensus(["5"]));
        assert!(!has_consensus(["5", "8"]));
        assert!(!has_consensus([]));
    }
}
