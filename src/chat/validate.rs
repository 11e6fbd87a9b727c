use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

pub const DEFAULT_MAX_LENGTH: usize = 512;

/// Minimum number of alphanumeric characters regardless of input length.
const MIN_SIGNAL: usize = 3;
/// One alphanumeric character is expected per this many characters of input.
const SIGNAL_RATIO: usize = 8;

/// Letters and numbers by general category. Combining marks that only carry
/// the Alphabetic property (vowel signs, circled letters) are not signal.
static SIGNAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}]").expect("signal pattern is valid"));

/// Rejections produced before a turn is sent; `Display` is the text shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Input must be a string.")]
    NotAString,

    #[error("Please enter a valid question.")]
    EmptyInput,

    #[error("Input is too long (>{limit} characters). Please shorten your question.")]
    TooLong { limit: usize },

    #[error("Input does not appear to be a valid question.")]
    LowSignal,
}

/// Checks an untyped utterance from the UI, returning the text when it passes.
pub fn validate_value(input: &Value, max_length: usize) -> Result<&str, ValidationError> {
    let text = input.as_str().ok_or(ValidationError::NotAString)?;
    validate(text, max_length)?;

    Ok(text)
}

pub fn validate(input: &str, max_length: usize) -> Result<(), ValidationError> {
    if input.trim().is_empty() {
        return Err(ValidationError::EmptyInput);
    }

    let length = input.chars().count();
    if length > max_length {
        return Err(ValidationError::TooLong { limit: max_length });
    }

    // mostly symbols, whitespace or emoji
    let alnum = SIGNAL.find_iter(input).count();
    if alnum < MIN_SIGNAL.max(length / SIGNAL_RATIO) {
        return Err(ValidationError::LowSignal);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(input: &str) -> Result<(), ValidationError> {
        validate(input, DEFAULT_MAX_LENGTH)
    }

    #[test]
    fn accepts_ordinary_questions() {
        assert_eq!(check("What does EVA do?"), Ok(()));
        assert_eq!(check("hey"), Ok(()));
        assert_eq!(check("  Tell me about CAM  "), Ok(()));
    }

    #[test]
    fn rejects_blank_input() {
        for input in ["", " ", "\t\n", "\u{3000}  "] {
            assert_eq!(check(input), Err(ValidationError::EmptyInput), "{input:?}");
        }
    }

    #[test]
    fn rejects_input_over_the_limit() {
        let at_limit = "a".repeat(512);
        assert_eq!(check(&at_limit), Ok(()));

        let over = "a".repeat(513);
        let err = check(&over).unwrap_err();
        assert_eq!(err, ValidationError::TooLong { limit: 512 });
        assert_eq!(
            err.to_string(),
            "Input is too long (>512 characters). Please shorten your question."
        );
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // 300 chars, 600 bytes
        let input = "é".repeat(300);
        assert_eq!(check(&input), Ok(()));
    }

    #[test]
    fn short_inputs_need_three_alphanumerics() {
        assert_eq!(check("hi?"), Err(ValidationError::LowSignal));
        assert_eq!(check("hi"), Err(ValidationError::LowSignal));
        assert_eq!(check("ok!"), Err(ValidationError::LowSignal));
        assert_eq!(check("why"), Ok(()));
        assert_eq!(check("a1?"), Err(ValidationError::LowSignal));
        assert_eq!(check("a1b"), Ok(()));
    }

    #[test]
    fn long_inputs_need_one_alphanumeric_per_eight_chars() {
        // length 80 -> threshold 10
        let nine = format!("{}{}", "a".repeat(9), "!".repeat(71));
        assert_eq!(check(&nine), Err(ValidationError::LowSignal));

        let ten = format!("{}{}", "a".repeat(10), "!".repeat(70));
        assert_eq!(check(&ten), Ok(()));

        // length 87 -> threshold still 10
        let ten_longer = format!("{}{}", "a".repeat(10), "!".repeat(77));
        assert_eq!(check(&ten_longer), Ok(()));

        // length 88 -> threshold 11
        let ten_too_long = format!("{}{}", "a".repeat(10), "!".repeat(78));
        assert_eq!(check(&ten_too_long), Err(ValidationError::LowSignal));
    }

    #[test]
    fn emoji_and_symbols_are_low_signal() {
        assert_eq!(check("🙂🙂🙂🙂"), Err(ValidationError::LowSignal));
        assert_eq!(check("??? !!! ..."), Err(ValidationError::LowSignal));
    }

    #[test]
    fn non_latin_letters_count_as_signal() {
        assert_eq!(check("什么是EVA"), Ok(()));
        assert_eq!(check("Ⅻ 42"), Ok(()));
    }

    #[test]
    fn marks_without_letters_are_low_signal() {
        assert_eq!(check("\u{93f}\u{93f}\u{93f}"), Err(ValidationError::LowSignal));
        assert_eq!(check("ⓐⓑⓒ"), Err(ValidationError::LowSignal));

        // the marks ride on letters that do count
        assert_eq!(check("\u{915}\u{93f}\u{924}\u{93e}\u{92c}"), Ok(()));
    }

    #[test]
    fn checks_short_circuit_in_order() {
        // too long and low signal at once, length wins
        let input = "!".repeat(600);
        assert_eq!(check(&input), Err(ValidationError::TooLong { limit: 512 }));

        // custom limit is reported
        assert_eq!(
            validate("abcdef", 5),
            Err(ValidationError::TooLong { limit: 5 })
        );
    }

    #[test]
    fn values_must_be_strings() {
        for value in [json!(42), json!(null), json!(["hi"]), json!({"text": "hi"})] {
            assert_eq!(
                validate_value(&value, DEFAULT_MAX_LENGTH),
                Err(ValidationError::NotAString)
            );
        }

        let value = json!("What is PHIL?");
        assert_eq!(validate_value(&value, DEFAULT_MAX_LENGTH), Ok("What is PHIL?"));

        let blank = json!("   ");
        assert_eq!(
            validate_value(&blank, DEFAULT_MAX_LENGTH),
            Err(ValidationError::EmptyInput)
        );
    }

    #[test]
    fn messages_match_what_the_widget_shows() {
        assert_eq!(ValidationError::NotAString.to_string(), "Input must be a string.");
        assert_eq!(ValidationError::EmptyInput.to_string(), "Please enter a valid question.");
        assert_eq!(
            ValidationError::LowSignal.to_string(),
            "Input does not appear to be a valid question."
        );
    }
}
