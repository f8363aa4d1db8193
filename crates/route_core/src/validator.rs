//! Address well-formedness checks.

/// Characters that may never appear in an address.
pub const RESERVED_CHARS: [char; 10] = ['@', '%', '&', '"', '\'', '/', '(', ')', '¿', ';'];

/// True when `input` is non-blank and free of reserved characters.
pub fn is_valid(input: &str) -> bool {
    !input.trim().is_empty() && !contains_reserved(input)
}

pub fn contains_reserved(input: &str) -> bool {
    input.chars().any(|c| RESERVED_CHARS.contains(&c))
}

/// Flag rule for a row: a blank row is "not filled yet", never invalid.
pub fn is_flagged(input: &str) -> bool {
    !input.trim().is_empty() && !is_valid(input)
}

pub fn reserved_chars_hint() -> String {
    let listed = RESERVED_CHARS
        .iter()
        .map(char::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("La dirección contiene caracteres no permitidos ({listed})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_every_reserved_character() {
        for c in RESERVED_CHARS {
            let input = format!("Main St {c} 5");
            assert!(!is_valid(&input), "{input:?} should be rejected");
            assert!(is_flagged(&input));
        }
    }

    #[test]
    fn rejects_blank_input() {
        for input in ["", " ", "\t\n", "   \u{3000}"] {
            assert!(!is_valid(input), "{input:?} should be rejected");
            assert!(!is_flagged(input), "{input:?} is unfilled, not invalid");
        }
    }

    #[test]
    fn accepts_plain_addresses() {
        for input in ["Main St 5", "Calle 10 # 20-30", "Av. Insurgentes Sur 1602", "0"] {
            assert!(is_valid(input), "{input:?} should be accepted");
            assert!(!is_flagged(input));
        }
    }

    #[test]
    fn hint_lists_reserved_set_without_zero() {
        let hint = reserved_chars_hint();
        assert!(hint.contains("@, %, &"));
        assert!(hint.ends_with("¿, ;)"));
        assert!(!hint.contains('0'));
    }

    mod properties {
        use super::super::*;
        use proptest::prelude::*;

        fn reserved() -> impl Strategy<Value = char> {
            proptest::sample::select(RESERVED_CHARS.to_vec())
        }

        fn unreserved() -> impl Strategy<Value = String> {
            any::<String>().prop_map(|s| {
                s.chars()
                    .filter(|c| !RESERVED_CHARS.contains(c))
                    .collect()
            })
        }

        proptest! {
            #[test]
            fn any_reserved_char_fails(
                prefix in any::<String>(),
                c in reserved(),
                suffix in any::<String>(),
            ) {
                let input = format!("{prefix}{c}{suffix}");
                prop_assert!(!is_valid(&input));
                prop_assert!(is_flagged(&input));
            }

            #[test]
            fn whitespace_only_fails_without_flag(input in "[ \t\r\n\u{00a0}\u{3000}]*") {
                prop_assert!(!is_valid(&input));
                prop_assert!(!is_flagged(&input));
            }

            #[test]
            fn unreserved_non_blank_passes(input in unreserved()) {
                prop_assume!(!input.trim().is_empty());
                prop_assert!(is_valid(&input));
                prop_assert!(!is_flagged(&input));
            }

            #[test]
            fn flag_is_filled_and_invalid(input in any::<String>()) {
                let expected = !input.trim().is_empty() && !is_valid(&input);
                prop_assert_eq!(is_flagged(&input), expected);
                prop_assert_eq!(
                    is_valid(&input),
                    !input.trim().is_empty() && !contains_reserved(&input)
                );
            }
        }
    }
}
