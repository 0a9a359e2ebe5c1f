//! Macro substitution for class names and property values
//!
//! Templates use `${name}` or `$name` placeholders; `$$` is a literal `$`.
//! Unknown names pass through verbatim. Substitution is repeated until the
//! text stops changing, so macro values may themselves contain placeholders.

use log::warn;
use logos::Logos;

use crate::parser::ast::Macros;

/// Upper bound on substitution passes before giving up
pub const MAX_MACRO_PASSES: usize = 100;

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum Piece {
    #[token("$$")]
    Escaped,

    #[regex(r"\$\{[_a-zA-Z][_a-zA-Z0-9]*\}")]
    Braced,

    #[regex(r"\$[_a-zA-Z][_a-zA-Z0-9]*")]
    Named,

    /// A `$` that starts no placeholder
    #[token("$")]
    Dollar,

    #[regex(r"[^$]+")]
    Text,
}

/// Result of expanding a template to a fixed point
#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    pub value: String,
    /// Number of substitution passes performed
    pub passes: usize,
    /// False when [`MAX_MACRO_PASSES`] ran out before the text settled
    pub converged: bool,
}

/// Perform one substitution pass
pub fn substitute(text: &str, macros: &Macros) -> String {
    let mut out = String::with_capacity(text.len());
    let mut lex = Piece::lexer(text);
    while let Some(piece) = lex.next() {
        let slice = lex.slice();
        match piece {
            Ok(Piece::Escaped) => out.push('$'),
            Ok(Piece::Braced) => {
                let name = &slice[2..slice.len() - 1];
                out.push_str(macros.get(name).map(String::as_str).unwrap_or(slice));
            }
            Ok(Piece::Named) => {
                out.push_str(macros.get(&slice[1..]).map(String::as_str).unwrap_or(slice));
            }
            Ok(Piece::Dollar) | Ok(Piece::Text) | Err(()) => out.push_str(slice),
        }
    }
    out
}

/// Substitute repeatedly until the text reaches a fixed point
pub fn expand(text: &str, macros: &Macros) -> Expansion {
    let mut current = text.to_string();
    for pass in 1..=MAX_MACRO_PASSES {
        let next = substitute(&current, macros);
        if next == current {
            return Expansion {
                value: current,
                passes: pass,
                converged: true,
            };
        }
        current = next;
    }

    Expansion {
        value: current,
        passes: MAX_MACRO_PASSES,
        converged: false,
    }
}

/// Expand `text`, warning when recursion did not settle
///
/// Runaway expansion is not an error: the last computed value is returned.
pub fn resolve(text: &str, macros: &Macros) -> String {
    let expansion = expand(text, macros);
    if !expansion.converged {
        warn!("Excessive macro recursion found in string: {}", text);
    }
    expansion.value
}

/// Merge scopes ordered least to most specific; later scopes win
pub fn combine_macros<'a>(scopes: impl IntoIterator<Item = &'a Macros>) -> Macros {
    let mut combined = Macros::new();
    for scope in scopes {
        for (key, value) in scope {
            combined.insert(key.clone(), value.clone());
        }
    }
    combined
}

#[cfg(test)]
mod tests {
    use super::*;

    fn macros(pairs: &[(&str, &str)]) -> Macros {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_nested_placeholder() {
        let m = macros(&[("a", "3"), ("b", "4"), ("a4", "xyz")]);
        assert_eq!(resolve("${a${b}}", &m), "xyz");
    }

    #[test]
    fn test_multi_hop_chase() {
        let m = macros(&[("a", "${b}"), ("b", "${c}"), ("c", "xyz")]);
        assert_eq!(resolve("${a}", &m), "xyz");
    }

    #[test]
    fn test_self_reference_hits_fixed_point() {
        let m = macros(&[("a", "${a}")]);
        let expansion = expand("${a}", &m);
        assert_eq!(expansion.value, "${a}");
        assert!(expansion.converged);
        assert_eq!(expansion.passes, 1);
    }

    #[test]
    fn test_runaway_returns_last_value() {
        let m = macros(&[("a", "x${a}")]);
        let expansion = expand("${a}", &m);
        assert!(!expansion.converged);
        assert_eq!(expansion.passes, MAX_MACRO_PASSES);
        assert!(expansion.value.starts_with("xxx"));
        assert!(expansion.value.ends_with("${a}"));
    }

    #[test]
    fn test_unknown_names_pass_through() {
        let m = macros(&[("known", "1")]);
        assert_eq!(resolve("${unknown}-$known-$other", &m), "${unknown}-1-$other");
    }

    #[test]
    fn test_bare_and_escaped_dollars() {
        let m = macros(&[("n", "5")]);
        assert_eq!(substitute("cost: $$$n", &m), "cost: $5");
        assert_eq!(resolve("$ {n} $", &m), "$ {n} $");
        assert_eq!(resolve("${1abc}", &m), "${1abc}");
    }

    #[test]
    fn test_combine_later_scope_wins() {
        let group = macros(&[("prefix", "A:"), ("rate", "1")]);
        let component = macros(&[("rate", "10")]);
        let combined = combine_macros([&group, &component]);
        assert_eq!(combined["prefix"], "A:");
        assert_eq!(combined["rate"], "10");
    }

    mod proptest_tests {
        use super::super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn text_without_placeholders_is_unchanged(text in "[^$]*") {
                let mut m = Macros::new();
                m.insert("a".to_string(), "1".to_string());
                prop_assert_eq!(resolve(&text, &m), text);
            }
        }
    }
}
