//! Rule name → type identifier / file name conversions.
use once_cell::sync::Lazy;
use regex::Regex;

static KEBAB_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"-[A-Za-z0-9_]").unwrap());
static SLASH_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/[A-Za-z0-9_]?").unwrap());
static NON_IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_$]+").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Casing {
    Lower,
    Upper,
}

impl Casing {
    fn apply(self, value: &str) -> String {
        match self {
            Casing::Lower => value.to_lowercase(),
            Casing::Upper => value.to_uppercase(),
        }
    }
}

/// `no-unused-vars` → `NoUnusedVars`
pub fn kebab_to_pascal_casing(value: &str) -> String {
    let mut chars = value.chars();
    let Some(first) = chars.next() else { return String::new() };
    let rest = KEBAB_SEGMENT.replace_all(chars.as_str(), |caps: &regex::Captures| {
        caps[0][1..].to_uppercase()
    });
    format!("{}{rest}", first.to_uppercase())
}

/// `style/indent` → `style_Indent` (upper) or `style_indent` (lower)
pub fn parse_slashed_name(value: &str, casing: Casing) -> String {
    SLASH_SEGMENT
        .replace_all(value, |caps: &regex::Captures| {
            format!("_{}", casing.apply(&caps[0][1..]))
        })
        .into_owned()
}

/// Type identifier for a rule: `style/no-extra-semi` → `Style_NoExtraSemi`.
pub fn rule_type_identifier(rule_name: &str) -> String {
    parse_slashed_name(&kebab_to_pascal_casing(rule_name), Casing::Upper)
}

/// File stem for a rule: `style/no-extra-semi` → `style_no-extra-semi`.
pub fn rule_file_name(rule_name: &str) -> String {
    parse_slashed_name(rule_name, Casing::Lower)
}

/// PascalCase identifier from free text such as a schema `title`.
pub fn to_safe_identifier(text: &str) -> String {
    let mut out = String::new();
    for word in NON_IDENT.split(text).filter(|w| !w.is_empty()) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("no-unused-vars", "NoUnusedVars")]
    #[case("eqeqeq", "Eqeqeq")]
    #[case("a-b-c", "ABC")]
    #[case("trailing-", "Trailing-")]
    #[case("", "")]
    fn kebab_to_pascal(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(kebab_to_pascal_casing(input), expected);
    }

    #[rstest]
    #[case("style/indent", Casing::Upper, "style_Indent")]
    #[case("style/indent", Casing::Lower, "style_indent")]
    #[case("Ts/Array-type", Casing::Lower, "Ts_array-type")]
    #[case("a//b", Casing::Upper, "a__B")]
    #[case("end/", Casing::Upper, "end_")]
    fn slashed_names(#[case] input: &str, #[case] casing: Casing, #[case] expected: &str) {
        assert_eq!(parse_slashed_name(input, casing), expected);
    }

    #[rstest]
    #[case("style/no-extra-semi", "Style_NoExtraSemi", "style_no-extra-semi")]
    #[case("no-console", "NoConsole", "no-console")]
    #[case("react-hooks/exhaustive-deps", "ReactHooks_ExhaustiveDeps", "react-hooks_exhaustive-deps")]
    fn rule_names(#[case] rule: &str, #[case] ident: &str, #[case] file: &str) {
        assert_eq!(rule_type_identifier(rule), ident);
        assert_eq!(rule_file_name(rule), file);
    }

    #[rstest]
    #[case("array option", "ArrayOption")]
    #[case("Array-Option", "ArrayOption")]
    #[case("1st choice", "_1stChoice")]
    #[case("***", "_")]
    fn safe_identifiers(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(to_safe_identifier(input), expected);
    }
}
