
use std::collections::BTreeSet;

const SWAP_PREFIXES: (&str, &str) = ("870", "770");

const TRUNK_FAMILIES: [&str; 2] = ["998", "996"];

// replaces the country code when dialled locally
const LOCAL_TRUNK_DIGIT: char = '8';

const MIN_FORMATTED_LEN: usize = 10;

pub fn digits_of(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

pub fn variants(phone: &str) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    out.insert(phone.to_string());

    let digits = digits_of(phone);
    if digits.is_empty() {
        return out;
    }

    if let Some(swapped) = swap_prefix(&digits) {
        let formatted = group_digits(&digits);
        let swapped_formatted = group_digits(&swapped);

        out.insert(format!("+{digits}"));
        out.insert(format!("+{swapped}"));
        out.insert(format!("+{formatted}"));
        out.insert(format!("+{swapped_formatted}"));
        out.insert(digits);
        out.insert(swapped);
        out.insert(formatted);
        out.insert(swapped_formatted);
        return out;
    }

    if let Some(family) = trunk_family(&digits) {
        let subscriber = &digits[family.len()..];
        let formatted = if subscriber.is_empty() {
            digits.clone()
        } else {
            format!("{family} {}", group_digits(subscriber))
        };

        out.insert(format!("+{digits}"));
        out.insert(format!("{LOCAL_TRUNK_DIGIT}{subscriber}"));
        out.insert(format!("+{formatted}"));
        out.insert(formatted);
        return out;
    }

    out.insert(format!("+{digits}"));
    if digits.len() >= MIN_FORMATTED_LEN {
        let formatted = group_digits(&digits);
        out.insert(format!("+{formatted}"));
        out.insert(formatted);
    }
    out.insert(digits);
    out
}

pub fn canonical(phone: &str) -> String {
    let digits = digits_of(phone);
    if digits.is_empty() {
        return phone.to_string();
    }

    match digits.strip_prefix(SWAP_PREFIXES.0) {
        Some(rest) => format!("+{}{rest}", SWAP_PREFIXES.1),
        None => format!("+{digits}"),
    }
}

pub fn matches(
    candidate: &BTreeSet<String>,
    stored_phone: &str,
    stored_variants: &BTreeSet<String>,
) -> bool {
    candidate
        .iter()
        .any(|variant| variant == stored_phone || stored_variants.contains(variant))
}

fn swap_prefix(digits: &str) -> Option<String> {
    let (p1, p2) = SWAP_PREFIXES;
    if let Some(rest) = digits.strip_prefix(p1) {
        return Some(format!("{p2}{rest}"));
    }
    digits.strip_prefix(p2).map(|rest| format!("{p1}{rest}"))
}

fn trunk_family(digits: &str) -> Option<&'static str> {
    TRUNK_FAMILIES
        .iter()
        .copied()
        .find(|family| digits.starts_with(*family))
}

// `77054060674` -> `7 705 406 06 74`
fn group_digits(digits: &str) -> String {
    let len = digits.len();
    if len < 7 {
        return digits.to_string();
    }

    let tail = &digits[len - 7..];
    let mut groups = vec![&tail[..3], &tail[3..5], &tail[5..]];

    let head = &digits[..len - 7];
    if head.len() > 3 {
        let split = head.len() - 3;
        groups.insert(0, &head[split..]);
        groups.insert(0, &head[..split]);
    } else if !head.is_empty() {
        groups.insert(0, head);
    }

    groups.join(" ")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;

    use super::{canonical, group_digits, matches, variants};

    fn intersects(a: &BTreeSet<String>, b: &BTreeSet<String>) -> bool {
        a.intersection(b).next().is_some()
    }

    #[test]
    fn domestic_and_international_forms_meet() {
        let stored = "+77054060674";
        let stored_variants = variants(stored);

        for input in [
            "+77054060674",
            "87054060674",
            "77054060674",
            "8 705 406 06 74",
            "+7 (705) 406-06-74",
        ] {
            assert!(
                matches(&variants(input), stored, &stored_variants),
                "{input} should resolve to {stored}"
            );
        }
    }

    #[test]
    fn swap_family_expansion_is_complete() {
        let set = variants("87054060674");
        for expected in [
            "87054060674",
            "+87054060674",
            "77054060674",
            "+77054060674",
            "8 705 406 06 74",
            "+8 705 406 06 74",
            "7 705 406 06 74",
            "+7 705 406 06 74",
        ] {
            assert!(set.contains(expected), "missing {expected}");
        }
    }

    #[test]
    fn trunk_family_gets_local_form() {
        let set = variants("+998 90 123 45 67");
        assert!(set.contains("+998 90 123 45 67"));
        assert!(set.contains("+998901234567"));
        assert!(set.contains("8901234567"));
        assert!(set.contains("998 90 123 45 67"));
        assert!(!set.contains("998901234567"));

        let kg = variants("996555123456");
        assert!(kg.contains("+996555123456"));
        assert!(kg.contains("8555123456"));
        assert!(kg.contains("996 55 512 34 56"));
        assert!(kg.contains("+996 55 512 34 56"));
    }

    #[test]
    fn short_generic_numbers_are_not_grouped() {
        let set = variants("12-34-56");
        let expected: BTreeSet<String> = ["12-34-56", "123456", "+123456"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(set, expected);
    }

    #[test]
    fn long_generic_numbers_get_one_grouping() {
        let set = variants("4915112345678");
        assert!(set.contains("4915112345678"));
        assert!(set.contains("+4915112345678"));
        assert!(set.contains("491 511 234 56 78"));
        assert!(set.contains("+491 511 234 56 78"));
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn input_without_digits_yields_itself() {
        let set = variants("call me");
        assert_eq!(set.len(), 1);
        assert!(set.contains("call me"));
        assert!(variants("").contains(""));
    }

    #[test]
    fn grouping_layouts() {
        assert_eq!(group_digits("7054060674"), "705 406 06 74");
        assert_eq!(group_digits("77054060674"), "7 705 406 06 74");
        assert_eq!(group_digits("901234567"), "90 123 45 67");
        assert_eq!(group_digits("1234567"), "123 45 67");
        assert_eq!(group_digits("123456"), "123456");
    }

    #[test]
    fn canonical_prefers_international_triplet() {
        assert_eq!(canonical("8 (705) 406-06-74"), "+77054060674");
        assert_eq!(canonical("+7 705 406 06 74"), "+77054060674");
        assert_eq!(canonical("998901234567"), "+998901234567");
    }

    #[test]
    fn unrelated_numbers_do_not_match() {
        let stored = "+77054060674";
        assert!(!matches(
            &variants("87054060675"),
            stored,
            &variants(stored)
        ));
    }

    fn noisy(digits: String, separator: &'static str) -> String {
        digits
            .chars()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(separator)
    }

    proptest! {
        #[test]
        fn prop_swap_prefixes_are_equivalent(subscriber in "[0-9]{8}") {
            let domestic = format!("870{subscriber}");
            let international = format!("+770{subscriber}");
            prop_assert!(intersects(&variants(&domestic), &variants(&international)));
            prop_assert!(matches(
                &variants(&domestic),
                &canonical(&international),
                &variants(&canonical(&international))
            ));
        }

        #[test]
        fn prop_formatting_noise_is_ignored(
            subscriber in "[0-9]{8}",
            separator in prop::sample::select(vec![" ", "-", " - ", "."]),
            prefix in prop::sample::select(vec!["870", "770"]),
        ) {
            let plain = format!("{prefix}{subscriber}");
            let decorated = format!("+{}", noisy(plain.clone(), separator));
            prop_assert!(intersects(&variants(&plain), &variants(&decorated)));
        }

        #[test]
        fn prop_canonical_form_matches_input(digits in "[0-9]{1,15}") {
            let stored = canonical(&digits);
            prop_assert!(matches(&variants(&digits), &stored, &variants(&stored)));
        }

        #[test]
        fn prop_variants_contain_input(raw in "\\PC{0,20}") {
            let first = variants(&raw);
            prop_assert!(first.contains(&raw));
            prop_assert_eq!(first, variants(&raw));
        }
    }
}
