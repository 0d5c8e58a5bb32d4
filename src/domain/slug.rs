//! URL slug generation for catalog entities.

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Turn a display name into a URL slug: lowercase ASCII alphanumerics with
/// single dashes. Non-ASCII characters are dropped.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut prev_dash = true; // suppress a leading dash

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            prev_dash = false;
        } else if (ch.is_whitespace() || ch == '-' || ch == '_') && !prev_dash {
            slug.push('-');
            prev_dash = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

/// Append a short random suffix, used to retry inserts that collide on the
/// slug's unique constraint.
pub fn with_suffix(slug: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();
    format!("{slug}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Everest Base Camp"), "everest-base-camp");
        assert_eq!(slugify("  Rara   Lake  "), "rara-lake");
        assert_eq!(slugify("Annapurna-Circuit"), "annapurna-circuit");
    }

    #[test]
    fn slugify_strips_punctuation_and_case() {
        assert_eq!(slugify("Ghandruk & Poon Hill!"), "ghandruk-poon-hill");
        assert_eq!(slugify("UPPER_case name"), "upper-case-name");
    }

    #[test]
    fn slugify_drops_non_ascii() {
        assert_eq!(slugify("सगरमाथा Trek"), "trek");
    }

    #[test]
    fn suffix_preserves_base_and_adds_six_chars() {
        let s = with_suffix("everest-base-camp");
        assert!(s.starts_with("everest-base-camp-"));
        assert_eq!(s.len(), "everest-base-camp-".len() + 6);
        assert!(s.chars().all(|c| c.is_ascii_lowercase()
            || c.is_ascii_digit()
            || c == '-'));
    }
}
