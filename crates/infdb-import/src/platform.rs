use infdb_core::Platform;

use crate::dictionary::Dictionary;

/// Resolves a raw platform cell to a canonical [`Platform`].
///
/// Lookup order: exact alias, lower-cased alias, then the lower-cased value
/// itself as a canonical token. Values outside the canonical set are an
/// error, never a silent default to `other`.
///
/// # Errors
///
/// Returns the offending input when it names no known platform.
pub fn normalize_platform<'a>(dict: &Dictionary, raw: &'a str) -> Result<Platform, &'a str> {
    if let Some(platform) = dict.platform_alias(raw) {
        return Ok(platform);
    }

    let lowered = raw.trim().to_lowercase();
    if let Some(platform) = dict.platform_alias(&lowered) {
        return Ok(platform);
    }

    lowered.parse::<Platform>().map_err(|_| raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(raw: &str) -> Result<Platform, &str> {
        normalize_platform(Dictionary::standard(), raw)
    }

    #[test]
    fn korean_and_english_spellings_agree() {
        assert_eq!(normalize("인스타그램"), Ok(Platform::Instagram));
        assert_eq!(normalize("instagram"), Ok(Platform::Instagram));
        assert_eq!(normalize("Instagram"), Ok(Platform::Instagram));
        assert_eq!(normalize("인스타"), Ok(Platform::Instagram));
    }

    #[test]
    fn mixed_case_canonical_tokens_resolve() {
        assert_eq!(normalize("YOUTUBE"), Ok(Platform::Youtube));
        assert_eq!(normalize("TikTok"), Ok(Platform::Tiktok));
        assert_eq!(normalize("INSTA"), Ok(Platform::Instagram));
    }

    #[test]
    fn other_aliases_resolve() {
        assert_eq!(normalize("기타"), Ok(Platform::Other));
        assert_eq!(normalize("other"), Ok(Platform::Other));
        assert_eq!(normalize("스레드"), Ok(Platform::Threads));
        assert_eq!(normalize("티크톡"), Ok(Platform::Tiktok));
    }

    #[test]
    fn unknown_platform_is_invalid() {
        assert_eq!(normalize("unknown_platform"), Err("unknown_platform"));
        assert_eq!(normalize("badvalue"), Err("badvalue"));
    }

    #[test]
    fn unknown_values_are_not_defaulted_to_other() {
        assert!(normalize("facebook").is_err());
    }
}
