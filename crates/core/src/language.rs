//! Language-name to ISO 639-1 code mapping.

/// Maps a human-readable language name to its ISO code.
/// Unknown names fall back to English.
pub fn language_code(language: &str) -> &'static str {
    match language {
        "Spanish" => "es",
        "French" => "fr",
        "German" => "de",
        "Italian" => "it",
        "Portuguese" => "pt",
        "English" => "en",
        "Chinese" => "zh",
        "Japanese" => "ja",
        "Korean" => "ko",
        "Russian" => "ru",
        _ => "en",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_languages_map_to_codes() {
        assert_eq!(language_code("Spanish"), "es");
        assert_eq!(language_code("Japanese"), "ja");
        assert_eq!(language_code("English"), "en");
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        assert_eq!(language_code("Klingon"), "en");
        assert_eq!(language_code(""), "en");
    }
}
