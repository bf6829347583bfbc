/*!
 * Tests for language detection and ISO language code utilities
 */

use subtrans::language_utils::{
    detect_language, get_language_name, is_auto, language_display_name,
    normalize_to_part2t, resolve_source_language,
};

/// Arabic outranks every other script, even when Chinese is present too
#[test]
fn test_detect_language_withArabicAndChinese_shouldPreferArabic() {
    assert_eq!(detect_language("你好 مرحبا"), "ar");
    assert_eq!(detect_language("مرحبا 你好"), "ar");
}

/// Kana without ideographs is Japanese, kanji-heavy text is reported as Chinese
#[test]
fn test_detect_language_withJapaneseText_shouldFollowPriorityOrder() {
    assert_eq!(detect_language("ありがとう"), "ja");
    assert_eq!(detect_language("カタカナ"), "ja");
    assert_eq!(detect_language("日本語です"), "zh");
}

/// Korean, Cyrillic and Latin text
#[test]
fn test_detect_language_withOtherScripts_shouldReturnExpectedCodes() {
    assert_eq!(detect_language("감사합니다"), "ko");
    assert_eq!(detect_language("Спасибо, друг"), "ru");
    assert_eq!(detect_language("Merci beaucoup"), "en");
    assert_eq!(detect_language(""), "en");
    assert_eq!(detect_language("12345 !?"), "en");
}

/// `auto` and empty requests are detected, explicit codes pass through
#[test]
fn test_resolve_source_language_shouldOnlyDetectForAuto() {
    assert!(is_auto("auto"));
    assert!(is_auto("AUTO"));
    assert!(is_auto("  "));
    assert!(!is_auto("en"));

    assert_eq!(resolve_source_language("auto", "Привет"), "ru");
    assert_eq!(resolve_source_language("", "안녕"), "ko");
    assert_eq!(resolve_source_language(" fr ", "Привет"), "fr");
}

/// Test language code normalization
#[test]
fn test_normalize_to_part2t_withVariousCodes_shouldNormalize() {
    assert_eq!(normalize_to_part2t("en").unwrap(), "eng");
    assert_eq!(normalize_to_part2t("FR").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("ger").unwrap(), "deu");
    assert_eq!(normalize_to_part2t("zho").unwrap(), "zho");
    assert!(normalize_to_part2t("xx").is_err());
    assert!(normalize_to_part2t("english").is_err());
}

/// Names for prompts, with region suffixes and unknown codes
#[test]
fn test_language_names_shouldHandleRegionsAndUnknownCodes() {
    assert_eq!(get_language_name("en").unwrap(), "English");
    assert_eq!(get_language_name("zh-CN").unwrap(), "Chinese");
    assert_eq!(get_language_name("pt_BR").unwrap(), "Portuguese");
    assert!(get_language_name("qq").is_err());

    assert_eq!(language_display_name("ja"), "Japanese");
    assert_eq!(language_display_name("klingon"), "klingon");
}
