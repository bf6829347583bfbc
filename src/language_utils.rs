//! Language utilities for ISO language code handling and script detection
//!
//! This module provides a coarse script-based language detector and helpers
//! for validating, normalizing and naming ISO 639-1 (2-letter) and ISO 639-2
//! (3-letter) language codes.

use anyhow::{Result, anyhow};
use isolang::Language;
use once_cell::sync::Lazy;
use regex::Regex;

/// Sentinel used by callers to request automatic source detection
pub const AUTO_DETECT: &str = "auto";

// @const: Script patterns, checked in this exact order
static ARABIC_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x{0600}-\x{06FF}\x{0750}-\x{077F}\x{08A0}-\x{08FF}\x{FB50}-\x{FDFF}\x{FE70}-\x{FEFF}]").unwrap()
});
static CHINESE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x{4E00}-\x{9FFF}\x{3400}-\x{4DBF}]").unwrap()
});
static JAPANESE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x{3040}-\x{309F}\x{30A0}-\x{30FF}\x{4E00}-\x{9FAF}]").unwrap()
});
static KOREAN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x{AC00}-\x{D7AF}\x{1100}-\x{11FF}\x{3130}-\x{318F}]").unwrap()
});
static RUSSIAN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x{0400}-\x{04FF}]").unwrap()
});

/// Guess the language of a text from the Unicode scripts it contains.
///
/// The first matching script wins: Arabic, Chinese, Japanese, Korean, Russian.
/// Text made only of shared CJK ideographs is reported as Chinese. Anything
/// else is English.
pub fn detect_language(text: &str) -> &'static str {
    let checks: [(&Lazy<Regex>, &'static str); 5] = [
        (&ARABIC_REGEX, "ar"),
        (&CHINESE_REGEX, "zh"),
        (&JAPANESE_REGEX, "ja"),
        (&KOREAN_REGEX, "ko"),
        (&RUSSIAN_REGEX, "ru"),
    ];

    checks
        .iter()
        .find(|(pattern, _)| pattern.is_match(text))
        .map(|(_, code)| *code)
        .unwrap_or("en")
}

/// Whether a requested source language asks for automatic detection
pub fn is_auto(code: &str) -> bool {
    let code = code.trim();
    code.is_empty() || code.eq_ignore_ascii_case(AUTO_DETECT)
}

/// Replace `auto` with the detected language of `text`
pub fn resolve_source_language(requested: &str, text: &str) -> String {
    if is_auto(requested) {
        detect_language(text).to_string()
    } else {
        requested.trim().to_string()
    }
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    // If it's a 2-letter code, convert to 3-letter
    if normalized_code.len() == 2 {
        if let Some(lang) = Language::from_639_1(&normalized_code) {
            return Ok(lang.to_639_3().to_string());
        }
    }
    // If it's already a 3-letter code, ensure it's ISO 639-2/T
    else if normalized_code.len() == 3 {
        if Language::from_639_3(&normalized_code).is_some() {
            return Ok(normalized_code);
        }

        // ISO 639-2/B codes that differ from their /T counterpart
        let part2t = match normalized_code.as_str() {
            "fre" => Some("fra"),
            "ger" => Some("deu"),
            "dut" => Some("nld"),
            "gre" => Some("ell"),
            "chi" => Some("zho"),
            "cze" => Some("ces"),
            "per" => Some("fas"),
            "rum" => Some("ron"),
            "slo" => Some("slk"),
            _ => None,
        };
        if let Some(part2t) = part2t {
            return Ok(part2t.to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Get the language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    // Region-qualified codes such as zh-CN or pt-BR name the base language
    let base = code.trim().split(['-', '_']).next().unwrap_or_default();
    let normalized = normalize_to_part2t(base)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}

/// Human-readable name for prompts, falling back to the code itself
pub fn language_display_name(code: &str) -> String {
    get_language_name(code).unwrap_or_else(|_| code.trim().to_string())
}
