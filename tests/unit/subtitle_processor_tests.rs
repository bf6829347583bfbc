/*!
 * Tests for subtitle processing functionality
 */

use anyhow::Result;
use subtrans::errors::SubtitleError;
use subtrans::subtitle_processor::{
    format_srt, normalize_entry_text, parse_srt, parse_srt_bytes, SubtitleCollection, SubtitleEntry,
};
use crate::common;

/// Test parsing of a regular multi-line document
#[test]
fn test_parse_srt_withMultilineEntry_shouldJoinLinesWithNewline() {
    let entries = parse_srt(common::SAMPLE_SRT);

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0], SubtitleEntry::new(1, "00:00:01,000 --> 00:00:04,000", "This is a test subtitle."));
    assert_eq!(entries[1].id, 2);
    assert_eq!(entries[1].text, "It contains\nmultiple lines.");
}

/// Formatting parsed entries and parsing again gives the same entries
#[test]
fn test_format_then_parse_withParsedEntries_shouldRoundTrip() {
    let documents = [
        common::SAMPLE_SRT.to_string(),
        common::numbered_srt(25),
        "7\n00:01:00,000 --> 00:01:02,000\n  padded text  \n\n\n\n8\nnot a real timecode\n<i>tagged</i>\n".to_string(),
    ];

    for document in documents {
        let entries = parse_srt(&document);
        assert!(!entries.is_empty());
        assert_eq!(parse_srt(&format_srt(&entries)), entries);
    }
}

/// Exact output layout for a small document
#[test]
fn test_format_srt_withTwoEntries_shouldSeparateWithBlankLine() {
    let entries = vec![
        SubtitleEntry::new(1, "00:00:01,000 --> 00:00:02,000", "HELLO"),
        SubtitleEntry::new(2, "00:00:03,000 --> 00:00:04,000", "WORLD"),
    ];

    assert_eq!(
        format_srt(&entries),
        "1\n00:00:01,000 --> 00:00:02,000\nHELLO\n\n2\n00:00:03,000 --> 00:00:04,000\nWORLD\n"
    );
}

/// A non-numeric line where an id is expected is skipped, scanning resumes on the next line
#[test]
fn test_parse_srt_withNonNumericIdLine_shouldSkipIt() {
    let content = "WEBVTT\n1\n00:00:01,000 --> 00:00:02,000\nFirst\n\nabc\n\n2\n00:00:03,000 --> 00:00:04,000\nSecond\n";
    let entries = parse_srt(content);

    let ids: Vec<_> = entries.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(entries[1].text, "Second");
}

/// An entry cut off after its id or timecode ends the scan
#[test]
fn test_parse_srt_withTruncatedLastEntry_shouldStop() {
    let cut_after_id = "1\n00:00:01,000 --> 00:00:02,000\nFirst\n\n2";
    assert_eq!(parse_srt(cut_after_id).len(), 1);

    let cut_after_timecode = "1\n00:00:01,000 --> 00:00:02,000\nFirst\n\n2\n00:00:03,000 --> 00:00:04,000";
    assert_eq!(parse_srt(cut_after_timecode).len(), 1);
}

/// Entries whose text is blank are dropped
#[test]
fn test_parse_srt_withTextlessEntry_shouldOmitIt() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\n\n2\n00:00:03,000 --> 00:00:04,000\nKept\n";
    let entries = parse_srt(content);

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, 2);
}

/// Byte-level parsing distinguishes undecodable from empty
#[test]
fn test_parse_srt_bytes_shouldSeparateMalformedFromEmpty() {
    assert!(matches!(parse_srt_bytes(&[0xff, 0xfe, 0x00]), Err(SubtitleError::Malformed(_))));
    assert_eq!(parse_srt_bytes(b""), Err(SubtitleError::Empty));
    assert_eq!(parse_srt_bytes(b"just some words\nno ids"), Err(SubtitleError::Empty));
    assert_eq!(parse_srt_bytes(common::SAMPLE_SRT.as_bytes()).unwrap().len(), 2);
}

/// Text with blank lines is reduced to what a re-read would keep
#[test]
fn test_normalize_entry_text_withBlankLines_shouldSurviveRoundTrip() {
    assert_eq!(normalize_entry_text("a\n\nb"), "a\nb");
    assert_eq!(normalize_entry_text("\r\n first \r\n\t\r\nsecond\n"), "first \nsecond");
    assert_eq!(normalize_entry_text(" \n "), "");

    let entry = SubtitleEntry::new(1, "00:00:01,000 --> 00:00:02,000", normalize_entry_text("one\n\n2\n\nthree"));
    assert_eq!(parse_srt(&format_srt(std::slice::from_ref(&entry))), vec![entry]);
}

/// Files written by a collection read back the same
#[test]
fn test_subtitle_collection_writeAndRead_shouldPreserveEntries() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "input.srt")?;

    let collection = SubtitleCollection::from_srt_file(&input)?;
    assert_eq!(collection.len(), 2);

    let output = temp_dir.path().join("nested").join("output.srt");
    collection.write_to_srt(&output)?;

    let reread = SubtitleCollection::from_srt_file(&output)?;
    assert_eq!(reread.entries, collection.entries);
    assert_eq!(std::fs::read_to_string(&output)?, common::SAMPLE_SRT);
    Ok(())
}

/// Reading an empty file is an error
#[test]
fn test_subtitle_collection_withEmptyFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "empty.srt", "")?;

    assert!(SubtitleCollection::from_srt_file(&input).is_err());
    Ok(())
}
