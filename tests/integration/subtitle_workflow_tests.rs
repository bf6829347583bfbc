/*!
 * End-to-end tests for translating subtitle files on disk
 */

use anyhow::Result;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use subtrans::app_config::TranslationProvider;
use subtrans::app_controller::{Controller, RunSummary, TranslateOptions};
use subtrans::providers::mock::MockProvider;
use subtrans::subtitle_processor::SubtitleCollection;
use crate::common;

fn controller(mock: MockProvider) -> Controller {
    common::init_test_logging();
    Controller::with_service(common::test_service(Arc::new(common::test_config()), Arc::new(mock)))
}

fn options(output_dir: Option<&Path>, force_overwrite: bool) -> TranslateOptions {
    TranslateOptions {
        provider: TranslationProvider::MyMemory,
        source_language: "auto".to_string(),
        target_language: "fr".to_string(),
        output_dir: output_dir.map(Path::to_path_buf),
        force_overwrite,
    }
}

/// Every input in a folder gets a translated sibling with the same timing
#[tokio::test]
async fn test_run_withFolder_shouldWriteTranslatedSiblings() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let first = common::create_test_subtitle(temp_dir.path(), "first.srt")?;
    common::create_test_file(temp_dir.path(), "nested/second.srt", &common::numbered_srt(12))?;

    let summary = controller(MockProvider::uppercase()).run(temp_dir.path(), &options(None, false)).await?;

    assert_eq!(summary, RunSummary { translated: 2, skipped: 0, errors: 0 });

    let original = SubtitleCollection::from_srt_file(&first)?;
    let translated = SubtitleCollection::from_srt_file(temp_dir.path().join("translated_first.srt"))?;
    assert_eq!(translated.len(), original.len());
    for (before, after) in original.entries.iter().zip(&translated.entries) {
        assert_eq!(after.timecode, before.timecode);
        assert_eq!(after.text, before.text.to_uppercase());
    }

    let second = SubtitleCollection::from_srt_file(temp_dir.path().join("nested/translated_second.srt"))?;
    assert_eq!(second.len(), 12);
    assert_eq!(second.entries[11].text, "LINE 12");
    Ok(())
}

/// A second run leaves existing outputs alone unless forced
#[tokio::test]
async fn test_run_withExistingOutput_shouldSkipUnlessForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let output = temp_dir.path().join("translated_movie.srt");
    fs::write(&output, "stale")?;

    let skipped = controller(MockProvider::uppercase()).run(&input, &options(None, false)).await?;
    assert_eq!(skipped, RunSummary { translated: 0, skipped: 1, errors: 0 });
    assert_eq!(fs::read_to_string(&output)?, "stale");

    let forced = controller(MockProvider::uppercase()).run(&input, &options(None, true)).await?;
    assert_eq!(forced.translated, 1);
    assert!(fs::read_to_string(&output)?.contains("THIS IS A TEST SUBTITLE."));
    Ok(())
}

/// Outputs can be collected in a separate directory
#[tokio::test]
async fn test_run_withOutputDir_shouldWriteThere() -> Result<()> {
    let input_dir = common::create_temp_dir()?;
    let output_dir = common::create_temp_dir()?;
    let out = output_dir.path().join("fr");
    let input = common::create_test_subtitle(input_dir.path(), "clip.srt")?;

    controller(MockProvider::working()).run(&input, &options(Some(&out), false)).await?;

    let content = fs::read_to_string(out.join("translated_clip.srt"))?;
    assert!(content.contains("[TRANSLATED to fr] This is a test subtitle."));
    assert!(!input_dir.path().join("translated_clip.srt").exists());
    Ok(())
}

/// Entries the provider rejects keep their text behind the failure marker
#[tokio::test]
async fn test_run_withFailingEntry_shouldWriteMarker() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "list.srt", &common::numbered_srt(3))?;

    controller(MockProvider::failing_on("line 2")).run(&input, &options(None, false)).await?;

    let translated = SubtitleCollection::from_srt_file(temp_dir.path().join("translated_list.srt"))?;
    assert_eq!(translated.entries[0].text, "LINE 1");
    assert_eq!(translated.entries[1].text, "[TRANSLATION FAILED] line 2");
    assert_eq!(translated.entries[2].text, "LINE 3");
    Ok(())
}

/// A cancelled run does not write a partial output
#[tokio::test]
async fn test_run_withCancelledToken_shouldFailWithoutOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;

    let controller = controller(MockProvider::uppercase());
    controller.cancel_token().cancel();

    assert!(controller.run(&input, &options(None, false)).await.is_err());
    assert!(!temp_dir.path().join("translated_movie.srt").exists());
    Ok(())
}

/// Missing paths and non-subtitle files are errors
#[test]
fn test_run_withInvalidInput_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let text_file = common::create_test_file(temp_dir.path(), "notes.txt", "hello")?;
    let empty_dir = common::create_temp_dir()?;
    let controller = controller(MockProvider::uppercase());

    tokio_test::block_on(async {
        assert!(controller.run(&temp_dir.path().join("missing.srt"), &options(None, false)).await.is_err());
        assert!(controller.run(&text_file, &options(None, false)).await.is_err());
        assert!(controller.run(empty_dir.path(), &options(None, false)).await.is_err());
    });
    Ok(())
}
