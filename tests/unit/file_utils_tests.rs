/*!
 * Tests for file and directory utilities
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use subtrans::file_utils::FileManager;
use crate::common;

/// Subtitle files are found recursively, sorted, without earlier outputs
#[test]
fn test_find_subtitle_files_withMixedTree_shouldListInputsOnly() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();

    common::create_test_subtitle(root, "b.srt")?;
    common::create_test_subtitle(root, "a.SRT")?;
    common::create_test_subtitle(root, "season1/episode1.srt")?;
    common::create_test_subtitle(root, "translated_b.srt")?;
    common::create_test_file(root, "notes.txt", "not a subtitle")?;

    let files = FileManager::find_subtitle_files(root)?;
    let names: Vec<PathBuf> = files
        .iter()
        .map(|f| f.strip_prefix(root).unwrap().to_path_buf())
        .collect();

    assert_eq!(
        names,
        vec![
            PathBuf::from("a.SRT"),
            PathBuf::from("b.srt"),
            Path::new("season1").join("episode1.srt"),
        ]
    );
    Ok(())
}

/// An empty directory yields no files
#[test]
fn test_find_subtitle_files_withEmptyDir_shouldReturnEmpty() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    assert!(FileManager::find_subtitle_files(temp_dir.path())?.is_empty());
    Ok(())
}

/// Output names get the prefix, next to the input or in the chosen directory
#[test]
fn test_translated_output_path_shouldPrefixFileName() {
    let input = Path::new("/media/show/episode.srt");

    assert_eq!(
        FileManager::translated_output_path(input, None),
        PathBuf::from("/media/show/translated_episode.srt")
    );
    assert_eq!(
        FileManager::translated_output_path(input, Some(Path::new("/out"))),
        PathBuf::from("/out/translated_episode.srt")
    );
}

/// Extension and output-name checks
#[test]
fn test_path_predicates_shouldRecognizeSubtitleFiles() {
    assert!(FileManager::has_subtitle_extension("movie.srt"));
    assert!(FileManager::has_subtitle_extension("MOVIE.SRT"));
    assert!(!FileManager::has_subtitle_extension("movie.ass"));
    assert!(!FileManager::has_subtitle_extension("srt"));

    assert!(FileManager::is_translated_output("dir/translated_movie.srt"));
    assert!(!FileManager::is_translated_output("translated/movie.srt"));
}

/// Writing creates missing parent directories and reads back the same content
#[test]
fn test_write_to_file_withMissingParents_shouldCreateThem() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("nested").join("deeper").join("out.srt");

    FileManager::write_to_file(&path, common::SAMPLE_SRT)?;

    assert!(FileManager::file_exists(&path));
    assert!(FileManager::dir_exists(path.parent().unwrap()));
    assert_eq!(fs::read_to_string(&path)?, common::SAMPLE_SRT);
    Ok(())
}
