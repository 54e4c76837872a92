/*!
 * End-to-end tests for translating files and folders with a mock backend
 */

use anyhow::Result;
use std::fs;
use std::sync::Arc;

use doctrans::app_controller::{Controller, FileOutcome, FolderSummary, ISSUES_LOG_FILE};
use doctrans::errors::AppError;
use doctrans::providers::mock::MockBackend;

use crate::common;

fn controller_with(backend: MockBackend) -> Result<Controller> {
    common::init_test_logging();
    Controller::with_backend(common::test_config(), Arc::new(backend))
}

#[tokio::test]
async fn test_run_withTextFile_shouldWriteTranslatedCopy() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "story.txt", &common::sample_document())?;
    let backend = MockBackend::working();
    let controller = controller_with(backend.clone())?;

    let outcome = controller
        .run(input.clone(), temp_dir.path().to_path_buf(), false)
        .await?;

    let expected_path = temp_dir.path().join("translated_story.txt");
    assert_eq!(outcome, FileOutcome::Translated(expected_path.clone()));

    // The whole document fits into one default-sized chunk
    let translated = fs::read_to_string(&expected_path)?;
    assert_eq!(translated, format!("[TRANSLATED to ro] {}", common::sample_document()));
    assert_eq!(backend.call_count(), 1);

    Ok(())
}

#[tokio::test]
async fn test_run_withExistingOutput_shouldSkipUnlessForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "a.txt", "Hello")?;
    common::create_test_file(temp_dir.path(), "translated_a.txt", "old")?;
    let backend = MockBackend::identity();
    let controller = controller_with(backend.clone())?;

    let skipped = controller
        .run(input.clone(), temp_dir.path().to_path_buf(), false)
        .await?;
    assert!(matches!(skipped, FileOutcome::Skipped(_)));
    assert_eq!(fs::read_to_string(temp_dir.path().join("translated_a.txt"))?, "old");
    assert_eq!(backend.call_count(), 0);

    controller
        .run(input, temp_dir.path().to_path_buf(), true)
        .await?;
    assert_eq!(fs::read_to_string(temp_dir.path().join("translated_a.txt"))?, "Hello");

    Ok(())
}

#[tokio::test]
async fn test_run_withFailingBackend_shouldLogIssueAndWriteNothing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "a.txt", "Hello")?;
    let controller = controller_with(MockBackend::failing())?;

    let result = controller
        .run(input, temp_dir.path().to_path_buf(), false)
        .await;

    assert!(result.is_err());
    assert!(!temp_dir.path().join("translated_a.txt").exists());

    let issues = fs::read_to_string(temp_dir.path().join(ISSUES_LOG_FILE))?;
    assert!(issues.contains("a.txt"));
    assert!(issues.contains("chunk 0 failed after 4 attempt(s)"));

    Ok(())
}

#[tokio::test]
async fn test_run_withMissingInput_shouldLogFileIssue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let backend = MockBackend::working();
    let controller = controller_with(backend.clone())?;

    let error = controller
        .run(temp_dir.path().join("missing.txt"), temp_dir.path().to_path_buf(), false)
        .await
        .unwrap_err();

    assert_eq!(AppError::classify(&error).kind(), "file");
    let issues = fs::read_to_string(temp_dir.path().join(ISSUES_LOG_FILE))?;
    assert!(issues.contains("File error: Input file does not exist"));
    assert_eq!(backend.call_count(), 0);

    Ok(())
}

#[tokio::test]
async fn test_runFolder_shouldTranslateEveryTextFileOnce() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    common::create_test_file(root, "one.txt", "One")?;
    common::create_test_file(root, "two.txt", "Two")?;
    common::create_test_file(root, "nested/three.txt", "Three")?;
    common::create_test_file(root, "translated_two.txt", "Doi")?;
    common::create_test_file(root, "ignored.md", "Ignored")?;
    let controller = controller_with(MockBackend::working())?;

    let summary = controller.run_folder(root.to_path_buf(), None, false).await?;

    assert_eq!(
        summary,
        FolderSummary {
            translated: 2,
            skipped: 1,
            failed: 0
        }
    );
    assert_eq!(fs::read_to_string(root.join("translated_one.txt"))?, "[TRANSLATED to ro] One");
    assert_eq!(fs::read_to_string(root.join("translated_two.txt"))?, "Doi");
    assert_eq!(
        fs::read_to_string(root.join("nested").join("translated_three.txt"))?,
        "[TRANSLATED to ro] Three"
    );

    // A second run finds only existing outputs
    let again = controller.run_folder(root.to_path_buf(), None, false).await?;
    assert_eq!(again.skipped, 3);
    assert_eq!(again.translated, 0);

    Ok(())
}

#[tokio::test]
async fn test_runFolder_withOutputDir_shouldMirrorLayoutAndCountFailures() -> Result<()> {
    let input_dir = common::create_temp_dir()?;
    let output_dir = common::create_temp_dir()?;
    common::create_test_file(input_dir.path(), "good.txt", "fine")?;
    common::create_test_file(input_dir.path(), "sub/bad.txt", "bad news")?;
    let controller = controller_with(MockBackend::identity().failing_on("bad"))?;

    let summary = controller
        .run_folder(input_dir.path().to_path_buf(), Some(output_dir.path().to_path_buf()), false)
        .await?;

    assert_eq!(summary.translated, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(fs::read_to_string(output_dir.path().join("translated_good.txt"))?, "fine");
    assert!(!output_dir.path().join("sub").join("translated_bad.txt").exists());
    assert!(output_dir.path().join("sub").join(ISSUES_LOG_FILE).exists());

    Ok(())
}

#[tokio::test]
async fn test_runFolder_withoutTextFiles_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "readme.md", "nothing")?;
    let controller = controller_with(MockBackend::working())?;

    assert!(controller.run_folder(temp_dir.path().to_path_buf(), None, false).await.is_err());

    Ok(())
}

#[tokio::test]
async fn test_translateText_withCancelledToken_shouldFail() -> Result<()> {
    let backend = MockBackend::working();
    let controller = controller_with(backend.clone())?;

    assert_eq!(controller.translate_text("Hi").await?, "[TRANSLATED to ro] Hi");

    controller.cancellation_token().cancel();
    assert!(controller.translate_text("Hi again").await.is_err());
    assert_eq!(backend.call_count(), 1);

    Ok(())
}
