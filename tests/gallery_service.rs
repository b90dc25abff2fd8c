//! Gallery service integration tests.
//!
//! These tests drive the service against real temporary storage and check
//! the index document and the directory tree stay in step.

mod common;

use common::{gallery_root, read_index, setup_failing_service, setup_service};
use galleryd::{ErrorKind, GalleryError, IncomingFile, Removed};

fn jpeg(name: &str) -> Option<IncomingFile> {
    Some(IncomingFile::new(name, b"\xFF\xD8\xFF\xE0jpeg".to_vec()))
}

#[tokio::test]
async fn test_trip_to_vacation_walkthrough() {
    let (dir, service) = setup_service();

    service.create("Trip").await.unwrap();
    let image = service.upload("Trip", jpeg("beach.jpg")).await.unwrap();
    assert_eq!(image.filename, "beach.jpg");
    assert_eq!(image.fullpath, "Trip/beach.jpg");
    assert_eq!(image.display_name, "Beach");

    let summary = service.rename("Trip", "Vacation").await.unwrap();
    assert_eq!(summary.slug, "Vacation");
    assert_eq!(summary.name, "Vacation");

    let root = gallery_root(&dir);
    assert!(!root.join("Trip").exists());
    assert!(root.join("Vacation").join("beach.jpg").is_file());

    let detail = service.detail("Vacation").await.unwrap();
    assert_eq!(detail.images.len(), 1);
    assert_eq!(detail.images[0].fullpath, "Vacation/beach.jpg");
    assert!(matches!(
        service.detail("Trip").await,
        Err(GalleryError::NotFound(_))
    ));

    let removed = service.delete("Vacation/beach.jpg").await.unwrap();
    assert!(matches!(removed, Removed::Image(ref i) if i.filename == "beach.jpg"));
    assert!(!root.join("Vacation").join("beach.jpg").exists());
    assert!(service.detail("Vacation").await.unwrap().images.is_empty());

    let removed = service.delete("Vacation").await.unwrap();
    assert!(matches!(removed, Removed::Gallery(ref g) if g.slug == "Vacation"));
    assert!(!root.join("Vacation").exists());
    assert!(service.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_every_listed_gallery_has_a_directory() {
    let (dir, service) = setup_service();

    for name in ["Alps", "Beach", "City"] {
        service.create(name).await.unwrap();
    }
    service.rename("Beach", "Coast").await.unwrap();
    service.delete("Alps").await.unwrap();

    let galleries = service.list().await.unwrap();
    let slugs: Vec<&str> = galleries.iter().map(|g| g.slug.as_str()).collect();
    assert_eq!(slugs, vec!["Coast", "City"]);

    for gallery in &galleries {
        assert!(gallery_root(&dir).join(&gallery.slug).is_dir());
    }
    assert!(!gallery_root(&dir).join("Alps").exists());
    assert!(!gallery_root(&dir).join("Beach").exists());
}

#[tokio::test]
async fn test_every_listed_image_has_a_file() {
    let (dir, service) = setup_service();
    service.create("Trip").await.unwrap();

    for name in ["a.jpg", "b.png", "c.gif"] {
        service.upload("Trip", jpeg(name)).await.unwrap();
    }
    service.delete("Trip/b.png").await.unwrap();

    let index = read_index(&dir);
    let gallery = index.find("Trip").unwrap();
    let files: Vec<&str> = gallery.images.iter().map(|i| i.filename.as_str()).collect();
    assert_eq!(files, vec!["a.jpg", "c.gif"]);

    for image in &gallery.images {
        assert_eq!(image.fullpath, format!("Trip/{}", image.filename));
        assert!(gallery_root(&dir).join(&image.fullpath).is_file());
    }
}

#[tokio::test]
async fn test_create_conflict_leaves_index_unchanged() {
    let (dir, service) = setup_service();
    service.create("Trip").await.unwrap();
    let before = std::fs::read_to_string(common::index_path(&dir)).unwrap();

    let result = service.create("Trip").await;

    assert!(matches!(result, Err(GalleryError::Conflict(_))));
    let after = std::fs::read_to_string(common::index_path(&dir)).unwrap();
    assert_eq!(before, after);
    assert_eq!(service.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_rename_conflict_leaves_tree_unchanged() {
    let (dir, service) = setup_service();
    service.create("Trip").await.unwrap();
    service.create("Home").await.unwrap();
    service.upload("Trip", jpeg("beach.jpg")).await.unwrap();

    let result = service.rename("Trip", "Home").await;

    assert_eq!(result.unwrap_err().kind(), ErrorKind::Conflict);
    assert!(gallery_root(&dir).join("Trip").join("beach.jpg").is_file());
    assert_eq!(
        service.detail("Trip").await.unwrap().images[0].fullpath,
        "Trip/beach.jpg"
    );
}

#[tokio::test]
async fn test_rename_missing_gallery() {
    let (_dir, service) = setup_service();

    let result = service.rename("Nowhere", "Somewhere").await;

    assert!(matches!(result, Err(GalleryError::NotFound(_))));
    assert!(service.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_into_missing_gallery_writes_nothing() {
    let (dir, service) = setup_service();

    let result = service.upload("Ghost", jpeg("beach.jpg")).await;

    assert!(matches!(result, Err(GalleryError::NotFound(_))));
    assert!(!gallery_root(&dir).join("Ghost").exists());
    assert!(read_index(&dir).is_empty());
}

#[tokio::test]
async fn test_delete_prefers_gallery_over_image() {
    let (_dir, service) = setup_service();
    service.create("Trip").await.unwrap();
    service.upload("Trip", jpeg("beach.jpg")).await.unwrap();

    let removed = service.delete("Trip").await.unwrap();

    match removed {
        Removed::Gallery(summary) => assert_eq!(summary.slug, "Trip"),
        Removed::Image(_) => panic!("expected gallery removal"),
    }
}

#[tokio::test]
async fn test_delete_unknown_target() {
    let (_dir, service) = setup_service();
    service.create("Trip").await.unwrap();

    let err = service.delete("Trip/missing.jpg").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(err.to_string().contains("Trip/missing.jpg"));
}

#[tokio::test]
async fn test_delete_image_tolerates_missing_file() {
    let (dir, service) = setup_service();
    service.create("Trip").await.unwrap();
    service.upload("Trip", jpeg("beach.jpg")).await.unwrap();
    std::fs::remove_file(gallery_root(&dir).join("Trip").join("beach.jpg")).unwrap();

    service.delete("Trip/beach.jpg").await.unwrap();

    assert!(service.detail("Trip").await.unwrap().images.is_empty());
}

#[tokio::test]
async fn test_index_survives_reopen() {
    let (dir, service) = setup_service();
    service.create("Trip").await.unwrap();
    service.upload("Trip", jpeg("beach.jpg")).await.unwrap();
    drop(service);

    let reopened = galleryd::GalleryService::open(&common::storage_config(&dir)).unwrap();
    let detail = reopened.detail("Trip").await.unwrap();

    assert_eq!(detail.images.len(), 1);
    assert_eq!(detail.images[0].display_name, "Beach");
}

#[tokio::test]
async fn test_persisted_document_shape() {
    let (dir, service) = setup_service();
    service.create("Trip").await.unwrap();
    service.upload("Trip", jpeg("beach.jpg")).await.unwrap();

    let raw = std::fs::read_to_string(common::index_path(&dir)).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();

    let gallery = &doc[0];
    assert_eq!(gallery["path"], "Trip");
    assert_eq!(gallery["name"], "Trip");
    let image = &gallery["images"][0];
    assert_eq!(image["path"], "beach.jpg");
    assert_eq!(image["fullpath"], "Trip/beach.jpg");
    assert_eq!(image["name"], "Beach");
    assert!(image["modified"].is_string());
}

#[tokio::test]
async fn test_corrupt_index_is_reported() {
    let (dir, service) = setup_service();
    std::fs::write(common::index_path(&dir), b"{ not json").unwrap();

    let err = service.list().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CorruptIndex);
}

#[tokio::test]
async fn test_create_reports_inconsistent_when_mkdir_fails() {
    let (dir, service, fs) = setup_failing_service();
    fs.arm();

    let err = service.create("Trip").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Inconsistent);
    // The index was saved before the directory effect.
    assert!(read_index(&dir).find("Trip").is_some());
    assert!(!gallery_root(&dir).join("Trip").exists());
}

#[tokio::test]
async fn test_rename_reports_inconsistent_when_move_fails() {
    let (dir, service, fs) = setup_failing_service();
    service.create("Trip").await.unwrap();
    service.upload("Trip", jpeg("beach.jpg")).await.unwrap();
    fs.arm();

    let err = service.rename("Trip", "Vacation").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Inconsistent);
    let index = read_index(&dir);
    assert!(index.find("Vacation").is_some());
    assert!(gallery_root(&dir).join("Trip").is_dir());
}

#[tokio::test]
async fn test_failed_upload_leaves_no_file_behind() {
    let (dir, service, fs) = setup_failing_service();
    service.create("Trip").await.unwrap();
    fs.arm_stat();

    let err = service.upload("Trip", jpeg("beach.jpg")).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unavailable);
    assert!(!gallery_root(&dir).join("Trip").join("beach.jpg").exists());
    assert!(read_index(&dir).find("Trip").unwrap().images.is_empty());
    let staged = std::fs::read_dir(gallery_root(&dir).join(".uploads"))
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(staged, 0);
}

#[tokio::test]
async fn test_reconcile_repairs_divergence() {
    let (dir, service, fs) = setup_failing_service();
    service.create("Trip").await.unwrap();
    service.upload("Trip", jpeg("beach.jpg")).await.unwrap();
    fs.arm();
    service.rename("Trip", "Vacation").await.unwrap_err();

    let report = service.reconcile().await.unwrap();

    assert!(report.has_changes());
    assert_eq!(report.pruned_galleries, 1);
    assert_eq!(report.adopted_galleries, 1);
    assert_eq!(report.adopted_images, 1);

    let detail = service.detail("Trip").await.unwrap();
    assert_eq!(detail.images[0].fullpath, "Trip/beach.jpg");
    assert!(matches!(
        service.detail("Vacation").await,
        Err(GalleryError::NotFound(_))
    ));
}
