mod helpers;

use helpers::{processing_upload, product, product_rows, setup_test_db};
use nutrack_core::models::UploadStatus;
use nutrack_core::AppError;
use nutrack_db::{
    IdentityResolver, ProductRepository, ProductStore, ProductUploadRepository,
    UploadRecordStore, UserDirectory, UNKNOWN_USER,
};
use uuid::Uuid;

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_insert_and_lookup_products() {
    let db = setup_test_db().await;
    let repo = ProductRepository::new(db.pool.clone());
    let upload = processing_upload(&db.pool, 2).await;

    let inserted = repo
        .insert_products(vec![
            product("4006381333931", &upload),
            product("5000112548010", &upload),
        ])
        .await
        .unwrap();
    assert_eq!(inserted, 2);

    let existing = repo
        .find_existing_codes(&["4006381333931".to_string(), "8710398526106".to_string()])
        .await
        .unwrap();
    assert_eq!(existing.len(), 1);
    assert!(existing.contains("4006381333931"));

    let listed = repo.list_products_by_upload(upload.id).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|p| p.upload_id == upload.id));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_unique_violation_names_code_and_rolls_back() {
    let db = setup_test_db().await;
    let repo = ProductRepository::new(db.pool.clone());

    let first = processing_upload(&db.pool, 1).await;
    repo.insert_products(vec![product("4006381333931", &first)])
        .await
        .unwrap();

    // The new code comes first so it is written before the conflicting one
    let second = processing_upload(&db.pool, 2).await;
    let err = repo
        .insert_products(vec![
            product("8710398526106", &second),
            product("4006381333931", &second),
        ])
        .await
        .unwrap_err();

    match err {
        AppError::PersistenceFailure(message) => assert_eq!(
            message,
            "EAN code 4006381333931 was stored by a concurrent upload"
        ),
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(product_rows(&db.pool).await, 1);
    assert!(repo
        .list_products_by_upload(second.id)
        .await
        .unwrap()
        .is_empty());
    assert!(repo
        .find_existing_codes(&["8710398526106".to_string()])
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_delete_products_by_upload() {
    let db = setup_test_db().await;
    let repo = ProductRepository::new(db.pool.clone());
    let kept = processing_upload(&db.pool, 1).await;
    let purged = processing_upload(&db.pool, 2).await;
    repo.insert_products(vec![product("1000000000001", &kept)])
        .await
        .unwrap();
    repo.insert_products(vec![
        product("2000000000002", &purged),
        product("3000000000003", &purged),
    ])
    .await
    .unwrap();

    assert_eq!(repo.delete_products_by_upload(purged.id).await.unwrap(), 2);
    assert_eq!(repo.delete_products_by_upload(purged.id).await.unwrap(), 0);
    assert_eq!(product_rows(&db.pool).await, 1);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_only_processing_records_can_be_finalized() {
    let db = setup_test_db().await;
    let uploads = ProductUploadRepository::new(db.pool.clone());
    let created = processing_upload(&db.pool, 3).await;

    let mut completed = created.clone();
    completed.complete(None).unwrap();
    uploads.update_upload(&completed).await.unwrap();

    let stored = uploads.get_upload(created.id).await.unwrap().unwrap();
    assert_eq!(stored.status, UploadStatus::Completed);
    assert_eq!(stored.product_count, 3);

    // A stale PROCESSING copy must not overwrite the finalized row
    let mut failed = created.clone();
    failed.fail("late failure").unwrap();
    let err = uploads.update_upload(&failed).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidStateTransition { .. }));

    let stored = uploads.get_upload(created.id).await.unwrap().unwrap();
    assert_eq!(stored.status, UploadStatus::Completed);
    assert_eq!(stored.product_count, 3);
    assert_eq!(stored.message, None);

    let mut missing = created.clone();
    missing.id = Uuid::new_v4();
    missing.complete(None).unwrap();
    let err = uploads.update_upload(&missing).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidStateTransition { .. }));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_listing_uploads_by_submitter() {
    let db = setup_test_db().await;
    let uploads = ProductUploadRepository::new(db.pool.clone());
    let first = processing_upload(&db.pool, 1).await;
    let second = processing_upload(&db.pool, 1).await;

    let all = uploads.list_uploads().await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all[0].submitted_at >= all[1].submitted_at);

    let mine = uploads
        .list_uploads_by_submitter(second.submitted_by)
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, second.id);
    assert_ne!(mine[0].id, first.id);

    assert!(uploads.get_upload(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_display_names_fall_back_to_unknown_user() {
    let db = setup_test_db().await;
    let known = Uuid::new_v4();
    sqlx::query("INSERT INTO users (id, display_name) VALUES ($1, $2)")
        .bind(known)
        .bind("Alice Baker")
        .execute(&db.pool)
        .await
        .unwrap();

    let users = UserDirectory::new(db.pool.clone());
    assert_eq!(users.resolve_display_name(known).await.unwrap(), "Alice Baker");
    assert_eq!(
        users.resolve_display_name(Uuid::new_v4()).await.unwrap(),
        UNKNOWN_USER
    );
}
