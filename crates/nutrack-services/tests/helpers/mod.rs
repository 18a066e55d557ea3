//! Test helpers: in-memory stores and product file fixtures.
//!
//! Run from workspace root: `cargo test -p nutrack-services`.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use nutrack_core::models::{NewUploadRecord, Product, UploadRecord, UploadStatus};
use nutrack_core::{AppError, PipelineLimits};
use nutrack_db::{IdentityResolver, ProductStore, UploadRecordStore, UNKNOWN_USER};
use nutrack_services::ProductUploadService;
use serde_json::{json, Value};
use tokio::sync::Barrier;
use uuid::Uuid;

/// In-memory implementation of every store the pipeline uses.
///
/// Product inserts are atomic: the unique check and the insert happen under one lock,
/// and a failing batch leaves nothing behind.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    products: Arc<Mutex<HashMap<String, Product>>>,
    uploads: Arc<Mutex<HashMap<Uuid, UploadRecord>>>,
    users: Arc<Mutex<HashMap<Uuid, String>>>,
    insert_calls: Arc<Mutex<usize>>,
    fail_inserts_with: Arc<Mutex<Option<String>>>,
    fail_status_updates: Arc<Mutex<bool>>,
    insert_barrier: Arc<Mutex<Option<Arc<Barrier>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, id: Uuid, display_name: &str) {
        self.users
            .lock()
            .unwrap()
            .insert(id, display_name.to_string());
    }

    /// Seed a product as if stored by an earlier upload.
    pub fn seed_product(&self, ean13_code: &str) {
        let product = Product {
            id: Uuid::new_v4(),
            ean13_code: ean13_code.to_string(),
            product_name: "Seeded product".to_string(),
            amount: 100.0,
            unit: "G".to_string(),
            calories: 100.0,
            protein: 0.0,
            carbs: 0.0,
            fat: 0.0,
            fiber: 0.0,
            sugar: 0.0,
            salt: 0.0,
            upload_id: Uuid::new_v4(),
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
        };
        self.products
            .lock()
            .unwrap()
            .insert(ean13_code.to_string(), product);
    }

    /// Make every following insert fail with a store error.
    pub fn fail_inserts_with(&self, message: &str) {
        *self.fail_inserts_with.lock().unwrap() = Some(message.to_string());
    }

    /// Make status updates fail, leaving records as they were.
    pub fn fail_status_updates(&self) {
        *self.fail_status_updates.lock().unwrap() = true;
    }

    /// Hold every insert until `parties` inserts are waiting.
    pub fn synchronize_inserts(&self, parties: usize) {
        *self.insert_barrier.lock().unwrap() = Some(Arc::new(Barrier::new(parties)));
    }

    pub fn product_count(&self) -> usize {
        self.products.lock().unwrap().len()
    }

    pub fn product_codes(&self) -> HashSet<String> {
        self.products.lock().unwrap().keys().cloned().collect()
    }

    pub fn products_for_upload(&self, upload_id: Uuid) -> Vec<Product> {
        self.products
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.upload_id == upload_id)
            .cloned()
            .collect()
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn upload(&self, id: Uuid) -> Option<UploadRecord> {
        self.uploads.lock().unwrap().get(&id).cloned()
    }

    pub fn uploads_with_status(&self, status: UploadStatus) -> Vec<UploadRecord> {
        self.uploads
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.status == status)
            .cloned()
            .collect()
    }

    pub fn insert_calls(&self) -> usize {
        *self.insert_calls.lock().unwrap()
    }

    /// Store a record directly, bypassing the pipeline.
    pub fn put_upload(&self, record: UploadRecord) {
        self.uploads.lock().unwrap().insert(record.id, record);
    }
}

#[async_trait]
impl ProductStore for InMemoryStore {
    async fn find_existing_codes(&self, codes: &[String]) -> Result<HashSet<String>, AppError> {
        let products = self.products.lock().unwrap();
        Ok(codes
            .iter()
            .filter(|c| products.contains_key(*c))
            .cloned()
            .collect())
    }

    async fn insert_products(&self, products: Vec<Product>) -> Result<u64, AppError> {
        *self.insert_calls.lock().unwrap() += 1;

        let barrier = self.insert_barrier.lock().unwrap().clone();
        if let Some(barrier) = barrier {
            barrier.wait().await;
        }

        let failure = self.fail_inserts_with.lock().unwrap().clone();
        if let Some(message) = failure {
            return Err(AppError::Internal(message));
        }

        let mut stored = self.products.lock().unwrap();
        if let Some(taken) = products
            .iter()
            .find(|p| stored.contains_key(&p.ean13_code))
        {
            return Err(AppError::PersistenceFailure(format!(
                "EAN code {} was stored by a concurrent upload",
                taken.ean13_code
            )));
        }

        let count = products.len() as u64;
        for product in products {
            stored.insert(product.ean13_code.clone(), product);
        }
        Ok(count)
    }

    async fn delete_products_by_upload(&self, upload_id: Uuid) -> Result<u64, AppError> {
        let mut stored = self.products.lock().unwrap();
        let before = stored.len();
        stored.retain(|_, p| p.upload_id != upload_id);
        Ok((before - stored.len()) as u64)
    }

    async fn list_products_by_upload(&self, upload_id: Uuid) -> Result<Vec<Product>, AppError> {
        let mut products = self.products_for_upload(upload_id);
        products.sort_by(|a, b| a.ean13_code.cmp(&b.ean13_code));
        Ok(products)
    }
}

#[async_trait]
impl UploadRecordStore for InMemoryStore {
    async fn create_upload(&self, new: NewUploadRecord) -> Result<UploadRecord, AppError> {
        let record = UploadRecord::processing(Uuid::new_v4(), new);
        self.put_upload(record.clone());
        Ok(record)
    }

    async fn update_upload(&self, record: &UploadRecord) -> Result<(), AppError> {
        let rejected = *self.fail_status_updates.lock().unwrap();
        if rejected {
            return Err(AppError::Internal("status update rejected".to_string()));
        }

        let mut uploads = self.uploads.lock().unwrap();
        match uploads.get_mut(&record.id) {
            Some(stored) if stored.status == UploadStatus::Processing => {
                *stored = record.clone();
                Ok(())
            }
            Some(stored) => Err(AppError::InvalidStateTransition {
                from: stored.status.to_string(),
                to: record.status.to_string(),
            }),
            None => Err(AppError::NotFound(format!("Upload {} not found", record.id))),
        }
    }

    async fn get_upload(&self, id: Uuid) -> Result<Option<UploadRecord>, AppError> {
        Ok(self.upload(id))
    }

    async fn list_uploads(&self) -> Result<Vec<UploadRecord>, AppError> {
        let mut records: Vec<_> = self.uploads.lock().unwrap().values().cloned().collect();
        records.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(records)
    }

    async fn list_uploads_by_submitter(
        &self,
        submitted_by: Uuid,
    ) -> Result<Vec<UploadRecord>, AppError> {
        let mut records = self.list_uploads().await?;
        records.retain(|r| r.submitted_by == submitted_by);
        Ok(records)
    }
}

#[async_trait]
impl IdentityResolver for InMemoryStore {
    async fn resolve_display_name(&self, user_id: Uuid) -> Result<String, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_USER.to_string()))
    }
}

/// Service wired to one in-memory store with default limits.
pub fn service(store: &InMemoryStore) -> ProductUploadService {
    let store = Arc::new(store.clone());
    ProductUploadService::new(
        store.clone(),
        store.clone(),
        store,
        PipelineLimits::default(),
    )
}

/// A valid product object as it appears in an upload file.
pub fn product_json(ean13_code: &str, name: &str) -> Value {
    json!({
        "ean13Code": ean13_code,
        "productName": name,
        "amount": 250,
        "unit": "grams",
        "calories": 120.5,
        "protein": 4.2,
        "fat": 1.1
    })
}

/// Serialize product objects into an upload body.
pub fn upload_body(products: Vec<Value>) -> Vec<u8> {
    serde_json::to_vec(&Value::Array(products)).unwrap()
}
