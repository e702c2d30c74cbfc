use super::ObjectStorage;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct MockObjectStorage {
    objects: Arc<Mutex<HashMap<String, (Vec<u8>, String)>>>,
    base_url: String,
    upload_count: Arc<Mutex<usize>>,
    presign_count: Arc<Mutex<usize>>,
    fail_uploads: Arc<Mutex<bool>>,
    fail_presign: Arc<Mutex<bool>>,
}

impl MockObjectStorage {
    pub fn new() -> Self {
        Self {
            objects: Arc::new(Mutex::new(HashMap::new())),
            base_url: "https://mock-bucket.tos.example.com".to_string(),
            upload_count: Arc::new(Mutex::new(0)),
            presign_count: Arc::new(Mutex::new(0)),
            fail_uploads: Arc::new(Mutex::new(false)),
            fail_presign: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_upload_failure(self, fail: bool) -> Self {
        *self.fail_uploads.lock().unwrap() = fail;
        self
    }

    pub fn with_presign_failure(self, fail: bool) -> Self {
        *self.fail_presign.lock().unwrap() = fail;
        self
    }

    pub fn get_upload_count(&self) -> usize {
        *self.upload_count.lock().unwrap()
    }

    pub fn get_presign_count(&self) -> usize {
        *self.presign_count.lock().unwrap()
    }

    pub fn get_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn get_object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).map(|(data, _)| data.clone())
    }

    pub fn get_content_type(&self, key: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(_, content_type)| content_type.clone())
    }
}

impl Default for MockObjectStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStorage for MockObjectStorage {
    async fn put_object(&self, key: &str, data: &[u8], content_type: &str) -> Result<()> {
        *self.upload_count.lock().unwrap() += 1;

        if *self.fail_uploads.lock().unwrap() {
            return Err(Error::Upload(format!(
                "failed to upload image to TOS: mock failure for {}",
                key
            )));
        }

        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (data.to_vec(), content_type.to_string()));
        Ok(())
    }

    async fn presign_get(&self, key: &str) -> Result<String> {
        *self.presign_count.lock().unwrap() += 1;

        if *self.fail_presign.lock().unwrap() {
            return Err(Error::Upload(format!(
                "failed to generate pre-signed URL: mock failure for {}",
                key
            )));
        }
        if !self.objects.lock().unwrap().contains_key(key) {
            return Err(Error::Upload(format!("Object not found: {}", key)));
        }

        Ok(format!("{}/{}?X-Tos-Signature=mock", self.base_url, key))
    }
}
