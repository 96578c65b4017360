use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use hkexkit::{Hkex, HkexError, HkexUrls, Result, Transport};

#[allow(dead_code)]
pub const BASE: &str = "http://portal.test";

pub fn fixture_path(relative: impl AsRef<Path>) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(relative)
}

pub fn read_fixture(relative: impl AsRef<Path>) -> String {
    fs::read_to_string(fixture_path(relative)).expect("fixture file should be readable")
}

#[allow(dead_code)]
pub fn hkex() -> Hkex {
    Hkex::new("test_agent example@example.com").unwrap()
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(dead_code)]
pub enum Call {
    Lookup(String),
    Search(Vec<(String, String)>),
    Document(String),
}

/// Canned portal: one lookup body, one search body, documents by URL.
#[derive(Debug, Default)]
#[allow(dead_code)]
pub struct StubTransport {
    pub lookup_body: String,
    pub search_body: String,
    pub documents: HashMap<String, Vec<u8>>,
    pub failing_search: bool,
    calls: Mutex<Vec<Call>>,
}

#[allow(dead_code)]
impl StubTransport {
    pub fn new(lookup_body: impl Into<String>, search_body: impl Into<String>) -> Self {
        Self {
            lookup_body: lookup_body.into(),
            search_body: search_body.into(),
            ..Self::default()
        }
    }

    pub fn with_document(mut self, path: &str, bytes: &[u8]) -> Self {
        self.documents.insert(format!("{}{}", BASE, path), bytes.to_vec());
        self
    }

    pub fn with_failing_search(mut self) -> Self {
        self.failing_search = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn document_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Document(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    pub fn into_client(self) -> (Hkex, Arc<StubTransport>) {
        let stub = Arc::new(self);
        let hkex = Hkex::with_transport(stub.clone(), HkexUrls::with_base(BASE));
        (hkex, stub)
    }

    fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn get_text(&self, url: &str) -> Result<String> {
        self.push(Call::Lookup(url.to_string()));
        Ok(self.lookup_body.clone())
    }

    async fn post_form(&self, _url: &str, form: &[(String, String)]) -> Result<String> {
        self.push(Call::Search(form.to_vec()));
        if self.failing_search {
            return Err(HkexError::InvalidResponse(
                "Unexpected status code: 503 Service Unavailable".to_string(),
            ));
        }
        Ok(self.search_body.clone())
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.push(Call::Document(url.to_string()));
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| HkexError::NotFound(url.to_string()))
    }
}
