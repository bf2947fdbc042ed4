//! Shared test double for the [`IndexClient`] seam.

use crate::client::IndexClient;
use crate::format::Document;
use crate::schema::FieldType;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::Mutex;

/// One recorded client call.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCall {
    CheckIndex(String),
    CreateIndex(String),
    SetFields(String, BTreeMap<String, FieldType>),
    UploadDocuments {
        index: String,
        documents: Vec<Document>,
        allow_unknown_fields: bool,
    },
}

/// Scripted [`IndexClient`] that records every call.
pub struct RecordingClient {
    calls: Mutex<Vec<ClientCall>>,
    index_exists: bool,
    fail_uploads: bool,
}

impl RecordingClient {
    /// Index present, uploads succeed.
    pub fn new() -> Self {
        Self::with_index_exists(true)
    }

    pub fn with_index_exists(index_exists: bool) -> Self {
        RecordingClient {
            calls: Mutex::new(Vec::new()),
            index_exists,
            fail_uploads: false,
        }
    }

    /// Index present, every upload fails.
    pub fn failing() -> Self {
        RecordingClient {
            calls: Mutex::new(Vec::new()),
            index_exists: true,
            fail_uploads: true,
        }
    }

    pub fn calls(&self) -> Vec<ClientCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Document lists passed to `upload_documents`, in call order.
    pub fn uploads(&self) -> Vec<Vec<Document>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ClientCall::UploadDocuments { documents, .. } => Some(documents),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: ClientCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl IndexClient for RecordingClient {
    fn check_index(&self, index: &str) -> Result<bool, Box<dyn Error + Send + Sync>> {
        self.record(ClientCall::CheckIndex(index.to_string()));
        Ok(self.index_exists)
    }

    fn create_index(&self, index: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.record(ClientCall::CreateIndex(index.to_string()));
        Ok(())
    }

    fn set_fields(
        &self,
        index: &str,
        fields: &BTreeMap<String, FieldType>,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.record(ClientCall::SetFields(index.to_string(), fields.clone()));
        Ok(())
    }

    fn upload_documents(
        &self,
        index: &str,
        documents: &[Document],
        allow_unknown_fields: bool,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.record(ClientCall::UploadDocuments {
            index: index.to_string(),
            documents: documents.to_vec(),
            allow_unknown_fields,
        });
        if self.fail_uploads {
            return Err("upload rejected by test client".into());
        }
        Ok(())
    }
}
