use crate::client::IndexClient;
use crate::format::Document;
use crate::schema::FieldType;
use std::collections::BTreeMap;
use std::error::Error;

/// A client that accepts everything and performs no I/O.
///
/// Useful for measuring the overhead of the layer itself without any
/// network calls, and for wiring tests that don't care about persistence.
#[derive(Clone, Default)]
pub struct NoopClient;

impl IndexClient for NoopClient {
    fn check_index(&self, _index: &str) -> Result<bool, Box<dyn Error + Send + Sync>> {
        Ok(true)
    }

    fn create_index(&self, _index: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }

    fn set_fields(
        &self,
        _index: &str,
        _fields: &BTreeMap<String, FieldType>,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }

    fn upload_documents(
        &self,
        _index: &str,
        _documents: &[Document],
        _allow_unknown_fields: bool,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}
