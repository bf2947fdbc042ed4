use crate::format::Document;
use crate::schema::FieldType;
use std::collections::BTreeMap;
use std::error::Error;

/// Client for the remote indexing service that stores log documents.
///
/// Implementations wrap a concrete service client (an HTTP document
/// store, a search engine, an in-memory double for tests). The layer
/// calls `upload_documents` inline on the logging thread, so a slow
/// client directly slows the caller; any timeout behavior belongs to the
/// implementation.
pub trait IndexClient: Send + Sync {
    /// Whether the named index exists.
    fn check_index(&self, index: &str) -> Result<bool, Box<dyn Error + Send + Sync>>;

    /// Create the named index.
    fn create_index(&self, index: &str) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Register the field schema for the named index.
    ///
    /// **Parameters**
    /// - `fields`: field name to declared type, merged into the index
    ///   schema by the service.
    fn set_fields(
        &self,
        index: &str,
        fields: &BTreeMap<String, FieldType>,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Upload documents to the named index.
    ///
    /// **Parameters**
    /// - `documents`: the documents to store; the layer always passes a
    ///   single-element slice.
    /// - `allow_unknown_fields`: let the service accept fields that were
    ///   never registered via `set_fields`.
    ///
    /// **Returns**
    /// - `Ok(())` if the documents were accepted by the service.
    /// - `Err(..)` on network failure, schema mismatch or service error.
    ///   The layer reports the error and drops the record; it never
    ///   retries.
    fn upload_documents(
        &self,
        index: &str,
        documents: &[Document],
        allow_unknown_fields: bool,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}
