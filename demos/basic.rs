use std::collections::BTreeMap;
use std::error::Error;
use std::sync::Arc;

use tracing::{error, info};
use tracing_index_log::{
    client::IndexClient,
    format::Document,
    init::{init_index_logging_with_config, IndexLogConfig},
    schema::FieldType,
};

/// Example of wiring a custom indexing backend by implementing the
/// `IndexClient` trait directly. Imagine this wraps the HTTP client of
/// your document search service; for the sake of example we just print
/// what would be sent.
struct PrintlnClient;

impl IndexClient for PrintlnClient {
    fn check_index(&self, index: &str) -> Result<bool, Box<dyn Error + Send + Sync>> {
        println!("[index-client] check_index {}", index);
        Ok(false)
    }

    fn create_index(&self, index: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        println!("[index-client] create_index {}", index);
        Ok(())
    }

    fn set_fields(
        &self,
        index: &str,
        fields: &BTreeMap<String, FieldType>,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        println!("[index-client] set_fields {} ({} fields)", index, fields.len());
        Ok(())
    }

    fn upload_documents(
        &self,
        index: &str,
        documents: &[Document],
        _allow_unknown_fields: bool,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        for doc in documents {
            println!("[index-client] upload to {}: {:?}", index, doc);
        }
        Ok(())
    }
}

fn main() {
    let client = Arc::new(PrintlnClient);

    let mut config = IndexLogConfig::new("job_logs");
    config.copy_console = false;
    config.extra_fields = vec!["user_id".to_string()];
    config.extra_values = BTreeMap::from([("host".to_string(), "worker-1".to_string())]);

    init_index_logging_with_config(client, config).expect("init index logging");

    info!(user_id = "u-42", "demo started");

    let err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
    let err: &(dyn Error + 'static) = &err;
    error!(err = err, user_id = "u-42", "simulated failure");
}
