//! Common test utilities for doc-harvester integration tests

use doc_harvester::config::{Config, StorageBackend};
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Body served for every PDF fixture; a valid header is enough for the harvester
pub const PDF_BYTES: &[u8] = b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n1 0 obj\n<<>>\nendobj\n%%EOF\n";

/// Config storing into `root` through the filesystem backend
pub fn filesystem_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.storage.bucket = "documents".to_string();
    config.storage.backend = StorageBackend::Filesystem {
        root: root.to_path_buf(),
    };
    config
}

/// Serve `html` at `page_path`
pub async fn mount_page(server: &MockServer, page_path: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "text/html; charset=utf-8")
                .set_body_string(html),
        )
        .mount(server)
        .await;
}

/// Serve [`PDF_BYTES`] at `file_path`
pub async fn mount_pdf(server: &MockServer, file_path: &str) {
    Mock::given(method("GET"))
        .and(path(file_path))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "application/pdf")
                .set_body_bytes(PDF_BYTES.to_vec()),
        )
        .mount(server)
        .await;
}

/// Serve a response with an arbitrary status and content type at `file_path`
#[allow(dead_code)]
pub async fn mount_response(server: &MockServer, file_path: &str, status: u16, content_type: &str) {
    Mock::given(method("GET"))
        .and(path(file_path))
        .respond_with(
            ResponseTemplate::new(status)
                .insert_header("Content-Type", content_type)
                .set_body_string("<html>not a document</html>"),
        )
        .mount(server)
        .await;
}
