fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use docferry_protocol::{
        ApiResponse, ChunkUploadRequest, DocumentMetadata, FinalizeData, FinalizeRequest,
    };

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a fixture JSON file as raw text.
    fn load_fixture_text(name: &str) -> String {
        let path = fixtures_dir().join(name);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        serde_json::from_str(&load_fixture_text(name))
            .unwrap_or_else(|e| panic!("failed to parse fixture {name}: {e}"))
    }

    fn sample_metadata() -> DocumentMetadata {
        DocumentMetadata {
            site_id: "site-7".into(),
            template_type: "knowledge-base".into(),
            tags: vec!["hr".into(), "policy".into()],
        }
    }

    #[test]
    fn chunk_upload_request_matches_fixture() {
        let request = ChunkUploadRequest {
            file_id: "1754000000000-9f1c2ab4".into(),
            chunk_index: 1,
            total_chunks: 3,
            file_name: "employee-handbook.pdf".into(),
            file_size: 2_621_440,
            chunk: b"Hello, world!".to_vec(),
            metadata: Some(sample_metadata()),
        };
        let serialized = serde_json::to_value(&request).unwrap();
        assert_eq!(serialized, load_fixture("chunk_upload_request.json"));
    }

    #[test]
    fn chunk_upload_request_parses_from_fixture() {
        let fixture = load_fixture("chunk_upload_request.json");
        let request: ChunkUploadRequest = serde_json::from_value(fixture).unwrap();
        assert_eq!(request.chunk, b"Hello, world!");
        assert_eq!(request.chunk_index, 1);
        assert_eq!(request.metadata.unwrap().site_id, "site-7");
    }

    #[test]
    fn finalize_request_matches_fixture() {
        let request = FinalizeRequest {
            file_id: "1754000000000-9f1c2ab4".into(),
            file_name: "employee-handbook.pdf".into(),
            file_size: 2_621_440,
            total_chunks: 3,
            metadata: Some(DocumentMetadata {
                site_id: "site-7".into(),
                template_type: String::new(),
                tags: vec![],
            }),
        };
        let serialized = serde_json::to_value(&request).unwrap();
        assert_eq!(serialized, load_fixture("finalize_request.json"));
    }

    #[test]
    fn success_response_parses_document_handle() {
        // `RawValue` payloads deserialize from text, not from `Value`.
        let text = load_fixture_text("api_response_success.json");
        let response: ApiResponse = serde_json::from_str(&text).unwrap();
        assert!(response.success);
        let data: FinalizeData = response.parse_data().unwrap().unwrap();
        assert_eq!(data.document_id, "doc-8841");
        assert_eq!(data.job_id.as_deref(), Some("ingest-531"));
    }

    #[test]
    fn error_array_response_joins_messages() {
        let text = load_fixture_text("api_response_error_array.json");
        let response: ApiResponse = serde_json::from_str(&text).unwrap();
        assert!(!response.success);
        assert_eq!(
            response.error_message().unwrap(),
            "siteId is required, templateType must be a string"
        );
    }

    #[test]
    fn error_string_response_passes_through() {
        let text = load_fixture_text("api_response_error_string.json");
        let response: ApiResponse = serde_json::from_str(&text).unwrap();
        assert_eq!(response.error_message().unwrap(), "upload session not found");
    }
}
