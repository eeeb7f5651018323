fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use videohub_protocol::{
        Privacy, UploadEvent, UploadProgress, UploadState, VideoMetadata, VideoResource,
    };

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        let path = fixtures_dir().join(name);
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()))
    }

    /// Normalizes JSON values so that integer-valued floats compare equal.
    ///
    /// `0` and `0.0` are the same percentage on the wire.
    fn normalize_value(v: &serde_json::Value) -> serde_json::Value {
        match v {
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => serde_json::json!(f),
                None => v.clone(),
            },
            serde_json::Value::Object(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), normalize_value(v)))
                    .collect(),
            ),
            serde_json::Value::Array(arr) => {
                serde_json::Value::Array(arr.iter().map(normalize_value).collect())
            }
            _ => v.clone(),
        }
    }

    /// Deserializes a fixture into a Rust type, re-serializes it, and compares
    /// the JSON values (order-independent, float-normalized comparison).
    fn roundtrip_test<T>(name: &str) -> T
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));

        assert_eq!(
            normalize_value(&fixture),
            normalize_value(&reserialized),
            "roundtrip mismatch for {name}:\n  fixture: {fixture}\n  rust:    {reserialized}"
        );
        parsed
    }

    fn fixture_metadata() -> VideoMetadata {
        serde_json::from_value(load_fixture("video_metadata.json")).unwrap()
    }

    #[test]
    fn fixture_video_resource() {
        let video: VideoResource = roundtrip_test("video_resource.json");
        assert_eq!(video.id, "abc123");
        assert_eq!(
            video.thumbnail_url(),
            Some("https://i.ytimg.com/vi/abc123/hqdefault.jpg")
        );
    }

    #[test]
    fn fixture_video_insert_response_ignores_unknown_fields() {
        let video: VideoResource =
            serde_json::from_value(load_fixture("video_insert_response.json")).unwrap();
        assert_eq!(video.id, "abc123");
        assert_eq!(video.title(), "Intro to Rust");
        assert_eq!(
            video.thumbnail_url(),
            Some("https://i.ytimg.com/vi/abc123/mqdefault.jpg")
        );
        let status = video.status.unwrap();
        assert_eq!(status.privacy_status, "private");
        assert_eq!(status.upload_status, "uploaded");
    }

    #[test]
    fn fixture_video_metadata() {
        let metadata: VideoMetadata = roundtrip_test("video_metadata.json");
        assert_eq!(metadata.privacy, Privacy::Private);
        assert_eq!(metadata.category_id(), "27");
    }

    #[test]
    fn fixture_insert_body() {
        assert_eq!(fixture_metadata().insert_body(), load_fixture("insert_body.json"));
    }

    #[test]
    fn insert_body_omits_empty_tags() {
        let mut metadata = fixture_metadata();
        metadata.tags.clear();
        let body = metadata.insert_body();
        assert!(body["snippet"].get("tags").is_none());
        assert_eq!(body["snippet"]["categoryId"], "27");
    }

    #[test]
    fn fixture_upload_events() {
        let events: Vec<UploadEvent> = roundtrip_test("upload_events.json");
        assert_eq!(events.len(), 5);
        assert_eq!(
            events[2],
            UploadEvent::Completed {
                video_id: "abc123".into()
            }
        );
        assert_eq!(events[4], UploadEvent::Cancelled);
    }

    #[test]
    fn fixture_upload_progress() {
        let progress: UploadProgress = roundtrip_test("upload_progress.json");
        assert_eq!(progress.state, UploadState::Failed);
        assert!((progress.percentage() - 10.0).abs() < 1e-9);
    }
}
