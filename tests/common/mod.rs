use std::sync::Arc;

use chrono::Utc;
use metrics_exporter_prometheus::PrometheusBuilder;

use xtra_secure::api::router::create_router;
use xtra_secure::config::AppConfig;
use xtra_secure::metrics::register_metrics;
use xtra_secure::inference::{BinaryModel, Classifier, Classifiers, TextModel, FEATURE_DIM};
use xtra_secure::models::ModelProvenance;
use xtra_secure::pipeline::ClassificationPipeline;
use xtra_secure::AppState;

pub const BOUNDARY: &str = "xtra-test-boundary";

/// Small TF-IDF phishing model with hand-picked weights.
#[allow(dead_code)]
pub fn text_model(probability: bool) -> TextModel {
    let terms: [(&str, f64); 10] = [
        ("verify", 2.0),
        ("account", 1.5),
        ("login", 1.5),
        ("password", 2.0),
        ("bank", 1.0),
        ("http", 1.0),
        ("urgent", 1.5),
        ("meeting", -2.0),
        ("tomorrow", -1.0),
        ("moved", -0.5),
    ];

    TextModel {
        name: "phishing-test".into(),
        vocabulary: terms
            .iter()
            .enumerate()
            .map(|(i, (t, _))| (t.to_string(), i))
            .collect(),
        idf: vec![1.0; terms.len()],
        coef: terms.iter().map(|(_, w)| *w).collect(),
        intercept: -0.5,
        probability,
    }
}

/// Linear malware model that ignores the features: the intercept alone
/// decides the label (`> 0` → Malicious).
#[allow(dead_code)]
pub fn binary_model(intercept: f64, probability: bool) -> BinaryModel {
    BinaryModel {
        name: "malware-test".into(),
        feature_dim: FEATURE_DIM,
        mean: vec![0.0; FEATURE_DIM],
        scale: vec![1.0; FEATURE_DIM],
        coef: vec![0.0; FEATURE_DIM],
        intercept,
        probability,
    }
}

#[allow(dead_code)]
pub fn pipeline(text: TextModel, binary: BinaryModel) -> ClassificationPipeline {
    ClassificationPipeline::new(Classifiers::new(Arc::new(text), Arc::new(binary)))
}

#[allow(dead_code)]
pub fn test_config(api_token: Option<&str>) -> AppConfig {
    let mut config = AppConfig::from_lookup(|key| match key {
        "MODEL_DIR" => Some("tests/fixtures".into()),
        "CORS_ALLOWED_ORIGINS" => Some("*".into()),
        _ => None,
    })
    .expect("test config should parse");
    config.api_token = api_token.map(str::to_string);
    config
}

/// Router over fixture models. The metrics recorder is built but not
/// installed globally, so tests can create as many apps as they like.
#[allow(dead_code)]
pub fn build_test_app(pipeline: ClassificationPipeline, api_token: Option<&str>) -> axum::Router {
    build_test_app_with_config(pipeline, test_config(api_token))
}

#[allow(dead_code)]
pub fn build_test_app_with_config(
    pipeline: ClassificationPipeline,
    config: AppConfig,
) -> axum::Router {
    let provenance = ModelProvenance {
        text: pipeline.classifiers().text.name().to_string(),
        binary: pipeline.classifiers().binary.name().to_string(),
        source: "local:tests/fixtures".into(),
        loaded_at: Utc::now(),
    };

    let recorder = PrometheusBuilder::new().build_recorder();
    let metrics_handle = recorder.handle();
    metrics::with_local_recorder(&recorder, register_metrics);

    let state = AppState {
        config,
        pipeline: Arc::new(pipeline),
        provenance,
        metrics_handle,
    };

    create_router(state)
}

/// Multipart body with a single `file` field.
#[allow(dead_code)]
pub fn multipart_body(field: &str, file_name: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

#[allow(dead_code)]
pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

#[allow(dead_code)]
fn put_u16(buf: &mut [u8], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

#[allow(dead_code)]
fn put_u32(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

/// Section flags of the `.text` section in [`minimal_pe`]: code, execute, read.
#[allow(dead_code)]
pub const TEXT_SECTION_FLAGS: u32 = 0x6000_0020;

/// `IMAGE_SCN_MEM_WRITE`.
#[allow(dead_code)]
pub const SECTION_WRITE: u32 = 0x8000_0000;

/// Minimal well-formed PE32 console image: DOS header, PE signature, COFF
/// header, optional header with empty data directories and a single
/// `.text` section holding a `ret`.
#[allow(dead_code)]
pub fn minimal_pe() -> Vec<u8> {
    pe_with_section_flags(TEXT_SECTION_FLAGS)
}

/// [`minimal_pe`] with custom characteristics on its only section.
#[allow(dead_code)]
pub fn pe_with_section_flags(section_flags: u32) -> Vec<u8> {
    const PE_OFFSET: usize = 0x80;
    const COFF: usize = PE_OFFSET + 4;
    const OPT: usize = COFF + 20;
    const OPT_SIZE: usize = 0xE0;
    const SECTION: usize = OPT + OPT_SIZE;
    const RAW_OFFSET: usize = 0x200;
    const RAW_SIZE: usize = 0x200;

    let mut image = vec![0u8; RAW_OFFSET + RAW_SIZE];

    // DOS header
    image[0..2].copy_from_slice(b"MZ");
    put_u32(&mut image, 0x3C, PE_OFFSET as u32);

    // PE signature + COFF header
    image[PE_OFFSET..PE_OFFSET + 4].copy_from_slice(b"PE\0\0");
    put_u16(&mut image, COFF, 0x014C); // i386
    put_u16(&mut image, COFF + 2, 1); // sections
    put_u32(&mut image, COFF + 4, 0x5F00_0000); // timestamp
    put_u16(&mut image, COFF + 16, OPT_SIZE as u16);
    put_u16(&mut image, COFF + 18, 0x0102); // executable, 32-bit

    // Optional header (PE32)
    put_u16(&mut image, OPT, 0x010B);
    image[OPT + 2] = 14; // linker major
    put_u32(&mut image, OPT + 4, RAW_SIZE as u32); // size of code
    put_u32(&mut image, OPT + 16, 0x1000); // entry point
    put_u32(&mut image, OPT + 20, 0x1000); // base of code
    put_u32(&mut image, OPT + 28, 0x0040_0000); // image base
    put_u32(&mut image, OPT + 32, 0x1000); // section alignment
    put_u32(&mut image, OPT + 36, 0x200); // file alignment
    put_u16(&mut image, OPT + 40, 6); // OS major
    put_u16(&mut image, OPT + 48, 6); // subsystem major
    put_u32(&mut image, OPT + 56, 0x2000); // size of image
    put_u32(&mut image, OPT + 60, 0x200); // size of headers
    put_u16(&mut image, OPT + 68, 3); // console subsystem
    put_u16(&mut image, OPT + 70, 0x8140); // NX, dynamic base, TS aware
    put_u32(&mut image, OPT + 72, 0x0010_0000); // stack reserve
    put_u32(&mut image, OPT + 76, 0x1000); // stack commit
    put_u32(&mut image, OPT + 80, 0x0010_0000); // heap reserve
    put_u32(&mut image, OPT + 84, 0x1000); // heap commit
    put_u32(&mut image, OPT + 92, 16); // data directory count

    // Section table
    image[SECTION..SECTION + 5].copy_from_slice(b".text");
    put_u32(&mut image, SECTION + 8, RAW_SIZE as u32); // virtual size
    put_u32(&mut image, SECTION + 12, 0x1000); // virtual address
    put_u32(&mut image, SECTION + 16, RAW_SIZE as u32); // raw size
    put_u32(&mut image, SECTION + 20, RAW_OFFSET as u32); // raw pointer
    put_u32(&mut image, SECTION + 36, section_flags);

    image[RAW_OFFSET] = 0xC3;
    image
}
