//! End-to-end PDF tests against a real pdfium library.
//!
//! These need libpdfium at runtime, so they are gated behind the
//! `E2E_ENABLED` environment variable and do not run in CI unless
//! explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=/path/to/libpdfium.so cargo test --test e2e -- --nocapture

use attachment_relay::{
    normalize_attachment, Attachment, InboundMessage, Relay, RelayConfig, TurnStatus,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;
use serde_json::{json, Value};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Skip this test unless E2E_ENABLED is set.
macro_rules! e2e_skip_unless_ready {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
    }};
}

/// Build a minimal PDF with `pages` blank US-letter pages and a valid xref.
fn blank_pdf(pages: usize) -> Vec<u8> {
    let mut objects: Vec<String> = Vec::new();
    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
    let kids: Vec<String> = (0..pages).map(|i| format!("{} 0 R", i + 3)).collect();
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        pages
    ));
    for _ in 0..pages {
        objects.push("<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] >>".to_string());
    }

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_at = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for off in offsets {
        out.extend_from_slice(format!("{off:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_at
        )
        .as_bytes(),
    );
    out
}

fn config(url: &str) -> RelayConfig {
    RelayConfig::builder(url)
        .pdf_max_pixels(400)
        .build()
        .expect("valid config")
}

#[tokio::test]
async fn test_pdf_first_page_becomes_png() {
    e2e_skip_unless_ready!();

    let file = normalize_attachment(
        Attachment::from_bytes("scan.PDF", "application/pdf", blank_pdf(3)),
        &config("http://localhost/webhook"),
    )
    .await
    .expect("PDF should convert");

    assert_eq!(file.name, "scan.png");
    assert_eq!(file.mime, "image/png");

    let png = STANDARD.decode(&file.content_base64).unwrap();
    let img = image::load_from_memory_with_format(&png, ImageFormat::Png).expect("valid PNG");
    assert!(img.width() <= 400 && img.height() <= 400);
    // Letter is portrait: height is the capped edge.
    assert!(img.height() > img.width());
    println!("Rendered page 1 → {}x{}", img.width(), img.height());
}

#[tokio::test]
async fn test_invoice_pdf_turn() {
    e2e_skip_unless_ready!();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "output": "Invoice read" })))
        .mount(&server)
        .await;

    let relay = Relay::new(config(&format!("{}/webhook", server.uri()))).unwrap();
    let session = relay.start_session();
    let message = InboundMessage::new("").with_attachment(Attachment::from_bytes(
        "invoice.pdf",
        "application/pdf",
        blank_pdf(1),
    ));
    let report = relay.handle_message(&session, message).await;

    assert_eq!(report.status, TurnStatus::Delivered);
    assert_eq!(
        report.replies,
        vec!["**Uploaded files:** invoice.png\nInvoice read"]
    );

    let requests = server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();
    assert_eq!(body["text"], "File uploaded for processing");
    assert_eq!(body["files"][0]["name"], "invoice.png");
    assert_eq!(body["files"][0]["type"], "image/png");
}

#[tokio::test]
async fn test_zero_page_pdf_fails_conversion() {
    e2e_skip_unless_ready!();

    let err = normalize_attachment(
        Attachment::from_bytes("empty.pdf", "application/pdf", blank_pdf(0)),
        &config("http://localhost/webhook"),
    )
    .await
    .unwrap_err();

    assert!(
        matches!(err, attachment_relay::FileError::ConversionError { .. }),
        "got: {err:?}"
    );
}
