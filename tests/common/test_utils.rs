use super::mocks::{MockClassifier, MockDetector};
use axum::{Router, body::Body, http::Response};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use khon_detect::{
    pipeline::DetectClassifyPipeline,
    server::{self, AppState},
    upload::UploadStore,
};
use serde_json::Value;
use std::{io::Cursor, path::PathBuf, sync::Arc};
use tempfile::TempDir;

pub const BOUNDARY: &str = "khon-test-boundary";

/// A router wired to mocks, plus the directories it writes to
pub struct TestApp {
    pub router: Router,
    pub upload_dir: PathBuf,
    pub result_dir: PathBuf,
    pub detector: Arc<MockDetector>,
    pub classifier: Arc<MockClassifier>,
    _temp_dir: TempDir,
}

pub async fn create_test_app(detector: MockDetector, classifier: MockClassifier) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let upload_dir = temp_dir.path().join("images");
    let result_dir = temp_dir.path().join("static").join("results");

    let detector = Arc::new(detector);
    let classifier = Arc::new(classifier);

    let pipeline = DetectClassifyPipeline::new(detector.clone(), classifier.clone(), &result_dir)
        .await
        .unwrap();
    let uploads = UploadStore::new(
        &upload_dir,
        vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()],
    )
    .await
    .unwrap();

    let state = AppState {
        pipeline: Arc::new(pipeline),
        uploads: Arc::new(uploads),
    };

    TestApp {
        router: server::router(state, 1024 * 1024),
        upload_dir,
        result_dir,
        detector,
        classifier,
        _temp_dir: temp_dir,
    }
}

/// Encodes a solid-colour PNG of the given size
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([180, 40, 40])));
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Encodes a grey JPEG and tags it with the given EXIF Orientation value
pub fn jpeg_bytes_with_orientation(width: u32, height: u32, orientation: u8) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([90, 90, 90])));
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Jpeg).unwrap();
    let jpeg = out.into_inner();

    // APP1 with a big-endian TIFF header and a single Orientation (0x0112) entry
    let mut app1 = vec![0xFF, 0xE1, 0x00, 0x22];
    app1.extend_from_slice(b"Exif\0\0");
    app1.extend_from_slice(&[b'M', b'M', 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08]);
    app1.extend_from_slice(&[0x00, 0x01]);
    app1.extend_from_slice(&[0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01]);
    app1.extend_from_slice(&[0x00, orientation, 0x00, 0x00]);
    app1.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);

    let mut tagged = jpeg[..2].to_vec();
    tagged.extend_from_slice(&app1);
    tagged.extend_from_slice(&jpeg[2..]);
    tagged
}

/// One multipart part; `file_name` of `None` makes it a plain form value
pub struct Part<'a> {
    pub name: &'a str,
    pub file_name: Option<&'a str>,
    pub data: Vec<u8>,
}

impl<'a> Part<'a> {
    pub fn file(name: &'a str, file_name: &'a str, data: Vec<u8>) -> Self {
        Self {
            name,
            file_name: Some(file_name),
            data,
        }
    }

    pub fn text(name: &'a str, value: &str) -> Self {
        Self {
            name,
            file_name: None,
            data: value.as_bytes().to_vec(),
        }
    }
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part.file_name {
            Some(file_name) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        part.name, file_name
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name)
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn upload_request(parts: &[Part<'_>]) -> axum::http::Request<Body> {
    axum::http::Request::builder()
        .method("POST")
        .uri("/detect_and_classify")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
