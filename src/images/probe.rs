//! 画像1枚のダウンロードと解析

use crate::error::Result;
use image::{ColorType, DynamicImage, ImageReader};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use std::io::Cursor;
use std::time::Duration;
use tracing::debug;

/// 画像チェックCSVの列
pub const IMAGE_HEADER: [&str; 11] = [
    "product_id",
    "result",
    "width",
    "height",
    "aspect_ratio",
    "file_size_kb",
    "format",
    "color_mode",
    "has_transparency",
    "filename",
    "url",
];

/// 解析できた画像の情報
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub aspect_ratio: f64,
    pub file_size_kb: f64,
    pub format: String,
    pub color_mode: String,
    pub has_transparency: bool,
}

/// 1商品分のチェック結果
#[derive(Debug, Clone, PartialEq)]
pub struct ImageReport {
    pub product_id: String,
    pub url: String,
    pub filename: String,
    pub outcome: std::result::Result<ImageInfo, String>,
}

impl ImageReport {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn result_label(&self) -> String {
        match &self.outcome {
            Ok(_) => "success".to_string(),
            Err(e) => format!("error: {}", e),
        }
    }

    /// CSV1行（失敗時は数値を0、文字列を空にする）
    pub fn to_record(&self) -> Vec<String> {
        let (width, height, aspect, size, format, mode, alpha) = match &self.outcome {
            Ok(info) => (
                info.width.to_string(),
                info.height.to_string(),
                format!("{:.2}", info.aspect_ratio),
                format!("{:.2}", info.file_size_kb),
                info.format.clone(),
                info.color_mode.clone(),
                info.has_transparency.to_string(),
            ),
            Err(_) => (
                "0".into(),
                "0".into(),
                "0".into(),
                "0".into(),
                String::new(),
                String::new(),
                String::new(),
            ),
        };

        vec![
            self.product_id.clone(),
            self.result_label(),
            width,
            height,
            aspect,
            size,
            format,
            mode,
            alpha,
            self.filename.clone(),
            self.url.clone(),
        ]
    }
}

/// ブラウザ相当のヘッダーをつけたHTTPクライアント
pub fn build_client(user_agent: &str, timeout_seconds: u64) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("image/webp,image/apng,image/*,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    let client = Client::builder()
        .user_agent(user_agent)
        .default_headers(headers)
        .timeout(Duration::from_secs(timeout_seconds))
        .build()?;
    Ok(client)
}

/// URLの最後のセグメント
pub fn filename_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').next().unwrap_or("").to_string()
}

/// 画像をダウンロードして解析（失敗はエラー結果として返す）
pub fn probe(client: &Client, product_id: &str, url: &str) -> ImageReport {
    debug!("画像チェック: {}", url);
    let outcome = fetch(client, url).and_then(|bytes| inspect_bytes(&bytes));
    ImageReport {
        product_id: product_id.to_string(),
        url: url.to_string(),
        filename: filename_from_url(url),
        outcome,
    }
}

fn fetch(client: &Client, url: &str) -> std::result::Result<Vec<u8>, String> {
    let response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| e.to_string())?;
    let bytes = response.bytes().map_err(|e| e.to_string())?;
    Ok(bytes.to_vec())
}

/// ダウンロード済みのバイト列を解析
pub fn inspect_bytes(bytes: &[u8]) -> std::result::Result<ImageInfo, String> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| e.to_string())?;
    let format = reader
        .format()
        .map(|f| format!("{:?}", f).to_uppercase())
        .unwrap_or_default();
    let image = reader.decode().map_err(|e| e.to_string())?;

    let (width, height) = (image.width(), image.height());
    let aspect_ratio = if height > 0 {
        width as f64 / height as f64
    } else {
        0.0
    };

    Ok(ImageInfo {
        width,
        height,
        aspect_ratio,
        file_size_kb: bytes.len() as f64 / 1024.0,
        format,
        color_mode: color_mode(&image).to_string(),
        has_transparency: image.color().has_alpha(),
    })
}

fn color_mode(image: &DynamicImage) -> &'static str {
    match image.color() {
        ColorType::L8 | ColorType::L16 => "L",
        ColorType::La8 | ColorType::La16 => "LA",
        ColorType::Rgb8 | ColorType::Rgb16 | ColorType::Rgb32F => "RGB",
        ColorType::Rgba8 | ColorType::Rgba16 | ColorType::Rgba32F => "RGBA",
        _ => "OTHER",
    }
}
