//! Tile responses and the observations drawn from them.

use std::fmt;
use std::io::Cursor;

use image::{ImageFormat, ImageReader};

use super::{TileRequest, WmtsError};
use crate::http::{HttpResponse, StatusCode, Url};

/// Whether the server rendered the tile or served it from its store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheResult {
    Miss,
    Hit,
    /// Header present with an unrecognized value.
    Other(String),
    /// Header missing.
    Absent,
}

impl CacheResult {
    /// Interprets a cache-result header value, ignoring case.
    pub fn from_header(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None => CacheResult::Absent,
            Some(v) if v.eq_ignore_ascii_case("MISS") => CacheResult::Miss,
            Some(v) if v.eq_ignore_ascii_case("HIT") => CacheResult::Hit,
            Some(v) => CacheResult::Other(v.to_string()),
        }
    }
}

impl fmt::Display for CacheResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheResult::Miss => f.write_str("MISS"),
            CacheResult::Hit => f.write_str("HIT"),
            CacheResult::Other(v) => write!(f, "{:?}", v),
            CacheResult::Absent => f.write_str("(absent)"),
        }
    }
}

/// Format and pixel size of a decoded tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

impl ImageInfo {
    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }
}

impl fmt::Display for ImageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}x{}", self.mime_type(), self.width, self.height)
    }
}

/// Everything observed from one `GetTile` call.
#[derive(Debug, Clone)]
pub struct TileResponse {
    pub request: TileRequest,
    pub url: Url,
    pub status: StatusCode,
    pub cache_result: CacheResult,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl TileResponse {
    /// Builds the observation from a raw response.
    pub fn new(request: TileRequest, url: Url, response: HttpResponse, cache_header: &str) -> Self {
        let cache_result = CacheResult::from_header(response.header(cache_header));
        Self {
            request,
            url,
            status: response.status,
            cache_result,
            headers: response.headers,
            body: response.body,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Reads the image header of the body.
    ///
    /// Only the header is decoded; pixel data is never loaded.
    pub fn image_info(&self) -> Result<ImageInfo, WmtsError> {
        let reader = ImageReader::new(Cursor::new(self.body.as_slice()))
            .with_guessed_format()
            .map_err(|e| self.image_error(e.to_string()))?;
        let format = reader
            .format()
            .ok_or_else(|| self.image_error("unrecognized image format".to_string()))?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| self.image_error(e.to_string()))?;
        Ok(ImageInfo {
            format,
            width,
            height,
        })
    }

    fn image_error(&self, reason: String) -> WmtsError {
        WmtsError::Image {
            url: self.url.to_string(),
            reason,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    /// Encodes a blank image of the given size.
    pub(crate) fn encoded_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let image: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::new(width, height);
        let mut bytes = Cursor::new(Vec::new());
        match format {
            ImageFormat::Jpeg => image::DynamicImage::ImageRgba8(image)
                .to_rgb8()
                .write_to(&mut bytes, format)
                .unwrap(),
            _ => image.write_to(&mut bytes, format).unwrap(),
        }
        bytes.into_inner()
    }

    fn response(body: Vec<u8>, cache: Option<&str>) -> TileResponse {
        let request = TileRequest::new("topp:states", "EPSG:4326", "image/png", 3, 2, 3);
        let mut http = HttpResponse::new(StatusCode::OK, body);
        if let Some(value) = cache {
            http = http.with_header("geowebcache-cache-result", value);
        }
        TileResponse::new(
            request,
            Url::parse("http://node1/gwc/service/wmts").unwrap(),
            http,
            "geowebcache-cache-result",
        )
    }

    #[test]
    fn test_cache_result_from_header() {
        assert_eq!(CacheResult::from_header(Some("MISS")), CacheResult::Miss);
        assert_eq!(CacheResult::from_header(Some("hit ")), CacheResult::Hit);
        assert_eq!(
            CacheResult::from_header(Some("WMS")),
            CacheResult::Other("WMS".to_string())
        );
        assert_eq!(CacheResult::from_header(None), CacheResult::Absent);
    }

    #[test]
    fn test_response_reads_configured_header() {
        let tile = response(Vec::new(), Some("HIT"));
        assert_eq!(tile.cache_result, CacheResult::Hit);
        assert!(tile.is_success());

        let tile = response(Vec::new(), None);
        assert_eq!(tile.cache_result, CacheResult::Absent);
    }

    #[test]
    fn test_image_info_png() {
        let tile = response(encoded_image(256, 256, ImageFormat::Png), Some("MISS"));
        let info = tile.image_info().unwrap();
        assert_eq!(info.format, ImageFormat::Png);
        assert_eq!((info.width, info.height), (256, 256));
        assert_eq!(info.mime_type(), "image/png");
    }

    #[test]
    fn test_image_info_non_square_jpeg() {
        let tile = response(encoded_image(200, 100, ImageFormat::Jpeg), Some("MISS"));
        let info = tile.image_info().unwrap();
        assert_eq!(info.format, ImageFormat::Jpeg);
        assert_eq!((info.width, info.height), (200, 100));
    }

    #[test]
    fn test_image_info_rejects_non_image() {
        let tile = response(b"<ServiceExceptionReport/>".to_vec(), None);
        assert!(matches!(tile.image_info(), Err(WmtsError::Image { .. })));
    }
}
