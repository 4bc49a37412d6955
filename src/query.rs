//! Query-string validation: decides whether a request should be resized at
//! all and, if so, with which parameters.

use std::fmt;

use percent_encoding::percent_decode_str;
use tracing::debug;

use crate::rejection::Rejection;

/// Quality used when `q` is missing, unparsable or zero.
pub const DEFAULT_QUALITY: u8 = 100;

/// Largest width or height a request may ask for.
pub const MAX_DIMENSION: u32 = 16_384;

/// Image types the resizer accepts, both as a source extension and as an
/// explicit `f` override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageType {
    Jpeg,
    Png,
    Gif,
    WebP,
    Svg,
    Tiff,
}

impl ImageType {
    /// Maps a lower-cased extension or format name; `jpg` is treated as `jpeg`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::WebP),
            "svg" => Some(Self::Svg),
            "tiff" => Some(Self::Tiff),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::WebP => "webp",
            Self::Svg => "svg",
            Self::Tiff => "tiff",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::WebP => "image/webp",
            Self::Svg => "image/svg+xml",
            Self::Tiff => "image/tiff",
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformParams {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub quality: u8,
    pub format: ImageType,
}

impl TransformParams {
    /// `WxH` with `auto` standing in for an absent side.
    pub fn requested_size(&self) -> String {
        let side = |v: Option<u32>| v.map_or_else(|| "auto".to_string(), |v| v.to_string());
        format!("{}x{}", side(self.width), side(self.height))
    }
}

/// Raw `w`, `h`, `q` and `f` values. The first occurrence of a key wins.
#[derive(Debug, Default, PartialEq)]
struct RawQuery {
    w: Option<String>,
    h: Option<String>,
    q: Option<String>,
    f: Option<String>,
}

impl RawQuery {
    fn parse(querystring: &str) -> Self {
        let mut raw = RawQuery::default();
        for pair in querystring.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let slot = match form_decode(key).as_str() {
                "w" => &mut raw.w,
                "h" => &mut raw.h,
                "q" => &mut raw.q,
                "f" => &mut raw.f,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(form_decode(value));
            }
        }
        raw
    }
}

fn form_decode(s: &str) -> String {
    let s = s.replace('+', " ");
    percent_decode_str(&s).decode_utf8_lossy().into_owned()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Lenient integer policy: optional leading whitespace, an optional sign,
/// then as many decimal digits as follow. `"200px"` reads as 200, `"px"`
/// does not read at all.
pub fn parse_leading_int(value: &str) -> Option<i64> {
    let value = value.trim_start();
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // saturate absurdly long inputs; they are rejected as out of range anyway
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Dimension policy: missing, unparsable or zero means "not requested";
/// negative or above [`MAX_DIMENSION`] is rejected.
fn dimension(param: &'static str, value: Option<&str>) -> Result<Option<u32>, Rejection> {
    match value.and_then(parse_leading_int) {
        None | Some(0) => Ok(None),
        Some(v) if v < 0 || v > MAX_DIMENSION as i64 => {
            Err(Rejection::InvalidDimension { param, value: v })
        }
        Some(v) => Ok(Some(v as u32)),
    }
}

/// Quality policy: missing, unparsable or zero means [`DEFAULT_QUALITY`];
/// anything else is clamped into `1..=100`.
fn quality(value: Option<&str>) -> u8 {
    match value.and_then(parse_leading_int) {
        None | Some(0) => DEFAULT_QUALITY,
        Some(v) => v.clamp(1, 100) as u8,
    }
}

/// Lower-cased text after the last `.` of the last path segment.
fn uri_extension(uri: &str) -> Option<String> {
    let segment = uri.rsplit('/').next().unwrap_or(uri);
    segment
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

/// Validates a viewer request and derives the transform to apply to the
/// object behind `uri`.
pub fn validate(uri: &str, querystring: &str) -> Result<TransformParams, Rejection> {
    let raw = RawQuery::parse(querystring);
    debug!(?raw, "parsed query parameters");

    if non_empty(&raw.w).is_none() && non_empty(&raw.h).is_none() {
        return Err(Rejection::NoResizeRequested);
    }

    let extension = uri_extension(uri).unwrap_or_default();
    let source_type =
        ImageType::from_name(&extension).ok_or_else(|| Rejection::UnsupportedType(extension))?;

    let width = dimension("width", non_empty(&raw.w))?;
    let height = dimension("height", non_empty(&raw.h))?;
    if width.is_none() && height.is_none() {
        return Err(Rejection::NoResizeRequested);
    }

    let format = match non_empty(&raw.f) {
        Some(f) => {
            let f = f.to_ascii_lowercase();
            ImageType::from_name(&f).ok_or(Rejection::UnsupportedType(f))?
        }
        None if source_type == ImageType::Gif => return Err(Rejection::GifWithoutConversion),
        None => source_type,
    };

    Ok(TransformParams {
        width,
        height,
        quality: quality(non_empty(&raw.q)),
        format,
    })
}
