//! Transform options: the compact `key_value` descriptor and its typed form.
//!
//! The wire form is a comma-separated list such as
//! `w_200,h_200,c_thumb,g_face,r_max,bo_2px_solid_white,q_90`. Every field
//! is parsed with a fallback chain, so malformed values degrade to defaults
//! instead of failing the request.

use serde::Serialize;
use std::collections::BTreeMap;

/// A single raw option value: either one token or an `_`-separated list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    Single(String),
    List(Vec<String>),
}

impl OptionValue {
    /// The value as one token. Lists are re-joined with `_`.
    pub fn as_token(&self) -> String {
        match self {
            OptionValue::Single(s) => s.clone(),
            OptionValue::List(items) => items.join("_"),
        }
    }

    /// The value as a list of tokens.
    pub fn tokens(&self) -> Vec<&str> {
        match self {
            OptionValue::Single(s) => vec![s.as_str()],
            OptionValue::List(items) => items.iter().map(String::as_str).collect(),
        }
    }
}

/// Raw key → value map as produced by [`parse_params`].
pub type OptionParams = BTreeMap<String, OptionValue>;

/// Split an option string into its raw key/value map.
///
/// Entries without a `_` separator (or with an empty key) are skipped.
/// A later duplicate key overwrites an earlier one.
pub fn parse_params(raw: &str) -> OptionParams {
    let mut params = OptionParams::new();
    for entry in raw.split(',') {
        let Some((key, value)) = entry.trim().split_once('_') else {
            tracing::debug!("Skipping option without separator: {:?}", entry);
            continue;
        };
        if key.is_empty() {
            continue;
        }
        let value = if value.contains('_') {
            OptionValue::List(value.split('_').map(str::to_string).collect())
        } else {
            OptionValue::Single(value.to_string())
        };
        params.insert(key.to_string(), value);
    }
    params
}

/// How the source is brought to the target size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CropMode {
    /// Stretch-resize to exactly the target size
    #[default]
    None,
    /// Crop around the focal point, then scale to cover the target
    Thumb,
    /// Scale to fit inside the target, letterboxed on a transparent canvas
    Fill,
    /// Scale to cover the target, centered and clipped to the canvas
    Pad,
}

impl CropMode {
    /// Parse a `c` token. Unknown tokens mean a plain resize.
    pub fn from_token(token: &str) -> Self {
        match token {
            "thumb" => CropMode::Thumb,
            "fill" => CropMode::Fill,
            "pad" => CropMode::Pad,
            _ => CropMode::None,
        }
    }
}

/// Policy for choosing the focal point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gravity {
    #[default]
    Center,
    Face,
}

impl Gravity {
    /// Parse a `g` token. Anything but `face` is center gravity.
    pub fn from_token(token: &str) -> Self {
        match token {
            "face" => Gravity::Face,
            _ => Gravity::Center,
        }
    }
}

/// Corner radius policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RadiusMode {
    #[default]
    None,
    /// Full elliptical mask fitted to the output
    Max,
}

impl RadiusMode {
    /// Parse an `r` token. Anything but `max` disables masking.
    pub fn from_token(token: &str) -> Self {
        match token {
            "max" => RadiusMode::Max,
            _ => RadiusMode::None,
        }
    }
}

/// Ring border drawn around a circular mask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BorderSpec {
    /// Ring thickness in pixels
    pub width: u32,
    /// Style token (only `solid` is drawn; others render the same)
    pub style: String,
    /// CSS colour name, resolved when the border is drawn
    pub color: String,
}

impl BorderSpec {
    /// Parse the `bo` tokens: `width`, `style`, `color`.
    ///
    /// With two tokens the style defaults to `solid`. A width that does not
    /// parse becomes 0. Returns `None` when there is no colour token.
    pub fn from_tokens(tokens: &[&str]) -> Option<Self> {
        let (width, style, color) = match tokens {
            [width, style, color, ..] => (*width, *style, *color),
            [width, color] => (*width, "solid", *color),
            _ => {
                tracing::debug!("Ignoring border spec with too few tokens: {:?}", tokens);
                return None;
            }
        };
        Some(Self {
            width: parse_border_width(width),
            style: style.to_string(),
            color: color.to_string(),
        })
    }
}

fn parse_border_width(token: &str) -> u32 {
    let digits = token.trim().trim_end_matches("px");
    digits.parse::<u32>().unwrap_or_else(|_| {
        tracing::warn!("Unparseable border width {:?}, drawing no ring", token);
        0
    })
}

/// Lossy encoding quality, clamped to 0–100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: i64) -> Self {
        Self(value.clamp(0, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Parse a `q` token; garbage yields `None` so the caller's default applies.
    pub fn from_token(token: &str) -> Option<Self> {
        token
            .trim()
            .parse::<i64>()
            .ok()
            .or_else(|| token.trim().parse::<f64>().ok().map(|f| f as i64))
            .map(Self::new)
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(100)
    }
}

/// Immutable, typed options for one transform.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransformOptions {
    /// Raw width request (`w`): integer pixels or a fraction of the source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    /// Raw height request (`h`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    pub crop: CropMode,
    pub gravity: Gravity,
    pub radius: RadiusMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<BorderSpec>,
    /// `None` means the configured default quality
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<Quality>,
}

impl TransformOptions {
    /// Parse an option string such as `w_200,h_100,c_fill`.
    pub fn parse(raw: &str) -> Self {
        Self::from_params(&parse_params(raw))
    }

    /// Build typed options from a raw key/value map. Unknown keys are ignored.
    pub fn from_params(params: &OptionParams) -> Self {
        let token = |key: &str| params.get(key).map(OptionValue::as_token);

        Self {
            width: token("w"),
            height: token("h"),
            crop: token("c")
                .map(|t| CropMode::from_token(&t))
                .unwrap_or_default(),
            gravity: token("g")
                .map(|t| Gravity::from_token(&t))
                .unwrap_or_default(),
            radius: token("r")
                .map(|t| RadiusMode::from_token(&t))
                .unwrap_or_default(),
            border: params
                .get("bo")
                .and_then(|v| BorderSpec::from_tokens(&v.tokens())),
            quality: token("q").and_then(|t| Quality::from_token(&t)),
        }
    }

    pub fn with_size(mut self, width: &str, height: &str) -> Self {
        self.width = Some(width.to_string());
        self.height = Some(height.to_string());
        self
    }

    pub fn with_crop(mut self, crop: CropMode) -> Self {
        self.crop = crop;
        self
    }

    pub fn with_gravity(mut self, gravity: Gravity) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_radius(mut self, radius: RadiusMode) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_border(mut self, width: u32, color: &str) -> Self {
        self.border = Some(BorderSpec {
            width,
            style: "solid".to_string(),
            color: color.to_string(),
        });
        self
    }

    pub fn with_quality(mut self, quality: i64) -> Self {
        self.quality = Some(Quality::new(quality));
        self
    }
}
