use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

pub const CONTRACT_ID: &str = "ruledpage.generate_request";
pub const CONTRACT_VERSION: &str = "1";

pub const DEFAULT_ENDPOINT_PATH: &str = "/generate-pdf";
pub const DEFAULT_DOCUMENT_NAME: &str = "handbook.pdf";
pub const DOCUMENT_MIME: &str = "application/pdf";

pub const FIELD_SIZE: &str = "size";
pub const FIELD_STYLE: &str = "style";
pub const FIELD_COLOR: &str = "color";
pub const FIELD_SPACING: &str = "spacing";
pub const FIELD_MARGIN: &str = "margin";
pub const FIELD_BG_POSITION: &str = "bg_position";
pub const FIELD_BG_OPACITY: &str = "bg_opacity";
pub const FIELD_BG_IMAGE: &str = "bg_image";

pub const DEFAULT_SIZE: &str = "A7";
pub const DEFAULT_STYLE: &str = "grid";
pub const DEFAULT_COLOR: &str = "#999999";
pub const DEFAULT_SPACING: &str = "0.5";
pub const DEFAULT_MARGIN: &str = "1.0";
pub const DEFAULT_BG_POSITION: &str = "center";
pub const DEFAULT_BG_OPACITY: &str = "80";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Enum,
    Color,
    Number,
    File,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Enum => "enum",
            FieldKind::Color => "color",
            FieldKind::Number => "number",
            FieldKind::File => "file",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<&'static str>,
    pub allowed: &'static [&'static str],
}

pub const PAPER_SIZES: [&str; 4] = ["A5", "A6", "B6", "A7"];
pub const RULING_STYLES: [&str; 6] = [
    "grid",
    "line",
    "dot",
    "dotted_line",
    "wavy_line",
    "random_dots",
];
pub const BACKGROUND_POSITIONS: [&str; 3] = ["center", "stretch", "tile"];

// Order is the wire order of the multipart form.
pub const FIELDS_V1: [FieldDef; 8] = [
    FieldDef {
        name: FIELD_SIZE,
        kind: FieldKind::Enum,
        required: true,
        default: Some(DEFAULT_SIZE),
        allowed: &PAPER_SIZES,
    },
    FieldDef {
        name: FIELD_STYLE,
        kind: FieldKind::Enum,
        required: true,
        default: Some(DEFAULT_STYLE),
        allowed: &RULING_STYLES,
    },
    FieldDef {
        name: FIELD_COLOR,
        kind: FieldKind::Color,
        required: true,
        default: Some(DEFAULT_COLOR),
        allowed: &[],
    },
    FieldDef {
        name: FIELD_SPACING,
        kind: FieldKind::Number,
        required: true,
        default: Some(DEFAULT_SPACING),
        allowed: &[],
    },
    FieldDef {
        name: FIELD_MARGIN,
        kind: FieldKind::Number,
        required: true,
        default: Some(DEFAULT_MARGIN),
        allowed: &[],
    },
    FieldDef {
        name: FIELD_BG_POSITION,
        kind: FieldKind::Enum,
        required: true,
        default: Some(DEFAULT_BG_POSITION),
        allowed: &BACKGROUND_POSITIONS,
    },
    FieldDef {
        name: FIELD_BG_OPACITY,
        kind: FieldKind::Number,
        required: true,
        default: Some(DEFAULT_BG_OPACITY),
        allowed: &[],
    },
    FieldDef {
        name: FIELD_BG_IMAGE,
        kind: FieldKind::File,
        required: false,
        default: None,
        allowed: &[],
    },
];

static CONTRACT_FINGERPRINT: OnceLock<String> = OnceLock::new();

pub fn field_defs_v1() -> &'static [FieldDef] {
    &FIELDS_V1
}

pub fn field_def(name: &str) -> Option<&'static FieldDef> {
    FIELDS_V1.iter().find(|def| def.name == name)
}

pub fn default_value(name: &str) -> Option<&'static str> {
    field_def(name).and_then(|def| def.default)
}

// Opacity travels as a percentage.
pub fn clamp_opacity_percent(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

pub fn contract_fingerprint_sha256() -> String {
    CONTRACT_FINGERPRINT
        .get_or_init(|| {
            let mut hasher = Sha256::new();
            hasher.update(CONTRACT_ID.as_bytes());
            hasher.update(b"\n");
            hasher.update(CONTRACT_VERSION.as_bytes());
            for def in FIELDS_V1.iter() {
                hasher.update(b"\n");
                hasher.update(def.name.as_bytes());
                hasher.update(b":");
                hasher.update(def.kind.as_str().as_bytes());
                hasher.update(if def.required { b":1" } else { b":0" });
                for allowed in def.allowed {
                    hasher.update(b",");
                    hasher.update(allowed.as_bytes());
                }
            }
            let digest = hasher.finalize();
            let mut out = String::with_capacity(digest.len() * 2);
            for b in digest {
                use std::fmt::Write;
                let _ = write!(&mut out, "{:02x}", b);
            }
            out
        })
        .clone()
}

pub fn metadata() -> Value {
    let fields: Vec<Value> = FIELDS_V1
        .iter()
        .map(|def| {
            json!({
                "name": def.name,
                "kind": def.kind.as_str(),
                "required": def.required,
                "default": def.default,
                "allowed": def.allowed,
            })
        })
        .collect();
    json!({
        "contract_id": CONTRACT_ID,
        "contract_version": CONTRACT_VERSION,
        "contract_fingerprint_sha256": contract_fingerprint_sha256(),
        "endpoint_path": DEFAULT_ENDPOINT_PATH,
        "fields": fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_fingerprint_is_stable_and_nonempty() {
        let a = contract_fingerprint_sha256();
        let b = contract_fingerprint_sha256();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn only_the_background_image_is_optional() {
        let optional: Vec<&str> = field_defs_v1()
            .iter()
            .filter(|def| !def.required)
            .map(|def| def.name)
            .collect();
        assert_eq!(optional, vec![FIELD_BG_IMAGE]);
    }

    #[test]
    fn defaults_match_form_defaults() {
        assert_eq!(default_value(FIELD_SIZE), Some("A7"));
        assert_eq!(default_value(FIELD_COLOR), Some("#999999"));
        assert_eq!(default_value(FIELD_BG_OPACITY), Some("80"));
        assert_eq!(default_value(FIELD_BG_IMAGE), None);
        assert!(default_value("unknown").is_none());
    }

    #[test]
    fn opacity_is_clamped_to_percent_range() {
        assert_eq!(clamp_opacity_percent(-5.0), 0.0);
        assert_eq!(clamp_opacity_percent(55.5), 55.5);
        assert_eq!(clamp_opacity_percent(250.0), 100.0);
    }

    #[test]
    fn metadata_lists_fields_in_wire_order() {
        let meta = metadata();
        let names: Vec<&str> = meta["fields"]
            .as_array()
            .expect("fields array")
            .iter()
            .filter_map(|f| f["name"].as_str())
            .collect();
        assert_eq!(
            names,
            vec![
                "size",
                "style",
                "color",
                "spacing",
                "margin",
                "bg_position",
                "bg_opacity",
                "bg_image"
            ]
        );
        assert_eq!(meta["contract_id"], CONTRACT_ID);
    }
}
