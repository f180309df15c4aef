//! Object-storage keys for ensaio photos.
//!
//! Convention: `cpf-{cpf}/session-{session}/photo-{seq:03}.{ext}`. Grouping
//! by the subject's CPF keeps every photo of a person under one prefix.
//! Subjects without a CPF fall back to `uploads/{session}/{uuid}.{ext}`.

use std::sync::LazyLock;

use regex::Regex;

use crate::validation::normalize_cpf;

static KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^cpf-(\d{11})/session-([^/]+)/photo-(\d+)\.(\w+)$").expect("valid regex")
});

/// The parts of a CPF-based photo key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageKey {
    pub cpf: String,
    pub session_id: String,
    pub sequence: u32,
    pub extension: String,
}

impl ImageKey {
    /// Build a key; fails unless `cpf` normalizes to 11 digits.
    pub fn new(cpf: &str, session_id: &str, sequence: u32, extension: &str) -> Result<Self, String> {
        let cpf = normalize_cpf(cpf).ok_or_else(|| "CPF must have 11 digits".to_string())?;
        Ok(Self {
            cpf,
            session_id: session_id.to_string(),
            sequence,
            extension: normalize_extension(extension),
        })
    }

    pub fn to_key(&self) -> String {
        format!(
            "cpf-{}/session-{}/photo-{:03}.{}",
            self.cpf, self.session_id, self.sequence, self.extension
        )
    }

    pub fn parse(key: &str) -> Option<Self> {
        let caps = KEY_RE.captures(key)?;
        Some(Self {
            cpf: caps[1].to_string(),
            session_id: caps[2].to_string(),
            sequence: caps[3].parse().ok()?,
            extension: caps[4].to_string(),
        })
    }
}

pub fn is_valid_image_key(key: &str) -> bool {
    ImageKey::parse(key).is_some()
}

/// Key for uploads whose subject has no CPF on file.
pub fn fallback_key(session_id: &str, extension: &str) -> String {
    format!(
        "uploads/{session_id}/{}.{}",
        uuid::Uuid::new_v4(),
        normalize_extension(extension)
    )
}

/// Extension derived from an upload's MIME type.
pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    match mime {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim_start_matches('.').to_ascii_lowercase()
}
