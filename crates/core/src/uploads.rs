//! Upload metadata validation.
//!
//! An upload is accepted only if its MIME type is on the allow-list, its size
//! is within that type's cap, its extension is not executable or scriptable,
//! and its name carries no path components.

use crate::error::CoreError;

/// An allowed MIME type with its canonical extension and size cap in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowedFileType {
    pub mime_type: &'static str,
    pub extension: &'static str,
    pub max_size: u64,
}

const MIB: u64 = 1024 * 1024;

pub const ALLOWED_FILE_TYPES: &[AllowedFileType] = &[
    AllowedFileType { mime_type: "image/jpeg", extension: "jpg", max_size: 5 * MIB },
    AllowedFileType { mime_type: "image/png", extension: "png", max_size: 5 * MIB },
    AllowedFileType { mime_type: "image/gif", extension: "gif", max_size: 5 * MIB },
    AllowedFileType { mime_type: "image/webp", extension: "webp", max_size: 5 * MIB },
    AllowedFileType { mime_type: "application/pdf", extension: "pdf", max_size: 10 * MIB },
    AllowedFileType { mime_type: "text/plain", extension: "txt", max_size: MIB },
];

/// Extensions that are never accepted, whatever the declared MIME type.
pub const DANGEROUS_EXTENSIONS: &[&str] = &[
    // Executables and shell scripts
    "exe", "bat", "cmd", "sh", "bash", "zsh", "ps1",
    // JavaScript / TypeScript
    "js", "mjs", "cjs", "ts", "tsx", "jsx",
    // Other interpreters
    "py", "rb", "php", "pl", "cgi", "perl",
    // Markup that can carry script
    "html", "htm", "svg",
    // Java archives
    "jar", "war", "ear",
    // Native libraries
    "dll", "so", "dylib",
    // VBScript
    "vbs", "vbe", "wsf",
    // Windows shortcuts and HTA
    "scr", "pif", "hta",
];

/// Look up the allow-list entry for a MIME type.
pub fn allowed_type(mime_type: &str) -> Option<&'static AllowedFileType> {
    ALLOWED_FILE_TYPES.iter().find(|t| t.mime_type == mime_type)
}

/// Check a declared upload before any bytes are written.
pub fn validate_file_metadata(filename: &str, mime_type: &str, size: u64) -> Result<(), CoreError> {
    let Some(allowed) = allowed_type(mime_type) else {
        let names: Vec<&str> = ALLOWED_FILE_TYPES.iter().map(|t| t.mime_type).collect();
        return Err(CoreError::Validation(format!(
            "File type \"{mime_type}\" is not allowed. Allowed types: {}",
            names.join(", ")
        )));
    };

    if size > allowed.max_size {
        return Err(CoreError::Validation(format!(
            "File size {} exceeds maximum {} for {mime_type}",
            format_bytes(size),
            format_bytes(allowed.max_size)
        )));
    }

    if let Some((_, extension)) = filename.rsplit_once('.') {
        let extension = extension.to_lowercase();
        if DANGEROUS_EXTENSIONS.contains(&extension.as_str()) {
            return Err(CoreError::Validation(format!(
                "File extension \".{extension}\" is not allowed due to security concerns"
            )));
        }
    }

    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        return Err(CoreError::Validation(
            "Filename contains invalid characters (path traversal detected)".to_string(),
        ));
    }

    Ok(())
}

/// Human-readable byte count with up to two decimals, e.g. `1.5 MB`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["Bytes", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    // Print "5" rather than "5.00" and "1.5" rather than "1.50".
    let text = format!("{rounded:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{text} {}", UNITS[unit])
}
