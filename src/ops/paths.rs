use crate::ops::error::{OpsError, OpsResult};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

/// Canonical comparison form of a manifest path.
///
/// Drops control characters, a leading `file://` and a Windows `\\?\`
/// prefix, turns backslashes into slashes, collapses runs of slashes and
/// percent-decodes. Symlinks and `..` segments are left alone.
pub fn normalize_path(raw: &str) -> String {
    let cleaned: String = raw.chars().filter(|c| !c.is_control()).collect();

    let without_scheme = match cleaned.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("file://") => &cleaned[7..],
        _ => cleaned.as_str(),
    };
    let plain = strip_verbatim_prefix(without_scheme);

    let mut collapsed = String::with_capacity(plain.len());
    for c in plain.chars() {
        let c = if c == '\\' { '/' } else { c };
        if c == '/' && collapsed.ends_with('/') {
            continue;
        }
        collapsed.push(c);
    }

    percent_decode_or_keep(&collapsed)
}

/// Turns `\\?\C:\x` into `C:\x` and `\\?\UNC\server\share` into
/// `\\server\share`. Other verbatim forms (volume GUIDs, devices) have no
/// plain spelling and are returned unchanged.
pub fn strip_verbatim_prefix(path: &str) -> String {
    for (prefix, sep) in [(r"\\?\", '\\'), ("//?/", '/')] {
        let Some(rest) = path.strip_prefix(prefix) else {
            continue;
        };
        let bytes = rest.as_bytes();
        if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
            return rest.to_string();
        }
        let unc = rest.get(..3).is_some_and(|p| p.eq_ignore_ascii_case("UNC"))
            && matches!(rest.get(3..4), Some("\\" | "/"));
        if unc {
            return format!("{0}{0}{1}", sep, &rest[4..]);
        }
    }
    path.to_string()
}

/// `path` without a verbatim prefix, for paths that came out of
/// `canonicalize` and end up in manifests.
pub fn simplified(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(text) if text.starts_with(r"\\?\") => PathBuf::from(strip_verbatim_prefix(text)),
        _ => path.to_path_buf(),
    }
}

/// Decodes `%XX` escapes. A malformed escape or a non-UTF-8 result keeps
/// the input as it was.
fn percent_decode_or_keep(input: &str) -> String {
    if !input.contains('%') || has_malformed_escape(input) {
        return input.to_string();
    }
    match urlencoding::decode(input) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => input.to_string(),
    }
}

fn has_malformed_escape(input: &str) -> bool {
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                return true;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    false
}

fn with_platform_separators(path: &str) -> String {
    if MAIN_SEPARATOR == '\\' {
        path.replace('/', "\\")
    } else {
        path.replace('\\', "/")
    }
}

/// True if the path exists as given, resolved against the working
/// directory, or with its separators flipped to the platform's.
pub fn path_exists(path: &str) -> bool {
    let given = Path::new(path);
    if given.exists() {
        return true;
    }

    let absolute = if given.is_absolute() {
        None
    } else {
        std::env::current_dir().ok().map(|cwd| cwd.join(given))
    };
    if absolute.is_some_and(|p| p.exists()) {
        return true;
    }

    Path::new(&with_platform_separators(path)).exists()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Verification {
    pub present: Vec<String>,
    pub missing: Vec<String>,
}

impl Verification {
    pub fn all_present(&self) -> bool {
        self.missing.is_empty()
    }

    /// Fails with the missing count and the first `sample_size` missing paths.
    pub fn ensure_all_present(&self, sample_size: usize) -> OpsResult<()> {
        if self.all_present() {
            return Ok(());
        }
        Err(OpsError::MissingFiles {
            count: self.missing.len(),
            sample: self.missing.iter().take(sample_size).cloned().collect(),
        })
    }
}

pub fn verify_paths(paths: &[String]) -> Verification {
    let mut verification = Verification::default();
    for path in paths {
        if path_exists(path) {
            verification.present.push(path.clone());
        } else {
            verification.missing.push(path.clone());
        }
    }
    verification
}
