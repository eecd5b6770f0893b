use std::fmt::Write as _;

use sha2::{Digest, Sha256};

const MAX_STEM_CHARS: usize = 80;

/// Filesystem-safe, deterministic resume filename:
/// `{sanitized display name}--{short_hash(apply id)}.pdf`.
///
/// The hash keeps two candidates with the same display name apart.
pub fn resume_filename(display_name: Option<&str>, apply_id: &str) -> String {
    let stem = sanitize_stem(display_name.unwrap_or("unknown"));
    format!("{stem}--{}.pdf", short_hash(apply_id))
}

fn sanitize_stem(input: &str) -> String {
    let mut stem = String::with_capacity(input.len());
    for c in input.chars() {
        let c = if is_forbidden(c) { '_' } else { c };
        if c == '_' && stem.ends_with('_') {
            continue;
        }
        stem.push(c);
    }

    let trimmed = stem.trim_matches(&['_', ' ', '.'][..]);
    let mut stem: String = trimmed.chars().take(MAX_STEM_CHARS).collect();
    if stem.is_empty() {
        stem = "unknown".to_string();
    }
    if is_reserved_windows_name(&stem) {
        stem.push('_');
    }
    stem
}

fn is_forbidden(c: char) -> bool {
    c.is_control() || r#"\/:*?"<>|"#.contains(c)
}

/// Windows device names stay reserved with any extension, so `CON.cv` is
/// as unusable as `CON`.
fn is_reserved_windows_name(name: &str) -> bool {
    let base = name.split('.').next().unwrap_or(name);
    let upper = base.to_ascii_uppercase();
    match upper.as_str() {
        "CON" | "PRN" | "AUX" | "NUL" => true,
        _ => {
            let bytes = upper.as_bytes();
            bytes.len() == 4
                && (upper.starts_with("COM") || upper.starts_with("LPT"))
                && (b'1'..=b'9').contains(&bytes[3])
        }
    }
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    digest.iter().take(4).fold(String::with_capacity(8), |mut hex, byte| {
        let _ = write!(hex, "{byte:02x}");
        hex
    })
}

#[cfg(test)]
mod tests {
    use super::resume_filename;

    #[test]
    fn names_are_safe_and_stable() {
        let name = resume_filename(Some("Li: Lei?/CV"), "88001");
        assert!(name.starts_with("Li_ Lei_CV--"));
        assert!(name.ends_with(".pdf"));
        assert_eq!(name, resume_filename(Some("Li: Lei?/CV"), "88001"));
    }

    #[test]
    fn same_name_different_application_differs() {
        assert_ne!(
            resume_filename(Some("Wang Fang"), "1"),
            resume_filename(Some("Wang Fang"), "2")
        );
    }

    #[test]
    fn missing_or_reserved_names_are_patched() {
        assert!(resume_filename(None, "1").starts_with("unknown--"));
        assert!(resume_filename(Some("..."), "1").starts_with("unknown--"));
        assert!(resume_filename(Some("CON"), "1").starts_with("CON_--"));
        assert!(resume_filename(Some("lpt3.old"), "1").starts_with("lpt3.old_--"));
        assert!(resume_filename(Some("COMET"), "1").starts_with("COMET--"));
    }

    #[test]
    fn non_ascii_names_survive() {
        assert!(resume_filename(Some("李雷"), "1").starts_with("李雷--"));
    }
}
