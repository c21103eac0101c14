//! OS version resolution.

/// Major/minor version from the available inspection fields.
///
/// Precedence: explicit major/minor fields, then the version field of a CPE 2.3 name, then a
/// dotted version string. Minor defaults to 0 for the derived forms.
pub fn resolve_version(
    major: Option<&str>,
    minor: Option<&str>,
    cpe: Option<&str>,
    version: Option<&str>,
) -> (Option<u32>, Option<u32>) {
    if let Some(major) = major.and_then(|m| m.trim().parse().ok()) {
        return (Some(major), minor.and_then(|m| m.trim().parse().ok()));
    }

    if let Some(cpe_version) = cpe.and_then(cpe_version)
        && let Some(parsed) = dotted(cpe_version)
    {
        return parsed;
    }

    version.and_then(dotted).unwrap_or((None, None))
}

/// Version component (index 5) of `cpe:2.3:<part>:<vendor>:<product>:<version>:...`
pub fn cpe_version(cpe: &str) -> Option<&str> {
    let field = cpe.trim().split(':').nth(5)?;
    match field {
        "" | "*" | "-" => None,
        v => Some(v),
    }
}

fn dotted(text: &str) -> Option<(Option<u32>, Option<u32>)> {
    let mut parts = text.trim().split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next().and_then(|m| m.parse().ok()).unwrap_or(0);
    Some((Some(major), Some(minor)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_fields_win() {
        assert_eq!(
            resolve_version(Some("9"), Some("2"), Some("cpe:2.3:o:redhat:rhel:8:*"), Some("7.1")),
            (Some(9), Some(2))
        );
    }

    #[test]
    fn test_cpe_without_minor() {
        assert_eq!(
            resolve_version(None, None, Some("cpe:2.3:o:amazon:amazon_linux:2023:*:*:*:*:*:*:*"), None),
            (Some(2023), Some(0))
        );
    }

    #[test]
    fn test_wildcard_cpe_falls_back_to_version() {
        assert_eq!(
            resolve_version(None, None, Some("cpe:2.3:o:vendor:product:*:*"), Some("15.4.1")),
            (Some(15), Some(4))
        );
        assert_eq!(resolve_version(None, None, None, Some("rolling")), (None, None));
    }
}
