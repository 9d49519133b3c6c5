//! Path resolution.
//!
//! Peers may be addressed under a base path (several clusters sharing one
//! host, or a reverse proxy prefix), so RPC paths are joined onto the
//! address's existing path instead of replacing it.

use crate::error::TransportError;
use url::Url;

/// Join slash-separated path elements and clean the result.
///
/// Empty elements are skipped, repeated separators collapse, `.` segments are
/// dropped and `..` removes the preceding segment. The result is rooted when
/// the first non-empty element is. Percent-encoded bytes are left untouched.
///
/// ```
/// use transport::join_path;
///
/// assert_eq!(join_path(&["/raft/", "/appendEntries"]), "/raft/appendEntries");
/// assert_eq!(join_path(&["", "/snapshot"]), "/snapshot");
/// ```
pub fn join_path(elements: &[&str]) -> String {
    let mut rooted = None;
    let mut segments: Vec<&str> = Vec::new();

    for element in elements.iter().filter(|e| !e.is_empty()) {
        if rooted.is_none() {
            rooted = Some(element.starts_with('/'));
        }
        for segment in element.split('/') {
            match segment {
                "" | "." => {}
                ".." => match segments.last() {
                    Some(&last) if last != ".." => {
                        segments.pop();
                    }
                    // Cannot climb above the root.
                    _ if rooted == Some(true) => {}
                    _ => segments.push(".."),
                },
                segment => segments.push(segment),
            }
        }
    }

    match rooted {
        None => String::new(),
        Some(true) => format!("/{}", segments.join("/")),
        Some(false) if segments.is_empty() => ".".to_string(),
        Some(false) => segments.join("/"),
    }
}

/// Merge a peer's base address with an RPC path suffix.
///
/// Scheme, host, port, query and any existing sub-path of `base` are kept;
/// `suffix` is joined onto the path.
///
/// # Errors
///
/// Returns [`TransportError::InvalidAddress`] if `base` is not an absolute
/// URL that can carry a path.
///
/// # Performance
/// - **Time**: O(len(base) + len(suffix))
/// - Holds no shared state, safe to call from any number of tasks.
pub fn resolve(base: &str, suffix: &str) -> Result<Url, TransportError> {
    let invalid = |reason: String| TransportError::InvalidAddress {
        address: base.to_string(),
        reason,
    };

    let mut url = Url::parse(base).map_err(|err| invalid(err.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("address cannot carry a path".to_string()));
    }

    let joined = join_path(&[url.path(), suffix]);
    url.set_path(&joined);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_keeps_base_path() {
        let url = resolve("http://host:1234/base", "/appendEntries").unwrap();
        assert_eq!(url.as_str(), "http://host:1234/base/appendEntries");
    }

    #[test]
    fn test_resolve_slash_variants_agree() {
        let with_slash = resolve("http://host/", "/x").unwrap();
        let without_slash = resolve("http://host", "/x").unwrap();
        let trailing = resolve("http://host/base/", "x").unwrap();

        assert_eq!(with_slash, without_slash);
        assert_eq!(with_slash.as_str(), "http://host/x");
        assert_eq!(trailing.as_str(), "http://host/base/x");
    }

    #[test]
    fn test_resolve_collapses_separators() {
        let url = resolve("http://host//a//", "//requestVote").unwrap();
        assert_eq!(url.as_str(), "http://host/a/requestVote");
    }

    #[test]
    fn test_resolve_keeps_query_and_encoding() {
        let url = resolve("http://host/a%2Fb?cluster=7", "/snapshot").unwrap();
        assert_eq!(url.as_str(), "http://host/a%2Fb/snapshot?cluster=7");
    }

    #[test]
    fn test_resolve_socket_style_host() {
        let url = resolve("http://node2.sock", "/raft/snapshotRecovery").unwrap();
        assert_eq!(url.host_str(), Some("node2.sock"));
        assert_eq!(url.path(), "/raft/snapshotRecovery");
    }

    #[test]
    fn test_resolve_rejects_garbage() {
        assert!(matches!(
            resolve("not a url", "/appendEntries"),
            Err(TransportError::InvalidAddress { .. })
        ));
        assert!(resolve("mailto:raft@example.com", "/appendEntries").is_err());
    }

    #[test]
    fn test_join_path_cleaning() {
        assert_eq!(join_path(&[]), "");
        assert_eq!(join_path(&["", ""]), "");
        assert_eq!(join_path(&["/"]), "/");
        assert_eq!(join_path(&["raft", "/appendEntries"]), "raft/appendEntries");
        assert_eq!(join_path(&["/a/./b/../c", "d"]), "/a/c/d");
        assert_eq!(join_path(&["/..", "x"]), "/x");
        assert_eq!(join_path(&["a", "../.."]), "..");
    }
}
