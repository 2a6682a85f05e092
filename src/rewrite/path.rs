//! Outbound path computation.
//!
//! The local prefix is removed by byte length only: the router guarantees the
//! inbound path lives under the prefix, so no second prefix comparison is made.

/// Join two path fragments so exactly one `/` sits at the junction.
pub fn single_joining_slash(a: &str, b: &str) -> String {
    let a_slash = a.ends_with('/');
    let b_slash = b.starts_with('/');
    match (a_slash, b_slash) {
        (true, true) => format!("{}{}", a, &b[1..]),
        (false, false) => format!("{}/{}", a, b),
        _ => format!("{}{}", a, b),
    }
}

/// Compute the upstream path for an inbound path.
///
/// Paths no longer than the prefix map to the empty path. Otherwise the bytes
/// after the prefix are joined onto `base_path` and a single trailing slash is
/// dropped unless the result is just `/`.
pub fn outbound_path(inbound: &str, prefix_len: usize, base_path: &str) -> String {
    if inbound.is_empty() || inbound.len() <= prefix_len {
        return String::new();
    }

    // Raw URI paths are ASCII; a non-boundary offset degrades to the empty path.
    let Some(suffix) = inbound.get(prefix_len..) else {
        return String::new();
    };

    let mut joined = single_joining_slash(base_path, suffix);
    if joined.len() > 1 && joined.ends_with('/') {
        joined.pop();
    }
    joined
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joining_collapses_double_slash() {
        assert_eq!(single_joining_slash("a/", "/b"), "a/b");
    }

    #[test]
    fn joining_inserts_missing_slash() {
        assert_eq!(single_joining_slash("a", "b"), "a/b");
    }

    #[test]
    fn joining_keeps_single_slash() {
        assert_eq!(single_joining_slash("a/", "b"), "a/b");
        assert_eq!(single_joining_slash("a", "/b"), "a/b");
    }

    #[test]
    fn joining_empty_base() {
        assert_eq!(single_joining_slash("", "foo"), "/foo");
        assert_eq!(single_joining_slash("", "/foo"), "/foo");
    }

    #[test]
    fn short_paths_become_empty() {
        let prefix = "/something/";
        for inbound in ["", "/", "/something", "/something/", "/other/xx/"] {
            assert!(inbound.len() <= prefix.len());
            assert_eq!(outbound_path(inbound, prefix.len(), "/base"), "", "inbound {:?}", inbound);
        }
    }

    #[test]
    fn suffix_joined_onto_empty_base() {
        assert_eq!(outbound_path("/something/get", 11, ""), "/get");
        assert_eq!(outbound_path("/something/a/b/", 11, ""), "/a/b");
    }

    #[test]
    fn suffix_joined_onto_base_path() {
        assert_eq!(outbound_path("/something/get", 11, "/"), "/get");
        assert_eq!(outbound_path("/something/get", 11, "/api/v1"), "/api/v1/get");
        assert_eq!(outbound_path("/something/get", 11, "/api/v1/"), "/api/v1/get");
    }

    #[test]
    fn prefix_without_trailing_slash_keeps_suffix_slash() {
        assert_eq!(outbound_path("/api/users", 4, ""), "/users");
        assert_eq!(outbound_path("/api/users", 4, "/v2/"), "/v2/users");
    }

    #[test]
    fn single_trailing_slash_is_stripped_once() {
        assert_eq!(outbound_path("/something/dir//", 11, ""), "/dir/");
    }

    #[test]
    fn lone_slash_result_is_kept() {
        // "/p" + "/" joined onto "" yields "/", which stays.
        assert_eq!(outbound_path("/p/", 2, ""), "/");
    }

    #[test]
    fn mismatched_prefix_is_sliced_by_length() {
        assert_eq!(outbound_path("/abc/defghijkl", 11, ""), "/jkl");
        assert_eq!(outbound_path("/other/path/here", 11, ""), "/here");
    }
}
