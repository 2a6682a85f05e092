//! Regex find-and-replace driven by capture groups.

use regex::Regex;

/// Replace every non-overlapping match of `re` in `haystack`, left to right.
///
/// `repl` receives the full match at index 0 followed by each capture group
/// (unmatched optional groups are passed as `""`). Text between matches is
/// copied through unchanged.
pub fn replace_all_submatch<F>(re: &Regex, haystack: &str, mut repl: F) -> String
where
    F: FnMut(&[&str]) -> String,
{
    let mut result = String::with_capacity(haystack.len());
    let mut last = 0;

    for caps in re.captures_iter(haystack) {
        let Some(whole) = caps.get(0) else { continue };
        let groups: Vec<&str> = caps
            .iter()
            .map(|m| m.map_or("", |m| m.as_str()))
            .collect();

        result.push_str(&haystack[last..whole.start()]);
        result.push_str(&repl(&groups));
        last = whole.end();
    }

    result.push_str(&haystack[last..]);
    result
}
