//! Path pattern matching.
//!
//! Patterns and paths are split on `/`. A pattern segment starting with `:`
//! binds the path segment at the same position as a parameter; every other
//! segment must match exactly. Segment counts must be equal, so trailing
//! slashes are significant.

use std::collections::HashMap;

/// Returns whether `path` matches `pattern`.
///
/// ```ignore
/// assert!(match_path("/user/:id", "/user/42"));
/// assert!(!match_path("/user/:id", "/user"));
/// ```
pub fn match_path(pattern: &str, path: &str) -> bool {
	let pattern_segments: Vec<&str> = pattern.split('/').collect();
	let path_segments: Vec<&str> = path.split('/').collect();

	if pattern_segments.len() != path_segments.len() {
		return false;
	}

	pattern_segments
		.iter()
		.zip(&path_segments)
		.all(|(expected, actual)| expected.starts_with(':') || expected == actual)
}

/// Extracts the parameters `pattern` binds in `path`.
///
/// Does not check that the path matches; call [`match_path`] first.
pub fn parse_params(pattern: &str, path: &str) -> HashMap<String, String> {
	pattern
		.split('/')
		.zip(path.split('/'))
		.filter_map(|(segment, value)| {
			segment
				.strip_prefix(':')
				.map(|name| (name.to_string(), value.to_string()))
		})
		.collect()
}

/// Matches `path` and extracts its parameters in one step.
pub fn match_params(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
	match_path(pattern, path).then(|| parse_params(pattern, path))
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("/", "/", true)]
	#[case("/user/:id", "/user/42", true)]
	#[case("/user/:id", "/user", false)]
	#[case("/user/:id", "/users/42", false)]
	#[case("/user/:id", "/user/42/", false)]
	#[case("/post/:post/comment/:comment", "/post/7/comment/9", true)]
	#[case("/about", "/About", false)]
	#[case("/:any", "/", true)]
	fn test_match_path(#[case] pattern: &str, #[case] path: &str, #[case] expected: bool) {
		assert_eq!(match_path(pattern, path), expected);
	}

	#[rstest]
	fn test_parse_params() {
		let params = parse_params("/post/:post/comment/:comment", "/post/7/comment/9");
		assert_eq!(params.len(), 2);
		assert_eq!(params["post"], "7");
		assert_eq!(params["comment"], "9");
	}

	#[rstest]
	fn test_match_params() {
		let params = match_params("/user/:id", "/user/42").unwrap();
		assert_eq!(params, HashMap::from([("id".to_string(), "42".to_string())]));
		assert!(match_params("/user/:id", "/user").is_none());
		assert!(match_params("/about", "/about").unwrap().is_empty());
	}
}
