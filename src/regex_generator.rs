use crate::Error;
use regex::Regex;

/// Compiles a path template into an anchored regex plus the ordered list of its
/// placeholder names.
///
/// `/post/:id` becomes `^/post/([^/]+)$` with params `["id"]`.
pub(crate) fn generate_exact_match_regex(template: &str) -> crate::Result<(Regex, Vec<String>)> {
    let (pattern, params) = generate_pattern(template)?;

    let re = Regex::new(pattern.as_str())
        .map_err(|e| Error::InvalidRoute(format!("Could not compile the regex for {:?}: {}", template, e)))?;

    Ok((re, params))
}

fn generate_pattern(template: &str) -> crate::Result<(String, Vec<String>)> {
    if !template.starts_with('/') {
        return Err(Error::InvalidRoute(format!(
            "The route path must start with '/': {:?}",
            template
        )));
    }

    let mut pattern = String::with_capacity(template.len() + 8);
    let mut params: Vec<String> = Vec::new();

    pattern.push('^');

    // Skip the leading empty segment produced by the first '/'.
    for segment in template.split('/').skip(1) {
        pattern.push('/');

        if let Some(name) = segment.strip_prefix(':') {
            if !is_valid_param_name(name) {
                return Err(Error::InvalidRoute(format!(
                    "Invalid route parameter {:?} in {:?}: a placeholder must span a whole segment",
                    segment, template
                )));
            }

            if params.iter().any(|p| p == name) {
                return Err(Error::InvalidRoute(format!(
                    "Duplicate route parameter {:?} in {:?}",
                    name, template
                )));
            }

            params.push(name.to_owned());
            pattern.push_str("([^/]+)");
        } else if segment.contains(':') {
            return Err(Error::InvalidRoute(format!(
                "Partial-segment placeholders are not supported: {:?} in {:?}",
                segment, template
            )));
        } else {
            pattern.push_str(regex::escape(segment).as_str());
        }
    }

    pattern.push('$');

    Ok((pattern, params))
}

fn is_valid_param_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}
