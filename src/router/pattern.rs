//! Path template compilation.
//!
//! Turns an OpenAPI path template such as `/users/{id}/posts/{postId}` into an
//! anchored regular expression and the ordered list of parameter names it
//! binds. Matching rules:
//!
//! - literal segments are matched exactly (case-sensitive)
//! - a `{name}` segment matches one non-empty path segment, non-greedily
//! - the whole path must be consumed
//! - one trailing `/` on the request path is optional
//!
//! Empty segments (`/items//42`) never match, because a placeholder needs at
//! least one character and literals never contain `//`.

use crate::error::PatternError;
use regex::Regex;
use smallvec::SmallVec;
use std::sync::Arc;

/// Maximum number of path parameters before heap allocation.
/// Most REST APIs have ≤4 path params (e.g., /users/{id}/posts/{postId}).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Extracted parameters in declaration order.
///
/// Names are `Arc<str>` shared with the compiled pattern; values are the raw
/// (pre-coercion) segment strings from the request.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// One segment of a compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    Literal(Arc<str>),
    Param(Arc<str>),
}

/// A compiled path template.
#[derive(Debug, Clone)]
pub struct PathPattern {
    template: Arc<str>,
    regex: Regex,
    param_names: Vec<Arc<str>>,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compile a path template.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] if the template is not absolute, contains a
    /// placeholder that is empty or not a whole segment, or repeats a name.
    pub fn compile(template: &str) -> Result<Self, PatternError> {
        if !template.starts_with('/') {
            return Err(PatternError::MissingLeadingSlash {
                template: template.to_string(),
            });
        }

        let mut segments = Vec::new();
        let mut param_names: Vec<Arc<str>> = Vec::with_capacity(template.matches('{').count());

        // Reserve space for the final regex string
        let mut pattern = String::with_capacity(template.len() + 16);
        pattern.push('^');

        for raw in split_template(template) {
            pattern.push('/');
            if let Some(name) = placeholder_name(raw) {
                if name.is_empty() {
                    return Err(PatternError::EmptyPlaceholder {
                        template: template.to_string(),
                    });
                }
                if param_names.iter().any(|n| n.as_ref() == name) {
                    return Err(PatternError::DuplicateParameter {
                        template: template.to_string(),
                        name: name.to_string(),
                    });
                }
                let name: Arc<str> = Arc::from(name);
                pattern.push_str("([^/]+?)");
                param_names.push(Arc::clone(&name));
                segments.push(Segment::Param(name));
            } else if raw.contains('{') || raw.contains('}') {
                return Err(PatternError::EmbeddedPlaceholder {
                    template: template.to_string(),
                    segment: raw.to_string(),
                });
            } else {
                pattern.push_str(&regex::escape(raw));
                segments.push(Segment::Literal(Arc::from(raw)));
            }
        }

        if segments.is_empty() {
            // root template: exactly "/"
            pattern.push_str("/$");
        } else {
            pattern.push_str("/?$");
        }

        let regex = Regex::new(&pattern).map_err(|e| PatternError::Regex {
            template: template.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            template: Arc::from(template),
            regex,
            param_names,
            segments,
        })
    }

    /// Test a request path, returning the parameter values in declaration order.
    #[must_use]
    pub fn try_match(&self, path: &str) -> Option<ParamVec> {
        let captures = self.regex.captures(path)?;
        let mut params = ParamVec::new();
        for (i, name) in self.param_names.iter().enumerate() {
            let value = captures.get(i + 1)?;
            params.push((Arc::clone(name), value.as_str().to_string()));
        }
        Some(params)
    }

    #[inline]
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// The template this pattern was compiled from.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Parameter names in left-to-right order.
    #[must_use]
    pub fn param_names(&self) -> &[Arc<str>] {
        &self.param_names
    }

    /// The generated expression, for diagnostics.
    #[must_use]
    pub fn as_regex(&self) -> &Regex {
        &self.regex
    }

    pub(crate) fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

/// Template segments without the leading `/` and without one trailing `/`.
fn split_template(template: &str) -> impl Iterator<Item = &str> {
    let body = &template[1..];
    let body = body.strip_suffix('/').unwrap_or(body);
    body.split('/').filter(|s| !s.is_empty())
}

fn placeholder_name(segment: &str) -> Option<&str> {
    let inner = segment.strip_prefix('{')?.strip_suffix('}')?;
    if inner.contains('{') || inner.contains('}') {
        return None;
    }
    Some(inner)
}

/// Split a request path into segments using the same rules as the compiled
/// expression: leading `/` required, one trailing `/` optional, no empty
/// segments. Returns `None` when no template could match the path.
pub(crate) fn split_request_path(path: &str) -> Option<SmallVec<[&str; MAX_INLINE_PARAMS]>> {
    let rest = path.strip_prefix('/')?;
    if rest.starts_with('/') {
        return None;
    }
    let rest = rest.strip_suffix('/').unwrap_or(rest);
    let mut out = SmallVec::new();
    if rest.is_empty() {
        return Some(out);
    }
    for segment in rest.split('/') {
        if segment.is_empty() {
            return None;
        }
        out.push(segment);
    }
    Some(out)
}
