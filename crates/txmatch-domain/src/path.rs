//! URL template matching.
//!
//! A pattern is either compared literally or split on `/` into segments.
//! Segments written `{name}` or `:name` accept any non-empty value; a final
//! `*` segment accepts any remainder. Comparison is segment-wise, so trailing
//! slashes and query strings are significant.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Literal(&'a str),
    Param(&'a str),
    Rest,
}

impl<'a> Segment<'a> {
    fn parse(part: &'a str, is_last: bool) -> Self {
        if is_last && part == "*" {
            return Segment::Rest;
        }
        if let Some(name) = part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
            return Segment::Param(name);
        }
        if let Some(name) = part.strip_prefix(':') {
            return Segment::Param(name);
        }
        Segment::Literal(part)
    }
}

/// A parsed URL template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlPattern<'a> {
    raw: &'a str,
    segments: Vec<Segment<'a>>,
}

impl<'a> UrlPattern<'a> {
    pub fn parse(pattern: &'a str) -> Self {
        let parts: Vec<&str> = pattern.split('/').collect();
        let last = parts.len() - 1;
        let segments = parts
            .iter()
            .enumerate()
            .map(|(i, part)| Segment::parse(part, i == last))
            .collect();
        UrlPattern {
            raw: pattern,
            segments,
        }
    }

    /// Names of the parameter segments, in order.
    pub fn param_names(&self) -> Vec<&'a str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Param(name) => Some(*name),
                _ => None,
            })
            .collect()
    }

    pub fn matches(&self, url: &str) -> bool {
        if url == self.raw {
            return true;
        }

        let mut values = url.split('/');
        for segment in &self.segments {
            if *segment == Segment::Rest {
                return true;
            }
            let Some(value) = values.next() else {
                return false;
            };
            let ok = match segment {
                Segment::Literal(lit) => *lit == value,
                Segment::Param(_) => !value.is_empty(),
                Segment::Rest => true,
            };
            if !ok {
                return false;
            }
        }

        values.next().is_none()
    }
}

/// True if `url` satisfies `pattern`, either literally or as a template.
pub fn url_matches(url: &str, pattern: &str) -> bool {
    UrlPattern::parse(pattern).matches(url)
}
