//! Element namespace chosen by the caller for each operation

use dom::{MATHML_NS, SVG_NS};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    /// Plain HTML
    #[default]
    None,
    Svg,
    #[serde(rename = "mathml")]
    MathMl,
}

impl Namespace {
    pub fn uri(self) -> Option<&'static str> {
        match self {
            Namespace::None => None,
            Namespace::Svg => Some(SVG_NS),
            Namespace::MathMl => Some(MATHML_NS),
        }
    }

    /// Root tag the parser needs as context for fragments in this namespace
    pub fn wrapper_tag(self) -> Option<&'static str> {
        match self {
            Namespace::None => None,
            Namespace::Svg => Some("svg"),
            Namespace::MathMl => Some("math"),
        }
    }

    /// Wrap `content` in the namespace root tag, if any
    pub fn wrap(self, content: &str) -> Cow<'_, str> {
        match self.wrapper_tag() {
            Some(tag) => Cow::Owned(format!("<{tag}>{content}</{tag}>")),
            None => Cow::Borrowed(content),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap() {
        assert_eq!(Namespace::None.wrap("<p>a</p>"), "<p>a</p>");
        assert!(matches!(Namespace::None.wrap("x"), Cow::Borrowed(_)));
        assert_eq!(Namespace::Svg.wrap("<circle/>"), "<svg><circle/></svg>");
        assert_eq!(Namespace::MathMl.wrap("<mi>x</mi>"), "<math><mi>x</mi></math>");
    }

    #[test]
    fn test_serde_names() {
        let ns: Namespace = serde_json::from_str("\"mathml\"").unwrap();
        assert_eq!(ns, Namespace::MathMl);
        assert_eq!(serde_json::to_string(&Namespace::Svg).unwrap(), "\"svg\"");
        assert_eq!(Namespace::None.uri(), None);
    }

    #[test]
    fn test_uris_resolve_in_host() {
        for (ns, host_ns) in [
            (Namespace::Svg, dom::Namespace::Svg),
            (Namespace::MathMl, dom::Namespace::MathMl),
        ] {
            let uri = ns.uri().unwrap();
            assert_eq!(dom::Namespace::from_uri(uri), Some(host_ns));
        }
    }
}
