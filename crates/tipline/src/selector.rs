//! Selector abstraction for element lookup.
//!
//! A [`Selector`] is an opaque locator: it carries no identity beyond a
//! single resolution. Drivers resolve it at interaction time, never at
//! construction time.
//!
//! # Tie-break
//!
//! Every variant resolves to the **first** match in DOM order. A scoped
//! selector ([`Selector::Within`]) takes the first match of the scope and
//! then the first match of the inner selector among its descendants.

use std::fmt;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// Element id (`id="..."` attribute)
    Id(String),
    /// CSS selector (e.g., "input[type='file']")
    Css(String),
    /// View-model binding (`ng-model="..."` attribute)
    Model(String),
    /// CSS selector filtered by contained text
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
    },
    /// Inner selector resolved inside the first match of a scope
    Within {
        /// Scope selector
        scope: Box<Selector>,
        /// Selector resolved below the scope
        inner: Box<Selector>,
    },
}

impl Selector {
    /// Create an id selector
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a view-model binding selector
    #[must_use]
    pub fn model(binding: impl Into<String>) -> Self {
        Self::Model(binding.into())
    }

    /// Create a CSS selector filtered by contained text
    #[must_use]
    pub fn css_with_text(css: impl Into<String>, text: impl Into<String>) -> Self {
        Self::CssWithText {
            css: css.into(),
            text: text.into(),
        }
    }

    /// The raw file input of a page or scope
    #[must_use]
    pub fn file_input() -> Self {
        Self::css("input[type='file']")
    }

    /// Resolve `inner` below the first match of `self`
    #[must_use]
    pub fn descendant(self, inner: Selector) -> Self {
        Self::Within {
            scope: Box::new(self),
            inner: Box::new(inner),
        }
    }

    /// Pure CSS rendering, when the selector has one.
    ///
    /// Text filters cannot be expressed in CSS and yield `None`.
    #[must_use]
    pub fn to_css(&self) -> Option<String> {
        match self {
            Self::Id(id) => Some(css_id(id)),
            Self::Css(s) => Some(s.clone()),
            Self::Model(binding) => Some(format!("[ng-model={binding:?}]")),
            Self::CssWithText { .. } => None,
            Self::Within { scope, inner } => {
                Some(format!("{} {}", scope.to_css()?, inner.to_css()?))
            }
        }
    }

    /// JavaScript expression evaluating to the first match or `null`
    #[must_use]
    pub fn to_query(&self) -> String {
        self.query_from("document")
    }

    fn query_from(&self, root: &str) -> String {
        match self {
            Self::Id(_) | Self::Css(_) | Self::Model(_) => {
                // to_css is always Some for these variants
                let css = self.to_css().unwrap_or_default();
                format!("{root}.querySelector({css:?})")
            }
            Self::CssWithText { css, text } => format!(
                "(Array.from({root}.querySelectorAll({css:?})).find(el => el.textContent.includes({text:?})) || null)"
            ),
            Self::Within { scope, inner } => format!(
                "((s) => s ? {} : null)({})",
                inner.query_from("s"),
                scope.query_from(root)
            ),
        }
    }
}

/// Render an id as a CSS selector, falling back to the attribute form for
/// ids that are not plain identifiers.
fn css_id(id: &str) -> String {
    let plain = id
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if plain {
        format!("#{id}")
    } else {
        format!("[id={id:?}]")
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{id}"),
            Self::Css(s) => write!(f, "{s}"),
            Self::Model(binding) => write!(f, "[ng-model={binding:?}]"),
            Self::CssWithText { css, text } => write!(f, "{css}:has-text({text:?})"),
            Self::Within { scope, inner } => write!(f, "{scope} >> {inner}"),
        }
    }
}
