use std::borrow::Cow;
use std::fmt;

macro_rules! opaque_token {
    ($(#[$meta:meta])* $name:ident { $($(#[$cmeta:meta])* $konst:ident = $value:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(Cow<'static, str>);

        impl $name {
            $($(#[$cmeta])* pub const $konst: Self = Self(Cow::Borrowed($value));)+

            /// Tokens are case-insensitive and stored lower-case.
            pub fn new(name: impl AsRef<str>) -> Self {
                Self(Cow::Owned(name.as_ref().to_ascii_lowercase()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self::new(name)
            }
        }
    };
}

opaque_token! {
    /// How much screen a window occupies. Absent means [`WindowState::NORMAL`].
    WindowState {
        NORMAL = "normal",
        MAXIMIZED = "maximized",
        MINIMIZED = "minimized",
    }
}

opaque_token! {
    /// The function a window is performing. Absent means [`PortletMode::VIEW`].
    PortletMode {
        VIEW = "view",
        EDIT = "edit",
        HELP = "help",
    }
}

/// Map key of a window-scoped parameter.
///
/// Ordered by window, then name. Kept as a pair in memory so that
/// `("ab", "c")` and `("a", "bc")` never collide; only the wire form
/// concatenates them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParameterKey {
    pub window_id: String,
    pub name: String,
}

impl ParameterKey {
    pub fn new(window_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            window_id: window_id.into(),
            name: name.into(),
        }
    }

    /// The concatenated key written on the wire.
    pub fn wire_key(&self) -> String {
        let mut key = String::with_capacity(self.window_id.len() + self.name.len());
        key.push_str(&self.window_id);
        key.push_str(&self.name);
        key
    }
}

/// A named, multi-valued parameter scoped to one window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub window_id: String,
    pub name: String,
    pub values: Vec<String>,
}

impl Parameter {
    pub fn new(
        window_id: impl Into<String>,
        name: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            window_id: window_id.into(),
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn single(window_id: impl Into<String>, name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(window_id, name, [value])
    }

    pub fn key(&self) -> ParameterKey {
        ParameterKey::new(self.window_id.clone(), self.name.clone())
    }

    pub fn first_value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}
