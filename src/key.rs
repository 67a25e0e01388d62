//! Cache keys and scoping
//!
//! A [`CacheKey`] is an asset name with an optional kind tag. Two keys are
//! equal only if both parts match exactly, so the same URL fetched as text and
//! as bytes occupies two entries. [`Scope`] prefixes every key of one cache
//! with a fixed namespace.

use crate::error::{LoadError, LoadResult};
use std::fmt;
use std::marker::PhantomData;

/// Identifier for a loadable asset
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    name: String,
    tag: Option<&'static str>,
}

impl CacheKey {
    /// Parse and validate an untagged key
    pub fn parse(name: &str) -> LoadResult<Self> {
        validate(name)?;
        Ok(Self {
            name: name.to_string(),
            tag: None,
        })
    }

    /// Parse and validate a key carrying a kind tag
    pub fn tagged(name: &str, tag: &'static str) -> LoadResult<Self> {
        validate(name)?;
        Ok(Self {
            name: name.to_string(),
            tag: Some(tag),
        })
    }

    /// Implicit key derived from a type's short name (`game::Hero<T>` → `Hero`)
    pub fn of<T: ?Sized>() -> Self {
        Self {
            name: type_key::<T>().to_string(),
            tag: None,
        }
    }

    /// The key name, including any scope prefix
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The kind tag, if any
    pub fn tag(&self) -> Option<&'static str> {
        self.tag
    }

    /// A key in the same namespace with a different name
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: self.tag,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag {
            Some(tag) => write!(f, "{} [{}]", self.name, tag),
            None => write!(f, "{}", self.name),
        }
    }
}

fn validate(name: &str) -> LoadResult<()> {
    let reason = if name.trim().is_empty() {
        "key is empty"
    } else if name.chars().any(char::is_control) {
        "key contains control characters"
    } else {
        return Ok(());
    };

    Err(LoadError::InvalidKey {
        key: name.to_string(),
        reason,
    })
}

fn type_key<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// A kind of asset that can be addressed through a [`TypedKey`]
pub trait AssetKind {
    /// Tag stored in the resulting [`CacheKey`]
    const TAG: &'static str;
}

/// Key statically bound to an asset kind
pub struct TypedKey<T: AssetKind> {
    name: String,
    _kind: PhantomData<fn() -> T>,
}

impl<T: AssetKind> TypedKey<T> {
    /// Create a typed key; validation happens on conversion
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            _kind: PhantomData,
        }
    }

    /// The untagged name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Convert into a tagged cache key
    pub fn to_cache_key(&self) -> LoadResult<CacheKey> {
        CacheKey::tagged(&self.name, T::TAG)
    }
}

impl<T: AssetKind> Clone for TypedKey<T> {
    fn clone(&self) -> Self {
        Self::new(self.name.clone())
    }
}

impl<T: AssetKind> fmt::Debug for TypedKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedKey")
            .field("name", &self.name)
            .field("kind", &T::TAG)
            .finish()
    }
}

/// Fixed namespace prefix applied to every key of a cache
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    prefix: Option<String>,
}

impl Scope {
    /// Create a scope; blank prefixes mean "no scope"
    pub fn new(prefix: Option<&str>) -> Self {
        let prefix = prefix
            .map(|p| p.trim().trim_matches('/'))
            .filter(|p| !p.is_empty())
            .map(str::to_string);
        Self { prefix }
    }

    /// A scope that leaves keys untouched
    pub fn unscoped() -> Self {
        Self::default()
    }

    /// The configured prefix
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Prefix a caller key (`sword` → `mymod/sword`)
    pub fn apply(&self, key: CacheKey) -> CacheKey {
        match &self.prefix {
            Some(prefix) => {
                let name = format!("{}/{}", prefix, key.name());
                key.with_name(name)
            }
            None => key,
        }
    }

    /// Caller-facing name of an internal key
    pub fn strip<'a>(&self, key: &'a CacheKey) -> &'a str {
        match &self.prefix {
            Some(prefix) => key
                .name()
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix('/'))
                .unwrap_or(key.name()),
            None => key.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Texture;

    impl AssetKind for Texture {
        const TAG: &'static str = "texture";
    }

    struct Hero<T>(PhantomData<T>);

    #[test]
    fn rejects_blank_keys() {
        assert!(matches!(
            CacheKey::parse(""),
            Err(LoadError::InvalidKey { reason: "key is empty", .. })
        ));
        assert!(CacheKey::parse("   ").is_err());
        assert!(CacheKey::parse("bad\nkey").is_err());
        assert!(CacheKey::parse("ui/icons/sword").is_ok());
    }

    #[test]
    fn tags_make_keys_distinct() {
        let plain = CacheKey::parse("hero").unwrap();
        let tagged = CacheKey::tagged("hero", "texture").unwrap();
        assert_ne!(plain, tagged);
        assert_eq!(tagged.to_string(), "hero [texture]");
        assert_eq!(TypedKey::<Texture>::new("hero").to_cache_key().unwrap(), tagged);
    }

    #[test]
    fn type_key_uses_short_name() {
        assert_eq!(CacheKey::of::<Texture>().name(), "Texture");
        assert_eq!(CacheKey::of::<Hero<u8>>().name(), "Hero");
    }

    #[test]
    fn scope_prefixes_and_strips() {
        let scope = Scope::new(Some("mymod/"));
        let key = scope.apply(CacheKey::parse("sword").unwrap());
        assert_eq!(key.name(), "mymod/sword");
        assert_eq!(scope.strip(&key), "sword");
    }

    #[test]
    fn blank_scope_is_unscoped() {
        assert_eq!(Scope::new(Some("  ")), Scope::unscoped());
        assert_eq!(Scope::new(None).prefix(), None);
        let key = Scope::new(Some("")).apply(CacheKey::parse("a").unwrap());
        assert_eq!(key.name(), "a");
    }
}
