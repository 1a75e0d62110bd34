use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TOKEN_ID: AtomicU64 = AtomicU64::new(1);

/// Identity behind a token: either a minted value or a type acting as its own token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKey {
    Value(u64),
    Type(TypeId),
}

/// A token with its type parameter erased.
///
/// Provider definitions and dependency lists store erased tokens; equality and hashing
/// only consider the identity, never the description.
#[derive(Clone)]
pub struct AnyToken {
    key: TokenKey,
    description: Arc<str>,
}

impl AnyToken {
    pub fn key(&self) -> TokenKey {
        self.key
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The type identity if this token is a type acting as its own token.
    pub fn type_id(&self) -> Option<TypeId> {
        match self.key {
            TokenKey::Type(type_id) => Some(type_id),
            TokenKey::Value(_) => None,
        }
    }
}

impl PartialEq for AnyToken {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for AnyToken {}

impl Hash for AnyToken {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for AnyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

impl fmt::Debug for AnyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyToken")
            .field("key", &self.key)
            .field("description", &self.description)
            .finish()
    }
}

/// Unique, type-carrying identifier for a dependency resolving to `Arc<T>`.
///
/// # Example
///
/// ```
/// use std::sync::LazyLock;
/// use wiring::Token;
///
/// struct Settings;
///
/// static SETTINGS: LazyLock<Token<Settings>> = LazyLock::new(|| Token::new("settings"));
///
/// assert_ne!(SETTINGS.erase(), Token::<Settings>::new("settings").erase());
/// assert_eq!(Token::<Settings>::of(), Token::<Settings>::of());
/// ```
pub struct Token<T: ?Sized> {
    inner: AnyToken,
    _marker: PhantomData<fn() -> Arc<T>>,
}

impl<T: ?Sized + 'static> Token<T> {
    /// Mint a new identity. The description is only used in diagnostics.
    pub fn new(description: impl Into<String>) -> Self {
        let id = NEXT_TOKEN_ID.fetch_add(1, Ordering::Relaxed);
        Self {
            inner: AnyToken {
                key: TokenKey::Value(id),
                description: Arc::from(description.into()),
            },
            _marker: PhantomData,
        }
    }

    /// The token for `T` itself, used by constructable types.
    pub fn of() -> Self {
        Self {
            inner: AnyToken {
                key: TokenKey::Type(TypeId::of::<T>()),
                description: Arc::from(type_name::<T>()),
            },
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized> Token<T> {
    pub fn erase(&self) -> AnyToken {
        self.inner.clone()
    }

    pub fn as_any(&self) -> &AnyToken {
        &self.inner
    }

    pub fn key(&self) -> TokenKey {
        self.inner.key
    }

    pub fn description(&self) -> &str {
        self.inner.description()
    }
}

impl<T: ?Sized> Clone for Token<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized> PartialEq for Token<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T: ?Sized> Eq for Token<T> {}

impl<T: ?Sized> Hash for Token<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl<T: ?Sized> fmt::Display for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl<T: ?Sized> fmt::Debug for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Token").field(&self.inner).finish()
    }
}

impl<T: ?Sized> From<&Token<T>> for AnyToken {
    fn from(token: &Token<T>) -> Self {
        token.erase()
    }
}

impl<T: ?Sized> From<Token<T>> for AnyToken {
    fn from(token: Token<T>) -> Self {
        token.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Service;

    #[test]
    fn test_value_tokens_are_unique() {
        let a = Token::<u32>::new("port");
        let b = Token::<u32>::new("port");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert_eq!(a.description(), "port");
    }

    #[test]
    fn test_type_token_is_its_own_identity() {
        let a = Token::<Service>::of();
        let b = Token::<Service>::of();
        assert_eq!(a, b);
        assert_eq!(a.erase().type_id(), Some(TypeId::of::<Service>()));
        assert!(a.description().ends_with("Service"));
    }

    #[test]
    fn test_value_token_has_no_type_identity() {
        let token = Token::<Service>::new("service");
        assert_eq!(token.erase().type_id(), None);
        assert_ne!(token.erase(), Token::<Service>::of().erase());
    }
}
