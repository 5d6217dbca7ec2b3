//! Type Extensions
//!
//! Attaches extra members (string rendering, pickling hooks) to model types
//! without touching the types themselves. Members live in an explicit table
//! keyed by the target type's `TypeId` and are looked up at the call site.
//!
//! # Critical Invariants
//!
//! - **No overwrite**: installing a member name that already exists on the
//!   target type fails with [`ExtensionError::Conflict`]; the first
//!   registration stays in place, so the outcome does not depend on
//!   installation order
//! - **All or nothing**: an extension with a conflicting member installs
//!   none of its members
//! - **Build once**: the process-wide table ([`extensions`]) is built on
//!   first use and read-only afterwards

use std::any::{type_name, Any, TypeId};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, OnceLock};

use serde_json::Value;
use thiserror::Error;

use crate::codec::CodecError;

pub mod builtin;

pub use builtin::{ConfigurationPickling, Point3Display};

#[derive(Debug, Error)]
pub enum ExtensionError {
    #[error("Member '{member}' is already defined on {type_name}")]
    Conflict {
        type_name: &'static str,
        member: &'static str,
    },

    #[error("{type_name} has no member '{member}'")]
    UnknownMember {
        type_name: &'static str,
        member: String,
    },

    #[error("Member expects a {expected} target")]
    TypeMismatch { expected: &'static str },

    #[error("Member '{member}' is not a {expected}")]
    WrongMemberKind {
        member: String,
        expected: &'static str,
    },

    #[error("Extension table failed to initialize: {0}")]
    Initialization(String),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

pub type Getter = Arc<dyn Fn(&dyn Any) -> Result<Value, ExtensionError> + Send + Sync>;
pub type Mutator = Arc<dyn Fn(&mut dyn Any, Value) -> Result<(), ExtensionError> + Send + Sync>;

/// A member donated to a target type.
#[derive(Clone)]
pub enum Member {
    /// Reads the target and produces a value.
    Getter(Getter),
    /// Writes an argument value into the target.
    Mutator(Mutator),
}

impl Member {
    pub fn getter<T, F>(f: F) -> Self
    where
        T: Any,
        F: Fn(&T) -> Result<Value, ExtensionError> + Send + Sync + 'static,
    {
        Member::Getter(Arc::new(move |target: &dyn Any| {
            let target = target
                .downcast_ref::<T>()
                .ok_or(ExtensionError::TypeMismatch {
                    expected: type_name::<T>(),
                })?;
            f(target)
        }))
    }

    pub fn mutator<T, F>(f: F) -> Self
    where
        T: Any,
        F: Fn(&mut T, Value) -> Result<(), ExtensionError> + Send + Sync + 'static,
    {
        Member::Mutator(Arc::new(move |target: &mut dyn Any, argument: Value| {
            let target = target
                .downcast_mut::<T>()
                .ok_or(ExtensionError::TypeMismatch {
                    expected: type_name::<T>(),
                })?;
            f(target, argument)
        }))
    }

    fn kind(&self) -> &'static str {
        match self {
            Member::Getter(_) => "getter",
            Member::Mutator(_) => "mutator",
        }
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Member::{}", self.kind())
    }
}

/// A set of members donated to one target type.
pub trait Extension {
    type Target: Any;

    fn members() -> Vec<(&'static str, Member)>;
}

type MemberTable = BTreeMap<&'static str, Member>;

/// Member tables keyed by target type.
#[derive(Debug, Default)]
pub struct ExtensionRegistry {
    tables: HashMap<TypeId, MemberTable>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install every member of `X` on `X::Target`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtensionError::Conflict`] if any member name already exists
    /// on the target, or appears twice in `X`. Nothing is installed then.
    pub fn extend<X: Extension>(&mut self) -> Result<(), ExtensionError> {
        let target_name = type_name::<X::Target>();
        let existing = self.tables.get(&TypeId::of::<X::Target>());

        let mut staged: BTreeMap<&'static str, Member> = BTreeMap::new();
        for (name, member) in X::members() {
            let taken = existing.is_some_and(|table| table.contains_key(name));
            match staged.entry(name) {
                Entry::Vacant(slot) if !taken => {
                    slot.insert(member);
                }
                _ => {
                    return Err(ExtensionError::Conflict {
                        type_name: target_name,
                        member: name,
                    })
                }
            }
        }

        tracing::debug!(
            target_type = target_name,
            members = ?staged.keys().collect::<Vec<_>>(),
            "installing type extension"
        );
        self.tables
            .entry(TypeId::of::<X::Target>())
            .or_default()
            .extend(staged);
        Ok(())
    }

    pub fn has_member<T: Any>(&self, name: &str) -> bool {
        self.tables
            .get(&TypeId::of::<T>())
            .is_some_and(|table| table.contains_key(name))
    }

    /// Member names installed on `T`, sorted.
    pub fn member_names<T: Any>(&self) -> Vec<&'static str> {
        self.tables
            .get(&TypeId::of::<T>())
            .map(|table| table.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Call getter `name` on `target`.
    pub fn invoke<T: Any>(&self, target: &T, name: &str) -> Result<Value, ExtensionError> {
        match self.member::<T>(name)? {
            Member::Getter(getter) => getter(target as &dyn Any),
            Member::Mutator(_) => Err(ExtensionError::WrongMemberKind {
                member: name.to_string(),
                expected: "getter",
            }),
        }
    }

    /// Call mutator `name` on `target` with `argument`.
    pub fn invoke_mut<T: Any>(
        &self,
        target: &mut T,
        name: &str,
        argument: Value,
    ) -> Result<(), ExtensionError> {
        match self.member::<T>(name)? {
            Member::Mutator(mutator) => mutator(target as &mut dyn Any, argument),
            Member::Getter(_) => Err(ExtensionError::WrongMemberKind {
                member: name.to_string(),
                expected: "mutator",
            }),
        }
    }

    fn member<T: Any>(&self, name: &str) -> Result<&Member, ExtensionError> {
        self.tables
            .get(&TypeId::of::<T>())
            .and_then(|table| table.get(name))
            .ok_or_else(|| ExtensionError::UnknownMember {
                type_name: type_name::<T>(),
                member: name.to_string(),
            })
    }
}

/// Process-wide extension table with the built-in extensions installed.
///
/// Built on first call, which the Python module does at import time.
pub fn extensions() -> Result<&'static ExtensionRegistry, ExtensionError> {
    static EXTENSIONS: OnceLock<Result<ExtensionRegistry, String>> = OnceLock::new();

    EXTENSIONS
        .get_or_init(|| {
            let mut registry = ExtensionRegistry::new();
            builtin::install(&mut registry)
                .map(|()| registry)
                .map_err(|e| e.to_string())
        })
        .as_ref()
        .map_err(|message| ExtensionError::Initialization(message.clone()))
}
