//! Enum Codec - Symbolic Names for Enumerated Values
//!
//! Every closed enumeration that crosses a process boundary is transported by
//! its symbolic name and reconstructed by table lookup.
//!
//! # Critical Invariants
//!
//! - **Identity**: `decode` returns a `&'static` reference into the enum's
//!   fixed variant table, the same reference `NamedEnum::singleton` returns.
//!   No value is ever allocated during decoding.
//! - **Closed sets**: the variant table of an enum is fixed for the lifetime
//!   of the process and lists every variant exactly once.

use std::any::Any;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use crate::codec::CodecError;
use crate::logging::LogLevel;
use crate::models::{BackendType, StackType};

/// A closed enumeration whose values are identified by unique names.
///
/// Implemented through [`named_enum!`], which derives the variant table,
/// the names, and the serde representation from a single variant list.
pub trait NamedEnum: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Name of the enumerated type, used as registry key.
    const TYPE_NAME: &'static str;

    /// All values, in declaration order.
    fn variants() -> &'static [Self];

    /// Symbolic name of this value.
    fn name(&self) -> &'static str;

    /// The process-wide instance of this value.
    fn singleton(&self) -> &'static Self;
}

/// Defines a fieldless enum and implements [`NamedEnum`], `Display`, and
/// name-based serde for it.
///
/// Variant discriminants are left implicit so that `value as usize` is the
/// position of `value` in the variant table.
macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $ty:ident as $type_name:literal {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $vis enum $ty {
            $(
                $(#[$variant_meta])*
                $variant
            ),+
        }

        impl $ty {
            /// All values, in declaration order.
            pub fn all() -> &'static [Self] {
                <Self as $crate::codec::enums::NamedEnum>::variants()
            }

            /// Position of this value in [`Self::all`].
            pub const fn index(self) -> usize {
                self as usize
            }
        }

        impl $crate::codec::enums::NamedEnum for $ty {
            const TYPE_NAME: &'static str = $type_name;

            fn variants() -> &'static [Self] {
                static VARIANTS: &[$ty] = &[$($ty::$variant),+];
                VARIANTS
            }

            fn name(&self) -> &'static str {
                match self {
                    $($ty::$variant => stringify!($variant)),+
                }
            }

            fn singleton(&self) -> &'static Self {
                &Self::variants()[self.index()]
            }
        }

        impl ::std::fmt::Display for $ty {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::codec::enums::encode(self))
            }
        }

        impl ::serde::Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: ::serde::Serializer,
            {
                serializer.serialize_str($crate::codec::enums::encode(self))
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let name = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                $crate::codec::enums::decode::<$ty>(&name)
                    .map(|value| *value)
                    .map_err(<D::Error as ::serde::de::Error>::custom)
            }
        }
    };
}

pub(crate) use named_enum;

/// Symbolic name of an enumerated value.
pub fn encode<E: NamedEnum>(value: &E) -> &'static str {
    value.name()
}

/// Resolve a symbolic name to the singleton value of `E`.
///
/// # Errors
///
/// Returns [`CodecError::UnknownEnumName`] if `E` has no value with that name.
///
/// # Example
/// ```
/// use pysopnet::codec::enums::{decode, encode, NamedEnum};
/// use pysopnet::StackType;
///
/// let membrane = decode::<StackType>("Membrane").unwrap();
/// assert!(std::ptr::eq(membrane, StackType::Membrane.singleton()));
/// assert_eq!(encode(membrane), "Membrane");
/// assert!(decode::<StackType>("membrane").is_err());
/// ```
pub fn decode<E: NamedEnum>(name: &str) -> Result<&'static E, CodecError> {
    E::variants()
        .iter()
        .find(|value| value.name() == name)
        .ok_or_else(|| CodecError::UnknownEnumName {
            enum_type: E::TYPE_NAME,
            name: name.to_string(),
        })
}

/// Type-erased singleton handed out by [`EnumRegistry::reconstruct`].
pub type EnumValue = &'static (dyn Any + Send + Sync);

/// Rebuilds a value of one registered enum from its symbolic name.
pub type Reconstructor = fn(&str) -> Result<EnumValue, CodecError>;

fn reconstruct_named<E: NamedEnum>(name: &str) -> Result<EnumValue, CodecError> {
    decode::<E>(name).map(|value| value as EnumValue)
}

/// Reconstruction functions keyed by enum type name.
///
/// Lets transport layers that only carry `(type name, value name)` pairs
/// rebuild enumerated values without knowing each type in advance.
#[derive(Debug, Default)]
pub struct EnumRegistry {
    reconstructors: BTreeMap<&'static str, Reconstructor>,
}

impl EnumRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `E` under `E::TYPE_NAME`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::DuplicateEnumType`] if the type name is taken.
    pub fn register<E: NamedEnum>(&mut self) -> Result<(), CodecError> {
        match self.reconstructors.entry(E::TYPE_NAME) {
            Entry::Occupied(_) => Err(CodecError::DuplicateEnumType(E::TYPE_NAME)),
            Entry::Vacant(slot) => {
                slot.insert(reconstruct_named::<E>);
                tracing::debug!(enum_type = E::TYPE_NAME, "registered enum reconstructor");
                Ok(())
            }
        }
    }

    pub fn is_registered(&self, type_name: &str) -> bool {
        self.reconstructors.contains_key(type_name)
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<&'static str> {
        self.reconstructors.keys().copied().collect()
    }

    /// Rebuild the singleton named `name` of the enum registered as `type_name`.
    ///
    /// # Errors
    ///
    /// - [`CodecError::UnknownEnumType`] if `type_name` was never registered
    /// - [`CodecError::UnknownEnumName`] if the type has no such value
    pub fn reconstruct(&self, type_name: &str, name: &str) -> Result<EnumValue, CodecError> {
        let reconstruct = self
            .reconstructors
            .get(type_name)
            .ok_or_else(|| CodecError::UnknownEnumType(type_name.to_string()))?;
        reconstruct(name)
    }

    /// Typed variant of [`Self::reconstruct`].
    pub fn reconstruct_as<E: NamedEnum>(&self, name: &str) -> Result<&'static E, CodecError> {
        self.reconstruct(E::TYPE_NAME, name)?
            .downcast_ref::<E>()
            .ok_or_else(|| CodecError::UnknownEnumType(E::TYPE_NAME.to_string()))
    }
}

fn codec_registry() -> Result<EnumRegistry, CodecError> {
    let mut registry = EnumRegistry::new();
    registry.register::<StackType>()?;
    registry.register::<BackendType>()?;
    registry.register::<LogLevel>()?;
    Ok(registry)
}

/// Process-wide registry holding every enum the configuration codec uses.
///
/// # Errors
///
/// Returns [`CodecError::RegistryInitialization`] if two of those enums
/// share a type name. The failure is permanent for the process.
pub fn enum_registry() -> Result<&'static EnumRegistry, CodecError> {
    static REGISTRY: OnceLock<Result<EnumRegistry, String>> = OnceLock::new();

    REGISTRY
        .get_or_init(|| codec_registry().map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|message| CodecError::RegistryInitialization(message.clone()))
}
