// SPDX-License-Identifier: MIT OR Apache-2.0
//! The tagged value type exchanged between pins.

use glint_assets::TextureHandle;
use serde::{Deserialize, Serialize};

/// Discriminant for the payload kinds a pin can carry.
///
/// [`DataKind::Invalid`] is the explicit "no payload" sentinel; a freshly
/// registered or cleared pin reports it until a node writes a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataKind {
    /// No payload present
    Invalid,
    /// Scalar integer
    Int,
    /// 2-component integer vector
    IVec2,
    /// 3-component integer vector
    IVec3,
    /// 4-component integer vector
    IVec4,
    /// Scalar float
    Float,
    /// 2-component float vector
    Vec2,
    /// 3-component float vector
    Vec3,
    /// 4-component float vector
    Vec4,
    /// GPU texture handle
    Texture2D,
}

impl DataKind {
    /// Display name, used by the presentation layer for pin labels.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Invalid => "Invalid",
            Self::Int => "Int",
            Self::IVec2 => "IVec2",
            Self::IVec3 => "IVec3",
            Self::IVec4 => "IVec4",
            Self::Float => "Float",
            Self::Vec2 => "Vec2",
            Self::Vec3 => "Vec3",
            Self::Vec4 => "Vec4",
            Self::Texture2D => "Texture2D",
        }
    }

    /// Pin color for the presentation layer.
    pub fn color(&self) -> [u8; 3] {
        match self {
            Self::Invalid => [90, 90, 90],
            Self::Int => [80, 200, 200],
            Self::IVec2 => [80, 170, 220],
            Self::IVec3 => [80, 140, 240],
            Self::IVec4 => [80, 110, 255],
            Self::Float => [80, 200, 80],
            Self::Vec2 => [200, 200, 80],
            Self::Vec3 => [200, 150, 80],
            Self::Vec4 => [200, 100, 200],
            Self::Texture2D => [100, 150, 200],
        }
    }
}

impl std::fmt::Display for DataKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A tagged value flowing through a pin.
///
/// `Data::Empty` means "nothing connected" or "not yet produced this frame";
/// callers must check [`Data::is_some`] (or use [`Data::try_get`]) before
/// consuming the output of an upstream node that may not have run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Data {
    /// No payload
    #[default]
    Empty,
    /// Scalar integer
    Int(i32),
    /// 2-component integer vector
    IVec2([i32; 2]),
    /// 3-component integer vector
    IVec3([i32; 3]),
    /// 4-component integer vector
    IVec4([i32; 4]),
    /// Scalar float
    Float(f32),
    /// 2-component float vector
    Vec2([f32; 2]),
    /// 3-component float vector
    Vec3([f32; 3]),
    /// 4-component float vector
    Vec4([f32; 4]),
    /// GPU texture handle
    Texture2D(TextureHandle),
}

impl Data {
    /// The kind tag of the current payload ([`DataKind::Invalid`] when empty).
    pub fn kind(&self) -> DataKind {
        match self {
            Self::Empty => DataKind::Invalid,
            Self::Int(_) => DataKind::Int,
            Self::IVec2(_) => DataKind::IVec2,
            Self::IVec3(_) => DataKind::IVec3,
            Self::IVec4(_) => DataKind::IVec4,
            Self::Float(_) => DataKind::Float,
            Self::Vec2(_) => DataKind::Vec2,
            Self::Vec3(_) => DataKind::Vec3,
            Self::Vec4(_) => DataKind::Vec4,
            Self::Texture2D(_) => DataKind::Texture2D,
        }
    }

    /// Whether a payload is present.
    pub fn is_some(&self) -> bool {
        !matches!(self, Self::Empty)
    }

    /// Read the payload as `T`, failing explicitly on absence or mismatch.
    ///
    /// A wrong-kind read is a [`DataError::KindMismatch`], distinguishable
    /// from [`DataError::Empty`]; it never reinterprets.
    pub fn get<T: Payload>(&self) -> Result<T, DataError> {
        T::extract(self).ok_or_else(|| match self.kind() {
            DataKind::Invalid => DataError::Empty,
            found => DataError::KindMismatch {
                expected: T::KIND,
                found,
            },
        })
    }

    /// Read the payload as `T`, treating absence and mismatch alike.
    pub fn try_get<T: Payload>(&self) -> Option<T> {
        T::extract(self)
    }

    /// Replace the payload.
    pub fn set<T: Payload>(&mut self, value: T) {
        *self = value.wrap();
    }

    /// Clear the payload back to [`Data::Empty`].
    pub fn reset(&mut self) {
        *self = Self::Empty;
    }
}

/// Error reading a typed payload out of a [`Data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DataError {
    /// No payload present
    #[error("no payload present")]
    Empty,

    /// Payload present but of a different kind
    #[error("expected {expected} payload, found {found}")]
    KindMismatch {
        /// The kind the caller asked for
        expected: DataKind,
        /// The kind actually stored
        found: DataKind,
    },
}

/// A concrete payload type that maps onto exactly one [`DataKind`].
pub trait Payload: Sized {
    /// The kind tag this payload carries.
    const KIND: DataKind;

    /// Pull the payload out of a [`Data`] of the matching kind.
    fn extract(data: &Data) -> Option<Self>;

    /// Wrap the payload into a [`Data`].
    fn wrap(self) -> Data;
}

macro_rules! impl_payload {
    ($ty:ty, $kind:ident) => {
        impl Payload for $ty {
            const KIND: DataKind = DataKind::$kind;

            fn extract(data: &Data) -> Option<Self> {
                match data {
                    Data::$kind(v) => Some(*v),
                    _ => None,
                }
            }

            fn wrap(self) -> Data {
                Data::$kind(self)
            }
        }
    };
}

impl_payload!(i32, Int);
impl_payload!([i32; 2], IVec2);
impl_payload!([i32; 3], IVec3);
impl_payload!([i32; 4], IVec4);
impl_payload!(f32, Float);
impl_payload!([f32; 2], Vec2);
impl_payload!([f32; 3], Vec3);
impl_payload!([f32; 4], Vec4);
impl_payload!(TextureHandle, Texture2D);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_reports_invalid_kind() {
        let data = Data::default();
        assert_eq!(data.kind(), DataKind::Invalid);
        assert!(!data.is_some());
    }

    #[test]
    fn test_get_matching_kind_returns_last_set() {
        let mut data = Data::Empty;
        data.set(3.5f32);
        assert_eq!(data.get::<f32>(), Ok(3.5));
        data.set([1.0f32, 2.0]);
        assert_eq!(data.get::<[f32; 2]>(), Ok([1.0, 2.0]));
    }

    #[test]
    fn test_get_wrong_kind_is_a_mismatch_not_empty() {
        let data = Data::Float(1.0);
        assert_eq!(
            data.get::<i32>(),
            Err(DataError::KindMismatch {
                expected: DataKind::Int,
                found: DataKind::Float,
            })
        );
        assert_eq!(Data::Empty.get::<i32>(), Err(DataError::Empty));
    }

    #[test]
    fn test_try_get_treats_mismatch_as_absence() {
        let data = Data::Float(1.0);
        assert_eq!(data.try_get::<i32>(), None);
        assert_eq!(data.try_get::<f32>(), Some(1.0));
        assert_eq!(Data::Empty.try_get::<f32>(), None);
    }

    #[test]
    fn test_reset_clears_payload() {
        let mut data = Data::Texture2D(TextureHandle(9));
        data.reset();
        assert!(!data.is_some());
        assert_eq!(data.try_get::<TextureHandle>(), None);
    }
}
