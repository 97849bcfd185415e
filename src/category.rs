//! Conversion of raw category values into bitset positions.
//!
//! Models hand over category values in whatever numeric type their format
//! uses (integers for native models, floats for XGBoost/LightGBM style
//! thresholds). Every value is validated before it touches a bitset: a
//! negative, fractional, non-finite or oversized value is rejected instead of
//! being wrapped or truncated into some unrelated category.

use std::fmt;

/// Why a raw value cannot be used as a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidCategory {
    #[error("value is negative")]
    Negative,

    #[error("value is not a whole number")]
    Fractional,

    #[error("value is NaN or infinite")]
    NonFinite,

    #[error("value exceeds the maximum category {max}")]
    TooLarge { max: u32 },
}

/// A raw numeric value that may name a category.
pub trait CategoryValue: Copy + fmt::Display + Send + Sync {
    /// Convert to a category in `0..=max`.
    fn to_category(self, max: u32) -> Result<u32, InvalidCategory>;
}

macro_rules! impl_unsigned {
    ($($t:ty),*) => {$(
        impl CategoryValue for $t {
            #[inline]
            fn to_category(self, max: u32) -> Result<u32, InvalidCategory> {
                match u32::try_from(self) {
                    Ok(cat) if cat <= max => Ok(cat),
                    _ => Err(InvalidCategory::TooLarge { max }),
                }
            }
        }
    )*};
}

macro_rules! impl_signed {
    ($($t:ty),*) => {$(
        impl CategoryValue for $t {
            #[inline]
            fn to_category(self, max: u32) -> Result<u32, InvalidCategory> {
                if self < 0 {
                    return Err(InvalidCategory::Negative);
                }
                match u32::try_from(self) {
                    Ok(cat) if cat <= max => Ok(cat),
                    _ => Err(InvalidCategory::TooLarge { max }),
                }
            }
        }
    )*};
}

macro_rules! impl_float {
    ($($t:ty),*) => {$(
        impl CategoryValue for $t {
            #[inline]
            fn to_category(self, max: u32) -> Result<u32, InvalidCategory> {
                if !self.is_finite() {
                    return Err(InvalidCategory::NonFinite);
                }
                if self < 0.0 {
                    return Err(InvalidCategory::Negative);
                }
                if self.fract() != 0.0 {
                    return Err(InvalidCategory::Fractional);
                }
                if f64::from(self) > f64::from(max) {
                    return Err(InvalidCategory::TooLarge { max });
                }
                Ok(self as u32)
            }
        }
    )*};
}

impl_unsigned!(u8, u16, u32, u64, u128, usize);
impl_signed!(i8, i16, i32, i64, i128, isize);
impl_float!(f32, f64);

/// Map a raw feature value to a category for querying.
///
/// Returns `None` for values that can never be a category (NaN, negative,
/// fractional, above `u32::MAX`). Callers treat `None` as "not in any set"
/// or route it through their missing-value policy.
#[inline]
pub fn category_of<T: CategoryValue>(value: T) -> Option<u32> {
    value.to_category(u32::MAX).ok()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsigned_values() {
        assert_eq!(7u8.to_category(10), Ok(7));
        assert_eq!(10usize.to_category(10), Ok(10));
        assert_eq!(11u64.to_category(10), Err(InvalidCategory::TooLarge { max: 10 }));
        assert_eq!(
            (u64::from(u32::MAX) + 1).to_category(u32::MAX),
            Err(InvalidCategory::TooLarge { max: u32::MAX })
        );
    }

    #[test]
    fn signed_values() {
        assert_eq!(0i32.to_category(5), Ok(0));
        assert_eq!(5i64.to_category(5), Ok(5));
        assert_eq!((-1i32).to_category(5), Err(InvalidCategory::Negative));
        assert_eq!(i64::MIN.to_category(u32::MAX), Err(InvalidCategory::Negative));
        assert_eq!(
            i64::MAX.to_category(u32::MAX),
            Err(InvalidCategory::TooLarge { max: u32::MAX })
        );
    }

    #[test]
    fn float_values() {
        assert_eq!(3.0f32.to_category(10), Ok(3));
        assert_eq!(42.0f64.to_category(100), Ok(42));
        assert_eq!((-0.0f64).to_category(10), Ok(0));
        assert_eq!((-2.0f64).to_category(10), Err(InvalidCategory::Negative));
        assert_eq!(1.5f32.to_category(10), Err(InvalidCategory::Fractional));
        assert_eq!(f64::NAN.to_category(10), Err(InvalidCategory::NonFinite));
        assert_eq!(f32::INFINITY.to_category(10), Err(InvalidCategory::NonFinite));
        assert_eq!(11.0f64.to_category(10), Err(InvalidCategory::TooLarge { max: 10 }));
        assert_eq!(
            4_294_967_296.0f64.to_category(u32::MAX),
            Err(InvalidCategory::TooLarge { max: u32::MAX })
        );
    }

    #[test]
    fn category_of_maps_invalid_to_none() {
        assert_eq!(category_of(17.0f64), Some(17));
        assert_eq!(category_of(u32::MAX), Some(u32::MAX));
        assert_eq!(category_of(f32::NAN), None);
        assert_eq!(category_of(-3i32), None);
        assert_eq!(category_of(0.25f64), None);
    }
}
