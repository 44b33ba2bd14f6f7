//! Masked attribute helpers.
//!
//! ECMA-335 attribute words mix two kinds of state: multi-bit sub-fields selected by a mask
//! (field access, type visibility, type layout) whose values are mutually exclusive, and single
//! bits that can be toggled independently (static, literal, sealed, ...).

/// Returns true if the bits of `value` selected by `mask` equal `attribute`.
#[must_use]
pub fn get_masked_attribute(value: u32, mask: u32, attribute: u32) -> bool {
    (value & mask) == attribute
}

/// Replace the sub-field selected by `mask` with `attribute`.
///
/// Clearing (`enabled == false`) only resets the sub-field if it currently holds `attribute`,
/// so switching off an access level that is not active leaves the other one in place.
#[must_use]
pub fn set_masked_attribute(value: u32, mask: u32, attribute: u32, enabled: bool) -> u32 {
    if enabled {
        (value & !mask) | (attribute & mask)
    } else if get_masked_attribute(value, mask, attribute) {
        value & !mask
    } else {
        value
    }
}

/// Set or clear a single independent flag.
#[must_use]
pub fn set_flag(value: u32, flag: u32, enabled: bool) -> u32 {
    if enabled {
        value | flag
    } else {
        value & !flag
    }
}

/// Generate getter / setter pairs for the values of a masked sub-field of `self.flags`.
///
/// Setting one value replaces whichever value the sub-field held before. Every setter marks the
/// entity dirty.
macro_rules! masked_flags {
    ($mask:expr, $( $(#[$doc:meta])* $get:ident / $set:ident => $value:expr ),* $(,)?) => {
        $(
            $(#[$doc])*
            #[must_use]
            pub fn $get(&self) -> bool {
                $crate::utils::get_masked_attribute(self.flags, $mask, $value)
            }

            #[doc = concat!("Select (or, with `false`, clear if active) the value tested by `", stringify!($get), "`")]
            pub fn $set(&mut self, enabled: bool) {
                self.flags = $crate::utils::set_masked_attribute(self.flags, $mask, $value, enabled);
                self.dirty = true;
            }
        )*
    };
}

/// Generate getter / setter pairs for independent single-bit flags of `self.flags`.
macro_rules! single_flags {
    ($( $(#[$doc:meta])* $get:ident / $set:ident => $flag:expr ),* $(,)?) => {
        $(
            $(#[$doc])*
            #[must_use]
            pub fn $get(&self) -> bool {
                self.flags & $flag != 0
            }

            #[doc = concat!("Set or clear the flag tested by `", stringify!($get), "`")]
            pub fn $set(&mut self, enabled: bool) {
                self.flags = $crate::utils::set_flag(self.flags, $flag, enabled);
                self.dirty = true;
            }
        )*
    };
}

pub(crate) use masked_flags;
pub(crate) use single_flags;

#[cfg(test)]
mod tests {
    use super::*;

    const MASK: u32 = 0x0007;

    #[test]
    fn masked_values_are_exclusive() {
        let value = set_masked_attribute(0x0010, MASK, 0x0001, true);
        assert_eq!(value, 0x0011);

        let value = set_masked_attribute(value, MASK, 0x0006, true);
        assert_eq!(value, 0x0016);
        assert!(get_masked_attribute(value, MASK, 0x0006));
        assert!(!get_masked_attribute(value, MASK, 0x0001));
    }

    #[test]
    fn clearing_inactive_value_is_noop() {
        let value = set_masked_attribute(0x0006, MASK, 0x0001, false);
        assert_eq!(value, 0x0006);

        let value = set_masked_attribute(value, MASK, 0x0006, false);
        assert_eq!(value, 0x0000);
    }

    #[test]
    fn independent_flags() {
        let value = set_flag(0x0006, 0x0010, true);
        assert_eq!(value, 0x0016);
        assert_eq!(set_flag(value, 0x0010, false), 0x0006);
    }
}
