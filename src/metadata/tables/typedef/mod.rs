//! The `TypeDef` table (0x02, II.22.37).
//!
//! Each row defines one type of the module. A type owns the contiguous run of `Field` rows
//! starting at its `field_list` and ending where the next type's run begins (or at the end of
//! the `Field` table for the last type):
//!
//! ```text
//! // Type A owns fields [A.field_list .. B.field_list)
//! ```

mod builder;
mod owned;
mod raw;

pub use builder::*;
pub use owned::*;
pub use raw::*;

#[allow(non_snake_case)]
/// Type attribute flag constants for `TypeDef` entries.
pub mod TypeAttributes {
    /// Mask for extracting type visibility information
    pub const VISIBILITY_MASK: u32 = 0x0000_0007;
    /// Type is not visible outside the assembly
    pub const NOT_PUBLIC: u32 = 0x0000_0000;
    /// Type is visible outside the assembly
    pub const PUBLIC: u32 = 0x0000_0001;
    /// Nested type with public visibility
    pub const NESTED_PUBLIC: u32 = 0x0000_0002;
    /// Nested type with private visibility
    pub const NESTED_PRIVATE: u32 = 0x0000_0003;
    /// Nested type with family visibility
    pub const NESTED_FAMILY: u32 = 0x0000_0004;
    /// Nested type with assembly visibility
    pub const NESTED_ASSEMBLY: u32 = 0x0000_0005;
    /// Nested type with family and assembly visibility
    pub const NESTED_FAM_AND_ASSEM: u32 = 0x0000_0006;
    /// Nested type with family or assembly visibility
    pub const NESTED_FAM_OR_ASSEM: u32 = 0x0000_0007;
    /// Mask for extracting class layout information
    pub const LAYOUT_MASK: u32 = 0x0000_0018;
    /// Fields are laid out by the runtime
    pub const AUTO_LAYOUT: u32 = 0x0000_0000;
    /// Fields are laid out sequentially, in declaration order
    pub const SEQUENTIAL_LAYOUT: u32 = 0x0000_0008;
    /// Field offsets are given explicitly
    pub const EXPLICIT_LAYOUT: u32 = 0x0000_0010;
    /// Type is an interface
    pub const INTERFACE: u32 = 0x0000_0020;
    /// Type is abstract
    pub const ABSTRACT: u32 = 0x0000_0080;
    /// Type cannot be derived from
    pub const SEALED: u32 = 0x0000_0100;
    /// Type name is special
    pub const SPECIAL_NAME: u32 = 0x0000_0400;
    /// The runtime should check the name encoding
    pub const RTSPECIAL_NAME: u32 = 0x0000_0800;
    /// Type is imported
    pub const IMPORT: u32 = 0x0000_1000;
    /// Type is serializable
    pub const SERIALIZABLE: u32 = 0x0000_2000;
    /// Static initialization may run before the first static field access
    pub const BEFORE_FIELD_INIT: u32 = 0x0010_0000;
}
