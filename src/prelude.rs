//! # cilmeta Prelude
//!
//! The types needed to load, inspect, mutate and write metadata, for glob import.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all cilmeta operations
pub use crate::Error;

/// The result type used throughout cilmeta
pub use crate::Result;

/// Load and build options
pub use crate::metadata::config::{BuildConfig, LoadConfig};

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// The owner of one image and its build phases
pub use crate::metadata::{BuildPhase, MetadataHeader, UpdatedMetadata};

/// Raw stream bytes, input of a load and output of a write
pub use crate::metadata::streams::{Heaps, MetadataStreams, TablesStream};

// ================================================================================================
// Metadata System - Core Types
// ================================================================================================

/// Metadata token type for referencing table entries
pub use crate::metadata::token::Token;

/// Table identification, layout and generic access
pub use crate::metadata::tables::{
    CodedIndex, CodedIndexType, MetadataEntity, MetadataTable, Resolvable, TableAccess, TableId,
    TableInfo, TableInfoRef,
};

// ================================================================================================
// Tables
// ================================================================================================

/// Table entities
pub use crate::metadata::tables::{
    Constant, CustomAttribute, Field, FieldMarshal, FieldRva, Module, TypeDef,
};

/// Builders for fresh entities
pub use crate::metadata::tables::{ConstantBuilder, FieldBuilder, TypeDefBuilder};

/// Attribute flag constants
pub use crate::metadata::tables::{FieldAttributes, TypeAttributes};

/// Decoded constant values
pub use crate::metadata::tables::ConstantValue;

// ================================================================================================
// Signatures
// ================================================================================================

/// Field signatures
pub use crate::metadata::signatures::{SignatureField, TypeSignature};
