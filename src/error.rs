//! Error types for Solidl

use thiserror::Error;

/// Schema (IDL) loading and validation errors
///
/// Raised while building a [`Registry`](crate::registry::Registry); a schema that
/// fails any of these checks is never usable for encoding or decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The schema document is not valid JSON or does not match the IDL shape
    #[error("Invalid IDL document: {0}")]
    Parse(String),

    /// A `defined` reference names a type that does not exist
    ///
    /// **Triggered by:** `{"defined": "Missing"}` with no `types[]` entry named `Missing`
    #[error("Unresolved type reference `{name}` (referenced from {referenced_from})")]
    UnresolvedType {
        /// Referenced type name
        name: String,
        /// Where the reference appears (type, field, instruction argument, ...)
        referenced_from: String,
    },

    /// A type contains itself without going through `vec`, `option` or `array`
    ///
    /// **Example:** `struct Node { next: Node }`
    #[error("Type `{name}` is directly self-referential (cycle: {cycle})")]
    SelfReference {
        /// Type at which the cycle was detected
        name: String,
        /// The cycle, rendered as `A -> B -> A`
        cycle: String,
    },

    /// Two definitions of the same kind share a name
    #[error("Duplicate {kind} name `{name}`")]
    DuplicateName {
        /// Definition kind (type, account, instruction, event, constant)
        kind: &'static str,
        /// Offending name
        name: String,
    },

    /// Two definitions of the same kind share a discriminator
    #[error("Duplicate {kind} discriminator {discriminator} for `{first}` and `{second}`")]
    DuplicateDiscriminator {
        /// Definition kind (account, instruction, event)
        kind: &'static str,
        /// Hex-encoded discriminator
        discriminator: String,
        /// First definition carrying it
        first: String,
        /// Second definition carrying it
        second: String,
    },

    /// One discriminator is a strict prefix of another of the same kind
    #[error("{kind} discriminator {prefix} of `{short}` is a prefix of `{long}`'s discriminator")]
    AmbiguousDiscriminator {
        /// Definition kind (account, instruction, event)
        kind: &'static str,
        /// Hex-encoded shorter discriminator
        prefix: String,
        /// Definition with the shorter discriminator
        short: String,
        /// Definition whose discriminator starts with it
        long: String,
    },

    /// An instruction's flattened account tree repeats a slot name
    #[error("Instruction `{instruction}` declares account slot `{slot}` more than once")]
    DuplicateSlot {
        /// Instruction name
        instruction: String,
        /// Repeated slot name
        slot: String,
    },

    /// A seed names a constant that `constants[]` does not declare
    #[error("Unresolved constant `{name}` (referenced from {referenced_from})")]
    UnresolvedConstant {
        /// Constant name
        name: String,
        /// Where the reference appears
        referenced_from: String,
    },

    /// An account constraint refers to something the instruction does not declare
    #[error("Invalid account `{slot}` in instruction `{instruction}`: {reason}")]
    InvalidAccountSpec {
        /// Instruction name
        instruction: String,
        /// Slot name
        slot: String,
        /// What is wrong
        reason: String,
    },

    /// A discriminator is empty
    #[error("Empty discriminator for {kind} `{name}`")]
    EmptyDiscriminator {
        /// Definition kind
        kind: &'static str,
        /// Definition name
        name: String,
    },

    /// A primitive type name is not recognised
    #[error("Unknown primitive type `{0}`")]
    UnknownPrimitive(String),

    /// A base58 address in the schema could not be parsed
    #[error("Invalid address `{value}` in {context}")]
    InvalidAddress {
        /// Raw address text
        value: String,
        /// Where it appears
        context: String,
    },

    /// A constant's value does not parse as its declared type
    #[error("Invalid value for constant `{name}`: {reason}")]
    InvalidConstant {
        /// Constant name
        name: String,
        /// Why parsing failed
        reason: String,
    },
}

/// Encoding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The value's shape does not match the declared type
    #[error("Type mismatch at `{path}`: expected {expected}, got {found}")]
    TypeMismatch {
        /// Expected type (IDL notation)
        expected: String,
        /// Value kind supplied
        found: String,
        /// Field path inside the value
        path: String,
    },

    /// An integer does not fit the declared width
    #[error("Integer overflow at `{path}`: {value} does not fit in {ty}")]
    IntegerOverflow {
        /// Target primitive
        ty: String,
        /// Supplied value
        value: String,
        /// Field path inside the value
        path: String,
    },

    /// A string/vec length exceeds what the declared prefix width can hold
    #[error("Length {len} at `{path}` exceeds the {width}-byte length prefix")]
    LengthOverflow {
        /// Number of elements or bytes
        len: usize,
        /// Prefix width in bytes
        width: usize,
        /// Field path inside the value
        path: String,
    },

    /// A fixed array received the wrong number of elements
    #[error("Array length mismatch at `{path}`: expected {expected}, got {found}")]
    ArrayLength {
        /// Declared length
        expected: usize,
        /// Supplied length
        found: usize,
        /// Field path inside the value
        path: String,
    },

    /// A struct value lacks a declared field
    #[error("Missing field `{field}` at `{path}`")]
    MissingField {
        /// Missing field name
        field: String,
        /// Field path of the enclosing struct
        path: String,
    },

    /// An enum value names a variant the type does not declare
    #[error("Unknown variant `{variant}` for enum `{ty}`")]
    UnknownVariant {
        /// Enum type name
        ty: String,
        /// Supplied variant name
        variant: String,
    },

    /// An enum variant index does not fit the declared tag width
    #[error("Variant index {index} of `{ty}` does not fit the {width}-byte tag")]
    TagOverflow {
        /// Enum type name
        ty: String,
        /// Variant index
        index: usize,
        /// Tag width in bytes
        width: usize,
    },
}

/// Decoding errors
///
/// All variants are terminal for the decode call that produced them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Fewer bytes remain than the layout requires
    #[error("Buffer too short decoding `{ty}` at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    BufferTooShort {
        /// Type being decoded
        ty: String,
        /// Byte offset of the failed read
        offset: usize,
        /// Bytes required
        needed: usize,
        /// Bytes available
        remaining: usize,
    },

    /// The leading discriminator does not match the expected one, or matches nothing
    #[error("Unknown discriminator {found} for {kind}{}", expected_suffix(.expected))]
    UnknownDiscriminator {
        /// What was being decoded (`account Counter`, `instruction`, `event`)
        kind: String,
        /// Hex of the bytes found
        found: String,
        /// Hex of the expected discriminator, when a specific type was requested
        expected: Option<String>,
    },

    /// An enum tag is out of range for the type's variants
    #[error("Invalid enum tag {index} for `{ty}` at offset {offset}")]
    InvalidEnumTag {
        /// Variant index read
        index: u64,
        /// Enum type name
        ty: String,
        /// Byte offset of the tag
        offset: usize,
    },

    /// An `option`/`coption` presence tag is neither 0 nor 1
    #[error("Invalid option tag {tag} for `{ty}` at offset {offset}")]
    InvalidOptionTag {
        /// Tag value read
        tag: u32,
        /// Type being decoded
        ty: String,
        /// Byte offset of the tag
        offset: usize,
    },

    /// A `bool` byte is neither 0 nor 1
    #[error("Invalid bool byte {byte} at offset {offset}")]
    InvalidBool {
        /// Byte read
        byte: u8,
        /// Byte offset
        offset: usize,
    },

    /// A string payload is not valid UTF-8
    #[error("Invalid UTF-8 string for `{ty}` at offset {offset}")]
    InvalidUtf8 {
        /// Type being decoded
        ty: String,
        /// Byte offset of the string payload
        offset: usize,
    },

    /// Recursive types nested deeper than the decoder allows
    #[error("Nesting deeper than {limit} levels decoding `{ty}` at offset {offset}")]
    NestingTooDeep {
        /// Type being decoded
        ty: String,
        /// Byte offset
        offset: usize,
        /// Depth limit
        limit: usize,
    },

    /// `decode_exact` found unread bytes after the value
    #[error("{remaining} trailing bytes after decoding `{ty}`")]
    TrailingBytes {
        /// Type decoded
        ty: String,
        /// Unread byte count
        remaining: usize,
    },
}

fn expected_suffix(expected: &Option<String>) -> String {
    match expected {
        Some(e) => format!(" (expected {})", e),
        None => String::new(),
    }
}

/// Address derivation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DerivationError {
    /// Every bump from 255 down to 0 produced an on-curve point
    #[error("No valid bump seed found: all 256 candidates are on the curve")]
    NoValidBump,

    /// A single seed exceeds the per-seed length limit
    #[error("Seed {index} is {len} bytes, exceeding the maximum of {max}")]
    MaxSeedLength {
        /// Seed position
        index: usize,
        /// Seed length
        len: usize,
        /// Limit
        max: usize,
    },

    /// Too many seeds were supplied
    #[error("{count} seeds supplied, maximum is {max}")]
    TooManySeeds {
        /// Seeds supplied (bump included)
        count: usize,
        /// Limit
        max: usize,
    },

    /// `create_program_address` produced a point on the curve
    #[error("Derived address lies on the ed25519 curve")]
    OnCurve,
}

/// Account resolution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The instruction name does not exist in the schema
    #[error("Unknown instruction `{0}`")]
    UnknownInstruction(String),

    /// Slots remained unresolved after the pass limit or once no pass made progress
    #[error("Reached maximum depth for account resolution. Unresolved accounts: {}", format_slots(.slots))]
    Unresolved {
        /// Unresolved slot names in declaration order
        slots: Vec<String>,
    },

    /// A seed's dependency is known but cannot be turned into seed bytes
    #[error("Cannot build seed for account `{slot}`: {reason}")]
    Seed {
        /// Slot being derived
        slot: String,
        /// Why the seed failed
        reason: String,
    },

    /// Derivation for a slot failed
    #[error("Derivation failed for account `{slot}`: {source}")]
    Derivation {
        /// Slot being derived
        slot: String,
        /// Underlying failure
        #[source]
        source: DerivationError,
    },
}

fn format_slots(slots: &[String]) -> String {
    slots
        .iter()
        .map(|s| format!("`{}`", s))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Client facade errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The transport collaborator reported a failure
    #[error("Transport error: {message}")]
    Transport {
        /// Error message
        message: String,
    },

    /// The program reported a custom error code
    #[error("Program error {code}: {name}{}", .msg.as_deref().map(|m| format!(" - {}", m)).unwrap_or_default())]
    Program {
        /// Numeric error code
        code: u32,
        /// Error name from the schema
        name: String,
        /// Error message from the schema
        msg: Option<String>,
    },

    /// Instruction arguments were not supplied as a struct of named values
    #[error("Invalid arguments for instruction `{instruction}`: {reason}")]
    InvalidArguments {
        /// Instruction name
        instruction: String,
        /// Reason for invalidity
        reason: String,
    },

    /// The schema carries no program address and none was supplied
    #[error("Program address is unknown")]
    MissingProgramAddress,
}

/// Solidl errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Schema loading/validation failed
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Encoding failed
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Decoding failed
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Address derivation failed
    #[error(transparent)]
    Derivation(#[from] DerivationError),

    /// Account resolution failed
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Client facade failure
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Lookup of a named definition failed
    #[error("Unknown {kind} `{name}`")]
    UnknownName {
        /// Definition kind (type, account, instruction, event)
        kind: &'static str,
        /// Requested name
        name: String,
    },
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Fatal error that cannot be recovered from
    Fatal,
    /// Recoverable error that may be retried
    Recoverable,
    /// Warning that doesn't prevent execution
    Warning,
}

impl Error {
    /// Create an unknown-name error
    pub fn unknown(kind: &'static str, name: impl Into<String>) -> Self {
        Error::UnknownName {
            kind,
            name: name.into(),
        }
    }

    /// Classify error severity
    ///
    /// Resolution failures are recoverable because the caller can supply the
    /// missing accounts explicitly and retry the whole call.
    pub fn classify(&self) -> ErrorSeverity {
        match self {
            Error::Schema(_) => ErrorSeverity::Fatal,
            Error::Decode(_) => ErrorSeverity::Fatal,
            Error::Derivation(_) => ErrorSeverity::Fatal,
            Error::Encode(_) => ErrorSeverity::Fatal,

            Error::Resolve(ResolveError::Unresolved { .. }) => ErrorSeverity::Recoverable,
            Error::Resolve(_) => ErrorSeverity::Fatal,
            Error::Client(ClientError::Transport { .. }) => ErrorSeverity::Recoverable,
            Error::Client(_) => ErrorSeverity::Fatal,

            Error::UnknownName { .. } => ErrorSeverity::Warning,
        }
    }
}

/// Result type for Solidl operations
pub type Result<T> = std::result::Result<T, Error>;
