//! Fixed offsets, signatures and page types of the SAS7BDAT layout.

/// File signature.
pub const MAGIC: [u8; 32] = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xc2, 0xea, 0x81,
    0x60, 0xb3, 0x14, 0x11, 0xcf, 0xbd, 0x92, 0x08, 0x00, 0x09, 0xc7, 0x31, 0x8c, 0x18, 0x1f,
    0x10, 0x11,
];

// Header offsets. Timestamps and sizes shift by the alignment at ALIGN_1.
pub const ALIGN_2_OFFSET: usize = 32;
pub const ALIGN_1_OFFSET: usize = 35;
pub const ALIGN_MARKER: u8 = b'3';
pub const ENDIANNESS_OFFSET: usize = 37;
pub const PLATFORM_OFFSET: usize = 39;
pub const ENCODING_OFFSET: usize = 70;
pub const SAS_FILE_OFFSET: usize = 84;
pub const DATASET_NAME_OFFSET: usize = 92;
pub const DATASET_NAME_LEN: usize = 64;
pub const FILE_TYPE_OFFSET: usize = 156;
pub const CREATED_OFFSET: usize = 164;
pub const MODIFIED_OFFSET: usize = 172;
pub const HEADER_SIZE_OFFSET: usize = 196;
pub const PAGE_SIZE_OFFSET: usize = 200;
pub const PAGE_COUNT_OFFSET: usize = 204;
pub const MIN_HEADER_LEN: usize = 288;

// Encoding codes at ENCODING_OFFSET.
pub const ENCODING_UTF8: u8 = 20;
pub const ENCODING_LATIN1: u8 = 29;
pub const ENCODING_WLATIN1: u8 = 62;

// Page types.
pub const PAGE_META: u16 = 0x0000;
pub const PAGE_DATA: u16 = 0x0100;
pub const PAGE_MIX: u16 = 0x0200;
pub const PAGE_MIX_ALT: u16 = 0x0280;
pub const PAGE_AMD: u16 = 0x0400;
pub const PAGE_METC: u16 = 0x4000;
pub const PAGE_COMP: u16 = 0x9000;

/// Offset of the subheader pointers from the page bit offset.
pub const SUBHEADER_POINTERS_OFFSET: usize = 8;

// Subheader signatures (low 32 bits).
pub const SIG_ROW_SIZE: u32 = 0xF7F7_F7F7;
pub const SIG_COLUMN_SIZE: u32 = 0xF6F6_F6F6;
pub const SIG_COUNTS: u32 = 0xFFFF_FC00;
pub const SIG_COLUMN_TEXT: u32 = 0xFFFF_FFFD;
pub const SIG_COLUMN_NAME: u32 = 0xFFFF_FFFF;
pub const SIG_COLUMN_ATTRIBUTES: u32 = 0xFFFF_FFFC;
pub const SIG_FORMAT_LABEL: u32 = 0xFFFF_FBFE;
pub const SIG_COLUMN_LIST: u32 = 0xFFFF_FFFE;

// Subheader pointer compression flags.
pub const POINTER_TRUNCATED: u8 = 1;
pub const POINTER_COMPRESSED: u8 = 4;

// Row size subheader field positions, in multiples of the integer width.
pub const ROW_LENGTH_MULTIPLIER: usize = 5;
pub const ROW_COUNT_MULTIPLIER: usize = 6;
pub const MIX_PAGE_ROW_COUNT_MULTIPLIER: usize = 15;

// Format and label subheader offsets, relative to 3 integer widths.
pub const FORMAT_INDEX_OFFSET: usize = 22;
pub const FORMAT_START_OFFSET: usize = 24;
pub const FORMAT_LENGTH_OFFSET: usize = 26;
pub const LABEL_INDEX_OFFSET: usize = 28;
pub const LABEL_START_OFFSET: usize = 30;
pub const LABEL_LENGTH_OFFSET: usize = 32;

/// Markers in the first column text block of compressed files.
pub const COMPRESSION_MARKERS: [&[u8]; 2] = [b"SASYZCRL", b"SASYZCR2"];
