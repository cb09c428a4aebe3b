use std::collections::BTreeMap;

/// Local File Header signature ("PK\x03\x04")
pub const SIG_LFH: u32 = 0x04034b50;
/// Data Descriptor signature ("PK\x07\x08")
pub const SIG_DD: u32 = 0x08074b50;
/// Central File Header signature ("PK\x01\x02")
pub const SIG_CFH: u32 = 0x02014b50;
/// End of Central Directory signature ("PK\x05\x06")
pub const SIG_EOCD: u32 = 0x06054b50;
/// ZIP64 End of Central Directory signature ("PK\x06\x06")
pub const SIG_ZIP64_EOCD: u32 = 0x06064b50;
/// ZIP64 EOCD Locator signature ("PK\x06\x07")
pub const SIG_ZIP64_EOCD_LOCATOR: u32 = 0x07064b50;

/// Extra field id of the ZIP64 extended information record
pub const ZIP64_EXTRA_ID: u16 = 0x0001;

/// 32-bit field value meaning "see the ZIP64 extra record instead"
pub const ZIP64_SENTINEL: u32 = 0xFFFFFFFF;
/// 16-bit sentinel used for entry counts in the EOCD
pub const ZIP64_SENTINEL_SHORT: u16 = 0xFFFF;

/// General purpose bit 3: sizes deferred to a trailing data descriptor
pub const FLAG_DATA_DESCRIPTOR: u16 = 0x0008;
/// General purpose bit 11: entry name is UTF-8 encoded
pub const FLAG_UTF8: u16 = 0x0800;

/// Fixed size of the local file header, signature included
pub const LFH_SIZE: usize = 30;
/// Fixed size of the central file header, signature included
pub const CFH_SIZE: usize = 46;
/// Fixed size of the EOCD record, signature included, comment excluded
pub const EOCD_SIZE: usize = 22;
/// Fixed size of the ZIP64 EOCD record without extensible data
pub const ZIP64_EOCD_SIZE: usize = 56;
/// Fixed size of the ZIP64 EOCD locator
pub const ZIP64_EOCD_LOCATOR_SIZE: usize = 20;

/// Returns true if `sig` opens one of the record types of the container
pub fn is_record_signature(sig: u32) -> bool {
    matches!(
        sig,
        SIG_LFH | SIG_DD | SIG_CFH | SIG_EOCD | SIG_ZIP64_EOCD | SIG_ZIP64_EOCD_LOCATOR
    )
}

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionMethod {
    Stored,
    #[default]
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Unknown(v) => *v,
        }
    }
}

/// One archive member's metadata, populated from the central directory
/// and finalized during the local-entry pass.
///
/// The central directory is the source of truth for every field here; the
/// local file header is validated but never copied over these values.
/// `content` is attached only after extraction.
#[derive(Debug, Clone, Default)]
pub struct EntryRecord {
    pub name: String,
    pub compression_method: CompressionMethod,
    pub flags: u16,
    pub crc32: u32,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub local_header_offset: u64,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub internal_attributes: u16,
    pub external_attributes: u32,
    pub extra_field: Vec<u8>,
    pub comment: Vec<u8>,
    /// True when a ZIP64 extra record widened this entry's fields
    pub zip64: bool,
    /// Decompressed bytes, present only after the local-entry pass
    pub content: Option<Vec<u8>>,
}

impl EntryRecord {
    /// Directory entries end with '/'
    pub fn is_directory(&self) -> bool {
        self.name.ends_with('/')
    }

    /// Whether the writer deferred this entry's sizes to a data descriptor
    pub fn has_data_descriptor(&self) -> bool {
        self.flags & FLAG_DATA_DESCRIPTOR != 0
    }

    /// Whether the compressed payload length can be read straight off the
    /// record. Deferred-size writers leave a sentinel (or a zero with bit 3
    /// set) behind, forcing the descriptor search instead.
    pub fn size_known(&self) -> bool {
        if self.compressed_size == ZIP64_SENTINEL as u64 && !self.zip64 {
            return false;
        }
        !(self.compressed_size == 0 && self.has_data_descriptor())
    }

    /// Parse modification date to (year, month, day)
    pub fn mod_date(&self) -> (u16, u8, u8) {
        let day = (self.last_mod_date & 0x1F) as u8;
        let month = ((self.last_mod_date >> 5) & 0x0F) as u8;
        let year = ((self.last_mod_date >> 9) & 0x7F) + 1980;
        (year, month, day)
    }

    /// Parse modification time to (hour, minute, second)
    pub fn mod_time(&self) -> (u8, u8, u8) {
        let second = ((self.last_mod_time & 0x1F) * 2) as u8;
        let minute = ((self.last_mod_time >> 5) & 0x3F) as u8;
        let hour = ((self.last_mod_time >> 11) & 0x1F) as u8;
        (hour, minute, second)
    }
}

/// The archive index: name to entry record, populated exclusively from the
/// central directory. Duplicate names overwrite (last-write-wins).
pub type ArchiveIndex = BTreeMap<String, EntryRecord>;

/// End of Central Directory summary
#[derive(Debug, Clone, Default)]
pub struct EndOfCentralDirectory {
    pub disk_number: u16,
    pub disk_with_cd: u16,
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment: Vec<u8>,
}

impl EndOfCentralDirectory {
    pub fn is_zip64(&self) -> bool {
        self.disk_entries == ZIP64_SENTINEL_SHORT
            || self.total_entries == ZIP64_SENTINEL_SHORT
            || self.cd_size == ZIP64_SENTINEL
            || self.cd_offset == ZIP64_SENTINEL
    }
}

/// ZIP64 End of Central Directory record
#[derive(Debug, Clone, Default)]
pub struct Zip64Eocd {
    pub record_size: u64,
    pub version_made_by: u16,
    pub version_needed: u16,
    pub disk_number: u32,
    pub disk_with_cd: u32,
    pub disk_entries: u64,
    pub total_entries: u64,
    pub cd_size: u64,
    pub cd_offset: u64,
}

/// ZIP64 EOCD Locator record
#[derive(Debug, Clone, Default)]
pub struct Zip64EocdLocator {
    pub disk_with_eocd64: u32,
    pub eocd64_offset: u64,
    pub total_disks: u32,
}

/// Trailing record carrying CRC32/sizes for deferred-size entries
#[derive(Debug, Clone, Copy)]
pub struct DataDescriptor {
    pub crc32: u32,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_method_mapping() {
        assert_eq!(CompressionMethod::from_u16(0), CompressionMethod::Stored);
        assert_eq!(CompressionMethod::from_u16(8), CompressionMethod::Deflate);
        assert_eq!(
            CompressionMethod::from_u16(12),
            CompressionMethod::Unknown(12)
        );
        assert_eq!(CompressionMethod::Unknown(12).as_u16(), 12);
    }

    #[test]
    fn test_dos_datetime_decode() {
        let entry = EntryRecord {
            // 2024-03-15, 13:45:30
            last_mod_date: (44 << 9) | (3 << 5) | 15,
            last_mod_time: (13 << 11) | (45 << 5) | 15,
            ..Default::default()
        };
        assert_eq!(entry.mod_date(), (2024, 3, 15));
        assert_eq!(entry.mod_time(), (13, 45, 30));
    }

    #[test]
    fn test_size_known() {
        let mut entry = EntryRecord {
            compressed_size: 42,
            ..Default::default()
        };
        assert!(entry.size_known());

        entry.compressed_size = ZIP64_SENTINEL as u64;
        assert!(!entry.size_known());
        entry.zip64 = true;
        assert!(entry.size_known());

        entry.zip64 = false;
        entry.compressed_size = 0;
        assert!(entry.size_known());
        entry.flags = FLAG_DATA_DESCRIPTOR;
        assert!(!entry.size_known());
    }

    #[test]
    fn test_eocd_zip64_detection() {
        let mut eocd = EndOfCentralDirectory::default();
        assert!(!eocd.is_zip64());
        eocd.cd_offset = ZIP64_SENTINEL;
        assert!(eocd.is_zip64());
    }
}
