//! Parsing of `sfdisk` partition listings.

use backingfiles_shared::errors::{BackingfilesError, BackingfilesResult};

use super::tools::PartitionGeometry;

/// Columns requested from `sfdisk -l`, in the order [`parse_partition_listing`] expects.
pub const LISTING_COLUMNS: &str = "Size,Sectors,Start";

/// Parse the output of `sfdisk -l -q --bytes -o Size,Sectors,Start <file>`.
///
/// The last non-empty line describes the partition; header lines are ignored.
pub fn parse_partition_listing(listing: &str) -> BackingfilesResult<PartitionGeometry> {
    let line = listing
        .lines()
        .map(str::trim)
        .rfind(|l| !l.is_empty())
        .ok_or_else(|| BackingfilesError::Storage("sfdisk listed no partitions".to_string()))?;

    let fields = line
        .split_whitespace()
        .map(|f| f.parse::<u64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            BackingfilesError::Storage(format!("Unexpected sfdisk listing '{}': {}", line, e))
        })?;

    match fields.as_slice() {
        [total_bytes, total_sectors, start_sector] => Ok(PartitionGeometry {
            total_bytes: *total_bytes,
            total_sectors: *total_sectors,
            start_sector: *start_sector,
        }),
        _ => Err(BackingfilesError::Storage(format!(
            "Expected {} columns in sfdisk listing, got '{}'",
            LISTING_COLUMNS, line
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing_with_header() {
        let listing = "      Size Sectors Start\n1072693248 2095104  2048\n";
        let geometry = parse_partition_listing(listing).unwrap();
        assert_eq!(
            geometry,
            PartitionGeometry {
                total_bytes: 1_072_693_248,
                total_sectors: 2_095_104,
                start_sector: 2048,
            }
        );
        assert_eq!(geometry.offset_bytes().unwrap(), 1_048_576);
    }

    #[test]
    fn test_parse_listing_trailing_blank_lines() {
        let listing = "Size Sectors Start\n512000 1000 1\n\n  \n";
        let geometry = parse_partition_listing(listing).unwrap();
        assert_eq!(geometry.start_sector, 1);
        assert_eq!(geometry.sector_size().unwrap(), 512);
    }

    #[test]
    fn test_parse_empty_listing_fails() {
        assert!(parse_partition_listing("").is_err());
        assert!(parse_partition_listing("\n\n").is_err());
    }

    #[test]
    fn test_parse_header_only_fails() {
        let err = parse_partition_listing("Size Sectors Start\n").unwrap_err();
        assert!(err.to_string().contains("Unexpected sfdisk listing"));
    }

    #[test]
    fn test_parse_wrong_column_count_fails() {
        let err = parse_partition_listing("2048\n").unwrap_err();
        assert!(err.to_string().contains("Size,Sectors,Start"));
    }
}
