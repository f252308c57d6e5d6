//! CSV decoding for bulk product import.
//!
//! The header row is required and matched case-insensitively. Import is
//! all-or-nothing: if any row fails validation the whole file is rejected
//! with one message per problem so the vendor can fix and re-upload.

use csv::{ReaderBuilder, StringRecord, Trim};

use yardstock_core::{ProductStatus, RawRow, MAX_DRAFTS_PER_BATCH};

use crate::error::ImportError;
use crate::normalize::check_row;

const REQUIRED_COLUMNS: &[&str] = &["name", "pricePerYard", "quantity"];
const IMAGE_COLUMNS: &[&str] = &["image1", "image2", "image3", "image4"];

/// Column positions resolved from the header row.
#[derive(Debug, Default)]
struct ColumnMap {
    name: Option<usize>,
    price_per_yard: Option<usize>,
    quantity: Option<usize>,
    material_type: Option<usize>,
    pattern: Option<usize>,
    description: Option<usize>,
    status: Option<usize>,
    images: Vec<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<Self, ImportError> {
        let position = |column: &str| -> Option<usize> {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(column))
        };

        for column in REQUIRED_COLUMNS {
            if position(*column).is_none() {
                return Err(ImportError::MissingColumn((*column).to_string()));
            }
        }

        Ok(Self {
            name: position("name"),
            price_per_yard: position("pricePerYard"),
            quantity: position("quantity"),
            material_type: position("materialType"),
            pattern: position("pattern"),
            description: position("description"),
            status: position("status"),
            images: IMAGE_COLUMNS.iter().filter_map(|c| position(*c)).collect(),
        })
    }

    fn row(&self, record: &StringRecord) -> RawRow {
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .map(str::to_owned)
                .unwrap_or_default()
        };

        RawRow {
            name: cell(self.name),
            price_per_yard: cell(self.price_per_yard),
            quantity: cell(self.quantity),
            material_type: cell(self.material_type),
            pattern: cell(self.pattern),
            description: cell(self.description),
            status: ProductStatus::from_cell(&cell(self.status)),
            image_refs: self
                .images
                .iter()
                .filter_map(|i| record.get(*i))
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }
}

/// Parses CSV text into raw product rows, validating every row.
///
/// Rows whose cells are all blank are skipped. Error messages reference
/// spreadsheet row numbers, counting the header as row 1.
///
/// # Errors
///
/// - [`ImportError::MissingHeader`] / [`ImportError::MissingColumn`] for a bad header.
/// - [`ImportError::NoRows`] when the file holds no product rows.
/// - [`ImportError::TooManyRows`] above the batch limit.
/// - [`ImportError::InvalidRows`] listing every row-level validation failure.
/// - [`ImportError::Csv`] for malformed CSV.
pub fn parse_products_csv(contents: &str) -> Result<Vec<RawRow>, ImportError> {
    let contents = contents.trim_start_matches('\u{feff}');
    if contents.trim().is_empty() {
        return Err(ImportError::MissingHeader);
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(contents.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.iter().all(str::is_empty) {
        return Err(ImportError::MissingHeader);
    }
    let columns = ColumnMap::from_headers(&headers)?;

    let mut rows = Vec::new();
    let mut problems = Vec::new();

    for record in reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        // Blank lines are dropped by the reader, so count from its position.
        let row_number = record.position().map_or(0, csv::Position::line);
        let row = columns.row(&record);
        for message in check_row(&row) {
            problems.push(format!("Row {row_number}: {message}"));
        }
        rows.push(row);
    }

    if !problems.is_empty() {
        tracing::warn!(
            rows = rows.len(),
            problems = problems.len(),
            "CSV import rejected"
        );
        return Err(ImportError::InvalidRows(problems));
    }

    if rows.is_empty() {
        return Err(ImportError::NoRows);
    }

    if rows.len() > MAX_DRAFTS_PER_BATCH {
        return Err(ImportError::TooManyRows {
            count: rows.len(),
            max: MAX_DRAFTS_PER_BATCH,
        });
    }

    tracing::info!(rows = rows.len(), "CSV import parsed");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "name,pricePerYard,quantity,materialType,pattern,description,status,image1,image2,image3,image4";

    #[test]
    fn parses_full_row() {
        let csv = format!(
            "{HEADER}\nCotton,\"₦1,500.00\",\"1,000\",Cotton,Striped,Soft cotton,unavailable,cotton.jpg,,cotton-2.jpg,\n"
        );
        let rows = parse_products_csv(&csv).unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.name, "Cotton");
        assert_eq!(row.price_per_yard, "₦1,500.00");
        assert_eq!(row.quantity, "1,000");
        assert_eq!(row.pattern, "Striped");
        assert_eq!(row.status, ProductStatus::Unavailable);
        assert_eq!(row.image_refs, vec!["cotton.jpg", "cotton-2.jpg"]);
    }

    #[test]
    fn header_matching_is_case_insensitive_and_order_free() {
        let csv = "Quantity, NAME ,PRICEPERYARD,Image1\n5,Silk,20,silk.jpg\n";
        let rows = parse_products_csv(csv).unwrap();
        assert_eq!(rows[0].name, "Silk");
        assert_eq!(rows[0].quantity, "5");
        assert_eq!(rows[0].price_per_yard, "20");
        assert_eq!(rows[0].image_refs, vec!["silk.jpg"]);
    }

    #[test]
    fn optional_columns_default() {
        let csv = "name,pricePerYard,quantity\nLinen,30,2\n";
        let rows = parse_products_csv(csv).unwrap();
        assert_eq!(rows[0].status, ProductStatus::Available);
        assert!(rows[0].image_refs.is_empty());
        assert!(rows[0].pattern.is_empty());
    }

    #[test]
    fn status_false_is_unavailable() {
        let csv = "name,pricePerYard,quantity,status\nLinen,30,2,FALSE\nLace,30,2,\n";
        let rows = parse_products_csv(csv).unwrap();
        assert_eq!(rows[0].status, ProductStatus::Unavailable);
        assert_eq!(rows[1].status, ProductStatus::Available);
    }

    #[test]
    fn missing_required_column() {
        let csv = "name,quantity\nLinen,2\n";
        let err = parse_products_csv(csv).unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn(ref c) if c == "pricePerYard"));
    }

    #[test]
    fn empty_file_has_no_header() {
        assert!(matches!(
            parse_products_csv("  \n"),
            Err(ImportError::MissingHeader)
        ));
    }

    #[test]
    fn header_only_has_no_rows() {
        assert!(matches!(
            parse_products_csv("name,pricePerYard,quantity\n"),
            Err(ImportError::NoRows)
        ));
    }

    #[test]
    fn blank_rows_are_skipped() {
        let csv = "name,pricePerYard,quantity\n,,\nLinen,30,2\n";
        let rows = parse_products_csv(csv).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn any_invalid_row_aborts_whole_import() {
        let csv = "name,pricePerYard,quantity\nLinen,30,2\n,abc,0\nLace,12,x\n";
        let err = parse_products_csv(csv).unwrap_err();
        let ImportError::InvalidRows(messages) = err else {
            panic!("expected InvalidRows, got {err:?}");
        };
        assert_eq!(
            messages,
            vec![
                "Row 3: Name is required",
                "Row 3: Price: Price must be a valid positive number",
                "Row 3: Quantity: Quantity must be a valid positive whole number",
                "Row 4: Quantity: Quantity must be a valid positive whole number",
            ]
        );
    }

    #[test]
    fn row_numbers_account_for_blank_lines() {
        let csv = "name,pricePerYard,quantity\n\nLinen,abc,2\n,,\nLace,12,x\n";
        let err = parse_products_csv(csv).unwrap_err();
        let ImportError::InvalidRows(messages) = err else {
            panic!("expected InvalidRows, got {err:?}");
        };
        assert_eq!(
            messages,
            vec![
                "Row 3: Price: Price must be a valid positive number",
                "Row 5: Quantity: Quantity must be a valid positive whole number",
            ]
        );
    }

    #[test]
    fn strips_byte_order_mark() {
        let csv = "\u{feff}name,pricePerYard,quantity\nLinen,30,2\n";
        assert_eq!(parse_products_csv(csv).unwrap().len(), 1);
    }

    #[test]
    fn rejects_more_than_batch_limit() {
        let mut csv = String::from("name,pricePerYard,quantity\n");
        for i in 0..=MAX_DRAFTS_PER_BATCH {
            csv.push_str(&format!("Fabric {i},10,1\n"));
        }
        assert!(matches!(
            parse_products_csv(&csv),
            Err(ImportError::TooManyRows { count, max }) if count == 101 && max == 100
        ));
    }
}
