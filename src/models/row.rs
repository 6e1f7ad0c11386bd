// Cell helpers shared by the row <-> model translations

pub fn cell(row: &[String], index: usize) -> String {
    row.get(index).map(|c| c.trim().to_string()).unwrap_or_default()
}

pub fn optional_cell(row: &[String], index: usize) -> Option<String> {
    Some(cell(row, index)).filter(|c| !c.is_empty())
}

/// Sheets may hand back TRUE/FALSE, true/false or 1/0 depending on who
/// edited the cell; anything else counts as false.
pub fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}

pub fn format_bool(value: bool) -> String {
    if value { "TRUE" } else { "FALSE" }.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_cells() {
        assert!(parse_bool("TRUE"));
        assert!(parse_bool(" true "));
        assert!(parse_bool("1"));
        assert!(!parse_bool("FALSE"));
        assert!(!parse_bool(""));
        assert_eq!(format_bool(true), "TRUE");
    }

    #[test]
    fn test_optional_cells() {
        let row = vec!["a".to_string(), "  ".to_string()];
        assert_eq!(optional_cell(&row, 0), Some("a".to_string()));
        assert_eq!(optional_cell(&row, 1), None);
        assert_eq!(optional_cell(&row, 7), None);
    }
}
