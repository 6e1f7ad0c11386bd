use std::borrow::Cow;

/// Renders a header and rows as CSV text, quoting fields that need it.
pub fn to_csv(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut csv_content = String::new();

    push_record(&mut csv_content, header.iter().map(|h| Cow::Borrowed(*h)));
    for row in rows {
        push_record(&mut csv_content, row.iter().map(|value| neutralize_formula(value)));
    }

    csv_content
}

/// Cells opened by spreadsheet apps run as formulas when they start with
/// one of these, so user-supplied values get a leading quote.
fn neutralize_formula(value: &str) -> Cow<'_, str> {
    if value.starts_with(&['=', '+', '-', '@'][..]) {
        Cow::Owned(format!("'{}", value))
    } else {
        Cow::Borrowed(value)
    }
}

fn push_record<'a>(out: &mut String, fields: impl Iterator<Item = Cow<'a, str>>) {
    for (i, value) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
            let escaped = value.replace('"', "\"\"");
            out.push_str(&format!("\"{}\"", escaped));
        } else {
            out.push_str(&value);
        }
    }
    out.push_str("\r\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quotes_only_when_needed() {
        let rows = vec![
            vec!["Jane".to_string(), "Cairo, EG".to_string()],
            vec!["Said \"Sam\"".to_string(), "Giza".to_string()],
        ];
        let csv = to_csv(&["name", "city"], &rows);
        assert_eq!(csv, "name,city\r\nJane,\"Cairo, EG\"\r\n\"Said \"\"Sam\"\"\",Giza\r\n");
    }

    #[test]
    fn test_formula_cells_are_neutralized() {
        let rows = vec![vec![
            "=HYPERLINK(\"http://x\")".to_string(),
            "+201001234567".to_string(),
            "-1".to_string(),
            "@SUM(A1)".to_string(),
            "a=b".to_string(),
        ]];
        let csv = to_csv(&["a", "b", "c", "d", "e"], &rows);
        assert_eq!(
            csv,
            "a,b,c,d,e\r\n\"'=HYPERLINK(\"\"http://x\"\")\",'+201001234567,'-1,'@SUM(A1),a=b\r\n"
        );
    }
}
