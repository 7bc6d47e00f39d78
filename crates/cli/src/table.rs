//! Plain-text tables: `" | "` between columns, `"-+-"` in the separator row, every column
//! padded to its widest cell.

fn width(cell: &str) -> usize {
    cell.chars().count()
}

fn pad(cell: &str, width_: usize) -> String {
    let mut out = cell.to_owned();
    out.extend(std::iter::repeat(' ').take(width_.saturating_sub(width(cell))));
    out
}

pub fn render(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| width(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(width(cell));
        }
    }

    let format_row = |cells: Vec<&str>| -> String {
        widths
            .iter()
            .enumerate()
            .map(|(i, w)| pad(cells.get(i).copied().unwrap_or_default(), *w))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format_row(headers.to_vec()));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in rows {
        lines.push(format_row(row.iter().map(String::as_str).collect()));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_padded_to_widest_cell() {
        let out = render(
            &["Name", "UUID"],
            &[
                vec!["Outpatient Clinic".into(), "u1".into()],
                vec!["Ward".into(), "u-2222".into()],
            ],
        );
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Name              | UUID  ");
        assert_eq!(lines[1], "------------------+-------");
        assert_eq!(lines[2], "Outpatient Clinic | u1    ");
        assert_eq!(lines[3], "Ward              | u-2222");
    }

    #[test]
    fn test_headers_only() {
        assert_eq!(render(&["A", "BB"], &[]), "A | BB\n--+---");
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let out = render(&["Имя"], &[vec!["Иван".into()]]);
        assert_eq!(out.lines().next(), Some("Имя "));
    }
}
