//! The markdown dialect produced by the generator: `#` headings, `-`
//! bullets, plain paragraphs and pipe tables.

/// Deepest heading level with its own styling; deeper headings render at this level.
pub const MAX_HEADING_LEVEL: u8 = 3;

/// Header, separator and at least one data row.
const MIN_TABLE_LINES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, text: String },
    Bullet(String),
    Paragraph(String),
    Table(TableBlock),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableBlock {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableBlock {
    pub fn column_count(&self) -> usize {
        self.header.len()
    }
}

/// A line is a table line iff its trimmed form starts and ends with `|`.
pub fn is_table_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with('|') && trimmed.ends_with('|')
}

/// Parse generated text into blocks, in source order.
///
/// Malformed tables never fail the parse: runs shorter than three lines
/// and rows whose cell count differs from the header are dropped.
pub fn parse_markdown(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut table_lines: Vec<&str> = Vec::new();

    for line in lines(text) {
        let stripped = line.trim();

        if stripped.is_empty() {
            flush_table(&mut table_lines, &mut blocks);
            continue;
        }

        if is_table_line(stripped) {
            table_lines.push(stripped);
            continue;
        }

        flush_table(&mut table_lines, &mut blocks);
        blocks.push(parse_line(stripped));
    }

    flush_table(&mut table_lines, &mut blocks);
    blocks
}

/// Line breaks as Python's `str.splitlines` sees them: `\r\n`, `\n`, a
/// bare `\r`, and the rarer vertical-space and separator characters.
fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().flat_map(|line| line.split(is_line_break))
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

fn parse_line(stripped: &str) -> Block {
    if stripped.starts_with('#') {
        let hashes = stripped.chars().take_while(|&c| c == '#').count();
        let level = hashes.min(MAX_HEADING_LEVEL as usize) as u8;
        let text = stripped.trim_start_matches('#').trim().to_string();
        Block::Heading { level, text }
    } else if stripped.starts_with('-') {
        Block::Bullet(stripped.trim_start_matches('-').trim().to_string())
    } else {
        Block::Paragraph(stripped.to_string())
    }
}

fn flush_table(table_lines: &mut Vec<&str>, blocks: &mut Vec<Block>) {
    if table_lines.is_empty() {
        return;
    }
    if let Some(table) = parse_table(table_lines) {
        blocks.push(Block::Table(table));
    }
    table_lines.clear();
}

/// Build a table from a buffered run of table lines.
pub fn parse_table(lines: &[&str]) -> Option<TableBlock> {
    if lines.len() < MIN_TABLE_LINES {
        tracing::debug!(lines = lines.len(), "Dropping table run shorter than three lines");
        return None;
    }

    let header: Vec<String> = split_cells(lines[0])
        .map(|cell| {
            cell.trim_matches(|c: char| c == '*' || c.is_whitespace())
                .to_string()
        })
        .collect();

    if header.is_empty() {
        tracing::debug!("Dropping table with no header cells");
        return None;
    }

    // lines[1] is the separator row; it is never validated
    let mut rows = Vec::new();
    for line in &lines[2..] {
        let row: Vec<String> = split_cells(line).map(str::to_string).collect();
        if row.len() == header.len() {
            rows.push(row);
        } else {
            tracing::debug!(
                expected = header.len(),
                actual = row.len(),
                row = %line,
                "Dropping table row with wrong cell count"
            );
        }
    }

    Some(TableBlock { header, rows })
}

/// Split on `|`, trim, and drop empty cells (including the boundary
/// artifacts either side of the outer pipes).
fn split_cells(line: &str) -> impl Iterator<Item = &str> {
    line.split('|').map(str::trim).filter(|cell| !cell.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn heading(level: u8, text: &str) -> Block {
        Block::Heading {
            level,
            text: text.to_string(),
        }
    }

    fn bullet(text: &str) -> Block {
        Block::Bullet(text.to_string())
    }

    fn paragraph(text: &str) -> Block {
        Block::Paragraph(text.to_string())
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn tables(blocks: &[Block]) -> Vec<&TableBlock> {
        blocks
            .iter()
            .filter_map(|b| match b {
                Block::Table(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn headings_bullets_and_paragraphs() {
        let blocks = parse_markdown("# Title\n\nSome text\n- point one\n- point two\n");

        assert_eq!(
            blocks,
            vec![
                heading(1, "Title"),
                paragraph("Some text"),
                bullet("point one"),
                bullet("point two"),
            ]
        );
    }

    #[test]
    fn simple_table() {
        let blocks = parse_markdown("| A | B |\n|---|---|\n| 1 | 2 |\n");

        assert_eq!(
            blocks,
            vec![Block::Table(TableBlock {
                header: row(&["A", "B"]),
                rows: vec![row(&["1", "2"])],
            })]
        );
    }

    #[test]
    fn malformed_row_dropped_valid_rows_kept() {
        let text = "| A | B |\n|---|---|\n| 1 | 2 |\n| 1 |\n| 3 | 4 |\n| 5 | 6 | 7 |\n";
        let blocks = parse_markdown(text);

        let tables = tables(&blocks);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows, vec![row(&["1", "2"]), row(&["3", "4"])]);
    }

    #[test]
    fn short_table_runs_are_dropped() {
        let text = "| A | B |\n|---|---|\n\nafter\n\n| lonely |\n";
        let blocks = parse_markdown(text);

        assert_eq!(blocks, vec![paragraph("after")]);
    }

    #[test]
    fn heading_level_counts_hashes_and_clamps_at_three() {
        let blocks = parse_markdown("# One\n## Two\n### Three\n#### Four\n###### Six");

        assert_eq!(
            blocks,
            vec![
                heading(1, "One"),
                heading(2, "Two"),
                heading(3, "Three"),
                heading(3, "Four"),
                heading(3, "Six"),
            ]
        );
    }

    #[test]
    fn no_table_lines_means_no_table_blocks() {
        let text = "Intro | with a pipe\n- bullet | pipe\n## Section\ntext|";
        let blocks = parse_markdown(text);

        assert!(tables(&blocks).is_empty());
        assert_eq!(blocks.len(), 4);
    }

    #[test]
    fn non_table_line_flushes_table_before_itself() {
        let text = "| H1 | H2 |\n| -- | -- |\n| a | b |\nClosing paragraph\n# Next";
        let blocks = parse_markdown(text);

        assert_eq!(
            blocks,
            vec![
                Block::Table(TableBlock {
                    header: row(&["H1", "H2"]),
                    rows: vec![row(&["a", "b"])],
                }),
                paragraph("Closing paragraph"),
                heading(1, "Next"),
            ]
        );
    }

    #[test]
    fn trailing_table_is_flushed_at_end_of_input() {
        let blocks = parse_markdown("Intro\n| X |\n|---|\n| y |");

        assert_eq!(blocks[0], paragraph("Intro"));
        assert_eq!(tables(&blocks).len(), 1);
    }

    #[test]
    fn blank_line_splits_adjacent_tables() {
        let text = "| A |\n|---|\n| 1 |\n\n| B |\n|---|\n| 2 |";
        let blocks = parse_markdown(text);

        let tables = tables(&blocks);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].header, row(&["A"]));
        assert_eq!(tables[1].header, row(&["B"]));
    }

    #[test]
    fn header_cells_lose_bold_markers_and_separator_is_not_validated() {
        let text = "| **Field** | *Type* |\n| not a separator | at all |\n| MATNR | CHAR18 |";
        let blocks = parse_markdown(text);

        assert_eq!(
            blocks,
            vec![Block::Table(TableBlock {
                header: row(&["Field", "Type"]),
                rows: vec![row(&["MATNR", "CHAR18"])],
            })]
        );
    }

    #[test]
    fn header_cells_lose_interleaved_stars_and_spaces() {
        let blocks = parse_markdown("| ** * x | * y * |\n|---|---|\n| 1 | 2 |");

        assert_eq!(tables(&blocks)[0].header, row(&["x", "y"]));
    }

    #[test]
    fn bare_carriage_returns_break_lines() {
        let blocks = parse_markdown("# Title\rSome text\r- bullet");

        assert_eq!(
            blocks,
            vec![heading(1, "Title"), paragraph("Some text"), bullet("bullet")]
        );
    }

    #[test]
    fn crlf_does_not_split_a_table() {
        let blocks = parse_markdown("| A | B |\r\n|---|---|\r\n| 1 | 2 |\r\n");

        assert_eq!(
            blocks,
            vec![Block::Table(TableBlock {
                header: row(&["A", "B"]),
                rows: vec![row(&["1", "2"])],
            })]
        );
    }

    #[test]
    fn bullet_and_heading_markers_are_stripped_with_whitespace() {
        let blocks = parse_markdown("   -   indented bullet  \n##   Spaced heading ##");

        assert_eq!(
            blocks,
            vec![bullet("indented bullet"), heading(2, "Spaced heading ##")]
        );
    }

    #[test]
    fn indented_table_lines_are_recognised() {
        assert!(is_table_line("   | a | b |   "));
        assert!(!is_table_line("| a | b"));
        assert!(!is_table_line("a | b |"));
    }

    #[test]
    fn block_order_is_source_order() {
        let text = "# H\npara\n| A |\n|---|\n| 1 |\n- b\n## H2";
        let kinds: Vec<&str> = parse_markdown(text)
            .iter()
            .map(|b| match b {
                Block::Heading { .. } => "heading",
                Block::Bullet(_) => "bullet",
                Block::Paragraph(_) => "paragraph",
                Block::Table(_) => "table",
            })
            .collect();

        assert_eq!(kinds, vec!["heading", "paragraph", "table", "bullet", "heading"]);
    }
}
