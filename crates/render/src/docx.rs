use std::io::Cursor;
use std::path::{Path, PathBuf};

use docx_rs::{
    AbstractNumbering, Docx, IndentLevel, Level, LevelJc, LevelText, NumberFormat, Numbering,
    NumberingId, Paragraph, Run, SpecialIndentType, Start, Table, TableCell, TableRow,
};

use crate::error::RenderError;
use crate::markdown::{Block, TableBlock, parse_markdown};

const BULLET_NUMBERING_ID: usize = 2;

/// Printable width of an A4/Letter page with default margins, in twips.
const TABLE_WIDTH_TWIPS: usize = 9000;

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub size_pt: usize,
    pub bold: bool,
    pub underline: bool,
    pub color: Option<String>,
}

impl TextStyle {
    fn plain(size_pt: usize) -> Self {
        Self {
            size_pt,
            bold: false,
            underline: false,
            color: None,
        }
    }

    fn run(&self, text: &str) -> Run {
        // docx sizes are half-points
        let mut run = Run::new().add_text(text).size(self.size_pt * 2);
        if self.bold {
            run = run.bold();
        }
        if self.underline {
            run = run.underline("single");
        }
        if let Some(color) = &self.color {
            run = run.color(color.as_str());
        }
        run
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderStyle {
    pub heading1: TextStyle,
    pub heading2: TextStyle,
    pub heading3: TextStyle,
    pub body: TextStyle,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            heading1: TextStyle {
                size_pt: 14,
                bold: true,
                underline: true,
                color: Some("0000FF".to_string()),
            },
            heading2: TextStyle {
                bold: true,
                ..TextStyle::plain(12)
            },
            heading3: TextStyle {
                bold: true,
                ..TextStyle::plain(11)
            },
            body: TextStyle::plain(11),
        }
    }
}

impl RenderStyle {
    pub fn heading(&self, level: u8) -> &TextStyle {
        match level {
            1 => &self.heading1,
            2 => &self.heading2,
            _ => &self.heading3,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DocxRenderer {
    style: RenderStyle,
}

impl DocxRenderer {
    pub fn new(style: RenderStyle) -> Self {
        Self { style }
    }

    /// Assemble the document in memory.
    pub fn build(&self, blocks: &[Block]) -> Docx {
        let mut docx = Docx::new()
            .add_abstract_numbering(
                AbstractNumbering::new(BULLET_NUMBERING_ID).add_level(
                    Level::new(
                        0,
                        Start::new(1),
                        NumberFormat::new("bullet"),
                        LevelText::new("•"),
                        LevelJc::new("left"),
                    )
                    .indent(Some(720), Some(SpecialIndentType::Hanging(360)), None, None),
                ),
            )
            .add_numbering(Numbering::new(BULLET_NUMBERING_ID, BULLET_NUMBERING_ID));

        for block in blocks {
            docx = match block {
                Block::Heading { level, text } => {
                    docx.add_paragraph(Paragraph::new().add_run(self.style.heading(*level).run(text)))
                }
                Block::Bullet(text) => docx.add_paragraph(
                    Paragraph::new()
                        .add_run(self.style.body.run(text))
                        .numbering(NumberingId::new(BULLET_NUMBERING_ID), IndentLevel::new(0)),
                ),
                Block::Paragraph(text) => {
                    docx.add_paragraph(Paragraph::new().add_run(self.style.body.run(text)))
                }
                Block::Table(table) => docx.add_table(self.table(table)),
            };
        }

        docx
    }

    fn table(&self, table: &TableBlock) -> Table {
        let cell = |text: &str| {
            TableCell::new().add_paragraph(Paragraph::new().add_run(self.style.body.run(text)))
        };

        let mut rows = Vec::with_capacity(table.rows.len() + 1);
        rows.push(TableRow::new(table.header.iter().map(|h| cell(h.as_str())).collect()));
        for row in &table.rows {
            rows.push(TableRow::new(row.iter().map(|c| cell(c.as_str())).collect()));
        }

        // Table::new carries single-line borders on every edge (a plain grid)
        let column_width = TABLE_WIDTH_TWIPS / table.column_count().max(1);
        Table::new(rows).set_grid(vec![column_width; table.column_count()])
    }

    /// Package the blocks as a .docx file at `output_path`, creating
    /// missing parent directories.
    pub fn write(&self, blocks: &[Block], output_path: &Path) -> Result<PathBuf, RenderError> {
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| RenderError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let mut buffer = Cursor::new(Vec::new());
        self.build(blocks)
            .build()
            .pack(&mut buffer)
            .map_err(|e| RenderError::Package(e.to_string()))?;

        std::fs::write(output_path, buffer.into_inner()).map_err(|source| RenderError::Io {
            path: output_path.to_path_buf(),
            source,
        })?;

        Ok(output_path.to_path_buf())
    }

    /// Parse `markdown_text` and write it to `output_path`.
    pub fn render(&self, markdown_text: &str, output_path: &Path) -> Result<PathBuf, RenderError> {
        let blocks = parse_markdown(markdown_text);
        let path = self.write(&blocks, output_path)?;

        tracing::info!(
            path = %path.display(),
            blocks = blocks.len(),
            tables = blocks.iter().filter(|b| matches!(b, Block::Table(_))).count(),
            "Document rendered"
        );

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document_xml(markdown: &str) -> String {
        let blocks = parse_markdown(markdown);
        let xml = DocxRenderer::default().build(&blocks).build();
        String::from_utf8(xml.document).unwrap()
    }

    #[test]
    fn rendered_text_keeps_block_order() {
        let markdown = "# Title\n\nSome text\n- point one\n| A | B |\n|---|---|\n| 1 | 2 |\n## Closing\n- point two";
        let xml = document_xml(markdown);

        let order = ["Title", "Some text", "point one", ">A<", ">B<", ">1<", ">2<", "Closing", "point two"];
        let positions: Vec<usize> = order
            .iter()
            .map(|needle| xml.find(needle).unwrap_or_else(|| panic!("{needle} missing")))
            .collect();

        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
    }

    #[test]
    fn bullets_reference_the_bullet_numbering() {
        let xml = document_xml("- only bullet");
        assert!(xml.contains("w:numId w:val=\"2\""));
    }

    #[test]
    fn dropped_rows_do_not_reach_the_document() {
        let xml = document_xml("| A | B |\n|---|---|\n| keep | me |\n| dropme |\n");
        assert!(xml.contains("keep"));
        assert!(!xml.contains("dropme"));
        assert_eq!(xml.matches("<w:tbl>").count(), 1);
    }

    #[test]
    fn heading_styles_follow_level() {
        let style = RenderStyle::default();
        assert!(style.heading(1).underline);
        assert_eq!(style.heading(1).color.as_deref(), Some("0000FF"));
        assert_eq!(style.heading(2).size_pt, 12);
        assert_eq!(style.heading(3), style.heading(7));
        assert!(!style.body.bold);
    }

    #[test]
    fn custom_style_reaches_body_runs() {
        let style = RenderStyle {
            body: TextStyle {
                color: Some("FF0000".to_string()),
                ..TextStyle::plain(10)
            },
            ..RenderStyle::default()
        };
        let blocks = parse_markdown("plain body");

        let custom = DocxRenderer::new(style).build(&blocks).build();
        let custom = String::from_utf8(custom.document).unwrap();
        assert!(custom.contains("FF0000"));
        assert!(custom.contains("\"20\""));

        assert!(!document_xml("plain body").contains("FF0000"));
    }

    #[test]
    fn write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/spec.docx");

        let written = DocxRenderer::default()
            .write(&parse_markdown("# Title\nbody"), &path)
            .unwrap();

        assert_eq!(written, path);
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn unwritable_target_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should go
        let path = dir.path().join("taken");
        std::fs::create_dir(&path).unwrap();

        let err = DocxRenderer::default()
            .write(&parse_markdown("text"), &path)
            .unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
    }
}
