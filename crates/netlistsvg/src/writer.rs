use std::fmt::{self, Write};

/// Line writer for skin markup. Nested elements are indented by two spaces.
pub struct MarkupWriter<W: Write> {
    writer: W,
    indent_level: usize,
    indent_str: String,
}

impl<W: Write> MarkupWriter<W> {
    pub fn new(writer: W) -> Self {
        MarkupWriter {
            writer,
            indent_level: 0,
            indent_str: "  ".to_string(),
        }
    }

    pub fn write_line(&mut self, line: &str) -> fmt::Result {
        if !line.trim().is_empty() {
            self.write_indentation()?;
        }
        writeln!(self.writer, "{}", line)
    }

    pub fn start_element(&mut self, open_tag: &str) -> fmt::Result {
        self.write_line(open_tag)?;
        self.indent_level += 1;
        Ok(())
    }

    pub fn end_element(&mut self, close_tag: &str) -> fmt::Result {
        self.indent_level = self.indent_level.saturating_sub(1);
        self.write_line(close_tag)
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_indentation(&mut self) -> fmt::Result {
        for _ in 0..self.indent_level {
            write!(self.writer, "{}", self.indent_str)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nests_elements() {
        let mut writer = MarkupWriter::new(String::new());
        writer.start_element("<g>").unwrap();
        writer.write_line("<path/>").unwrap();
        writer.write_line("").unwrap();
        writer.end_element("</g>").unwrap();
        assert_eq!(writer.into_inner(), "<g>\n  <path/>\n\n</g>\n");
    }
}
