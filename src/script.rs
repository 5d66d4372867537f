//! Line-oriented session scripts.
//!
//! Drives a [`Session`] the way an interactive front end would: files are
//! loaded, previewed and edited, and once a merge is showing every edit
//! updates it. One command per line; `#` starts a comment.
//!
//! ```text
//! load q1.xlsx q2.xlsx
//! merge
//! edit 1 B2 20
//! show merged
//! export totals.xlsx
//! ```

use anyhow::{Context, Result, anyhow, bail};
use gridmerge_core::storage::render_markdown;
use gridmerge_core::{CellRef, Config, GeminiSummarizer, Session, SourceId};
use std::io::{BufRead, Write};
use std::path::PathBuf;

pub struct ScriptRunner {
    session: Session,
    config: Config,
    summarizer: Option<GeminiSummarizer>,
}

/// Split off the first whitespace-separated token.
fn next_token(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(char::is_whitespace) {
        Some(end) => (&input[..end], &input[end..]),
        None => (input, ""),
    }
}

/// Edit values are the rest of the line. Surrounding double quotes are
/// stripped so empty or space-padded text can be written.
fn edit_value(rest: &str) -> &str {
    let trimmed = rest.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    }
}

impl ScriptRunner {
    pub fn new(config: Config) -> Self {
        ScriptRunner {
            session: Session::new(),
            config,
            summarizer: None,
        }
    }

    #[cfg(test)]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run every line of `input`. Returns the number of commands that failed.
    pub fn run<R: BufRead, W: Write, E: Write>(
        &mut self,
        input: R,
        out: &mut W,
        err: &mut E,
    ) -> Result<usize> {
        let mut failures = 0;
        for (idx, line) in input.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Err(e) = self.execute(line, out) {
                failures += 1;
                writeln!(err, "line {}: {:#}", idx + 1, e)?;
            }
        }
        Ok(failures)
    }

    /// Execute a single command line.
    pub fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> Result<()> {
        let (command, rest) = next_token(line);
        match command {
            "load" => self.load(rest, out),
            "list" => self.list(out),
            "remove" => {
                let id = self.file_id(rest.trim())?;
                self.session.remove(id);
                writeln!(out, "Removed file {}", rest.trim())?;
                Ok(())
            }
            "edit" => self.edit(rest, out),
            "merge" => {
                let merged = self.session.merge()?;
                let rows = merged.len();
                writeln!(
                    out,
                    "Merged {} files into {} rows",
                    self.session.ready_count(),
                    rows
                )?;
                Ok(())
            }
            "show" => self.show(rest.trim(), out),
            "export" => {
                let path = PathBuf::from(rest.trim());
                if path.as_os_str().is_empty() {
                    bail!("Usage: export <path>");
                }
                self.session
                    .export_to(&path, &self.config.export.sheet_name)?;
                writeln!(out, "Exported to {}", path.display())?;
                Ok(())
            }
            "summarize" => self.summarize(out),
            other => bail!("Unknown command: {}", other),
        }
    }

    /// Resolve a 1-based display index.
    fn file_id(&self, token: &str) -> Result<SourceId> {
        let n: usize = token
            .parse()
            .with_context(|| format!("Expected a file number, got '{}'", token))?;
        n.checked_sub(1)
            .and_then(|idx| self.session.id_at(idx))
            .ok_or_else(|| anyhow!("No file number {}", n))
    }

    fn load<W: Write>(&mut self, rest: &str, out: &mut W) -> Result<()> {
        let paths: Vec<PathBuf> = rest.split_whitespace().map(PathBuf::from).collect();
        if paths.is_empty() {
            bail!("Usage: load <path>...");
        }
        for id in self.session.load_paths(&paths) {
            if let Some(file) = self.session.file(id) {
                match file.error() {
                    Some(e) => writeln!(out, "{}: error ({})", file.name, e)?,
                    None => writeln!(out, "{}: {}", file.name, file.status())?,
                }
            }
        }
        Ok(())
    }

    fn list<W: Write>(&self, out: &mut W) -> Result<()> {
        for (idx, file) in self.session.files().iter().enumerate() {
            writeln!(
                out,
                "{}. {} ({} bytes) {}",
                idx + 1,
                file.name,
                file.size,
                file.status()
            )?;
        }
        Ok(())
    }

    fn edit<W: Write>(&mut self, rest: &str, out: &mut W) -> Result<()> {
        let (file_token, rest) = next_token(rest);
        let (cell_token, rest) = next_token(rest);
        if file_token.is_empty() || cell_token.is_empty() {
            bail!("Usage: edit <file> <cell> <value>");
        }
        let id = self.file_id(file_token)?;
        let cell = CellRef::from_str(cell_token)
            .ok_or_else(|| anyhow!("Invalid cell reference: {}", cell_token))?;

        let edited = self.session.apply_edit(id, cell, edit_value(rest))?;
        let value = edited
            .get(cell.row, cell.col)
            .map(|v| v.to_string())
            .unwrap_or_default();
        writeln!(out, "{}!{} = {}", file_token, cell, value)?;

        if let Some(merged) = self.session.merged() {
            let value = merged
                .get(cell.row, cell.col)
                .map(|v| v.to_string())
                .unwrap_or_default();
            writeln!(out, "merged!{} = {}", cell, value)?;
        }
        Ok(())
    }

    fn show<W: Write>(&self, target: &str, out: &mut W) -> Result<()> {
        if target == "merged" {
            let merged = self
                .session
                .merged()
                .ok_or_else(|| anyhow!("Nothing has been merged yet"))?;
            write!(out, "{}", render_markdown(merged, "Merged result"))?;
            return Ok(());
        }

        let id = self.file_id(target)?;
        let file = self
            .session
            .file(id)
            .ok_or_else(|| anyhow!("No file number {}", target))?;
        let grid = file
            .grid()
            .ok_or_else(|| anyhow!("{} is {}", file.name, file.status()))?;
        write!(out, "{}", render_markdown(grid, &file.name))?;
        Ok(())
    }

    fn summarize<W: Write>(&mut self, out: &mut W) -> Result<()> {
        if self.summarizer.is_none() {
            self.summarizer = Some(GeminiSummarizer::new(self.config.summary.clone())?);
        }
        let Some(summarizer) = self.summarizer.as_ref() else {
            return Ok(());
        };
        let text = self
            .session
            .summarize(summarizer)
            .ok_or_else(|| anyhow!("Nothing has been merged yet"))?;
        writeln!(out, "{}", text)?;
        Ok(())
    }
}
