//! INI document model.
//!
//! Keeps every line of the parsed text so that writing an option back to disk
//! preserves comments, blank lines and the order of sections and options.

use log::*;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
enum Line {
    /// Blank line, comment or unparseable text, kept verbatim.
    Raw(String),
    Section(String),
    Entry { key: String, value: String },
}

/// Parsed INI text.
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IniDocument {
    lines: Vec<Line>,
}

impl IniDocument {
    /// Parse INI text. Never fails: lines that are neither section headers,
    /// options, comments nor blank are kept verbatim and reported at warn level.
    ///
    pub fn parse(text: &str) -> Self {
        let mut lines: Vec<Line> = Vec::new();
        let mut in_section = false;
        for (number, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
                lines.push(Line::Raw(line.to_string()));
                continue;
            }

            // indented lines continue the value of the preceding option
            if line.starts_with(char::is_whitespace) {
                if let Some(Line::Entry { value, .. }) = lines.last_mut() {
                    value.push('\n');
                    value.push_str(trimmed);
                    continue;
                }
            }

            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                let name = trimmed[1..trimmed.len() - 1].trim().to_string();
                lines.push(Line::Section(name));
                in_section = true;
                continue;
            }

            match split_option(trimmed) {
                Some((key, value)) if in_section => lines.push(Line::Entry { key, value }),
                Some(_) => {
                    warn!("Ignoring option outside of any section on line {}", number + 1);
                    lines.push(Line::Raw(line.to_string()));
                }
                None => {
                    warn!("Ignoring unparseable config line {}: '{}'", number + 1, trimmed);
                    lines.push(Line::Raw(line.to_string()));
                }
            }
        }
        IniDocument { lines }
    }

    /// Names of all sections in order of first appearance.
    ///
    pub fn sections(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for line in &self.lines {
            if let Line::Section(name) = line {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.lines
            .iter()
            .any(|line| matches!(line, Line::Section(name) if name == section))
    }

    /// Option names of a section in order of first appearance. Empty if the
    /// section does not exist.
    ///
    pub fn options(&self, section: &str) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for (key, _) in self.entries(section) {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    pub fn has_option(&self, section: &str, key: &str) -> bool {
        self.get(section, key).is_some()
    }

    /// Value of an option. Repeated options resolve to the last one.
    ///
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.entries(section)
            .filter(|(entry_key, _)| *entry_key == key)
            .map(|(_, value)| value)
            .last()
    }

    /// Set an option, replacing its last occurrence in place, or appending it
    /// to the last block of the section, or appending a new section.
    ///
    pub fn set(&mut self, section: &str, key: &str, new_value: &str) {
        let mut current = None;
        let mut existing = None;
        let mut section_end = None;
        for (index, line) in self.lines.iter().enumerate() {
            match line {
                Line::Section(name) => current = Some(name.as_str()),
                Line::Entry { key: entry_key, .. } if current == Some(section) => {
                    if entry_key == key {
                        existing = Some(index);
                    }
                    section_end = Some(index + 1);
                }
                _ => {}
            }
            if let Line::Section(name) = line {
                if name == section {
                    section_end = Some(index + 1);
                }
            }
        }

        if let Some(index) = existing {
            if let Some(Line::Entry { value, .. }) = self.lines.get_mut(index) {
                *value = new_value.to_string();
            }
            return;
        }

        let entry = Line::Entry {
            key: key.to_string(),
            value: new_value.to_string(),
        };
        match section_end {
            Some(index) => self.lines.insert(index, entry),
            None => {
                if !matches!(self.lines.last(), None | Some(Line::Raw(_))) {
                    self.lines.push(Line::Raw(String::new()));
                }
                self.lines.push(Line::Section(section.to_string()));
                self.lines.push(entry);
            }
        }
    }

    /// Option key/value pairs of all blocks of a section.
    fn entries<'a>(&'a self, section: &str) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        let section = section.to_string();
        let mut current: Option<&'a str> = None;
        self.lines.iter().filter_map(move |line| match line {
            Line::Section(name) => {
                current = Some(name.as_str());
                None
            }
            Line::Entry { key, value } if current == Some(section.as_str()) => {
                Some((key.as_str(), value.as_str()))
            }
            _ => None,
        })
    }
}

impl fmt::Display for IniDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            match line {
                Line::Raw(text) => writeln!(f, "{}", text)?,
                Line::Section(name) => writeln!(f, "[{}]", name)?,
                Line::Entry { key, value } => {
                    let mut value_lines = value.split('\n');
                    writeln!(f, "{} = {}", key, value_lines.next().unwrap_or_default())?;
                    for continuation in value_lines {
                        writeln!(f, "    {}", continuation)?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Split `key = value` or `key: value` at the first delimiter.
fn split_option(line: &str) -> Option<(String, String)> {
    let index = line.find(|c: char| c == '=' || c == ':')?;
    let key = line[..index].trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), line[index + 1..].trim().to_string()))
}
