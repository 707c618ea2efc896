//! Paragraph style table (`word/styles.xml`).

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::package::attr_value;
use crate::error::Result;

/// Deepest `basedOn` chain followed before giving up.
const MAX_STYLE_DEPTH: usize = 16;

/// Outline level 9 means "body text" in WordprocessingML.
const BODY_OUTLINE_LEVEL: u8 = 9;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct StyleDef {
    name: Option<String>,
    based_on: Option<String>,
    outline_level: Option<u8>,
}

/// Style id lookup used to recognise heading paragraphs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleMap {
    styles: HashMap<String, StyleDef>,
}

impl StyleMap {
    /// Create an empty style map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `styles.xml`.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut styles = HashMap::new();
        let mut current: Option<(String, StyleDef)> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    if e.local_name().as_ref() == b"style" {
                        current = attr_value(&e, b"styleId")?.map(|id| (id, StyleDef::default()));
                    } else if let Some((_, def)) = current.as_mut() {
                        apply_style_element(&e, def)?;
                    }
                }
                Event::Empty(e) => {
                    if let Some((_, def)) = current.as_mut() {
                        apply_style_element(&e, def)?;
                    }
                }
                Event::End(e) if e.local_name().as_ref() == b"style" => {
                    if let Some((id, def)) = current.take() {
                        styles.insert(id, def);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        log::debug!("StyleMap: parsed {} styles", styles.len());
        Ok(Self { styles })
    }

    /// Number of known styles.
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Check if no styles are known.
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Heading level (1-9) of a paragraph style, following `basedOn`.
    ///
    /// Unknown style ids fall back to the conventional `Heading1` naming.
    pub fn heading_level(&self, style_id: &str) -> Option<u8> {
        let mut id = style_id;
        for _ in 0..MAX_STYLE_DEPTH {
            let Some(def) = self.styles.get(id) else {
                return heading_level_from_name(id);
            };
            if let Some(level) = def.name.as_deref().and_then(heading_level_from_name) {
                return Some(level);
            }
            if let Some(level) = def.outline_level {
                return (level < BODY_OUTLINE_LEVEL).then(|| level + 1);
            }
            match def.based_on.as_deref() {
                Some(parent) => id = parent,
                None => return None,
            }
        }
        None
    }
}

fn apply_style_element(e: &BytesStart<'_>, def: &mut StyleDef) -> Result<()> {
    match e.local_name().as_ref() {
        b"name" => def.name = attr_value(e, b"val")?,
        b"basedOn" => def.based_on = attr_value(e, b"val")?,
        b"outlineLvl" => {
            def.outline_level = attr_value(e, b"val")?.and_then(|v| v.trim().parse().ok());
        }
        _ => {}
    }
    Ok(())
}

/// `heading 2`, `Heading2`, `HEADING 2` → 2.
pub(crate) fn heading_level_from_name(name: &str) -> Option<u8> {
    let compact: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    let digits = compact.strip_prefix("heading")?;
    match digits.parse::<u8>() {
        Ok(level @ 1..=9) => Some(level),
        _ => None,
    }
}
