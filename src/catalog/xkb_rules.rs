//! xkeyboard-config registry parsing (`evdev.xml`, `base.xml`).
//!
//! Only the `layoutList` section is read. Every layout yields its own entry
//! and every variant yields `layout+variant`, the identifier form XKB
//! configuration tools use.

use anyhow::{Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

/// One selectable layout from the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryLayout {
    /// Identifier, `layout` or `layout+variant`
    pub identifier: String,
    /// English description shown to users (e.g. "German (no dead keys)")
    pub description: String,
}

/// Text fields of the `configItem` being read.
#[derive(Default)]
struct ConfigItem {
    name: Option<String>,
    description: Option<String>,
}

/// Parses the layouts and variants of an xkeyboard-config registry.
pub fn parse_registry(xml: &str) -> Result<Vec<RegistryLayout>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut layouts = Vec::new();
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut item = ConfigItem::default();
    let mut current_layout: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = e.local_name().as_ref().to_vec();
                match name.as_slice() {
                    b"layout" => current_layout = None,
                    b"configItem" => item = ConfigItem::default(),
                    _ => {}
                }
                path.push(name);
            }
            Ok(Event::Text(ref t)) if in_layout_list(&path) => {
                let text = t
                    .unescape()
                    .with_context(|| format!("at byte {}", reader.buffer_position()))?
                    .into_owned();
                match parent_and_leaf(&path) {
                    Some((b"configItem", b"name")) => item.name = Some(text),
                    Some((b"configItem", b"description")) => item.description = Some(text),
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) => {
                path.pop();
                if e.local_name().as_ref() == b"configItem" && in_layout_list(&path) {
                    let item = std::mem::take(&mut item);
                    match path.last().map(Vec::as_slice) {
                        Some(b"layout") => {
                            current_layout.clone_from(&item.name);
                            if let (Some(name), Some(description)) = (item.name, item.description) {
                                layouts.push(RegistryLayout {
                                    identifier: name,
                                    description,
                                });
                            }
                        }
                        Some(b"variant") => {
                            if let (Some(layout), Some(name), Some(description)) =
                                (current_layout.as_deref(), item.name, item.description)
                            {
                                layouts.push(RegistryLayout {
                                    identifier: format!("{layout}+{name}"),
                                    description,
                                });
                            }
                        }
                        _ => {}
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                anyhow::bail!(
                    "XKB registry parse error at byte {}: {}",
                    reader.buffer_position(),
                    e
                );
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(layouts)
}

fn in_layout_list(path: &[Vec<u8>]) -> bool {
    path.iter().any(|element| element == b"layoutList")
}

fn parent_and_leaf(path: &[Vec<u8>]) -> Option<(&[u8], &[u8])> {
    match path {
        [.., parent, leaf] => Some((parent.as_slice(), leaf.as_slice())),
        _ => None,
    }
}
