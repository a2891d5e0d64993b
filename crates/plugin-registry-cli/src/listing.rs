//! Renders the creators held by a registry.

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;

use plugin_registry::{CreatorRecord, LibraryHandle};
use serde::Serialize;

/// One creator as shown to the operator.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub(crate) struct CreatorSummary {
    pub(crate) name: String,
    pub(crate) version: String,
    pub(crate) namespace: String,
    pub(crate) library: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) fields: Vec<FieldSummary>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub(crate) struct FieldSummary {
    pub(crate) name: String,
    pub(crate) kind: &'static str,
}

pub(crate) fn summarise(
    records: &[CreatorRecord],
    libraries: &HashMap<LibraryHandle, PathBuf>,
    with_fields: bool,
) -> Vec<CreatorSummary> {
    records
        .iter()
        .map(|record| {
            let identity = record.identity();
            let fields = if with_fields {
                record
                    .creator()
                    .field_names()
                    .iter()
                    .map(|spec| FieldSummary {
                        name: spec.name().to_owned(),
                        kind: spec.kind().as_str(),
                    })
                    .collect()
            } else {
                Vec::new()
            };
            CreatorSummary {
                name: identity.name().to_owned(),
                version: identity.version().to_owned(),
                namespace: identity.namespace().to_owned(),
                library: record
                    .library()
                    .and_then(|handle| libraries.get(&handle))
                    .map(|path| path.display().to_string()),
                fields,
            }
        })
        .collect()
}

pub(crate) fn render_text(listing: &[CreatorSummary], out: &mut impl Write) -> std::io::Result<()> {
    if listing.is_empty() {
        return writeln!(out, "no plugin creators registered");
    }
    let name_width = column_width(listing, |summary| &summary.name);
    let version_width = column_width(listing, |summary| &summary.version);
    let namespace_width = column_width(listing, |summary| &summary.namespace).max(1);

    for summary in listing {
        let namespace = if summary.namespace.is_empty() {
            "-"
        } else {
            summary.namespace.as_str()
        };
        let line = format!(
            "{name:<name_width$}  {version:<version_width$}  {namespace:<namespace_width$}  {library}",
            name = summary.name,
            version = summary.version,
            library = summary.library.as_deref().unwrap_or("-"),
        );
        writeln!(out, "{}", line.trim_end())?;
        for field in &summary.fields {
            writeln!(out, "    {}: {}", field.name, field.kind)?;
        }
    }
    Ok(())
}

fn column_width(listing: &[CreatorSummary], column: impl Fn(&CreatorSummary) -> &String) -> usize {
    listing
        .iter()
        .map(|summary| column(summary).chars().count())
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: &str, namespace: &str, library: Option<&str>) -> CreatorSummary {
        CreatorSummary {
            name: name.to_owned(),
            version: "1".to_owned(),
            namespace: namespace.to_owned(),
            library: library.map(ToOwned::to_owned),
            fields: Vec::new(),
        }
    }

    fn rendered(listing: &[CreatorSummary]) -> String {
        let mut out = Vec::new();
        render_text(listing, &mut out).expect("render");
        String::from_utf8(out).expect("utf-8")
    }

    #[test]
    fn empty_listing_says_so() {
        assert_eq!(rendered(&[]), "no plugin creators registered\n");
    }

    #[test]
    fn columns_are_aligned() {
        let listing = vec![
            summary("Relu", "act", Some("/p/libact.so")),
            summary("LayerNorm", "", None),
        ];
        assert_eq!(
            rendered(&listing),
            "Relu       1  act  /p/libact.so\nLayerNorm  1  -    -\n"
        );
    }

    #[test]
    fn fields_are_indented_under_their_creator() {
        let mut relu = summary("Relu", "act", None);
        relu.fields.push(FieldSummary {
            name: "alpha".to_owned(),
            kind: "float32",
        });
        assert_eq!(rendered(&[relu]), "Relu  1  act  -\n    alpha: float32\n");
    }
}
