use colored::{ColoredString, Colorize};

use crate::site::{ItemKind, SiteItem};

/// Draws a site tree with box-drawing guides.
///
/// Folders get a trailing slash, selected nodes are underlined and a node being
/// renamed shows its edit buffer next to the committed name. Whether escape
/// codes are emitted follows `colored`'s global override.
pub struct TreePrinter;

impl TreePrinter {
    pub fn render(root: &SiteItem) -> String {
        let mut out = format!("{}\n", Self::label(root));
        Self::render_children(root, "", &mut out);
        out
    }

    fn render_children(item: &SiteItem, prefix: &str, out: &mut String) {
        let count = item.children().len();
        for (index, child) in item.children().iter().enumerate() {
            let (branch, indent) = if index + 1 == count {
                ("└── ", "    ")
            } else {
                ("├── ", "│   ")
            };
            out.push_str(&format!("{prefix}{branch}{}\n", Self::label(child)));
            Self::render_children(child, &format!("{prefix}{indent}"), out);
        }
    }

    fn label(item: &SiteItem) -> String {
        let mut name: ColoredString = match item.kind() {
            ItemKind::Folder => format!("{}/", item.name()).bold().blue(),
            ItemKind::File => item.name().normal(),
        };
        if item.is_selected() {
            name = name.underline();
        }

        match item.rename_state().edit_buffer() {
            Some(buffer) => format!("{} {}", name, format!("[renaming: {}]", buffer).yellow()),
            None => name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::fake::FakeFileSystem;
    use std::sync::Arc;

    #[test]
    fn renders_nested_tree() {
        colored::control::set_override(false);
        let file_system = Arc::new(FakeFileSystem::new());
        let mut root = SiteItem::folder(file_system.clone(), "/site");
        let mut docs = SiteItem::folder(file_system.clone(), "/site/docs");
        docs.insert_child(SiteItem::file(file_system.clone(), "/site/docs/intro.md"))
            .unwrap();
        docs.insert_child(SiteItem::file(file_system.clone(), "/site/docs/faq.md"))
            .unwrap();
        root.insert_child(docs).unwrap();
        let mut index = SiteItem::file(file_system, "/site/index.md");
        index.begin_rename().unwrap();
        index.edit_name("home.md").unwrap();
        root.insert_child(index).unwrap();

        let rendered = TreePrinter::render(&root);

        assert_eq!(
            rendered,
            "site/\n\
             ├── docs/\n\
             │   ├── intro.md\n\
             │   └── faq.md\n\
             └── index.md [renaming: home.md]\n"
        );
    }
}
