use crate::error::Result;
use crate::storage::{DirectoryHandle, EntryKind};
use std::fmt;

/// Snapshot of a folder hierarchy, children in name order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryTree {
    File { name: String },
    Directory { name: String, children: Vec<DirectoryTree> },
}

impl DirectoryTree {
    /// Depth-first walk of `dir` and everything below it.
    pub fn walk<D: DirectoryHandle>(dir: &D) -> Result<Self> {
        let mut children = Vec::new();
        for entry in dir.entries()? {
            let child = match entry.kind {
                EntryKind::File => DirectoryTree::File { name: entry.name },
                EntryKind::Directory => Self::walk(&dir.get_directory(&entry.name, false)?)?,
            };
            children.push(child);
        }
        Ok(DirectoryTree::Directory { name: dir.name().to_string(), children })
    }

    pub fn name(&self) -> &str {
        match self {
            DirectoryTree::File { name } | DirectoryTree::Directory { name, .. } => name,
        }
    }

    pub fn children(&self) -> &[DirectoryTree] {
        match self {
            DirectoryTree::File { .. } => &[],
            DirectoryTree::Directory { children, .. } => children,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, DirectoryTree::Directory { .. })
    }

    pub fn find(&self, name: &str) -> Option<&DirectoryTree> {
        self.children().iter().find(|child| child.name() == name)
    }

    /// Top-level directories that contain a direct `source_data_dir` child.
    pub fn project_names(&self, source_data_dir: &str) -> Vec<&str> {
        self.children()
            .iter()
            .filter(|child| child.find(source_data_dir).is_some_and(DirectoryTree::is_directory))
            .map(DirectoryTree::name)
            .collect()
    }
}

impl fmt::Display for DirectoryTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}/", self.name())?;
        render_children(f, self, "")
    }
}

fn render_children(f: &mut fmt::Formatter<'_>, node: &DirectoryTree, indent: &str) -> fmt::Result {
    let children = node.children();
    for (i, child) in children.iter().enumerate() {
        let last = i + 1 == children.len();
        let branch = if last { "└── " } else { "├── " };
        match child {
            DirectoryTree::File { name } => writeln!(f, "{}{}{}", indent, branch, name)?,
            DirectoryTree::Directory { name, .. } => {
                writeln!(f, "{}{}{}/", indent, branch, name)?;
                let nested = format!("{}{}", indent, if last { "    " } else { "│   " });
                render_children(f, child, &nested)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalDirectory;
    use std::fs;

    fn file(name: &str) -> DirectoryTree {
        DirectoryTree::File { name: name.to_string() }
    }

    fn dir(name: &str, children: Vec<DirectoryTree>) -> DirectoryTree {
        DirectoryTree::Directory { name: name.to_string(), children }
    }

    fn sample() -> DirectoryTree {
        dir(
            "GraphForge",
            vec![
                dir(
                    "Alpha",
                    vec![
                        dir("Notes", vec![dir("Source Data", vec![])]),
                        dir("Source Data", vec![file("a.ttl"), file("quads.nq")]),
                    ],
                ),
                dir("Loose", vec![file("readme.txt")]),
                file("stray.txt"),
            ],
        )
    }

    #[test]
    fn test_walk_local_folder() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("Alpha/Source Data")).unwrap();
        fs::write(root.path().join("Alpha/Source Data/a.ttl"), "").unwrap();
        fs::write(root.path().join("top.txt"), "").unwrap();

        let tree = DirectoryTree::walk(&LocalDirectory::open(root.path()).unwrap()).unwrap();
        assert_eq!(tree.children().len(), 2);
        let alpha = tree.find("Alpha").unwrap();
        assert_eq!(alpha.find("Source Data").unwrap().children(), &[file("a.ttl")]);
        assert_eq!(tree.find("top.txt"), Some(&file("top.txt")));
    }

    #[test]
    fn test_project_names_need_source_data() {
        assert_eq!(sample().project_names("Source Data"), vec!["Alpha"]);
    }

    #[test]
    fn test_render() {
        let text = dir("Root", vec![dir("P", vec![file("x.ttl")]), file("y")]).to_string();
        assert_eq!(text, "Root/\n├── P/\n│   └── x.ttl\n└── y\n");
    }
}
