use std::path::{Component, Path, PathBuf};

/// Helpers for turning filesystem paths into tree-facing values.
pub trait PathExt {
    /// The last segment of the path as a display string.
    ///
    /// Roots and paths ending in `..` have no file name; they fall back to the
    /// whole path so a node never ends up with an empty name.
    fn display_name(&self) -> String;

    /// Resolves `.` and `..` components without touching the disk.
    fn lexically_normalized(&self) -> PathBuf;

    /// A normalized rendering meant for log lines and error messages.
    fn best_effort_display(&self) -> String;
}

impl PathExt for Path {
    fn display_name(&self) -> String {
        match self.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => self.display().to_string(),
        }
    }

    fn lexically_normalized(&self) -> PathBuf {
        let mut components: Vec<Component> = Vec::new();

        for component in self.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => match components.last() {
                    Some(Component::Normal(_)) => {
                        components.pop();
                    }
                    // `..` above the root stays at the root
                    Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                    _ => components.push(component),
                },
                _ => components.push(component),
            }
        }

        components.iter().collect()
    }

    fn best_effort_display(&self) -> String {
        self.lexically_normalized().display().to_string()
    }
}

impl PathExt for PathBuf {
    fn display_name(&self) -> String {
        self.as_path().display_name()
    }

    fn lexically_normalized(&self) -> PathBuf {
        self.as_path().lexically_normalized()
    }

    fn best_effort_display(&self) -> String {
        self.as_path().best_effort_display()
    }
}
