//! Main title insertion

use std::path::Path;

/// Prepend `# {title}` unless the document already opens with an H1
pub fn ensure_title(title: &str, text: &str) -> String {
    if text.trim().starts_with("# ") {
        return text.to_string();
    }
    format!("# {title}\n\n{text}")
}

/// Document title taken from a file name, without its extension
pub fn title_from_file_name(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepends_title() {
        assert_eq!(ensure_title("标题", "正文"), "# 标题\n\n正文");
    }

    #[test]
    fn test_existing_title_kept() {
        let text = "\n  # 已有标题\n正文";
        assert_eq!(ensure_title("标题", text), text);
    }

    #[test]
    fn test_subheading_is_not_a_title() {
        assert_eq!(ensure_title("T", "## Sub\nbody"), "# T\n\n## Sub\nbody");
    }

    #[test]
    fn test_title_from_file_name() {
        assert_eq!(
            title_from_file_name(Path::new("data/2024 政策解读.md")),
            Some("2024 政策解读".to_string())
        );
        assert_eq!(title_from_file_name(Path::new("/")), None);
    }
}
