//! Plain paragraph splitting

/// Split on blank-line boundaries (`\n\n`), trimming pieces and dropping empty ones
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_paragraphs() {
        let text = "  first para\nstill first\n\n\n\nsecond\n\n   \n\nthird  ";
        assert_eq!(
            split_paragraphs(text),
            vec!["first para\nstill first", "second", "third"]
        );
    }

    #[test]
    fn test_empty_text() {
        assert!(split_paragraphs("").is_empty());
        assert!(split_paragraphs("\n\n\n\n").is_empty());
    }
}
