//! Boilerplate removal for scraped articles

use crate::config::CleanConfig;
use crate::error::CleanError;
use regex::Regex;
use std::collections::BTreeSet;

const SETEXT_TITLE: &str = r"(?m)^(.+)\n=+\n+";
const ATX_TITLE: &str = r"(?m)^# .+\n+";
const BLANK_RUN: &str = r"\n(\s*\n)+";

/// Strips titles, promotional text and UI residue from raw article Markdown
#[derive(Debug, Clone)]
pub struct BoilerplateCleaner {
    setext_title: Regex,
    atx_title: Regex,
    blank_run: Regex,
    promo: Option<Regex>,
    strip: Vec<Regex>,
    cover_image_marker: String,
    drop_line_markers: Vec<String>,
    stray_chars: Vec<char>,
    author_prefixes: Vec<String>,
    author_separator: String,
    min_content_chars: usize,
}

impl BoilerplateCleaner {
    /// Compile the configured patterns once
    pub fn new(config: &CleanConfig) -> Result<Self, CleanError> {
        let promo = if config.promo_phrases.is_empty() {
            None
        } else {
            let alternation = config
                .promo_phrases
                .iter()
                .map(|phrase| regex::escape(phrase))
                .collect::<Vec<_>>()
                .join("|");
            Some(compile(&alternation)?)
        };

        let strip = config
            .strip_patterns
            .iter()
            .map(|pattern| compile(pattern))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            setext_title: compile(SETEXT_TITLE)?,
            atx_title: compile(ATX_TITLE)?,
            blank_run: compile(BLANK_RUN)?,
            promo,
            strip,
            cover_image_marker: config.cover_image_marker.clone(),
            drop_line_markers: config.drop_line_markers.clone(),
            stray_chars: config.stray_chars.chars().collect(),
            author_prefixes: config.author_keys.iter().map(|k| format!("{k}：")).collect(),
            author_separator: config.author_separator.clone(),
            min_content_chars: config.min_content_chars,
        })
    }

    /// Clean a raw article
    pub fn clean(&self, raw: &str) -> String {
        // The scraped title is re-added from the file name later
        let text = self.setext_title.replacen(raw, 1, "");
        let mut text = self.atx_title.replacen(&text, 1, "").into_owned();

        if !self.cover_image_marker.is_empty() && text.starts_with(&self.cover_image_marker) {
            text = match text.find('\n') {
                Some(pos) => text[pos + 1..].to_string(),
                None => String::new(),
            };
        }

        let mut text = text
            .lines()
            .filter(|line| !self.drop_line_markers.iter().any(|m| line.contains(m.as_str())))
            .collect::<Vec<_>>()
            .join("\n");

        if let Some(promo) = &self.promo {
            text = promo.replace_all(&text, "").into_owned();
        }
        for pattern in &self.strip {
            text = pattern.replace_all(&text, "").into_owned();
        }

        text.retain(|c| !self.stray_chars.contains(&c));

        let collapsed = self.blank_run.replace_all(&text, "\n");
        collapsed.trim().to_string()
    }

    /// Names listed on author lines such as `撰稿人：张三、李四`, sorted and unique
    pub fn extract_authors(&self, raw: &str) -> Vec<String> {
        let mut authors = BTreeSet::new();
        for prefix in &self.author_prefixes {
            for line in raw.lines() {
                let Some(rest) = line.strip_prefix(prefix.as_str()) else {
                    continue;
                };
                authors.extend(
                    rest.trim()
                        .split(self.author_separator.as_str())
                        .map(str::trim)
                        .filter(|name| !name.is_empty())
                        .map(str::to_string),
                );
            }
        }
        authors.into_iter().collect()
    }

    /// Whether a cleaned document is long enough to keep
    pub fn is_substantial(&self, cleaned: &str) -> bool {
        cleaned.chars().count() >= self.min_content_chars
    }
}

fn compile(pattern: &str) -> Result<Regex, CleanError> {
    Regex::new(pattern).map_err(|e| CleanError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleaner() -> BoilerplateCleaner {
        BoilerplateCleaner::new(&CleanConfig::default()).unwrap()
    }

    #[test]
    fn test_removes_first_title_only() {
        let raw = "# 文章标题\n\n正文第一段\n# 保留的标题\n正文";
        assert_eq!(cleaner().clean(raw), "正文第一段\n# 保留的标题\n正文");
    }

    #[test]
    fn test_removes_setext_title() {
        let raw = "文章标题\n====\n\n正文";
        assert_eq!(cleaner().clean(raw), "正文");
    }

    #[test]
    fn test_drops_cover_image_line() {
        let raw = "![cover_image](https://example.com/a.jpg) caption\n正文内容";
        assert_eq!(cleaner().clean(raw), "正文内容");
    }

    #[test]
    fn test_drops_read_original_lines() {
        let raw = "第一行\n[阅读原文](javascript:;) 点击\n第二行";
        assert_eq!(cleaner().clean(raw), "第一行\n第二行");
    }

    #[test]
    fn test_removes_promo_and_stray_chars() {
        let raw = "正文▼\n**扫描二维码 下载查看**\n[长宁房管](javascript:void(0);)〓重点**内容**\n修改于2024年";
        assert_eq!(cleaner().clean(raw), "正文\n重点内容\n2024年");
    }

    #[test]
    fn test_strip_patterns() {
        let raw = "开头 ![cover_image](http://img.example.com/x.png) 结尾\n撰稿人: 王五 其他";
        assert_eq!(cleaner().clean(raw), "开头  结尾\n 其他");
    }

    #[test]
    fn test_collapses_blank_lines() {
        let raw = "\n\n一\n\n\n  \n二\n\n";
        assert_eq!(cleaner().clean(raw), "一\n二");
    }

    #[test]
    fn test_extract_authors() {
        let raw = "正文\n撰稿人：张三、李四\n投稿人： 王五 \n信息来源：李四\n作者：不收集";
        assert_eq!(cleaner().extract_authors(raw), vec!["张三", "李四", "王五"]);
    }

    #[test]
    fn test_extract_authors_requires_full_width_colon() {
        assert!(cleaner().extract_authors("撰稿人: 张三").is_empty());
    }

    #[test]
    fn test_is_substantial() {
        let cleaner = cleaner();
        assert!(!cleaner.is_substantial("短"));
        assert!(cleaner.is_substantial(&"字".repeat(100)));
    }

    #[test]
    fn test_invalid_strip_pattern() {
        let config = CleanConfig {
            strip_patterns: vec!["(".to_string()],
            ..CleanConfig::default()
        };
        assert!(matches!(
            BoilerplateCleaner::new(&config),
            Err(CleanError::InvalidPattern { .. })
        ));
    }
}
