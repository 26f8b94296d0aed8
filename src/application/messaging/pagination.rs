//! Splitting long output to the platform's per-message size limit

/// Split `text` into chunks of at most `limit` bytes, preferring to break on
/// line boundaries. Oversized single lines are hard-split on char boundaries.
pub fn paginate(text: &str, limit: usize) -> Vec<String> {
    if limit == 0 || text.len() <= limit {
        if text.is_empty() {
            return Vec::new();
        }
        return vec![text.to_string()];
    }

    let mut pages = Vec::new();
    let mut current = String::new();

    for line in text.split_inclusive('\n') {
        if !current.is_empty() && current.len() + line.len() > limit {
            pages.push(std::mem::take(&mut current));
        }
        if line.len() > limit {
            let mut rest = line;
            while rest.len() > limit {
                let mut cut = limit;
                while !rest.is_char_boundary(cut) {
                    cut -= 1;
                }
                pages.push(rest[..cut].to_string());
                rest = &rest[cut..];
            }
            current.push_str(rest);
        } else {
            current.push_str(line);
        }
    }

    if !current.is_empty() {
        pages.push(current);
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_page() {
        assert_eq!(paginate("hello", 100), vec!["hello"]);
    }

    #[test]
    fn empty_text_has_no_pages() {
        assert!(paginate("", 100).is_empty());
    }

    #[test]
    fn breaks_on_line_boundaries() {
        let text = "aaa\nbbb\nccc\n";
        let pages = paginate(text, 8);
        assert_eq!(pages, vec!["aaa\nbbb\n", "ccc\n"]);
        assert_eq!(pages.concat(), text);
    }

    #[test]
    fn hard_splits_oversized_lines() {
        let text = "x".repeat(25);
        let pages = paginate(&text, 10);
        assert_eq!(pages.len(), 3);
        assert!(pages.iter().all(|p| p.len() <= 10));
        assert_eq!(pages.concat(), text);
    }

    #[test]
    fn respects_char_boundaries() {
        let text = "é".repeat(10);
        let pages = paginate(&text, 5);
        assert!(pages.iter().all(|p| p.len() <= 5));
        assert_eq!(pages.concat(), text);
    }
}
