//! Fenced Python code extraction

use once_cell::sync::Lazy;
use regex::Regex;

static PYTHON_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```python\s*(.*?)```").expect("python block pattern is valid")
});

/// Return every ```` ```python ```` block of `text`, in order.
///
/// Blocks are trimmed and blocks that are empty after trimming are skipped.
/// An empty result means the model produced no runnable code.
pub fn extract_code_blocks(text: &str) -> Vec<String> {
    PYTHON_BLOCK
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|block| !block.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_blocks_yields_empty_list() {
        assert!(extract_code_blocks("The optimal plan is to build 3 plants.").is_empty());
        assert!(extract_code_blocks("```rust\nfn main() {}\n```").is_empty());
        assert!(extract_code_blocks("").is_empty());
    }

    #[test]
    fn test_blocks_are_returned_in_order() {
        let text = "First:\n```python\nimport gurobipy as gp\n```\nthen\n```python\nprint('b')\n```";
        assert_eq!(
            extract_code_blocks(text),
            vec!["import gurobipy as gp".to_string(), "print('b')".to_string()]
        );
    }

    #[test]
    fn test_whitespace_only_block_is_skipped() {
        let text = "```python\n   \n```\n```python\nx = 1\n```";
        assert_eq!(extract_code_blocks(text), vec!["x = 1".to_string()]);
    }

    #[test]
    fn test_unterminated_block_is_ignored() {
        assert!(extract_code_blocks("```python\nprint(1)\n").is_empty());
    }

    #[test]
    fn test_block_on_same_line_as_fence() {
        assert_eq!(extract_code_blocks("```python print(2)```"), vec!["print(2)".to_string()]);
    }
}
