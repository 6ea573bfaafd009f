//! Tokenizer - uses jieba-rs so CJK titles are searchable / 分词器
//!
//! Supports / 支持：
//! - Chinese word segmentation (jieba) / 中文分词
//! - English word segmentation (space-separated + lowercase) / 英文分词

use jieba_rs::Jieba;
use once_cell::sync::Lazy;

/// Global jieba tokenizer instance / 全局 jieba 分词器实例
static JIEBA: Lazy<Jieba> = Lazy::new(Jieba::new);

/// Tokenize text into lowercase words / 对文本进行分词
///
/// Punctuation-only fragments are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    JIEBA
        .cut_for_search(text, true)
        .into_iter()
        .map(|word| word.trim().to_lowercase())
        .filter(|word| word.chars().any(char::is_alphanumeric))
        .collect()
}
