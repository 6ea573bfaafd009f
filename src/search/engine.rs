//! Search engine - in-memory full-text search implementation / 搜索引擎
//!
//! `SearchEngine` is the seam the query pipeline calls. `InMemorySearchEngine`
//! backs it with an inverted index and exposes only primitive operations:
//! - index_document: index single document / 索引单个文档
//! - index_batch: batch indexing / 批量索引
//! - query: search + filter + paginate / 搜索
//! - delete_type: drop one result type / 删除某类型
//! - clear: clear index / 清空索引

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::Value;

use super::tokenizer::tokenize;
use crate::models::{SearchDocument, SearchQuery, SearchResult, SearchResultSet};

/// Search engine collaborator / 搜索引擎接口
///
/// Owns matching, ranking and cursor computation.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    async fn query(&self, query: &SearchQuery) -> anyhow::Result<SearchResultSet>;
}

const TITLE_BOOST: f32 = 2.0;
const TEXT_BOOST: f32 = 1.0;
const PREFIX_FACTOR: f32 = 0.5;

/// Document plus the type bucket it was indexed under / 带类型的文档
#[derive(Debug, Clone, Deserialize)]
pub struct IndexableEntry {
    #[serde(rename = "type")]
    pub result_type: String,
    pub document: SearchDocument,
}

#[derive(Default)]
struct IndexInner {
    /// seq -> entry, seq is insertion order / 按插入顺序存储
    documents: BTreeMap<usize, IndexableEntry>,
    /// token -> seq -> weight / 倒排索引
    inverted_index: HashMap<String, HashMap<usize, f32>>,
    next_seq: usize,
}

impl IndexInner {
    fn postings_for(document: &SearchDocument) -> HashMap<String, f32> {
        let mut weights: HashMap<String, f32> = HashMap::new();
        for token in tokenize(&document.title) {
            *weights.entry(token).or_default() += TITLE_BOOST;
        }
        for token in tokenize(&document.text) {
            *weights.entry(token).or_default() += TEXT_BOOST;
        }
        weights
    }

    fn insert(&mut self, entry: IndexableEntry) {
        let seq = self.next_seq;
        self.next_seq += 1;

        for (token, weight) in Self::postings_for(&entry.document) {
            self.inverted_index.entry(token).or_default().insert(seq, weight);
        }
        self.documents.insert(seq, entry);
    }

    fn remove(&mut self, seq: usize) {
        let Some(entry) = self.documents.remove(&seq) else {
            return;
        };
        for token in Self::postings_for(&entry.document).into_keys() {
            if let Some(postings) = self.inverted_index.get_mut(&token) {
                postings.remove(&seq);
                if postings.is_empty() {
                    self.inverted_index.remove(&token);
                }
            }
        }
    }

    /// seq -> score for a term; empty term matches everything / 计算分数
    fn score(&self, term: &str) -> Vec<(usize, f32)> {
        if term.trim().is_empty() {
            return self.documents.keys().map(|seq| (*seq, 0.0)).collect();
        }
        let query_tokens = tokenize(term);

        let mut scores: HashMap<usize, f32> = HashMap::new();
        for token in &query_tokens {
            if let Some(postings) = self.inverted_index.get(token) {
                for (seq, weight) in postings {
                    *scores.entry(*seq).or_default() += weight;
                }
            }
            // 前缀匹配
            for (idx_token, postings) in &self.inverted_index {
                if idx_token != token && idx_token.starts_with(token.as_str()) {
                    for (seq, weight) in postings {
                        *scores.entry(*seq).or_default() += weight * PREFIX_FACTOR;
                    }
                }
            }
        }

        let mut scored: Vec<(usize, f32)> = scores.into_iter().collect();
        scored.sort_by_key(|(seq, _)| *seq);
        scored
    }
}

pub struct InMemorySearchEngine {
    inner: RwLock<IndexInner>,
    page_size: usize,
}

impl InMemorySearchEngine {
    pub fn new(page_size: usize) -> Self {
        Self {
            inner: RwLock::new(IndexInner::default()),
            page_size: page_size.max(1),
        }
    }

    /// Index single document (primitive operation) / 索引单个文档
    pub fn index_document(&self, result_type: impl Into<String>, document: SearchDocument) {
        self.inner.write().insert(IndexableEntry {
            result_type: result_type.into(),
            document,
        });
    }

    /// 批量索引文档
    pub fn index_batch(&self, entries: Vec<IndexableEntry>) -> usize {
        let mut inner = self.inner.write();
        let count = entries.len();
        for entry in entries {
            inner.insert(entry);
        }
        count
    }

    /// Load `[{ "type": ..., "document": {...} }]` from a JSON file / 从文件导入文档
    pub async fn load_documents_file(&self, path: impl AsRef<Path>) -> anyhow::Result<usize> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read documents file {:?}", path))?;
        let entries: Vec<IndexableEntry> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse documents file {:?}", path))?;
        Ok(self.index_batch(entries))
    }

    /// Remove every document of one type / 删除某一类型的所有文档
    pub fn delete_type(&self, result_type: &str) -> usize {
        let mut inner = self.inner.write();
        let seqs: Vec<usize> = inner
            .documents
            .iter()
            .filter(|(_, entry)| entry.result_type == result_type)
            .map(|(seq, _)| *seq)
            .collect();
        for seq in &seqs {
            inner.remove(*seq);
        }
        seqs.len()
    }

    /// 清空所有索引（原语操作）
    pub fn clear(&self) {
        *self.inner.write() = IndexInner::default();
    }

    pub fn document_count(&self) -> usize {
        self.inner.read().documents.len()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    fn search(&self, query: &SearchQuery) -> anyhow::Result<SearchResultSet> {
        let page = decode_cursor(query.page_cursor.as_deref())?;
        let inner = self.inner.read();

        let mut hits: Vec<(f32, &IndexableEntry)> = inner
            .score(&query.term)
            .into_iter()
            .filter_map(|(seq, score)| inner.documents.get(&seq).map(|entry| (score, entry)))
            .filter(|(_, entry)| type_matches(query.types.as_deref(), &entry.result_type))
            .filter(|(_, entry)| filters_match(&query.filters, &entry.document))
            .collect();

        // stable: ties keep insertion order
        hits.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let total = hits.len();
        let start = page.saturating_mul(self.page_size);
        let results: Vec<SearchResult> = hits
            .into_iter()
            .enumerate()
            .skip(start)
            .take(self.page_size)
            .map(|(position, (score, entry))| SearchResult {
                result_type: entry.result_type.clone(),
                document: entry.document.clone(),
                score: Some(score),
                rank: Some(position + 1),
            })
            .collect();

        let next_page_cursor = (start.saturating_add(self.page_size) < total).then(|| encode_cursor(page + 1));
        let previous_page_cursor = (page > 0).then(|| encode_cursor(page - 1));

        Ok(SearchResultSet {
            results,
            next_page_cursor,
            previous_page_cursor,
        })
    }
}

impl Default for InMemorySearchEngine {
    fn default() -> Self {
        Self::new(25)
    }
}

#[async_trait]
impl SearchEngine for InMemorySearchEngine {
    async fn query(&self, query: &SearchQuery) -> anyhow::Result<SearchResultSet> {
        self.search(query)
    }
}

/// Cursor is base64 of the decimal page number / 游标编码
pub fn encode_cursor(page: usize) -> String {
    STANDARD.encode(page.to_string())
}

/// Missing or empty cursor means the first page / 游标解码
pub fn decode_cursor(cursor: Option<&str>) -> anyhow::Result<usize> {
    let Some(cursor) = cursor.filter(|c| !c.is_empty()) else {
        return Ok(0);
    };
    let bytes = STANDARD
        .decode(cursor)
        .with_context(|| format!("Invalid page cursor: {}", cursor))?;
    let text = String::from_utf8(bytes).context("Page cursor is not UTF-8")?;
    text.parse::<usize>()
        .with_context(|| format!("Page cursor does not hold a page number: {}", text))
}

fn type_matches(types: Option<&[String]>, result_type: &str) -> bool {
    match types {
        Some(types) if !types.is_empty() => types.iter().any(|t| t == result_type),
        _ => true,
    }
}

fn filters_match(filters: &HashMap<String, Value>, document: &SearchDocument) -> bool {
    filters.iter().all(|(key, expected)| {
        let Some(actual) = document.field(key) else {
            return false;
        };
        match expected {
            // any-of
            Value::Array(options) => options.iter().any(|option| value_eq(option, &actual)),
            other => value_eq(other, &actual),
        }
    })
}

fn value_eq(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::String(a), Value::String(b)) => a.eq_ignore_ascii_case(b),
        (Value::String(a), other) | (other, Value::String(a)) => {
            // query-string filters arrive as strings
            match other {
                Value::Bool(b) => a.eq_ignore_ascii_case(&b.to_string()),
                Value::Number(n) => *a == n.to_string(),
                _ => false,
            }
        }
        (a, b) => a == b,
    }
}
