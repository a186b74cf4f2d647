//! BM25 keyword index on tantivy
//!
//! An in-RAM tantivy index over title, genres, description, cast, director
//! and keywords of every catalog item. Title hits are boosted so a title
//! match outranks a passing mention in a synopsis.

use tantivy::{
    collector::TopDocs,
    query::QueryParser,
    schema::{Field, Schema, Value, STORED, STRING, TEXT},
    Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument,
};

use super::retriever::{LexicalIndex, RetrieverError, ScoredId};
use crate::catalog::CatalogItem;

/// Writer arena for the one-shot build
const WRITER_MEMORY_BYTES: usize = 50_000_000;

/// Weight of a title hit relative to the other fields
const TITLE_BOOST: f32 = 3.0;

/// Words that carry no signal for ranking dramas
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "drama", "dramas", "for", "i", "in", "is", "it", "kdrama", "like", "me",
    "my", "of", "on", "or", "series", "show", "shows", "something", "the", "to", "with",
];

/// Split text into lowercase alphanumeric terms, dropping stopwords
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .filter(|t| !STOPWORDS.contains(&t.as_str()))
        .collect()
}

fn index_error(e: tantivy::TantivyError) -> RetrieverError {
    RetrieverError::Failed(format!("keyword index: {e}"))
}

/// Schema fields
struct Bm25Schema {
    id: Field,
    title: Field,
    genres: Field,
    description: Field,
    cast: Field,
    director: Field,
    keywords: Field,
}

impl Bm25Schema {
    fn build() -> (Schema, Self) {
        let mut builder = Schema::builder();
        let fields = Self {
            id: builder.add_text_field("id", STRING | STORED),
            title: builder.add_text_field("title", TEXT),
            genres: builder.add_text_field("genres", TEXT),
            description: builder.add_text_field("description", TEXT),
            cast: builder.add_text_field("cast", TEXT),
            director: builder.add_text_field("director", TEXT),
            keywords: builder.add_text_field("keywords", TEXT),
        };
        (builder.build(), fields)
    }

    fn searchable(&self) -> Vec<Field> {
        vec![
            self.title,
            self.genres,
            self.description,
            self.cast,
            self.director,
            self.keywords,
        ]
    }

    fn document(&self, item: &CatalogItem) -> TantivyDocument {
        let mut doc = TantivyDocument::new();
        doc.add_text(self.id, &item.id);
        doc.add_text(self.title, &item.title);
        for genre in &item.genres {
            doc.add_text(self.genres, genre.as_str());
        }
        doc.add_text(self.description, &item.description);
        for name in &item.cast {
            doc.add_text(self.cast, name);
        }
        if let Some(director) = &item.director {
            doc.add_text(self.director, director);
        }
        for keyword in &item.keywords {
            doc.add_text(self.keywords, keyword);
        }
        doc
    }
}

/// BM25 index over catalog items
pub struct Bm25Index {
    index: Index,
    reader: IndexReader,
    schema: Bm25Schema,
    num_docs: u64,
}

impl Bm25Index {
    /// Index a set of catalog items in memory
    pub fn build<'a>(items: impl IntoIterator<Item = &'a CatalogItem>) -> Result<Self, RetrieverError> {
        let (schema, fields) = Bm25Schema::build();
        let index = Index::create_in_ram(schema);

        let mut writer: IndexWriter = index.writer(WRITER_MEMORY_BYTES).map_err(index_error)?;
        for item in items {
            writer.add_document(fields.document(item)).map_err(index_error)?;
        }
        writer.commit().map_err(index_error)?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(index_error)?;
        reader.reload().map_err(index_error)?;
        let num_docs = reader.searcher().num_docs();
        tracing::debug!(num_docs, "Keyword index built");

        Ok(Self {
            index,
            reader,
            schema: fields,
            num_docs,
        })
    }

    /// Number of indexed documents
    pub fn len(&self) -> usize {
        self.num_docs as usize
    }

    /// Check if nothing is indexed
    pub fn is_empty(&self) -> bool {
        self.num_docs == 0
    }
}

impl LexicalIndex for Bm25Index {
    fn lexical_search(&self, text: &str, k: usize) -> Result<Vec<ScoredId>, RetrieverError> {
        if self.is_empty() {
            return Err(RetrieverError::Unavailable("keyword index is empty".to_string()));
        }

        // Terms are plain alphanumerics, so the parser never sees query syntax
        let mut terms = tokenize(text);
        terms.sort();
        terms.dedup();
        if terms.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let mut parser = QueryParser::for_index(&self.index, self.schema.searchable());
        parser.set_field_boost(self.schema.title, TITLE_BOOST);
        let query = parser
            .parse_query(&terms.join(" "))
            .map_err(|e| RetrieverError::Failed(format!("keyword query: {e}")))?;

        let searcher = self.reader.searcher();
        let top_docs = searcher
            .search(&query, &TopDocs::with_limit(k))
            .map_err(index_error)?;

        let mut results = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let doc: TantivyDocument = searcher.doc(address).map_err(index_error)?;
            let id = doc
                .get_first(self.schema.id)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            if score > 0.0 {
                results.push((id, score));
            }
        }

        results.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(results)
    }
}
