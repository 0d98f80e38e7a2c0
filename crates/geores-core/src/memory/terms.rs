// crates/geores-core/src/memory/terms.rs

//! Candidate lookup for [`MemoryIndex`](super::MemoryIndex), backed by an
//! in-RAM tantivy index with one document per searchable name.
//!
//! Tokens are already folded, so the field is split on whitespace only.
//! Fuzzy lookups walk tantivy's term dictionary with a Levenshtein
//! automaton; the caller rescores every candidate it gets back.

use log::debug;
use std::fmt;
use tantivy::collector::DocSetCollector;
use tantivy::query::{BooleanQuery, FuzzyTermQuery, Occur, PhraseQuery, Query, TermQuery};
use tantivy::schema::{
    Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, Value, STORED,
};
use tantivy::tokenizer::{TextAnalyzer, WhitespaceTokenizer};
use tantivy::{Index, IndexReader, IndexWriter, TantivyDocument, Term};

use super::NameDoc;
use crate::error::Result;

/// Tokenizer registered for the pre-folded name field.
const FOLDED_TOKENIZER: &str = "folded_whitespace";

const WRITER_HEAP_BYTES: usize = 50_000_000;

#[derive(Clone)]
pub(super) struct TermIndex {
    reader: IndexReader,
    tokens: Field,
    doc: Field,
}

impl fmt::Debug for TermIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TermIndex")
            .field("documents", &self.reader.searcher().num_docs())
            .finish_non_exhaustive()
    }
}

impl TermIndex {
    pub(super) fn build(docs: &[NameDoc]) -> Result<Self> {
        let mut schema_builder = Schema::builder();
        let indexing = TextFieldIndexing::default()
            .set_tokenizer(FOLDED_TOKENIZER)
            .set_index_option(IndexRecordOption::WithFreqsAndPositions);
        let tokens = schema_builder
            .add_text_field("tokens", TextOptions::default().set_indexing_options(indexing));
        let doc = schema_builder.add_u64_field("doc", STORED);

        let index = Index::create_in_ram(schema_builder.build());
        index.tokenizers().register(
            FOLDED_TOKENIZER,
            TextAnalyzer::builder(WhitespaceTokenizer::default()).build(),
        );

        let mut writer: IndexWriter = index.writer_with_num_threads(1, WRITER_HEAP_BYTES)?;
        for (id, name) in docs.iter().enumerate() {
            let mut document = TantivyDocument::new();
            document.add_text(tokens, name.tokens.join(" "));
            document.add_u64(doc, id as u64);
            writer.add_document(document)?;
        }
        writer.commit()?;

        let reader = index.reader()?;
        debug!("Built term index over {} name documents", docs.len());
        Ok(Self { reader, tokens, doc })
    }

    /// Name documents containing `tokens` as a contiguous phrase.
    pub(super) fn phrase(&self, tokens: &[String]) -> Result<Vec<u32>> {
        let mut terms: Vec<Term> = tokens
            .iter()
            .map(|token| Term::from_field_text(self.tokens, token))
            .collect();
        let query: Box<dyn Query> = match terms.len() {
            0 => return Ok(Vec::new()),
            1 => Box::new(TermQuery::new(terms.remove(0), IndexRecordOption::Basic)),
            _ => Box::new(PhraseQuery::new(terms)),
        };
        self.collect(query.as_ref())
    }

    /// Name documents where every `(token, max_edits)` pair is within
    /// `max_edits` of some name token. Transpositions cost one edit.
    pub(super) fn fuzzy(&self, tokens: &[(&str, usize)]) -> Result<Vec<u32>> {
        if tokens.is_empty() {
            return Ok(Vec::new());
        }
        let clauses: Vec<(Occur, Box<dyn Query>)> = tokens
            .iter()
            .map(|&(token, max_edits)| {
                let term = Term::from_field_text(self.tokens, token);
                let query: Box<dyn Query> = if max_edits == 0 {
                    Box::new(TermQuery::new(term, IndexRecordOption::Basic))
                } else {
                    Box::new(FuzzyTermQuery::new(term, max_edits as u8, true))
                };
                (Occur::Must, query)
            })
            .collect();
        self.collect(&BooleanQuery::new(clauses))
    }

    fn collect(&self, query: &dyn Query) -> Result<Vec<u32>> {
        let searcher = self.reader.searcher();
        let addresses = searcher.search(query, &DocSetCollector)?;
        let mut docs = Vec::with_capacity(addresses.len());
        for address in addresses {
            let stored: TantivyDocument = searcher.doc(address)?;
            if let Some(doc) = stored.get_first(self.doc).and_then(|v| v.as_u64()) {
                docs.push(doc as u32);
            }
        }
        docs.sort_unstable();
        Ok(docs)
    }
}
