//! Batch drivers building the entity index from a source tree.
//!
//! Comments are compiled one task per comment; results are inserted in
//! submission order so the index order never depends on scheduling.

use std::sync::Arc;

use relative_path::RelativePathBuf;

use crate::comment::{
    Binding, CommentParser, CommentSite, add_missing_sections, add_uncommented_entities,
    add_uncommented_modules, group_entities,
};
use crate::diagnostics::Diagnostics;
use crate::model::{Entity, EntityIndex};
use crate::pool::{WorkerPool, map_each};
use crate::source::SourceTree;

/// A freestanding markdown file to include as a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSource {
    pub name: String,
    pub path: RelativePathBuf,
    pub text: String,
}

/// Compiles every attached and free comment of `source`.
///
/// Failed comments and duplicate identities are recorded in `diagnostics`
/// and left out of the index.
pub fn parse_source(
    source: &Arc<SourceTree>,
    parser: &Arc<CommentParser>,
    pool: &dyn WorkerPool,
    diagnostics: &Diagnostics,
) -> EntityIndex {
    let mut units = Vec::new();
    for id in source.ids() {
        if let Some(text) = source.comment(id) {
            units.push((
                Binding::Declaration(id).describe(source),
                (CommentSite::attached(id, source), text.to_string()),
            ));
        }
    }
    for (file, text) in source.free_comments() {
        units.push((
            format!("free comment in '{}'", source.name(*file)),
            (CommentSite::free(*file), text.clone()),
        ));
    }
    log::debug!("parsing {} comments", units.len());

    let task_source = Arc::clone(source);
    let task_parser = Arc::clone(parser);
    let parsed = map_each(
        pool,
        units,
        diagnostics,
        move |(site, text): (CommentSite, String)| {
            let source = task_source.as_ref();
            Ok(task_parser.parse(&text, site, source, source)?)
        },
    );

    let mut index = EntityIndex::new();
    insert_all(&mut index, parsed.into_iter().flatten().flatten(), diagnostics);
    index
}

/// Parses freestanding documents into `index`.
pub fn parse_documents(
    documents: Vec<DocumentSource>,
    parser: &Arc<CommentParser>,
    pool: &dyn WorkerPool,
    index: &mut EntityIndex,
    diagnostics: &Diagnostics,
) {
    let units = documents
        .into_iter()
        .map(|doc| (format!("document '{}'", doc.path), doc))
        .collect();
    let task_parser = Arc::clone(parser);
    let parsed = map_each(pool, units, diagnostics, move |doc: DocumentSource| {
        Ok(task_parser.parse_document(&doc.text, &doc.name, doc.path))
    });
    insert_all(index, parsed.into_iter().flatten(), diagnostics);
}

fn insert_all(
    index: &mut EntityIndex,
    entities: impl IntoIterator<Item = Entity>,
    diagnostics: &Diagnostics,
) {
    for entity in entities {
        if let Err(e) = index.insert(entity) {
            diagnostics.error(e);
        }
    }
}

/// Runs the index-wide normalization steps: placeholders for
/// undocumented declarations and modules, required sections, groups.
pub fn normalize(index: &mut EntityIndex, source: &SourceTree, diagnostics: &Diagnostics) {
    match add_uncommented_entities(index, source) {
        Ok(added) => log::debug!("added {added} uncommented declarations"),
        Err(e) => diagnostics.error(e),
    }
    match add_uncommented_modules(index) {
        Ok(added) => log::debug!("added {added} uncommented modules"),
        Err(e) => diagnostics.error(e),
    }
    add_missing_sections(index, source);
    match group_entities(index, source) {
        Ok(grouped) => log::debug!("grouped {grouped} declarations"),
        Err(e) => diagnostics.error(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityKey, ExcludeMode};
    use crate::pool::{SyncPool, ThreadPool};
    use crate::source::{DeclId, DeclKind};
    use pretty_assertions::assert_eq;

    fn source() -> (Arc<SourceTree>, DeclId, DeclId) {
        let mut source = SourceTree::new();
        let file = source.add_file("swap.hpp");
        let ns = source.add(file, DeclKind::Namespace, "ns1");
        source.set_comment(ns, "The namespace.");
        let swap = source.add(ns, DeclKind::Function, "swap");
        source.set_comment(swap, "Swaps.\n\\module utility");
        source.add(swap, DeclKind::FunctionParameter, "a");
        source.add(ns, DeclKind::Class, "widget");
        source.add_free_comment(file, "\\entity ns1::swap\nAgain.");
        (Arc::new(source), ns, swap)
    }

    #[test]
    fn comments_are_indexed_in_source_order() {
        let (source, ns, swap) = source();
        let diagnostics = Diagnostics::new();
        let pool = ThreadPool::new(4).unwrap();
        let index = parse_source(
            &source,
            &Arc::new(CommentParser::default()),
            &pool,
            &diagnostics,
        );

        let keys: Vec<_> = index.iter().filter_map(Entity::key).collect();
        assert_eq!(keys, vec![EntityKey::Declaration(ns), EntityKey::Declaration(swap)]);
        // the free comment documents swap a second time
        assert_eq!(diagnostics.error_count(), 1);
    }

    #[test]
    fn normalization_fills_in_placeholders() {
        let (source, _, _) = source();
        let diagnostics = Diagnostics::new();
        let mut index = parse_source(
            &source,
            &Arc::new(CommentParser::default()),
            &SyncPool,
            &diagnostics,
        );
        normalize(&mut index, &source, &diagnostics);

        let widget = source.lookup("ns1::widget").unwrap();
        assert_eq!(
            index
                .find_by_declaration(widget)
                .unwrap()
                .documentation()
                .unwrap()
                .exclude_mode,
            ExcludeMode::Uncommented
        );
        let module = index.find_by_module_name("utility").unwrap();
        assert_eq!(
            module.documentation().unwrap().exclude_mode,
            ExcludeMode::Uncommented
        );
        let len = index.len();
        normalize(&mut index, &source, &diagnostics);
        assert_eq!(index.len(), len);
    }

    #[test]
    fn documents_are_keyed_by_path() {
        let diagnostics = Diagnostics::new();
        let mut index = EntityIndex::new();
        let doc = DocumentSource {
            name: "Guide".into(),
            path: RelativePathBuf::from("docs/guide.md"),
            text: "# Guide\n\nRead [swap]().".into(),
        };
        parse_documents(
            vec![doc.clone(), doc],
            &Arc::new(CommentParser::default()),
            &SyncPool,
            &mut index,
            &diagnostics,
        );
        assert_eq!(index.len(), 1);
        assert_eq!(diagnostics.error_count(), 1);
        assert!(
            index
                .find(&EntityKey::Document(RelativePathBuf::from("docs/guide.md")))
                .is_some()
        );
    }
}
