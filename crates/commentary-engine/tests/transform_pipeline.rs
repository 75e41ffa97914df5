use std::collections::BTreeMap;
use std::sync::Arc;

use commentary_engine::model::{ExcludeMode, Link};
use commentary_engine::{
    Access, CommentParser, DeclId, DeclKind, Diagnostics, DocumentSource, Entity, EntityIndex,
    Inventory, LinkTarget, Pipeline, PipelineOptions, SourceTree, SyncPool, ThreadPool,
    WorkerPool, normalize, parse_documents, parse_source,
};
use pretty_assertions::assert_eq;
use relative_path::RelativePathBuf;
use rstest::rstest;

struct Project {
    source: Arc<SourceTree>,
    ns: DeclId,
    swap: DeclId,
    widget: DeclId,
    cache: DeclId,
    max: DeclId,
}

fn project() -> Project {
    let mut source = SourceTree::new();
    let file = source.add_file("include/ns1.hpp");
    let ns = source.add(file, DeclKind::Namespace, "ns1");
    source.set_comment(ns, "The namespace.");

    let swap = source.add(ns, DeclKind::Function, "swap");
    source.set_comment(
        swap,
        "Swaps.\n\nSee [](<> \"ns1::widget\"), [](<> \"std::vector\") and [](<> \"nowhere\").",
    );
    source.add(swap, DeclKind::FunctionParameter, "a");

    let widget = source.add(ns, DeclKind::Class, "widget");
    source.set_comment(widget, "A widget.");
    let cache = source.add(widget, DeclKind::MemberFunction, "cache");
    source.set_access(cache, Access::Private);
    source.set_comment(cache, "Internal.");

    let min = source.add(ns, DeclKind::Function, "min");
    source.set_comment(min, "\\group minmax Min and max\nSmaller.");
    let max = source.add(ns, DeclKind::Function, "max");
    source.set_comment(max, "\\group -minmax\nLarger.");

    Project {
        source: Arc::new(source),
        ns,
        swap,
        widget,
        cache,
        max,
    }
}

fn std_inventory() -> Inventory {
    Inventory {
        project: "std".into(),
        version: "c++20".into(),
        base_url: "https://en.cppreference.com/w/".into(),
        entries: BTreeMap::from([(
            "std::vector".to_string(),
            "cpp/container/vector".to_string(),
        )]),
    }
}

struct Run {
    index: EntityIndex,
    pipeline: Pipeline,
    diagnostics: Arc<Diagnostics>,
}

fn run(source: &Arc<SourceTree>, pool: &dyn WorkerPool) -> Run {
    let _ = env_logger::builder().is_test(true).try_init();
    let diagnostics = Arc::new(Diagnostics::new());
    let mut index = parse_source(
        source,
        &Arc::new(CommentParser::default()),
        pool,
        &diagnostics,
    );
    normalize(&mut index, source, &diagnostics);

    let options = PipelineOptions {
        inventories: vec![std_inventory()],
        ..PipelineOptions::default()
    };
    let pipeline = Pipeline::new(Arc::clone(source), options, Arc::clone(&diagnostics));
    assert_eq!(pipeline.transform(&mut index, pool), 0);
    Run {
        index,
        pipeline,
        diagnostics,
    }
}

fn links(entity: &Entity) -> Vec<Link> {
    let mut links = Vec::new();
    entity.walk(&mut |e| {
        if let Entity::Link(link) = e {
            links.push(link.clone());
        }
    });
    links
}

#[test]
fn namespace_heading_slug() {
    let p = project();
    let r = run(&p.source, &SyncPool);
    let ns = r.index.find_by_declaration(p.ns).unwrap();
    assert_eq!(ns.anchor(), Some("namespace-ns1"));
}

#[test]
fn links_resolve_internally_then_externally() {
    let p = project();
    let r = run(&p.source, &SyncPool);
    let swap = r.index.find_by_declaration(p.swap).unwrap();
    let links = links(swap);
    assert_eq!(links.len(), 3);

    assert_eq!(links[0].target, LinkTarget::DeclarationRef(p.widget));
    assert_eq!(links[0].children, vec![Entity::Code("widget".into())]);
    assert_eq!(
        r.index.href(&links[0].target).as_deref(),
        Some("#class-ns1widget")
    );

    assert!(matches!(
        &links[1].target,
        LinkTarget::ExternalInventoryRef(entry) if entry.entry == "std::vector"
    ));
    assert_eq!(links[1].children, vec![Entity::Code("std::vector".into())]);
    assert_eq!(
        r.index.href(&links[1].target).as_deref(),
        Some("https://en.cppreference.com/w/cpp/container/vector")
    );

    assert_eq!(links[2].target, LinkTarget::Unresolved("nowhere".into()));
    assert!(links[2].children.is_empty());
    assert_eq!(r.diagnostics.warning_count(), 1);
    assert_eq!(r.diagnostics.error_count(), 0);
}

#[test]
fn grouped_members_share_one_heading() {
    let p = project();
    let r = run(&p.source, &SyncPool);
    let group = r
        .index
        .iter()
        .find(|e| matches!(e, Entity::Group(_)))
        .unwrap();
    assert_eq!(group.anchor(), Some("min-and-max"));
    assert_eq!(group.children().len(), 3);

    let max = r.index.find_by_declaration(p.max).unwrap();
    assert_eq!(max.anchor(), Some("function-ns1max"));
    assert!(matches!(max.children().first(), Some(Entity::Heading(h)) if h.level == 2));
}

#[test]
fn private_members_are_excluded() {
    let p = project();
    let r = run(&p.source, &SyncPool);
    let cache = r.index.find_by_declaration(p.cache).unwrap();
    assert_eq!(cache.documentation().unwrap().exclude_mode, ExcludeMode::Exclude);
    assert!(!matches!(cache.children().first(), Some(Entity::Heading(_))));
}

#[test]
fn second_transform_changes_nothing() {
    let p = project();
    let pool = ThreadPool::new(2).unwrap();
    let mut r = run(&p.source, &pool);
    let first = r.index.clone();
    assert_eq!(r.pipeline.transform(&mut r.index, &pool), 0);
    assert_eq!(
        r.index.iter().collect::<Vec<_>>(),
        first.iter().collect::<Vec<_>>()
    );
}

#[rstest]
fn thread_count_does_not_change_the_result(#[values(1, 2, 8)] threads: usize) {
    let p = project();
    let expected = run(&p.source, &SyncPool);
    let actual = run(&p.source, &ThreadPool::new(threads).unwrap());
    assert_eq!(
        actual.index.iter().collect::<Vec<_>>(),
        expected.index.iter().collect::<Vec<_>>()
    );
    assert_eq!(
        actual.diagnostics.warning_count(),
        expected.diagnostics.warning_count()
    );
}

#[test]
fn documents_link_into_the_declarations() {
    let p = project();
    let diagnostics = Arc::new(Diagnostics::new());
    let parser = Arc::new(CommentParser::default());
    let mut index = parse_source(&p.source, &parser, &SyncPool, &diagnostics);
    parse_documents(
        vec![DocumentSource {
            name: "Guide".into(),
            path: RelativePathBuf::from("docs/guide.md"),
            text: "# Guide\n\nRead [](<> \"*swap\").".into(),
        }],
        &parser,
        &SyncPool,
        &mut index,
        &diagnostics,
    );
    normalize(&mut index, &p.source, &diagnostics);
    Pipeline::new(
        Arc::clone(&p.source),
        PipelineOptions::default(),
        Arc::clone(&diagnostics),
    )
    .transform(&mut index, &SyncPool);

    let guide = index
        .iter()
        .find(|e| matches!(e, Entity::Document(_)))
        .unwrap();
    assert_eq!(guide.anchor(), Some("guide"));
    let links = links(guide);
    assert_eq!(links[0].target, LinkTarget::DeclarationRef(p.swap));
    assert_eq!(links[0].children, vec![Entity::Code("swap".into())]);
}

#[test]
fn links_reach_parameters_and_undocumented_headers() {
    let mut source = SourceTree::new();
    let file = source.add_file("include/util.hpp");
    let ns = source.add(file, DeclKind::Namespace, "ns1");
    let swap = source.add(ns, DeclKind::Function, "swap");
    source.set_comment(swap, "Swaps.\n\n\\param a The first value.");
    let a = source.add(swap, DeclKind::FunctionParameter, "a");
    let other = source.add(ns, DeclKind::Function, "other");
    source.set_comment(other, "Uses [ns1::swap::a]() from [util.hpp]().");
    let r = run(&Arc::new(source), &SyncPool);
    let entity = r.index.find_by_declaration(other).unwrap();
    let links = links(entity);

    let targets: Vec<_> = links.iter().map(|l| l.target.clone()).collect();
    assert_eq!(
        targets,
        vec![LinkTarget::DeclarationRef(a), LinkTarget::DeclarationRef(file)]
    );
    for link in &links {
        let href = r.index.href(&link.target);
        assert!(
            href.as_deref().is_some_and(|h| h.len() > 1 && h.starts_with('#')),
            "{:?} has no address: {href:?}",
            link.target
        );
    }
    assert_eq!(r.diagnostics.warning_count(), 0);
}
