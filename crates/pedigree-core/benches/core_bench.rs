//! Criterion benchmarks for pedigree-core.
//!
//! ## Benchmark groups
//!
//! 1. **schema** — DDL init + migration overhead.
//! 2. **guards** — Input clamping.
//! 3. **name_splitting** — Title/kennel/name decomposition.
//! 4. **slot_math** — Binary slot indexing and grid placement.
//! 5. **tree_build** — Generation-list construction against an in-memory
//!    resolver at several depths.
//! 6. **scrape_parse** — Full HTML document parse and slot assembly.
//!
//! ## Running
//!
//! ```sh
//! cargo bench --manifest-path crates/pedigree-core/Cargo.toml
//! # Run only the tree builder group:
//! cargo bench --manifest-path crates/pedigree-core/Cargo.toml -- tree_build
//! ```

use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rusqlite::Connection;

use pedigree_core::errors::PedigreeResult;
use pedigree_core::guards::{clamp_generations, clamp_int, clamp_limit, MAX_SEARCH_LIMIT};
use pedigree_core::models::{PedigreeEntity, Sex};
use pedigree_core::names::split_name;
use pedigree_core::scrape::parse_pedigree;
use pedigree_core::store::schema::{migrate_schema, SCHEMA_STATEMENTS};
use pedigree_core::tree::slots::{grid_cell, parent_slot, path_to_slot};
use pedigree_core::tree::{build_generations, RecordResolver};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create a fresh in-memory database with the full schema applied and
/// migrated to the latest version.
fn setup_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
    for stmt in SCHEMA_STATEMENTS {
        conn.execute_batch(stmt).unwrap();
    }
    migrate_schema(&conn).unwrap();
    conn
}

struct MapResolver(HashMap<i64, PedigreeEntity>);

impl RecordResolver for MapResolver {
    fn resolve_by_id(&self, id: i64) -> PedigreeResult<Option<PedigreeEntity>> {
        Ok(self.0.get(&id).cloned())
    }
}

/// Build a complete binary pedigree `generations` deep. Record ids follow the
/// heap layout (root 1, parents of `i` at `2i` and `2i + 1`), so the builder
/// resolves every slot.
fn full_pedigree(generations: usize) -> MapResolver {
    let mut records = HashMap::new();
    let total = (1i64 << generations) - 1;
    for id in 1..=total {
        let has_parents = id * 2 + 1 <= total;
        records.insert(
            id,
            PedigreeEntity {
                id,
                name: format!("dog-{id}"),
                sex: if id % 2 == 0 { Sex::Male } else { Sex::Female },
                image_url: None,
                profile_url: None,
                father_id: has_parents.then_some(id * 2),
                mother_id: has_parents.then_some(id * 2 + 1),
                kennel: None,
            },
        );
    }
    MapResolver(records)
}

/// Synthetic source document matching the external pedigree layout: two
/// branch rows of 1 + 2 + 4 cards.
fn sample_document() -> String {
    let card = |name: &str| {
        format!(
            r#"<div class="dog-card male"><a href="/dog/{name}"><img src="/img/{name}.jpg">{name}</a></div>"#
        )
    };
    let row = |names: [&str; 7]| {
        format!(
            r#"<tr><td class="gen-1">{}</td><td class="gen-2">{}{}</td><td class="gen-3">{}{}{}{}</td></tr>"#,
            card(names[0]),
            card(names[1]),
            card(names[2]),
            card(names[3]),
            card(names[4]),
            card(names[5]),
            card(names[6]),
        )
    };
    format!(
        r#"<html><body>
        <h1 class="dog-name">Rocko</h1>
        <img class="dog-photo" src="/images/rocko.jpg">
        <table class="pedigree">{}{}</table>
        </body></html>"#,
        row(["Duke", "Rex", "Bella", "A", "B", "C", "D"]),
        row(["Luna", "Max", "Daisy", "E", "F", "G", "H"]),
    )
}

// ---------------------------------------------------------------------------
// Benchmark: Schema initialization & migration
// ---------------------------------------------------------------------------

fn bench_schema_init(c: &mut Criterion) {
    c.bench_function("schema_init_and_migrate", |b| {
        b.iter(|| {
            let conn = Connection::open_in_memory().unwrap();
            conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
            for stmt in SCHEMA_STATEMENTS {
                conn.execute_batch(stmt).unwrap();
            }
            migrate_schema(&conn).unwrap();
            black_box(&conn);
        });
    });
}

fn bench_schema_migration_on_existing(c: &mut Criterion) {
    c.bench_function("schema_migration_noop_on_current", |b| {
        // Pre-create a fully migrated database; measure re-running migrate
        // (should be essentially a no-op version check).
        let conn = setup_db();
        b.iter(|| {
            migrate_schema(black_box(&conn)).unwrap();
        });
    });
}

// ---------------------------------------------------------------------------
// Benchmark: Guard clamping functions
// ---------------------------------------------------------------------------

fn bench_guards(c: &mut Criterion) {
    let mut group = c.benchmark_group("guards");

    group.bench_function("clamp_int", |b| {
        b.iter(|| clamp_int(black_box(150), black_box(1), black_box(100)));
    });

    group.bench_function("clamp_generations", |b| {
        b.iter(|| clamp_generations(black_box(12)));
    });

    group.bench_function("clamp_limit", |b| {
        b.iter(|| clamp_limit(black_box(200), black_box(MAX_SEARCH_LIMIT)));
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: Name splitting
// ---------------------------------------------------------------------------

fn bench_name_splitting(c: &mut Criterion) {
    let mut group = c.benchmark_group("name_splitting");

    group.bench_function("title_and_possessive", |b| {
        b.iter(|| split_name(black_box("Ch. Eminent's Boss")));
    });

    group.bench_function("marker_vocabulary", |b| {
        b.iter(|| split_name(black_box("City Of Bullies Rocko-Mania")));
    });

    group.bench_function("plain_name", |b| {
        b.iter(|| split_name(black_box("Max")));
    });

    group.bench_function("long_untitled_name", |b| {
        let long = "One Two Three Four Five Six Seven Eight Nine Ten";
        b.iter(|| split_name(black_box(long)));
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: Slot math
// ---------------------------------------------------------------------------

fn bench_slot_math(c: &mut Criterion) {
    let mut group = c.benchmark_group("slot_math");

    group.bench_function("path_to_slot_gen8", |b| {
        b.iter(|| path_to_slot(black_box(8), black_box(173)));
    });

    group.bench_function("parent_slot", |b| {
        b.iter(|| parent_slot(black_box(173)));
    });

    group.bench_function("grid_cell", |b| {
        b.iter(|| grid_cell(black_box(3), black_box(5), black_box(8)));
    });

    group.bench_function("full_generation_paths", |b| {
        b.iter(|| {
            for i in 0..(1usize << 6) {
                black_box(path_to_slot(6, i));
            }
        });
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: Tree builder against an in-memory resolver
// ---------------------------------------------------------------------------

fn bench_tree_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_build");

    for &generations in &[3usize, 5, 8] {
        group.bench_with_input(
            BenchmarkId::new("full_pedigree", generations),
            &generations,
            |b, &generations| {
                let resolver = full_pedigree(generations);
                let root = resolver.0[&1].clone();
                b.iter(|| {
                    let list = build_generations(black_box(root.clone()), generations, &resolver);
                    black_box(list);
                });
            },
        );
    }

    group.bench_function("sparse_pedigree_5_gens", |b| {
        // Only the father line is known; mother slots stay unknown all the
        // way down, so most lookups short-circuit.
        let mut records = HashMap::new();
        for id in 1..=5i64 {
            records.insert(
                id,
                PedigreeEntity {
                    id,
                    name: format!("dog-{id}"),
                    sex: Sex::Male,
                    image_url: None,
                    profile_url: None,
                    father_id: (id < 5).then_some(id + 1),
                    mother_id: None,
                    kennel: None,
                },
            );
        }
        let resolver = MapResolver(records);
        let root = resolver.0[&1].clone();
        b.iter(|| {
            let list = build_generations(black_box(root.clone()), 5, &resolver);
            black_box(list);
        });
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: Scraper parse and slot assembly
// ---------------------------------------------------------------------------

fn bench_scrape_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("scrape_parse");

    let doc = sample_document();
    group.bench_function("full_document", |b| {
        b.iter(|| {
            let parsed = parse_pedigree(
                black_box(&doc),
                "https://www.bullypedia.net/dog/rocko",
            );
            black_box(parsed);
        });
    });

    let empty = "<html><body><p>nothing here</p></body></html>";
    group.bench_function("empty_document", |b| {
        b.iter(|| {
            let parsed = parse_pedigree(
                black_box(empty),
                "https://www.bullypedia.net/dog/rocko",
            );
            black_box(parsed);
        });
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Register all benchmark groups
// ---------------------------------------------------------------------------

criterion_group!(
    benches,
    bench_schema_init,
    bench_schema_migration_on_existing,
    bench_guards,
    bench_name_splitting,
    bench_slot_math,
    bench_tree_build,
    bench_scrape_parse,
);
criterion_main!(benches);
