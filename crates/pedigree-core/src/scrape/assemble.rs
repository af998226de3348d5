//! Assembly of scraped cards into the binary ancestry tree.
//!
//! Parsing a fetched document never fails outright: structural anomalies
//! (missing root name, absent branch rows, wrong card counts) downgrade to
//! warnings on a best-effort tree. Slot assignment follows the same binary
//! indexing as the internal builder: row 0 fills the father's branch, row 1
//! the mother's, each group in document order.

use scraper::Html;
use tracing::warn;
use url::Url;

use crate::models::{AncestorNode, ImportWarning, ParsedPedigree, Sex};
use crate::scrape::cards::{self, AncestorCard, BranchRow};
use crate::scrape::relay::relay_for;

/// Display name used when the source page carries no root name.
const PLACEHOLDER_ROOT_NAME: &str = "Unknown";

/// Expected card counts per generation group within one branch row.
const EXPECTED_GROUP_COUNTS: [usize; 3] = [1, 2, 4];

fn node_from_card(
    card: AncestorCard,
    base: Option<&Url>,
    warnings: &mut Vec<ImportWarning>,
) -> AncestorNode {
    let image = card.image_src.and_then(|src| {
        let relayed = relay_for(&src, base);
        if relayed.is_none() {
            warnings.push(ImportWarning::new(
                "image_not_proxied",
                format!("image reference {src:?} could not be proxied"),
            ));
        }
        relayed
    });
    AncestorNode {
        id: None,
        name: card.name,
        sex: card.sex,
        image,
        profile_url: card.profile_url,
        father: None,
        mother: None,
    }
}

/// Turn one generation group into its dense slot vector, warning when the
/// card count is off and filling slots with whatever cards are present.
fn group_slots(
    cards: Vec<AncestorCard>,
    row_label: &str,
    generation: usize,
    base: Option<&Url>,
    warnings: &mut Vec<ImportWarning>,
) -> Vec<Option<AncestorNode>> {
    let expected = EXPECTED_GROUP_COUNTS[generation - 1];
    if cards.len() != expected {
        warnings.push(ImportWarning::new(
            format!("unexpected_{row_label}_gen{generation}_count"),
            format!(
                "expected {expected} cards in generation {generation} of the {row_label} row, found {}",
                cards.len()
            ),
        ));
    }
    let mut slots: Vec<Option<AncestorNode>> = cards
        .into_iter()
        .take(expected)
        .map(|card| Some(node_from_card(card, base, warnings)))
        .collect();
    slots.resize(expected, None);
    slots
}

/// Build one branch (the root's father or mother, with two generations of
/// ancestors above) from a branch row's card groups.
fn assemble_branch(
    row: BranchRow,
    row_label: &str,
    base: Option<&Url>,
    warnings: &mut Vec<ImportWarning>,
) -> Option<Box<AncestorNode>> {
    let [g1_cards, g2_cards, g3_cards] = row;
    let mut g3 = group_slots(g3_cards, row_label, 3, base, warnings);
    let mut g2 = group_slots(g2_cards, row_label, 2, base, warnings);
    let mut g1 = group_slots(g1_cards, row_label, 1, base, warnings);

    // A missing node orphans the cards above it; position alone cannot
    // attach a great-grandparent to an unknown grandparent.
    for i in 0..2 {
        if let Some(grandparent) = g2[i].as_mut() {
            grandparent.father = g3[i * 2].take().map(Box::new);
            grandparent.mother = g3[i * 2 + 1].take().map(Box::new);
        }
    }
    if let Some(parent) = g1[0].as_mut() {
        parent.father = g2[0].take().map(Box::new);
        parent.mother = g2[1].take().map(Box::new);
    }
    g1.swap_remove(0).map(Box::new)
}

/// Parse an already-fetched pedigree document into a best-effort tree plus
/// the warnings accumulated along the way.
///
/// `source_url` is used to absolutize profile links and image references;
/// an unparseable source URL just disables absolutization.
pub fn parse_pedigree(html: &str, source_url: &str) -> ParsedPedigree {
    let doc = Html::parse_document(html);
    let base = Url::parse(source_url).ok();
    let mut warnings = Vec::new();

    let name = match cards::root_name(&doc) {
        Some(name) => name,
        None => {
            warnings.push(ImportWarning::new(
                "missing_root_name",
                "document carries no root display name; using a placeholder",
            ));
            PLACEHOLDER_ROOT_NAME.to_string()
        }
    };
    let image = cards::root_image(&doc).and_then(|src| {
        let relayed = relay_for(&src, base.as_ref());
        if relayed.is_none() {
            warnings.push(ImportWarning::new(
                "image_not_proxied",
                format!("root image reference {src:?} could not be proxied"),
            ));
        }
        relayed
    });

    let mut rows = cards::branch_rows(&doc, base.as_ref());
    if rows.len() < 2 {
        warn!("expected two branch rows, found {}", rows.len());
        warnings.push(ImportWarning::new(
            "missing_branch_rows",
            format!("expected two branch rows, found {}", rows.len()),
        ));
    } else if rows.len() > 2 {
        warnings.push(ImportWarning::new(
            "unexpected_branch_row_count",
            format!("expected two branch rows, found {}; using the first two", rows.len()),
        ));
    }

    let mut row_iter = rows.drain(..);
    let father = row_iter
        .next()
        .and_then(|row| assemble_branch(row, "father", base.as_ref(), &mut warnings));
    let mother = row_iter
        .next()
        .and_then(|row| assemble_branch(row, "mother", base.as_ref(), &mut warnings));
    drop(row_iter);

    let root = AncestorNode {
        id: None,
        name,
        sex: Sex::Unknown,
        image,
        profile_url: base.as_ref().map(|u| u.to_string()),
        father,
        mother,
    };

    ParsedPedigree { root, warnings }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guards::SCRAPE_GENERATIONS;
    use crate::models::GenerationList;

    const SOURCE_URL: &str = "https://www.bullypedia.net/dog/rocko";

    fn card(name: &str) -> String {
        format!(r#"<div class="dog-card male"><a href="/dog/{name}">{name}</a></div>"#)
    }

    fn row(g1: &[&str], g2: &[&str], g3: &[&str]) -> String {
        let group = |names: &[&str]| names.iter().map(|n| card(n)).collect::<String>();
        format!(
            r#"<tr><td class="gen-1">{}</td><td class="gen-2">{}</td><td class="gen-3">{}</td></tr>"#,
            group(g1),
            group(g2),
            group(g3),
        )
    }

    fn document(header: &str, rows: &[String]) -> String {
        format!(
            r#"<html><body>{header}<table class="pedigree">{}</table></body></html>"#,
            rows.concat()
        )
    }

    fn full_document() -> String {
        document(
            r#"<h1 class="dog-name">Rocko</h1><img class="dog-photo" src="/images/rocko.jpg">"#,
            &[
                row(&["Duke"], &["Rex", "Bella"], &["A", "B", "C", "D"]),
                row(&["Luna"], &["Max", "Daisy"], &["E", "F", "G", "H"]),
            ],
        )
    }

    #[test]
    fn test_assembly_example() {
        let parsed = parse_pedigree(&full_document(), SOURCE_URL);
        assert!(parsed.warnings.is_empty(), "{:?}", parsed.warnings);
        let root = &parsed.root;
        assert_eq!(root.name, "Rocko");
        assert_eq!(root.father.as_ref().unwrap().name, "Duke");
        assert_eq!(root.father.as_ref().unwrap().father.as_ref().unwrap().name, "Rex");
        assert_eq!(root.father.as_ref().unwrap().mother.as_ref().unwrap().name, "Bella");
        assert_eq!(root.mother.as_ref().unwrap().name, "Luna");
        assert_eq!(root.mother.as_ref().unwrap().father.as_ref().unwrap().name, "Max");
        assert_eq!(root.mother.as_ref().unwrap().mother.as_ref().unwrap().name, "Daisy");
    }

    #[test]
    fn test_great_grandparents_in_fixed_order() {
        let parsed = parse_pedigree(&full_document(), SOURCE_URL);
        let father = parsed.root.father.unwrap();
        let ff = father.father.unwrap();
        let fm = father.mother.unwrap();
        assert_eq!(ff.father.unwrap().name, "A");
        assert_eq!(ff.mother.unwrap().name, "B");
        assert_eq!(fm.father.unwrap().name, "C");
        assert_eq!(fm.mother.unwrap().name, "D");
    }

    #[test]
    fn test_count_mismatch_warns_once_and_uses_first_cards() {
        let doc = document(
            r#"<h1 class="dog-name">Rocko</h1>"#,
            &[
                row(&["Duke"], &["Rex", "Bella", "Extra"], &["A", "B", "C", "D"]),
                row(&["Luna"], &["Max", "Daisy"], &["E", "F", "G", "H"]),
            ],
        );
        let parsed = parse_pedigree(&doc, SOURCE_URL);
        let gen2_warnings: Vec<_> = parsed
            .warnings
            .iter()
            .filter(|w| w.code.starts_with("unexpected_") && w.code.ends_with("_gen2_count"))
            .collect();
        assert_eq!(gen2_warnings.len(), 1);
        assert_eq!(gen2_warnings[0].code, "unexpected_father_gen2_count");

        let father = parsed.root.father.unwrap();
        assert_eq!(father.father.unwrap().name, "Rex");
        assert_eq!(father.mother.unwrap().name, "Bella");
    }

    #[test]
    fn test_missing_root_name_warns_and_uses_placeholder() {
        let doc = document(
            "",
            &[
                row(&["Duke"], &["Rex", "Bella"], &["A", "B", "C", "D"]),
                row(&["Luna"], &["Max", "Daisy"], &["E", "F", "G", "H"]),
            ],
        );
        let parsed = parse_pedigree(&doc, SOURCE_URL);
        assert_eq!(parsed.root.name, "Unknown");
        assert!(parsed.warnings.iter().any(|w| w.code == "missing_root_name"));
        // Never aborts: the branches are still assembled.
        assert_eq!(parsed.root.father.unwrap().name, "Duke");
    }

    #[test]
    fn test_single_branch_row_degrades_to_unknown_mother() {
        let doc = document(
            r#"<h1 class="dog-name">Rocko</h1>"#,
            &[row(&["Duke"], &["Rex", "Bella"], &["A", "B", "C", "D"])],
        );
        let parsed = parse_pedigree(&doc, SOURCE_URL);
        assert!(parsed.warnings.iter().any(|w| w.code == "missing_branch_rows"));
        assert_eq!(parsed.root.father.unwrap().name, "Duke");
        assert!(parsed.root.mother.is_none());
    }

    #[test]
    fn test_missing_grandparent_orphans_cards_above_it() {
        // Only one gen-2 card: Bella's slot is unknown, so C and D cannot
        // attach and are dropped.
        let doc = document(
            r#"<h1 class="dog-name">Rocko</h1>"#,
            &[
                row(&["Duke"], &["Rex"], &["A", "B", "C", "D"]),
                row(&["Luna"], &["Max", "Daisy"], &["E", "F", "G", "H"]),
            ],
        );
        let parsed = parse_pedigree(&doc, SOURCE_URL);
        let father = parsed.root.father.unwrap();
        let rex = father.father.unwrap();
        assert_eq!(rex.father.as_ref().unwrap().name, "A");
        assert_eq!(rex.mother.as_ref().unwrap().name, "B");
        assert!(father.mother.is_none());
    }

    #[test]
    fn test_images_are_relayed_not_linked() {
        let parsed = parse_pedigree(&full_document(), SOURCE_URL);
        let image = parsed.root.image.unwrap();
        assert!(image.starts_with("/image-proxy?u="), "{image}");
    }

    #[test]
    fn test_parsed_tree_flattens_to_scrape_generations() {
        let parsed = parse_pedigree(&full_document(), SOURCE_URL);
        let list = GenerationList::from_root(&parsed.root, SCRAPE_GENERATIONS);
        assert_eq!(list.depth(), SCRAPE_GENERATIONS);
        assert_eq!(list.get(1, 0).unwrap().name, "Duke");
        assert_eq!(list.get(2, 3).unwrap().name, "Daisy");
        assert_eq!(list.get(3, 0).unwrap().name, "A");
        assert_eq!(list.get(3, 7).unwrap().name, "H");
    }

    #[test]
    fn test_empty_document_still_returns_a_tree() {
        let parsed = parse_pedigree("<html><body></body></html>", SOURCE_URL);
        assert_eq!(parsed.root.name, "Unknown");
        assert!(parsed.root.father.is_none());
        assert!(parsed.root.mother.is_none());
        assert!(!parsed.warnings.is_empty());
    }
}
